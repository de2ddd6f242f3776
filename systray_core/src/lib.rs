use std::path::PathBuf;

pub mod command_id;
pub mod menu;
pub mod message;
pub mod registry;
pub mod window;

mod error;
mod tray;

#[cfg(test)]
mod testing;

pub use command_id::CommandId;
pub use error::Error;
pub use menu::*;
pub use message::{Message, MessageKind, MessageMap, NotifyEvent};
pub use registry::CommandRegistry;
pub use tray::{QuitCallback, State, TrayIcon};
pub use window::{IconHandle, IconKind, NativeWindow, NotifyOp};

/// Window class used when none is given.
pub const DEFAULT_CLASS_NAME: &str = "SysTrayIcon";

/// Everything needed to put a tray icon up.
pub struct TrayIconAttributes {
    /// Path of the `.ico` file shown in the notification area.
    pub icon: PathBuf,
    pub hover_text: String,
    pub menu: Vec<MenuOption>,
    pub on_quit: Option<QuitCallback>,
    /// Item run on a double click, as an offset from [`FIRST_ID`].
    pub default_index: u32,
    pub class_name: String,
}

impl std::fmt::Debug for TrayIconAttributes {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TrayIconAttributes")
            .field("icon", &self.icon)
            .field("hover_text", &self.hover_text)
            .field("menu", &self.menu)
            .field("on_quit", &self.on_quit.as_ref().map(|_| "<fn>"))
            .field("default_index", &self.default_index)
            .field("class_name", &self.class_name)
            .finish()
    }
}

impl Default for TrayIconAttributes {
    fn default() -> Self {
        TrayIconAttributes {
            icon: PathBuf::new(),
            hover_text: String::new(),
            menu: Vec::new(),
            on_quit: None,
            default_index: 0,
            class_name: DEFAULT_CLASS_NAME.to_string(),
        }
    }
}

impl TrayIconAttributes {
    /// Set the icon file for the tray.
    pub fn with_icon(mut self, icon: impl Into<PathBuf>) -> Self {
        self.icon = icon.into();
        self
    }

    /// Set the text shown when hovering the icon.
    pub fn with_hover_text(mut self, hover_text: impl Into<String>) -> Self {
        self.hover_text = hover_text.into();
        self
    }

    /// Set the context menu. A "Quit" entry is always appended.
    pub fn with_menu(mut self, menu: Vec<MenuOption>) -> Self {
        self.menu = menu;
        self
    }

    /// Set the callback run once when the tray goes away.
    pub fn with_on_quit(mut self, on_quit: impl FnOnce(&mut TrayIcon) + 'static) -> Self {
        self.on_quit = Some(Box::new(on_quit));
        self
    }

    /// Set which item runs on a double click.
    pub fn with_default_index(mut self, default_index: u32) -> Self {
        self.default_index = default_index;
        self
    }

    /// Set the class name for the tray window.
    ///
    /// WARNING: On Windows if this is the same as another window class name, it will cause issues.
    pub fn with_class_name(mut self, class_name: impl Into<String>) -> Self {
        self.class_name = class_name.into();
        self
    }
}
