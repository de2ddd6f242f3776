//! The native side of the tray: one hidden window, the shell notification icon and the
//! message pump.

use std::path::Path;

use dpi::PhysicalPosition;

use crate::error::Error;
use crate::menu::MenuEntry;
use crate::message::Message;

/// Shell notification operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotifyOp {
    Add,
    Modify,
    Delete,
}

/// Where an icon handle came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IconKind {
    /// Loaded from an icon file.
    File,
    /// The stock application icon.
    Default,
}

/// An icon loaded by a [`NativeWindow`]. The window owns the underlying resource.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IconHandle {
    raw: usize,
    kind: IconKind,
}

impl IconHandle {
    pub const fn new(raw: usize, kind: IconKind) -> Self {
        Self { raw, kind }
    }

    pub const fn raw(&self) -> usize {
        self.raw
    }

    pub const fn kind(&self) -> IconKind {
        self.kind
    }
}

/// Platform window backing a tray icon.
///
/// All methods are called from the thread that created the window. Messages are handed out by
/// [`next_message`](NativeWindow::next_message) in arrival order, one at a time.
pub trait NativeWindow {
    /// Load an icon file at the default tray icon size.
    fn load_icon(&mut self, path: &Path) -> Result<IconHandle, Error>;

    /// The stock application icon.
    fn default_icon(&mut self) -> Result<IconHandle, Error>;

    /// Add or modify the notification icon with the given icon and hover text.
    fn notify_icon(&mut self, op: NotifyOp, icon: IconHandle, tip: &str) -> Result<(), Error>;

    /// Delete the notification icon.
    fn remove_icon(&mut self) -> Result<(), Error>;

    /// Pointer position in screen coordinates.
    fn cursor_position(&self) -> PhysicalPosition<i32>;

    /// Bring the window to the foreground so a popup gets input focus and dismisses correctly.
    fn set_foreground(&mut self);

    /// Show `menu` as a popup at `position`. Blocks until the popup is dismissed; the chosen
    /// item arrives later as a [`Message::Command`].
    fn track_popup_menu(
        &mut self,
        menu: &[MenuEntry],
        position: PhysicalPosition<i32>,
    ) -> Result<(), Error>;

    /// Destroy the window. A [`Message::Destroy`] follows.
    fn destroy(&mut self);

    /// Ask the pump to stop.
    fn post_quit(&mut self);

    /// Block until the next tray message arrives. `None` once the pump has been told to quit.
    fn next_message(&mut self) -> Option<Message>;
}
