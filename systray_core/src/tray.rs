use std::panic::{AssertUnwindSafe, catch_unwind};
use std::path::{Path, PathBuf};

use crate::TrayIconAttributes;
use crate::command_id::CommandId;
use crate::menu::{Command, FIRST_ID, MenuEntry};
use crate::message::{Message, MessageMap, NotifyEvent, low_word};
use crate::registry::{CommandRegistry, build_menu};
use crate::window::{IconHandle, NativeWindow, NotifyOp};

/// Called once when the tray window is destroyed, before the icon is removed.
///
/// The native window no longer exists at that point, so [`TrayIcon::refresh_icon`] is a no-op.
pub type QuitCallback = Box<dyn FnOnce(&mut TrayIcon)>;

/// Lifecycle of a [`TrayIcon`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum State {
    Constructing,
    Running,
    Destroying,
    Terminated,
}

/// A shell tray icon with a context menu.
///
/// The menu and the command registry are fixed at construction. The icon and hover text can be
/// changed by callbacks; call [`refresh_icon`](Self::refresh_icon) to push changes to the shell.
pub struct TrayIcon {
    icon: PathBuf,
    hover_text: String,
    menu: Vec<MenuEntry>,
    registry: CommandRegistry,
    on_quit: Option<QuitCallback>,
    default_index: u32,
    window: Box<dyn NativeWindow>,
    message_map: MessageMap<TrayIcon>,
    icon_added: bool,
    state: State,
}

impl std::fmt::Debug for TrayIcon {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TrayIcon")
            .field("icon", &self.icon)
            .field("hover_text", &self.hover_text)
            .field("menu", &self.menu)
            .field("default_index", &self.default_index)
            .field("icon_added", &self.icon_added)
            .field("state", &self.state)
            .finish_non_exhaustive()
    }
}

impl TrayIcon {
    /// Build the menu and registry, then add the icon to the shell.
    ///
    /// The window is expected to be created already. Call [`pump`](Self::pump) afterwards to
    /// process messages until the user quits.
    pub fn new(attr: TrayIconAttributes, window: Box<dyn NativeWindow>) -> Self {
        let TrayIconAttributes {
            icon,
            hover_text,
            menu,
            on_quit,
            default_index,
            ..
        } = attr;

        let (menu, registry) = build_menu(menu);
        tracing::debug!(commands = registry.len(), "built tray menu");

        let mut tray = TrayIcon {
            icon,
            hover_text,
            menu,
            registry,
            on_quit,
            default_index,
            window,
            message_map: Self::message_map(),
            icon_added: false,
            state: State::Constructing,
        };
        tray.refresh_icon();
        tray.state = State::Running;
        tray
    }

    /// Handlers for each message kind.
    pub fn message_map() -> MessageMap<TrayIcon> {
        MessageMap {
            taskbar_created: Self::on_taskbar_created,
            destroy: Self::on_destroy,
            command: Self::on_command,
            notify: Self::on_notify,
        }
    }

    /// Process messages until the window is destroyed.
    pub fn pump(&mut self) {
        while self.state != State::Terminated {
            let Some(message) = self.window.next_message() else {
                break;
            };
            self.dispatch(&message);
        }

        if self.state == State::Running {
            // Someone else ended the pump; don't leave the icon behind.
            tracing::debug!("message pump ended while running, tearing down");
            self.on_destroy(&Message::Destroy);
        }
    }

    /// Route one message to its handler. Messages are ignored unless the tray is running.
    pub fn dispatch(&mut self, message: &Message) -> isize {
        if self.state != State::Running {
            tracing::debug!(state = ?self.state, kind = ?message.kind(), "ignoring message");
            return 0;
        }
        let map = self.message_map;
        map.dispatch(self, message)
    }

    pub fn icon(&self) -> &Path {
        &self.icon
    }

    pub fn set_icon(&mut self, icon: impl Into<PathBuf>) {
        self.icon = icon.into();
    }

    pub fn hover_text(&self) -> &str {
        &self.hover_text
    }

    pub fn set_hover_text(&mut self, hover_text: impl Into<String>) {
        self.hover_text = hover_text.into();
    }

    pub fn menu(&self) -> &[MenuEntry] {
        &self.menu
    }

    pub fn registry(&self) -> &CommandRegistry {
        &self.registry
    }

    pub fn state(&self) -> State {
        self.state
    }

    /// Command run on a double click, or `None` if the default index is out of the id range.
    pub fn default_command(&self) -> Option<CommandId> {
        FIRST_ID.checked_add(self.default_index).map(CommandId::from_raw)
    }

    /// Push the current icon and hover text to the shell.
    ///
    /// Adds the icon the first time, modifies it afterwards. A missing or unreadable icon file
    /// falls back to the stock application icon.
    ///
    /// Does nothing once the tray is being destroyed: the window is already gone by then.
    pub fn refresh_icon(&mut self) {
        if matches!(self.state, State::Destroying | State::Terminated) {
            tracing::debug!(state = ?self.state, "not refreshing icon of a destroyed tray");
            return;
        }

        let Some(icon) = self.resolve_icon() else {
            return;
        };

        let op = if self.icon_added {
            NotifyOp::Modify
        } else {
            NotifyOp::Add
        };
        match self.window.notify_icon(op, icon, &self.hover_text) {
            Ok(()) => self.icon_added = true,
            Err(err) => tracing::error!(%err, "failed to update tray icon"),
        }
    }

    fn resolve_icon(&mut self) -> Option<IconHandle> {
        if self.icon.is_file() {
            match self.window.load_icon(&self.icon) {
                Ok(icon) => return Some(icon),
                Err(err) => tracing::warn!(%err, "using default icon"),
            }
        } else {
            tracing::warn!(path = %self.icon.display(), "can't find icon file, using default");
        }

        match self.window.default_icon() {
            Ok(icon) => Some(icon),
            Err(err) => {
                tracing::error!(%err, "failed to load default icon");
                None
            }
        }
    }

    /// Show the context menu at the pointer.
    pub fn show_menu(&mut self) {
        let position = self.window.cursor_position();
        self.window.set_foreground();
        if let Err(err) = self.window.track_popup_menu(&self.menu, position) {
            tracing::error!(%err, "failed to show tray menu");
        }
    }

    /// Run the action registered for `id`.
    ///
    /// Unknown ids are logged and ignored.
    pub fn execute(&mut self, id: CommandId) {
        let Some(command) = self.registry.get(id).cloned() else {
            tracing::error!(%id, "no action registered for command");
            return;
        };

        match command {
            Command::Quit => self.window.destroy(),
            Command::Callback(callback) => {
                self.contained("menu callback", |tray| callback(tray));
            }
        }
    }

    /// Run caller code, logging a panic instead of unwinding into the pump.
    fn contained(&mut self, what: &str, f: impl FnOnce(&mut TrayIcon)) {
        if catch_unwind(AssertUnwindSafe(|| f(self))).is_err() {
            tracing::error!(what, "callback panicked");
        }
    }

    fn on_taskbar_created(&mut self, _message: &Message) -> isize {
        // The new notification area has no icon from us; add it again.
        self.icon_added = false;
        self.refresh_icon();
        0
    }

    fn on_destroy(&mut self, _message: &Message) -> isize {
        self.state = State::Destroying;

        if let Some(on_quit) = self.on_quit.take() {
            self.contained("quit callback", on_quit);
        }
        if let Err(err) = self.window.remove_icon() {
            tracing::warn!(%err, "failed to remove tray icon");
        }
        self.icon_added = false;
        self.window.post_quit();

        self.state = State::Terminated;
        0
    }

    fn on_command(&mut self, message: &Message) -> isize {
        if let Message::Command { wparam } = *message {
            self.execute(CommandId::from_raw(u32::from(low_word(wparam))));
        }
        0
    }

    fn on_notify(&mut self, message: &Message) -> isize {
        if let Message::Notify(event) = *message {
            match event {
                NotifyEvent::LeftButtonDoubleClick => match self.default_command() {
                    Some(id) => self.execute(id),
                    None => {
                        tracing::error!(default_index = self.default_index, "default index out of range")
                    }
                },
                NotifyEvent::RightButtonUp => self.show_menu(),
                NotifyEvent::LeftButtonUp | NotifyEvent::Other(_) => {}
            }
        }
        1
    }
}
