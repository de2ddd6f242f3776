//! Window messages the tray reacts to, and the table routing them to handlers.

/// Kinds of window message routed to the tray.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MessageKind {
    /// The shell rebuilt the notification area (e.g. explorer restarted).
    TaskbarCreated,
    /// The tray window is being destroyed.
    Destroy,
    /// A menu item was chosen.
    Command,
    /// Mouse interaction with the tray icon.
    Notify,
}

/// Mouse interaction reported through the tray's callback message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotifyEvent {
    LeftButtonDoubleClick,
    LeftButtonUp,
    RightButtonUp,
    /// Any other sub-code, passed through untouched.
    Other(u32),
}

/// A classified window message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Message {
    TaskbarCreated,
    Destroy,
    /// `wparam` as delivered with `WM_COMMAND`; the command id is its low word.
    Command { wparam: usize },
    Notify(NotifyEvent),
}

impl Message {
    pub fn kind(&self) -> MessageKind {
        match self {
            Message::TaskbarCreated => MessageKind::TaskbarCreated,
            Message::Destroy => MessageKind::Destroy,
            Message::Command { .. } => MessageKind::Command,
            Message::Notify(_) => MessageKind::Notify,
        }
    }
}

#[inline]
pub fn low_word(wparam: usize) -> u16 {
    (wparam & 0xFFFF) as u16
}

/// Handler for one kind of message. The return value is the message result.
pub type Handler<C> = fn(&mut C, &Message) -> isize;

/// One handler per [`MessageKind`], fixed when the window is set up.
pub struct MessageMap<C> {
    pub taskbar_created: Handler<C>,
    pub destroy: Handler<C>,
    pub command: Handler<C>,
    pub notify: Handler<C>,
}

impl<C> MessageMap<C> {
    pub fn handler(&self, kind: MessageKind) -> Handler<C> {
        match kind {
            MessageKind::TaskbarCreated => self.taskbar_created,
            MessageKind::Destroy => self.destroy,
            MessageKind::Command => self.command,
            MessageKind::Notify => self.notify,
        }
    }

    pub fn dispatch(&self, target: &mut C, message: &Message) -> isize {
        (self.handler(message.kind()))(target, message)
    }
}

// Manual impls: fn pointers are `Copy` whatever `C` is.
impl<C> Clone for MessageMap<C> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<C> Copy for MessageMap<C> {}

impl<C> std::fmt::Debug for MessageMap<C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MessageMap").finish_non_exhaustive()
    }
}
