//! In-memory `NativeWindow` that records every call, for controller tests.

use std::cell::{Cell, RefCell};
use std::collections::VecDeque;
use std::io;
use std::path::{Path, PathBuf};
use std::rc::Rc;

use dpi::PhysicalPosition;

use crate::error::Error;
use crate::menu::MenuEntry;
use crate::message::Message;
use crate::window::{IconHandle, IconKind, NativeWindow, NotifyOp};

#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Call {
    LoadIcon(PathBuf),
    DefaultIcon,
    NotifyIcon(NotifyOp, IconHandle, String),
    RemoveIcon,
    SetForeground,
    /// Number of top-level entries and the position.
    TrackPopupMenu(usize, PhysicalPosition<i32>),
    Destroy,
    PostQuit,
}

#[derive(Default)]
struct Shared {
    calls: RefCell<Vec<Call>>,
    queue: RefCell<VecDeque<Message>>,
    quit: Cell<bool>,
    fail_notify: Cell<bool>,
}

/// Clones share the same record, so a test can keep one and hand the other to the tray.
#[derive(Clone, Default)]
pub(crate) struct RecordingWindow {
    shared: Rc<Shared>,
}

impl RecordingWindow {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn calls(&self) -> Vec<Call> {
        self.shared.calls.borrow().clone()
    }

    pub fn notifies(&self) -> Vec<(NotifyOp, IconHandle, String)> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                Call::NotifyIcon(op, icon, tip) => Some((op, icon, tip)),
                _ => None,
            })
            .collect()
    }

    /// Queue a posted message.
    pub fn push(&self, message: Message) {
        self.shared.queue.borrow_mut().push_back(message);
    }

    pub fn fail_notify(&self, fail: bool) {
        self.shared.fail_notify.set(fail);
    }

    /// Make the pump stop as if a quit message arrived from elsewhere.
    pub fn close_queue(&self) {
        self.shared.quit.set(true);
    }

    fn record(&self, call: Call) {
        self.shared.calls.borrow_mut().push(call);
    }
}

impl NativeWindow for RecordingWindow {
    fn load_icon(&mut self, path: &Path) -> Result<IconHandle, Error> {
        self.record(Call::LoadIcon(path.to_path_buf()));
        if path.as_os_str().is_empty() {
            return Err(Error::IconLoad {
                path: path.to_path_buf(),
                source: io::ErrorKind::InvalidInput.into(),
            });
        }
        Ok(IconHandle::new(0x100, IconKind::File))
    }

    fn default_icon(&mut self) -> Result<IconHandle, Error> {
        self.record(Call::DefaultIcon);
        Ok(IconHandle::new(32512, IconKind::Default))
    }

    fn notify_icon(&mut self, op: NotifyOp, icon: IconHandle, tip: &str) -> Result<(), Error> {
        self.record(Call::NotifyIcon(op, icon, tip.to_string()));
        if self.shared.fail_notify.get() {
            return Err(Error::NotifyIcon { op });
        }
        Ok(())
    }

    fn remove_icon(&mut self) -> Result<(), Error> {
        self.record(Call::RemoveIcon);
        Ok(())
    }

    fn cursor_position(&self) -> PhysicalPosition<i32> {
        PhysicalPosition::new(10, 20)
    }

    fn set_foreground(&mut self) {
        self.record(Call::SetForeground);
    }

    fn track_popup_menu(
        &mut self,
        menu: &[MenuEntry],
        position: PhysicalPosition<i32>,
    ) -> Result<(), Error> {
        self.record(Call::TrackPopupMenu(menu.len(), position));
        Ok(())
    }

    fn destroy(&mut self) {
        self.record(Call::Destroy);
        // Sent, not posted: delivered ahead of anything already queued.
        self.shared.queue.borrow_mut().push_front(Message::Destroy);
    }

    fn post_quit(&mut self) {
        self.record(Call::PostQuit);
        self.shared.quit.set(true);
    }

    fn next_message(&mut self) -> Option<Message> {
        if self.shared.quit.get() {
            return None;
        }
        self.shared.queue.borrow_mut().pop_front()
    }
}
