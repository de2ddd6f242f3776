use std::sync::atomic::{AtomicU32, Ordering};

use windows_sys::Win32::UI::WindowsAndMessaging::{RegisterWindowMessageA, WM_USER};

/// Callback message the shell sends for mouse interaction with the icon.
/// LPARAM carries the mouse message (`WM_LBUTTONDBLCLK`, `WM_RBUTTONUP`, ...).
pub(crate) const TRAY_CALLBACK_MSG_ID: u32 = WM_USER + 20;

/// A lazily-initialized window message ID.
pub struct LazyMessageId {
    /// The ID.
    id: AtomicU32,

    /// The name of the message.
    name: &'static str,
}

/// An invalid custom window ID.
const INVALID_ID: u32 = 0x0;

impl LazyMessageId {
    /// Create a new `LazyId`.
    const fn new(name: &'static str) -> Self {
        Self {
            id: AtomicU32::new(INVALID_ID),
            name,
        }
    }

    /// Get the message ID, registering it on first use.
    ///
    /// Returns `None` if the system refused to register the message.
    pub fn get(&self) -> Option<u32> {
        let id = self.id.load(Ordering::Relaxed);

        if id != INVALID_ID {
            return Some(id);
        }

        debug_assert!(self.name.ends_with('\0'));
        // SAFETY: `name` is a valid C string ending with '\0'.
        let new_id = unsafe { RegisterWindowMessageA(self.name.as_ptr()) };

        if new_id == INVALID_ID {
            tracing::error!(
                name = self.name.trim_end_matches('\0'),
                err = %std::io::Error::last_os_error(),
                "RegisterWindowMessageA failed"
            );
            return None;
        }

        // `RegisterWindowMessageA` returns the same value for any given string, so a racing
        // store writes the same ID.
        self.id.store(new_id, Ordering::Relaxed);

        Some(new_id)
    }
}

// Broadcast by the shell after it (re)creates the taskbar, e.g. when explorer restarts.
// WPARAM and LPARAM are unused.
pub(crate) static TASKBAR_CREATED_MSG_ID: LazyMessageId = LazyMessageId::new("TaskbarCreated\0");
