//! Win32 tray window: a hidden window owning the shell notification icon, and the message pump
//! that feeds its messages to the tray.
//!
//! The window procedure never calls back into the tray. It classifies the few messages the tray
//! cares about and queues them; [`Win32Window::next_message`] hands them out from the pump loop.
//! A handler can therefore destroy the window or run a modal popup without re-entering itself.
#![cfg(target_os = "windows")]

mod icon;
mod menu;
mod msg;
mod util;

use std::cell::{Cell, RefCell};
use std::collections::VecDeque;
use std::path::Path;
use std::{io, mem, ptr};

use dpi::PhysicalPosition;
use systray_core::{
    DEFAULT_CLASS_NAME, Error, IconHandle, IconKind, MenuEntry, Message, NativeWindow,
    NotifyEvent, NotifyOp,
};
use windows_sys::Win32::{
    Foundation::{ERROR_CLASS_ALREADY_EXISTS, HWND, LPARAM, LRESULT, POINT, WPARAM},
    Graphics::Gdi::{COLOR_WINDOW, HBRUSH, UpdateWindow},
    UI::{
        Shell::{
            NIF_ICON, NIF_MESSAGE, NIF_TIP, NIM_ADD, NIM_DELETE, NIM_MODIFY, NOTIFYICONDATAW,
            Shell_NotifyIconW,
        },
        WindowsAndMessaging::{
            CS_HREDRAW, CS_VREDRAW, CW_USEDEFAULT, CreateWindowExW, DefWindowProcW, DestroyIcon,
            DestroyWindow, DispatchMessageW, GWL_USERDATA, GetCursorPos, GetMessageW, HICON,
            IDC_ARROW, LoadCursorW, MSG, PostQuitMessage, RegisterClassExW, SetForegroundWindow,
            TranslateMessage, WM_COMMAND, WM_DESTROY, WM_LBUTTONDBLCLK, WM_LBUTTONUP, WM_NCDESTROY,
            WM_RBUTTONUP, WNDCLASSEXW, WS_OVERLAPPED, WS_SYSMENU,
        },
    },
};

use crate::msg::{TASKBAR_CREATED_MSG_ID, TRAY_CALLBACK_MSG_ID};

/// `uID` of our notification icon; one icon per window.
const TRAY_ICON_UID: u32 = 0;

/// Data stored per tray window, reachable from the window procedure through `GWL_USERDATA`.
#[derive(Default)]
struct TrayWindowData {
    queue: RefCell<VecDeque<Message>>,
    destroyed: Cell<bool>,
}

/// A hidden top-level window that owns one shell notification icon.
pub struct Win32Window {
    hwnd: HWND,
    data: Box<TrayWindowData>,
    /// Custom icon currently shown by the shell.
    shown_icon: Option<HICON>,
    /// Custom icon loaded but not yet shown.
    loaded_icon: Option<HICON>,
}

impl std::fmt::Debug for Win32Window {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Win32Window")
            .field("hwnd", &self.hwnd)
            .field("destroyed", &self.data.destroyed.get())
            .finish_non_exhaustive()
    }
}

impl Win32Window {
    /// Register the window class and create the hidden tray window.
    ///
    /// An empty `class_name` falls back to [`DEFAULT_CLASS_NAME`].
    pub fn new(class_name: &str) -> Result<Self, anyhow::Error> {
        let class_name = if class_name.is_empty() {
            DEFAULT_CLASS_NAME
        } else {
            class_name
        };
        unsafe { init_window(class_name) }
    }

    /// Get the Windows window handle.
    #[inline]
    pub fn hwnd(&self) -> HWND {
        self.hwnd
    }

    fn notify_data(&self) -> NOTIFYICONDATAW {
        let mut data: NOTIFYICONDATAW = unsafe { mem::zeroed() };
        data.cbSize = mem::size_of::<NOTIFYICONDATAW>() as u32;
        data.hWnd = self.hwnd;
        data.uID = TRAY_ICON_UID;
        data
    }

    /// Track which custom icon the shell now shows and free the one it replaced.
    fn icon_shown(&mut self, icon: IconHandle) {
        let now_shown = match icon.kind() {
            IconKind::File => self.loaded_icon.take(),
            IconKind::Default => None,
        };
        if let Some(previous) = mem::replace(&mut self.shown_icon, now_shown) {
            if Some(previous) != self.shown_icon {
                unsafe { DestroyIcon(previous) };
            }
        }
    }
}

unsafe fn init_window(class_name: &str) -> Result<Win32Window, anyhow::Error> {
    let class_name = util::encode_wide(class_name);
    let instance = util::get_instance_handle();

    let class = WNDCLASSEXW {
        cbSize: mem::size_of::<WNDCLASSEXW>() as u32,
        style: CS_HREDRAW | CS_VREDRAW,
        lpfnWndProc: Some(tray_window_callback),
        cbClsExtra: 0,
        cbWndExtra: 0,
        hInstance: instance,
        hIcon: ptr::null_mut(),
        hCursor: unsafe { LoadCursorW(ptr::null_mut(), IDC_ARROW) },
        hbrBackground: (COLOR_WINDOW + 1) as usize as HBRUSH,
        lpszMenuName: ptr::null(),
        lpszClassName: class_name.as_ptr(),
        hIconSm: ptr::null_mut(),
    };

    if unsafe { RegisterClassExW(&class) } == 0 {
        let err = io::Error::last_os_error();
        if err.raw_os_error() != Some(ERROR_CLASS_ALREADY_EXISTS as i32) {
            return Err(Error::Window(err).into());
        }
    }

    // Register before the window exists so the first broadcast is recognised.
    TASKBAR_CREATED_MSG_ID.get();

    let hwnd = unsafe {
        CreateWindowExW(
            0,
            class_name.as_ptr(),
            class_name.as_ptr(),
            WS_OVERLAPPED | WS_SYSMENU,
            0,
            0,
            CW_USEDEFAULT,
            CW_USEDEFAULT,
            ptr::null_mut(),
            ptr::null_mut(),
            instance,
            ptr::null(),
        )
    };

    if hwnd.is_null() {
        return Err(Error::Window(io::Error::last_os_error()).into());
    }

    let data = Box::<TrayWindowData>::default();
    unsafe {
        util::set_window_long(hwnd, GWL_USERDATA, &*data as *const TrayWindowData as isize);
        UpdateWindow(hwnd);
    }
    tracing::debug!(?hwnd, "created tray window");

    Ok(Win32Window {
        hwnd,
        data,
        shown_icon: None,
        loaded_icon: None,
    })
}

impl NativeWindow for Win32Window {
    fn load_icon(&mut self, path: &Path) -> Result<IconHandle, Error> {
        let hicon = icon::load_from_file(path)?;
        if let Some(stale) = self.loaded_icon.replace(hicon) {
            unsafe { DestroyIcon(stale) };
        }
        Ok(IconHandle::new(hicon as usize, IconKind::File))
    }

    fn default_icon(&mut self) -> Result<IconHandle, Error> {
        let hicon = icon::application_icon()?;
        Ok(IconHandle::new(hicon as usize, IconKind::Default))
    }

    fn notify_icon(&mut self, op: NotifyOp, icon: IconHandle, tip: &str) -> Result<(), Error> {
        let mut data = self.notify_data();
        data.uFlags = NIF_ICON | NIF_MESSAGE | NIF_TIP;
        data.uCallbackMessage = TRAY_CALLBACK_MSG_ID;
        data.hIcon = icon.raw() as HICON;
        util::copy_wide(&mut data.szTip, tip);

        let message = match op {
            NotifyOp::Add => NIM_ADD,
            NotifyOp::Modify => NIM_MODIFY,
            NotifyOp::Delete => NIM_DELETE,
        };
        if unsafe { Shell_NotifyIconW(message, &data) } == 0 {
            return Err(Error::NotifyIcon { op });
        }

        self.icon_shown(icon);
        Ok(())
    }

    fn remove_icon(&mut self) -> Result<(), Error> {
        let data = self.notify_data();
        if unsafe { Shell_NotifyIconW(NIM_DELETE, &data) } == 0 {
            return Err(Error::NotifyIcon {
                op: NotifyOp::Delete,
            });
        }
        Ok(())
    }

    fn cursor_position(&self) -> PhysicalPosition<i32> {
        let mut point = POINT { x: 0, y: 0 };
        if unsafe { GetCursorPos(&mut point) } == 0 {
            tracing::warn!(err = %io::Error::last_os_error(), "GetCursorPos failed");
        }
        PhysicalPosition::new(point.x, point.y)
    }

    fn set_foreground(&mut self) {
        unsafe { SetForegroundWindow(self.hwnd) };
    }

    fn track_popup_menu(
        &mut self,
        entries: &[MenuEntry],
        position: PhysicalPosition<i32>,
    ) -> Result<(), Error> {
        unsafe { menu::track_popup_menu(self.hwnd, entries, position) }
    }

    fn destroy(&mut self) {
        if !self.data.destroyed.get() {
            unsafe { DestroyWindow(self.hwnd) };
        }
    }

    fn post_quit(&mut self) {
        unsafe { PostQuitMessage(0) };
    }

    fn next_message(&mut self) -> Option<Message> {
        loop {
            if let Some(message) = self.data.queue.borrow_mut().pop_front() {
                return Some(message);
            }

            let mut msg: MSG = unsafe { mem::zeroed() };
            match unsafe { GetMessageW(&mut msg, ptr::null_mut(), 0, 0) } {
                0 => return None,
                -1 => {
                    tracing::error!(err = %io::Error::last_os_error(), "GetMessageW failed");
                    return None;
                }
                _ => unsafe {
                    TranslateMessage(&msg);
                    DispatchMessageW(&msg);
                },
            }
        }
    }
}

impl Drop for Win32Window {
    fn drop(&mut self) {
        unsafe {
            if !self.data.destroyed.get() {
                // Detach first so the window procedure stops touching `data`.
                util::set_window_long(self.hwnd, GWL_USERDATA, 0);
                DestroyWindow(self.hwnd);
            }
            for hicon in [self.shown_icon.take(), self.loaded_icon.take()].into_iter().flatten() {
                DestroyIcon(hicon);
            }
        }
    }
}

/// Map a raw window message to a tray message.
fn classify(msg: u32, wparam: WPARAM, lparam: LPARAM) -> Option<Message> {
    match msg {
        WM_DESTROY => Some(Message::Destroy),
        WM_COMMAND => Some(Message::Command { wparam }),
        TRAY_CALLBACK_MSG_ID => Some(Message::Notify(notify_event(lparam as u32))),
        _ if Some(msg) == TASKBAR_CREATED_MSG_ID.get() => Some(Message::TaskbarCreated),
        _ => None,
    }
}

fn notify_event(code: u32) -> NotifyEvent {
    match code {
        WM_LBUTTONDBLCLK => NotifyEvent::LeftButtonDoubleClick,
        WM_LBUTTONUP => NotifyEvent::LeftButtonUp,
        WM_RBUTTONUP => NotifyEvent::RightButtonUp,
        other => NotifyEvent::Other(other),
    }
}

/// Window callback for the tray window.
unsafe extern "system" fn tray_window_callback(
    window: HWND,
    msg: u32,
    wparam: WPARAM,
    lparam: LPARAM,
) -> LRESULT {
    let userdata = unsafe { util::get_window_long(window, GWL_USERDATA) };
    if userdata == 0 {
        return unsafe { DefWindowProcW(window, msg, wparam, lparam) };
    }
    let data = unsafe { &*(userdata as *const TrayWindowData) };

    if msg == WM_NCDESTROY {
        data.destroyed.set(true);
        unsafe { util::set_window_long(window, GWL_USERDATA, 0) };
        return unsafe { DefWindowProcW(window, msg, wparam, lparam) };
    }

    match classify(msg, wparam, lparam) {
        Some(message) => {
            let mut queue = data.queue.borrow_mut();
            match message {
                // Nothing queued earlier may run against a destroyed window.
                Message::Destroy => queue.push_front(message),
                _ => queue.push_back(message),
            }
            match message {
                Message::Notify(_) => 1,
                _ => 0,
            }
        }
        None => unsafe { DefWindowProcW(window, msg, wparam, lparam) },
    }
}
