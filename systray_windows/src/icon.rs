//! Icon loading for the notification area and for menu items.

#![allow(unsafe_op_in_unsafe_fn)]

use std::path::Path;
use std::{io, ptr};

use systray_core::Error;
use windows_sys::Win32::{
    Foundation::{HWND, RECT},
    Graphics::Gdi::{
        COLOR_MENU, CreateCompatibleBitmap, CreateCompatibleDC, DeleteDC, DeleteObject, FillRect,
        GetSysColorBrush, GetWindowDC, HBITMAP, ReleaseDC, SelectObject,
    },
    UI::WindowsAndMessaging::{
        DI_NORMAL, DestroyIcon, DrawIconEx, GetSystemMetrics, HICON, IDI_APPLICATION, IMAGE_ICON,
        LR_DEFAULTSIZE, LR_LOADFROMFILE, LoadIconW, LoadImageW, SM_CXSMICON, SM_CYSMICON,
    },
};

use crate::util::encode_wide;

/// Load an `.ico` file at the default icon size.
pub(crate) fn load_from_file(path: &Path) -> Result<HICON, Error> {
    load_sized(path, 0, 0, LR_LOADFROMFILE | LR_DEFAULTSIZE).ok_or_else(|| Error::IconLoad {
        path: path.to_path_buf(),
        source: io::Error::last_os_error(),
    })
}

/// The stock application icon. Shared; must not be destroyed.
pub(crate) fn application_icon() -> Result<HICON, Error> {
    let hicon = unsafe { LoadIconW(ptr::null_mut(), IDI_APPLICATION) };
    if hicon.is_null() {
        return Err(Error::Window(io::Error::last_os_error()));
    }
    Ok(hicon)
}

fn load_sized(path: &Path, cx: i32, cy: i32, flags: u32) -> Option<HICON> {
    let wide = encode_wide(path.as_os_str());
    let handle = unsafe { LoadImageW(ptr::null_mut(), wide.as_ptr(), IMAGE_ICON, cx, cy, flags) };
    (!handle.is_null()).then_some(handle as HICON)
}

/// Render an icon file onto a small-icon sized bitmap with the menu background colour, for use
/// as a menu item image. The caller owns the returned bitmap.
///
/// # Safety
/// The `hwnd` must be a valid window handle.
pub(crate) unsafe fn menu_item_bitmap(hwnd: HWND, path: &Path) -> Option<HBITMAP> {
    let cx = GetSystemMetrics(SM_CXSMICON);
    let cy = GetSystemMetrics(SM_CYSMICON);

    let Some(hicon) = load_sized(path, cx, cy, LR_LOADFROMFILE) else {
        tracing::warn!(path = %path.display(), err = %io::Error::last_os_error(), "failed to load menu icon");
        return None;
    };

    let hdc_window = GetWindowDC(hwnd);
    if hdc_window.is_null() {
        DestroyIcon(hicon);
        return None;
    }

    let hdc = CreateCompatibleDC(hdc_window);
    if hdc.is_null() {
        ReleaseDC(hwnd, hdc_window);
        DestroyIcon(hicon);
        return None;
    }

    let hbitmap = CreateCompatibleBitmap(hdc_window, cx, cy);
    if hbitmap.is_null() {
        DeleteDC(hdc);
        ReleaseDC(hwnd, hdc_window);
        DestroyIcon(hicon);
        return None;
    }

    let old_bitmap = SelectObject(hdc, hbitmap as _);
    let rect = RECT {
        left: 0,
        top: 0,
        right: cx,
        bottom: cy,
    };
    FillRect(hdc, &rect, GetSysColorBrush(COLOR_MENU));
    DrawIconEx(hdc, 0, 0, hicon, cx, cy, 0, ptr::null_mut(), DI_NORMAL);
    SelectObject(hdc, old_bitmap);

    DeleteDC(hdc);
    ReleaseDC(hwnd, hdc_window);
    DestroyIcon(hicon);

    Some(hbitmap)
}

/// Free a bitmap from [`menu_item_bitmap`].
pub(crate) unsafe fn delete_bitmap(hbitmap: HBITMAP) {
    DeleteObject(hbitmap as _);
}
