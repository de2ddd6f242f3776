//! Popup menu for the tray icon, built from the annotated menu tree on every show.

#![allow(unsafe_op_in_unsafe_fn)]

use std::{io, ptr};

use dpi::PhysicalPosition;
use systray_core::{EntryKind, Error, MenuEntry};
use windows_sys::Win32::{
    Foundation::HWND,
    Graphics::Gdi::HBITMAP,
    UI::WindowsAndMessaging::{
        AppendMenuW, CreatePopupMenu, DestroyMenu, HMENU,
        MENUITEMINFOW, MF_POPUP, MF_STRING, MIIM_BITMAP, PostMessageW, SetMenuItemInfoW,
        TPM_LEFTALIGN, TrackPopupMenu, WM_NULL,
    },
};

use crate::icon;
use crate::util::encode_wide;

/// Show `entries` as a popup menu at `position` and wait until it is dismissed.
///
/// Item ids are the entries' command ids, so the chosen item comes back as `WM_COMMAND`.
///
/// # Safety
/// The `hwnd` must be a valid window handle owned by the calling thread.
pub(crate) unsafe fn track_popup_menu(
    hwnd: HWND,
    entries: &[MenuEntry],
    position: PhysicalPosition<i32>,
) -> Result<(), Error> {
    let mut bitmaps = Vec::new();
    let hmenu = match build_popup_menu(hwnd, entries, &mut bitmaps) {
        Ok(hmenu) => hmenu,
        Err(err) => {
            free_bitmaps(bitmaps);
            return Err(err);
        }
    };

    let shown = TrackPopupMenu(hmenu, TPM_LEFTALIGN, position.x, position.y, 0, hwnd, ptr::null());
    let track_error = io::Error::last_os_error();
    // Lets the menu close properly when the user clicks elsewhere.
    // https://learn.microsoft.com/en-us/windows/win32/api/winuser/nf-winuser-trackpopupmenu#remarks
    PostMessageW(hwnd, WM_NULL, 0, 0);

    destroy_menu_tree(hmenu);
    free_bitmaps(bitmaps);

    if shown == 0 && track_error.raw_os_error() != Some(0) {
        return Err(Error::Menu(track_error));
    }
    Ok(())
}

unsafe fn build_popup_menu(
    hwnd: HWND,
    entries: &[MenuEntry],
    bitmaps: &mut Vec<HBITMAP>,
) -> Result<HMENU, Error> {
    let hmenu = CreatePopupMenu();
    if hmenu.is_null() {
        return Err(Error::Menu(io::Error::last_os_error()));
    }

    for (position, entry) in entries.iter().enumerate() {
        let label = encode_wide(&entry.label);
        let appended = match &entry.kind {
            EntryKind::Item(_) => AppendMenuW(
                hmenu,
                MF_STRING,
                entry.id.into_raw() as usize,
                label.as_ptr(),
            ),
            EntryKind::Submenu(children) => {
                let child = match build_popup_menu(hwnd, children, bitmaps) {
                    Ok(child) => child,
                    Err(err) => {
                        destroy_menu_tree(hmenu);
                        return Err(err);
                    }
                };
                let appended = AppendMenuW(hmenu, MF_STRING | MF_POPUP, child as usize, label.as_ptr());
                if appended == 0 {
                    destroy_menu_tree(child);
                }
                appended
            }
        };

        if appended == 0 {
            let err = io::Error::last_os_error();
            destroy_menu_tree(hmenu);
            return Err(Error::Menu(err));
        }

        if let Some(path) = entry.icon.as_deref().filter(|path| path.is_file()) {
            if let Some(hbitmap) = icon::menu_item_bitmap(hwnd, path) {
                set_menu_item_bitmap(hmenu, position as u32, hbitmap);
                bitmaps.push(hbitmap);
            }
        }
    }

    Ok(hmenu)
}

unsafe fn set_menu_item_bitmap(hmenu: HMENU, position: u32, hbitmap: HBITMAP) {
    let mut info: MENUITEMINFOW = std::mem::zeroed();
    info.cbSize = std::mem::size_of::<MENUITEMINFOW>() as u32;
    info.fMask = MIIM_BITMAP;
    info.hbmpItem = hbitmap;
    // By position: submenus have no command id.
    SetMenuItemInfoW(hmenu, position, 1, &info);
}

unsafe fn free_bitmaps(bitmaps: Vec<HBITMAP>) {
    for hbitmap in bitmaps {
        icon::delete_bitmap(hbitmap);
    }
}

/// Destroys a menu. `DestroyMenu` also destroys attached submenus.
unsafe fn destroy_menu_tree(hmenu: HMENU) {
    DestroyMenu(hmenu);
}
