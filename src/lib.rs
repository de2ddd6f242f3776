pub use systray_core::*;

#[cfg(target_os = "windows")]
mod tray;
#[cfg(target_os = "windows")]
pub use tray::run;

#[cfg(target_os = "windows")]
pub use systray_windows::Win32Window;
