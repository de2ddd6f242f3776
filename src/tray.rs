use systray_core::{TrayIcon, TrayIconAttributes};
use systray_windows as platform_impl;

/// Put a tray icon up and block until the user quits.
///
/// Creates the hidden window, builds the menu, adds the icon and runs the message pump on the
/// calling thread. Returns once the window has been destroyed and the icon removed.
///
/// # Example
///
/// ```ignore
/// use systray::{MenuOption, TrayIconAttributes};
///
/// let attr = TrayIconAttributes::default()
///     .with_icon("app.ico")
///     .with_hover_text("Example")
///     .with_menu(vec![
///         MenuOption::callback("Say hello", |tray| {
///             tray.set_hover_text("Hello!");
///             tray.refresh_icon();
///         }),
///     ])
///     .with_on_quit(|_| println!("bye"));
///
/// systray::run(attr)?;
/// ```
pub fn run(attr: TrayIconAttributes) -> Result<(), anyhow::Error> {
    let window = platform_impl::Win32Window::new(&attr.class_name)?;
    let mut tray = TrayIcon::new(attr, Box::new(window));
    tray.pump();
    tracing::debug!("tray message pump finished");
    Ok(())
}
