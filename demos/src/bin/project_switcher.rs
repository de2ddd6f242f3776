//! Tray icon for switching between projects.
//!
//! Reads `projects.json` from the working directory (creating a default one if needed), shows a
//! menu of projects and work packages, and logs every switch to `prjtrx_events.log`.
//! Double-click the icon to switch to the first `StartUp` work package.

use std::rc::Rc;

use anyhow::Context as _;
use demos::{
    DEFAULT_ITEM, FALLBACK_ICON, INITIAL_HOVER_TEXT, PROJECTS_FILE, Switcher, discover_icons,
    load_or_create_projects,
};
use tracing::{info, warn};

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt::init();

    let dir = std::env::current_dir().context("no working directory")?;
    let projects = load_or_create_projects(&dir.join(PROJECTS_FILE))?;
    let icons = discover_icons(&dir).unwrap_or_else(|err| {
        warn!(%err, "failed to list icon files");
        Default::default()
    });
    info!(projects = projects.len(), icons = icons.len(), "starting project switcher");

    let switcher = Rc::new(Switcher::new(&dir, icons));
    let menu = switcher.build_menu(&projects);
    let default_index = systray::find_default_index(&menu, DEFAULT_ITEM).unwrap_or(0);

    let attr = systray::TrayIconAttributes::default()
        .with_icon(dir.join(FALLBACK_ICON))
        .with_hover_text(INITIAL_HOVER_TEXT)
        .with_menu(menu)
        .with_default_index(default_index)
        .with_on_quit(|_| info!("Bye, then."));

    run(attr)
}

#[cfg(target_os = "windows")]
fn run(attr: systray::TrayIconAttributes) -> anyhow::Result<()> {
    systray::run(attr)
}

#[cfg(not(target_os = "windows"))]
fn run(_attr: systray::TrayIconAttributes) -> anyhow::Result<()> {
    anyhow::bail!("the project switcher needs the Windows notification area")
}
