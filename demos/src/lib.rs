//! Project switcher: a tray menu of projects and their work packages. Picking one records the
//! switch in an event log and shows it in the icon's hover text.

use std::collections::HashSet;
use std::fs::{self, OpenOptions};
use std::io::{self, Write as _};
use std::path::{Path, PathBuf};
use std::rc::Rc;

use anyhow::Context as _;
use serde_json::{Map, Value, json};
use systray::{MenuOption, OptionAction, TrayIcon};

pub const PROJECTS_FILE: &str = "projects.json";
pub const EVENT_LOG_FILE: &str = "prjtrx_events.log";
pub const FALLBACK_ICON: &str = "myIcon_Meta.ico";
pub const INITIAL_HOVER_TEXT: &str = "No Project selected!";
/// Item run on a double click.
pub const DEFAULT_ITEM: &str = "StartUp";

/// Projects in file order: project name -> list of work packages.
pub type Projects = Map<String, Value>;

pub fn default_projects() -> Projects {
    let mut projects = Map::new();
    projects.insert("Meta".into(), json!(["StartUp", "Break", "DoSomething"]));
    projects
}

/// Read `path`, or write the default projects there if it does not exist yet.
pub fn load_or_create_projects(path: &Path) -> anyhow::Result<Projects> {
    if path.exists() {
        let text = fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display()))?;
        let projects = serde_json::from_str(&text)
            .with_context(|| format!("failed to parse {}", path.display()))?;
        return Ok(projects);
    }

    let projects = default_projects();
    fs::write(path, serde_json::to_string(&projects)?)
        .with_context(|| format!("failed to write {}", path.display()))?;
    tracing::info!(path = %path.display(), "created default projects file");
    Ok(projects)
}

/// File names of the `.ico` files in `dir`.
pub fn discover_icons(dir: &Path) -> io::Result<HashSet<String>> {
    let mut icons = HashSet::new();
    for entry in fs::read_dir(dir)? {
        let path = entry?.path();
        let is_icon = path
            .extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case("ico"));
        if let (true, Some(name)) = (is_icon, path.file_name().and_then(|n| n.to_str())) {
            icons.insert(name.to_string());
        }
    }
    Ok(icons)
}

/// Text shown in the menu: the part after the last `-`.
pub fn menu_label(name: &str) -> &str {
    name.rsplit('-').next().unwrap_or(name)
}

/// Text written to the log: the part before the first `-`.
pub fn info_text(name: &str) -> &str {
    name.split('-').next().unwrap_or(name)
}

/// Everything the menu callbacks need.
#[derive(Debug, Clone)]
pub struct Switcher {
    dir: PathBuf,
    log_file: PathBuf,
    icons: HashSet<String>,
}

impl Switcher {
    pub fn new(dir: impl Into<PathBuf>, icons: HashSet<String>) -> Self {
        let dir = dir.into();
        Self {
            log_file: dir.join(EVENT_LOG_FILE),
            dir,
            icons,
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// `myIcon_<label>.ico`, if such a file was found.
    pub fn icon_for(&self, label: &str) -> Option<String> {
        let name = format!("myIcon_{label}.ico");
        self.icons.contains(&name).then_some(name)
    }

    /// Icon shown in the tray after a switch.
    pub fn tray_icon(&self, icon: Option<&str>) -> PathBuf {
        let name = icon
            .filter(|name| self.icons.contains(*name))
            .unwrap_or(FALLBACK_ICON);
        self.dir.join(name)
    }

    /// Append the switch to the event log and return the line written, without newline.
    pub fn record_switch(&self, project: &str, work_package: &str) -> io::Result<String> {
        let line = format!(
            "{} - changed <{project}>:<{work_package}>",
            chrono::Local::now().format("%Y%m%d %H%M%S")
        );
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.log_file)?;
        writeln!(file, "{line}")?;
        Ok(line)
    }

    pub fn switch(&self, tray: &mut TrayIcon, project: &str, work_package: &str, icon: Option<&str>) {
        let line = match self.record_switch(project, work_package) {
            Ok(line) => line,
            Err(err) => {
                tracing::warn!(%err, log = %self.log_file.display(), "failed to write event log");
                format!("changed <{project}>:<{work_package}>")
            }
        };
        tracing::info!(%project, %work_package, "switched");

        tray.set_hover_text(line);
        tray.set_icon(self.tray_icon(icon));
        tray.refresh_icon();
    }

    fn option(
        self: &Rc<Self>,
        label: &str,
        project: &str,
        work_package: &str,
        icon: Option<String>,
    ) -> MenuOption {
        let switcher = self.clone();
        let (project, work_package) = (project.to_string(), work_package.to_string());
        let menu_icon = icon.as_ref().map(|name| self.dir.join(name));
        MenuOption::callback(label, move |tray: &mut TrayIcon| {
            switcher.switch(tray, &project, &work_package, icon.as_deref())
        })
        .with_icon(menu_icon)
    }

    /// One menu option per project.
    ///
    /// A project with several work packages becomes a submenu, one with a single work package a
    /// direct item, and one with none a direct item for work package `Default`.
    pub fn build_menu(self: &Rc<Self>, projects: &Projects) -> Vec<MenuOption> {
        let mut options = Vec::with_capacity(projects.len());

        for (name, value) in projects {
            let label = menu_label(name);
            let project = info_text(name);
            let mut project_icon = self.icon_for(label);

            let Some(work_packages) = string_list(value) else {
                options.push(MenuOption::new(label, OptionAction::Unknown(value.to_string())));
                continue;
            };

            let option = match work_packages.as_slice() {
                [] => self.option(label, project, "Default", project_icon.clone()),
                [only] => {
                    if project_icon.is_none() {
                        project_icon = self.icon_for(menu_label(only));
                    }
                    self.option(label, project, info_text(only), project_icon.clone())
                }
                many => {
                    let items = many
                        .iter()
                        .map(|wp| {
                            let wp_label = menu_label(wp);
                            let icon = self.icon_for(wp_label).or_else(|| project_icon.clone());
                            self.option(wp_label, project, info_text(wp), icon)
                        })
                        .collect();
                    MenuOption::submenu(label, items)
                        .with_icon(project_icon.as_ref().map(|name| self.dir.join(name)))
                }
            };
            options.push(option);
        }

        options
    }
}

fn string_list(value: &Value) -> Option<Vec<&str>> {
    value.as_array()?.iter().map(Value::as_str).collect()
}

#[cfg(test)]
mod tests {
    use systray::{find_default_index, registry::build_menu};

    use super::*;

    fn scratch_dir(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("systray-demos-{name}-{}", std::process::id()));
        let _ = fs::remove_dir_all(&dir);
        fs::create_dir_all(&dir).unwrap();
        dir
    }

    #[test]
    fn labels_split_on_dashes() {
        assert_eq!(menu_label("P100-Website"), "Website");
        assert_eq!(info_text("P100-Website"), "P100");
        assert_eq!(menu_label("a-b-c"), "c");
        assert_eq!(info_text("a-b-c"), "a");
        assert_eq!(menu_label("Meta"), "Meta");
        assert_eq!(info_text("Meta"), "Meta");
    }

    #[test]
    fn missing_projects_file_is_created_with_defaults() {
        let dir = scratch_dir("create");
        let path = dir.join(PROJECTS_FILE);

        let projects = load_or_create_projects(&path).unwrap();
        assert_eq!(projects, default_projects());
        assert!(path.exists());

        let again = load_or_create_projects(&path).unwrap();
        assert_eq!(again, projects);
        fs::remove_dir_all(dir).unwrap();
    }

    #[test]
    fn projects_keep_file_order() {
        let dir = scratch_dir("order");
        let path = dir.join(PROJECTS_FILE);
        fs::write(&path, r#"{"Zeta": [], "Alpha": ["x"]}"#).unwrap();

        let projects = load_or_create_projects(&path).unwrap();
        let names: Vec<&String> = projects.keys().collect();
        assert_eq!(names, ["Zeta", "Alpha"]);
        fs::remove_dir_all(dir).unwrap();
    }

    #[test]
    fn icons_are_discovered_by_extension() {
        let dir = scratch_dir("icons");
        fs::write(dir.join("myIcon_Meta.ico"), b"").unwrap();
        fs::write(dir.join("other.ICO"), b"").unwrap();
        fs::write(dir.join("notes.txt"), b"").unwrap();

        let icons = discover_icons(&dir).unwrap();
        assert_eq!(icons.len(), 2);
        assert!(icons.contains("myIcon_Meta.ico"));
        assert!(icons.contains("other.ICO"));
        fs::remove_dir_all(dir).unwrap();
    }

    #[test]
    fn menu_shape_follows_work_package_count() {
        let icons = HashSet::from(["myIcon_Meta.ico".to_string(), "myIcon_Solo.ico".to_string()]);
        let switcher = Rc::new(Switcher::new("base", icons));
        let projects: Projects = serde_json::from_str(
            r#"{"Meta": ["StartUp", "Break"], "P1-Single": ["W1-Solo"], "P2-Empty": [], "Bad": 3}"#,
        )
        .unwrap();

        let options = switcher.build_menu(&projects);
        assert_eq!(options.len(), 4);

        let OptionAction::Submenu(items) = &options[0].action else {
            panic!("expected submenu");
        };
        assert_eq!(items.len(), 2);
        assert_eq!(items[0].label, "StartUp");
        // Work packages without their own icon inherit the project icon.
        assert_eq!(items[1].icon, Some(Path::new("base").join("myIcon_Meta.ico")));
        assert_eq!(options[0].icon, Some(Path::new("base").join("myIcon_Meta.ico")));

        assert_eq!(options[1].label, "Single");
        assert!(matches!(options[1].action, OptionAction::Callback(_)));
        assert_eq!(options[1].icon, Some(Path::new("base").join("myIcon_Solo.ico")));

        assert_eq!(options[2].label, "Empty");
        assert!(options[2].icon.is_none());

        assert!(matches!(options[3].action, OptionAction::Unknown(_)));
    }

    #[test]
    fn default_item_is_found_in_submenu() {
        let switcher = Rc::new(Switcher::new("base", HashSet::new()));
        let options = switcher.build_menu(&default_projects());

        let index = find_default_index(&options, DEFAULT_ITEM).unwrap();
        let (_, registry) = build_menu(options);
        let id = systray::CommandId::from_raw(systray::FIRST_ID + index);
        assert!(matches!(registry.get(id), Some(systray::Command::Callback(_))));
        assert_eq!(index, 1);
    }

    #[test]
    fn unknown_icons_fall_back() {
        let icons = HashSet::from(["myIcon_Known.ico".to_string()]);
        let switcher = Switcher::new("base", icons);

        assert_eq!(
            switcher.tray_icon(Some("myIcon_Known.ico")),
            Path::new("base").join("myIcon_Known.ico")
        );
        assert_eq!(
            switcher.tray_icon(Some("myIcon_Gone.ico")),
            Path::new("base").join(FALLBACK_ICON)
        );
        assert_eq!(switcher.tray_icon(None), Path::new("base").join(FALLBACK_ICON));
    }

    #[test]
    fn switches_are_appended_to_the_log() {
        let dir = scratch_dir("log");
        let switcher = Switcher::new(&dir, HashSet::new());

        let first = switcher.record_switch("Meta", "Break").unwrap();
        switcher.record_switch("None", "").unwrap();

        assert!(first.ends_with(" - changed <Meta>:<Break>"));
        let log = fs::read_to_string(dir.join(EVENT_LOG_FILE)).unwrap();
        let lines: Vec<&str> = log.lines().collect();
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0], first);
        assert!(lines[1].ends_with(" - changed <None>:<>"));
        fs::remove_dir_all(dir).unwrap();
    }
}
