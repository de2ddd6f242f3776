//! Menu types for tray context menus.
//!
//! A menu is described by the caller as a tree of [`MenuOption`]s and annotated once, at
//! construction, into a tree of [`MenuEntry`]s that carry their [`CommandId`].

use std::fmt;
use std::path::PathBuf;
use std::rc::Rc;

use crate::command_id::CommandId;
use crate::tray::TrayIcon;

/// Command id of the first menu entry. Later entries count up from here in pre-order.
pub const FIRST_ID: u32 = 1023;

/// Label of the entry appended to every root menu.
pub const QUIT_LABEL: &str = "Quit";

/// Icon file of the entry appended to every root menu. Drawn only when the file exists.
pub const QUIT_ICON: &str = "myIcon_QUIT.ico";

/// Action run when a menu item is chosen. Receives the tray so it can change the icon or the
/// hover text and call [`TrayIcon::refresh_icon`].
pub type Callback = Rc<dyn Fn(&mut TrayIcon)>;

/// What a menu option does, as supplied by the caller.
#[derive(Clone)]
pub enum OptionAction {
    /// Run a callback.
    Callback(Callback),
    /// Destroy the tray window, which removes the icon and ends the message pump.
    Quit,
    /// Open a nested menu.
    Submenu(Vec<MenuOption>),
    /// An action a declarative source could not express as one of the above.
    ///
    /// The option is skipped with a warning when the menu is built.
    Unknown(String),
}

impl fmt::Debug for OptionAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OptionAction::Callback(_) => f.write_str("Callback(<fn>)"),
            OptionAction::Quit => f.write_str("Quit"),
            OptionAction::Submenu(items) => f.debug_tuple("Submenu").field(items).finish(),
            OptionAction::Unknown(what) => f.debug_tuple("Unknown").field(what).finish(),
        }
    }
}

/// A caller-supplied menu option: label, optional icon file, action.
#[derive(Debug, Clone)]
pub struct MenuOption {
    /// Text label displayed for this option.
    pub label: String,
    /// Optional `.ico` file drawn next to the label.
    pub icon: Option<PathBuf>,
    /// What happens when the option is chosen.
    pub action: OptionAction,
}

impl MenuOption {
    pub fn new(label: impl Into<String>, action: OptionAction) -> Self {
        Self {
            label: label.into(),
            icon: None,
            action,
        }
    }

    /// Create an option that runs `callback` when chosen.
    pub fn callback(label: impl Into<String>, callback: impl Fn(&mut TrayIcon) + 'static) -> Self {
        Self::new(label, OptionAction::Callback(Rc::new(callback)))
    }

    /// Create an option that quits the tray.
    pub fn quit(label: impl Into<String>) -> Self {
        Self::new(label, OptionAction::Quit)
    }

    /// Create a nested menu.
    pub fn submenu(label: impl Into<String>, items: Vec<MenuOption>) -> Self {
        Self::new(label, OptionAction::Submenu(items))
    }

    /// Set the icon file for this option.
    pub fn icon(mut self, icon: impl Into<PathBuf>) -> Self {
        self.icon = Some(icon.into());
        self
    }

    /// Set the icon file for this option, if any.
    pub fn with_icon(mut self, icon: Option<PathBuf>) -> Self {
        self.icon = icon;
        self
    }
}

/// An action stored in the command registry.
#[derive(Clone)]
pub enum Command {
    Callback(Callback),
    Quit,
}

impl Command {
    pub fn is_quit(&self) -> bool {
        matches!(self, Command::Quit)
    }
}

impl fmt::Debug for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Command::Callback(_) => f.write_str("Callback(<fn>)"),
            Command::Quit => f.write_str("Quit"),
        }
    }
}

/// Leaf or nested menu.
#[derive(Debug, Clone)]
pub enum EntryKind {
    Item(Command),
    Submenu(Vec<MenuEntry>),
}

/// A menu entry annotated with its command id.
///
/// Submenus carry an id too. It is never registered and never dispatched.
#[derive(Debug, Clone)]
pub struct MenuEntry {
    pub id: CommandId,
    pub label: String,
    pub icon: Option<PathBuf>,
    pub kind: EntryKind,
}

impl MenuEntry {
    pub fn is_submenu(&self) -> bool {
        matches!(self.kind, EntryKind::Submenu(_))
    }

    /// Child entries of a submenu, empty for items.
    pub fn children(&self) -> &[MenuEntry] {
        match &self.kind {
            EntryKind::Submenu(items) => items,
            EntryKind::Item(_) => &[],
        }
    }
}

/// Find the first item labelled `label`, searching the options in pre-order.
///
/// Returns its offset from [`FIRST_ID`], counted the way the registry numbers entries, so the
/// result can be used as a default index. Submenus are searched but never returned.
pub fn find_default_index(options: &[MenuOption], label: &str) -> Option<u32> {
    fn walk(options: &[MenuOption], label: &str, offset: &mut u32) -> Option<u32> {
        for option in options {
            let own = *offset;
            *offset += 1;
            match &option.action {
                OptionAction::Submenu(items) => {
                    if let Some(found) = walk(items, label, offset) {
                        return Some(found);
                    }
                }
                OptionAction::Callback(_) | OptionAction::Quit if option.label == label => {
                    return Some(own);
                }
                _ => {}
            }
        }
        None
    }

    walk(options, label, &mut 0)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn noop(label: &str) -> MenuOption {
        MenuOption::callback(label, |_| {})
    }

    #[test]
    fn default_index_follows_registry_numbering() {
        let options = vec![
            noop("Open"),
            MenuOption::submenu("Meta", vec![noop("StartUp"), noop("Break")]),
        ];

        // Open = 0, Meta = 1, StartUp = 2
        assert_eq!(find_default_index(&options, "StartUp"), Some(2));
        assert_eq!(find_default_index(&options, "Open"), Some(0));
    }

    #[test]
    fn default_index_skips_submenus_and_missing_labels() {
        let options = vec![MenuOption::submenu("Meta", vec![noop("Break")])];

        assert_eq!(find_default_index(&options, "Meta"), None);
        assert_eq!(find_default_index(&options, "StartUp"), None);
    }

    #[test]
    fn unknown_options_still_take_a_slot() {
        let options = vec![
            MenuOption::new("Broken", OptionAction::Unknown("42".into())),
            noop("StartUp"),
        ];

        assert_eq!(find_default_index(&options, "StartUp"), Some(1));
    }

    #[test]
    fn builders_set_icon() {
        let option = noop("A").icon("a.ico");
        assert_eq!(option.icon, Some(PathBuf::from("a.ico")));

        let option = noop("B").with_icon(None);
        assert!(option.icon.is_none());
    }
}
