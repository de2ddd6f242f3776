//! Command registry: maps the command ids of menu items to their actions.

use std::collections::BTreeMap;

use crate::command_id::CommandId;
use crate::menu::{Command, EntryKind, FIRST_ID, MenuEntry, MenuOption, OptionAction, QUIT_ICON, QUIT_LABEL};

/// Flat `command id -> action` table built alongside the annotated menu tree.
///
/// Only items are registered; submenu ids are not keys.
#[derive(Debug, Clone, Default)]
pub struct CommandRegistry {
    actions: BTreeMap<CommandId, Command>,
}

impl CommandRegistry {
    pub fn get(&self, id: CommandId) -> Option<&Command> {
        self.actions.get(&id)
    }

    pub fn contains(&self, id: CommandId) -> bool {
        self.actions.contains_key(&id)
    }

    pub fn len(&self) -> usize {
        self.actions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.actions.is_empty()
    }

    /// Registered ids in ascending order.
    pub fn ids(&self) -> impl Iterator<Item = CommandId> + '_ {
        self.actions.keys().copied()
    }
}

/// Annotate `options` with command ids and collect the registry.
///
/// A trailing "Quit" entry is appended to the root. Ids start at [`FIRST_ID`] and are assigned
/// in pre-order: a submenu takes its id before its children. Options with an
/// [`OptionAction::Unknown`] action are logged and dropped, but still consume an id so the
/// numbering of their siblings does not depend on them.
pub fn build_menu(mut options: Vec<MenuOption>) -> (Vec<MenuEntry>, CommandRegistry) {
    options.push(MenuOption::quit(QUIT_LABEL).icon(QUIT_ICON));

    let mut builder = MenuBuilder {
        next_id: CommandId::from_raw(FIRST_ID),
        registry: CommandRegistry::default(),
    };
    let entries = builder.annotate(options);
    (entries, builder.registry)
}

/// Id counter and partial registry, alive for one build only.
struct MenuBuilder {
    next_id: CommandId,
    registry: CommandRegistry,
}

impl MenuBuilder {
    fn take_id(&mut self) -> CommandId {
        let id = self.next_id;
        self.next_id = id.next();
        // Warn once, at the first id the command word cannot carry.
        if !id.fits_command_word() && CommandId::from_raw(id.into_raw() - 1).fits_command_word() {
            tracing::warn!(%id, "menu has too many entries, later commands will be misrouted");
        }
        id
    }

    fn annotate(&mut self, options: Vec<MenuOption>) -> Vec<MenuEntry> {
        let mut entries = Vec::with_capacity(options.len());

        for MenuOption { label, icon, action } in options {
            let id = self.take_id();
            let kind = match action {
                OptionAction::Callback(callback) => self.register(id, Command::Callback(callback)),
                OptionAction::Quit => self.register(id, Command::Quit),
                OptionAction::Submenu(items) => EntryKind::Submenu(self.annotate(items)),
                OptionAction::Unknown(what) => {
                    tracing::warn!(%label, icon = ?icon, action = %what, "unknown menu item, skipping");
                    continue;
                }
            };
            entries.push(MenuEntry { id, label, icon, kind });
        }

        entries
    }

    fn register(&mut self, id: CommandId, command: Command) -> EntryKind {
        let previous = self.registry.actions.insert(id, command.clone());
        debug_assert!(previous.is_none(), "command id {id} assigned twice");
        EntryKind::Item(command)
    }
}
