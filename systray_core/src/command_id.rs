use std::fmt;

/// Identifier of a menu command. Unique for each entry of one tray menu.
///
/// Command ids are handed to the shell as menu item ids and come back in the low word of the
/// `WM_COMMAND` parameter when the user picks an item.
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct CommandId(u32);

impl CommandId {
    /// Convert the `CommandId` into the underlying integer.
    ///
    /// This is useful if you need to pass the ID across an FFI boundary.
    pub const fn into_raw(self) -> u32 {
        self.0
    }

    /// Construct a `CommandId` from the underlying integer.
    pub const fn from_raw(id: u32) -> Self {
        Self(id)
    }

    /// Whether the id survives the 16-bit command word of `WM_COMMAND` unchanged.
    pub const fn fits_command_word(self) -> bool {
        self.0 <= u16::MAX as u32
    }

    pub(crate) const fn next(self) -> Self {
        Self(self.0 + 1)
    }
}

impl fmt::Debug for CommandId {
    fn fmt(&self, fmtr: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(fmtr)
    }
}

impl fmt::Display for CommandId {
    fn fmt(&self, fmtr: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(fmtr)
    }
}
