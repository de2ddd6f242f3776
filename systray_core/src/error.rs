use std::path::PathBuf;

use crate::window::NotifyOp;

/// Errors reported by a [`NativeWindow`](crate::NativeWindow).
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("failed to load icon from {}", path.display())]
    IconLoad {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("shell rejected {op:?} of the notification icon")]
    NotifyIcon { op: NotifyOp },

    #[error("failed to build popup menu")]
    Menu(#[source] std::io::Error),

    #[error("tray window error")]
    Window(#[source] std::io::Error),
}
