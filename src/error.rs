//! Crate-level error types.

use std::fmt;

use crate::engine::CanvasId;

/// Errors produced by the zoomview crate.
#[derive(Debug)]
pub enum ViewerError {
    /// The canvas was destroyed or never belonged to this viewer.
    UnknownCanvas(CanvasId),
    /// Re-parenting would make a canvas its own ancestor.
    Cycle {
        /// Prospective parent.
        parent: CanvasId,
        /// Canvas being moved.
        child: CanvasId,
    },
    /// The implicit root canvas cannot be re-parented or destroyed.
    RootCanvas,
    /// Image descriptor with unusable dimensions or tile size.
    InvalidImage(String),
    /// TOML options parsing/serialization failure.
    OptionsParse(String),
    /// Generic I/O failure (options files).
    Io(std::io::Error),
}

impl fmt::Display for ViewerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnknownCanvas(id) => write!(f, "unknown canvas {id:?}"),
            Self::Cycle { parent, child } => write!(
                f,
                "cannot attach {child:?} under its own descendant {parent:?}"
            ),
            Self::RootCanvas => {
                write!(f, "the root canvas cannot be moved or destroyed")
            }
            Self::InvalidImage(msg) => write!(f, "invalid image: {msg}"),
            Self::OptionsParse(msg) => {
                write!(f, "options parse error: {msg}")
            }
            Self::Io(e) => write!(f, "I/O error: {e}"),
        }
    }
}

impl std::error::Error for ViewerError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io(e) => Some(e),
            _ => None,
        }
    }
}

impl From<std::io::Error> for ViewerError {
    fn from(e: std::io::Error) -> Self {
        Self::Io(e)
    }
}
