#![forbid(unsafe_code)]

//! curvit public facade crate.
//!
//! Re-exports the curve model from `curvit-core` and the editing engine
//! from `curvit-edit`, with a top-level [`Error`] and a prelude for
//! day-to-day usage.

use std::fmt;

// --- Core re-exports -------------------------------------------------------

pub use curvit_core::{
    Continuity, Curve, CurveLoop, Keyframe, Point, Rect, Size, TangentMode, ViewTransform,
};

// --- Edit re-exports -------------------------------------------------------

pub use curvit_edit::{
    AddCurveOutcome, AddKeyCommand, ChangeContinuityCommand, ChangeTangentCommand,
    ChangeTangentModeCommand, CommandError, ConfigError, CurveColor, CurveEditor, CurveId,
    CurveTree, DeleteKeysCommand, EditorConfig, EditorState, HistoryConfig, HitEntry,
    HitTestConfig, KeyId, ModeChange, MoveKeysCommand, PendingGesture, ScaleHandle,
    ScaleKeysCommand, SelectKeysCommand, SelectionMode, TangentSide, TreeError, TreeNode,
    UndoableCmd,
};

// --- Errors ---------------------------------------------------------------

/// Top-level error type for curvit callers.
#[derive(Debug)]
pub enum Error {
    /// An edit command failed.
    Command(CommandError),
    /// A curve path was invalid or missing.
    Tree(TreeError),
    /// Configuration could not be loaded or failed validation.
    Config(ConfigError),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Command(err) => write!(f, "{err}"),
            Self::Tree(err) => write!(f, "{err}"),
            Self::Config(err) => write!(f, "{err}"),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Command(err) => Some(err),
            Self::Tree(err) => Some(err),
            Self::Config(err) => Some(err),
        }
    }
}

impl From<CommandError> for Error {
    fn from(err: CommandError) -> Self {
        Self::Command(err)
    }
}

impl From<TreeError> for Error {
    fn from(err: TreeError) -> Self {
        Self::Tree(err)
    }
}

impl From<ConfigError> for Error {
    fn from(err: ConfigError) -> Self {
        Self::Config(err)
    }
}

/// Standard result type for curvit APIs.
pub type Result<T> = std::result::Result<T, Error>;

// --- Prelude --------------------------------------------------------------

pub mod prelude {
    pub use crate::{
        AddKeyCommand, Curve, CurveEditor, CurveId, DeleteKeysCommand, EditorConfig, Error,
        KeyId, Keyframe, MoveKeysCommand, Point, Result, SelectKeysCommand, SelectionMode,
        TangentMode, ViewTransform,
    };

    pub use crate::{core, edit};
}

pub use curvit_core as core;
pub use curvit_edit as edit;
