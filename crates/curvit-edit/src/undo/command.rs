#![forbid(unsafe_code)]

//! Undoable command trait and shared command types.
//!
//! # Invariants
//!
//! - `execute()` followed by `undo()` restores prior state exactly
//! - `undo()` followed by `redo()` restores the executed state exactly,
//!   including the ids of any keys the command created
//! - `size_bytes()` reflects the captured state for memory budgeting
//!
//! # Failure Modes
//!
//! - **Stale reference**: Command holds an id whose wrapper was removed
//!   - Mitigation: every lookup reports [`CommandError::UnknownKey`] or
//!     [`CommandError::UnknownCurve`] instead of silently succeeding
//! - **State drift**: Non-undoable changes invalidate captured state
//!   - Mitigation: the editor clears history when it removes curves

use std::fmt;
use std::time::Instant;

use crate::collection::DuplicateIdError;
use crate::id::{CurveId, KeyId};

/// Source of a command - who/what triggered it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CommandSource {
    /// Direct user action (pointer, keyboard).
    #[default]
    User,
    /// Triggered programmatically by application code.
    Programmatic,
}

/// Metadata attached to every command for tracing and UI display.
#[derive(Debug, Clone)]
pub struct CommandMetadata {
    /// Human-readable description for UI (e.g., "Move keys").
    pub description: String,
    /// When the command was created.
    pub timestamp: Instant,
    /// Who/what triggered the command.
    pub source: CommandSource,
}

impl CommandMetadata {
    /// Create new metadata with the given description.
    #[must_use]
    pub fn new(description: impl Into<String>) -> Self {
        Self {
            description: description.into(),
            timestamp: Instant::now(),
            source: CommandSource::User,
        }
    }

    /// Set the command source.
    #[must_use]
    pub fn with_source(mut self, source: CommandSource) -> Self {
        self.source = source;
        self
    }

    /// Size in bytes for memory accounting.
    #[must_use]
    pub fn size_bytes(&self) -> usize {
        std::mem::size_of::<Self>() + self.description.len()
    }
}

impl Default for CommandMetadata {
    fn default() -> Self {
        Self::new("Unknown")
    }
}

/// Result of command execution or undo.
pub type CommandResult = Result<(), CommandError>;

/// Errors that can occur during command execution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommandError {
    /// No key wrapper with this id, or its curve has no slot for it.
    UnknownKey(KeyId),
    /// No curve wrapper with this id.
    UnknownCurve(CurveId),
    /// An insertion collided with an existing id.
    DuplicateId(DuplicateIdError),
    /// Command cannot run in the current state.
    InvalidState(String),
}

impl fmt::Display for CommandError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnknownKey(id) => write!(f, "unknown key {id}"),
            Self::UnknownCurve(id) => write!(f, "unknown curve {id}"),
            Self::DuplicateId(err) => write!(f, "{err}"),
            Self::InvalidState(msg) => write!(f, "invalid state: {msg}"),
        }
    }
}

impl std::error::Error for CommandError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::DuplicateId(err) => Some(err),
            _ => None,
        }
    }
}

impl From<DuplicateIdError> for CommandError {
    fn from(err: DuplicateIdError) -> Self {
        Self::DuplicateId(err)
    }
}

/// A reversible command over a target state `T`.
pub trait UndoableCmd<T> {
    /// Execute the command, applying its effect.
    fn execute(&mut self, target: &mut T) -> CommandResult;

    /// Undo the command, reverting its effect.
    fn undo(&mut self, target: &mut T) -> CommandResult;

    /// Redo the command after it was undone.
    fn redo(&mut self, target: &mut T) -> CommandResult {
        self.execute(target)
    }

    /// Whether the command should be recorded for undo.
    fn can_undo(&self) -> bool {
        true
    }

    /// Human-readable description for UI display.
    fn description(&self) -> &str {
        &self.metadata().description
    }

    /// Size of this command in bytes for memory budgeting.
    fn size_bytes(&self) -> usize;

    /// Get the command metadata.
    fn metadata(&self) -> &CommandMetadata;

    /// Debug description of the command.
    fn debug_name(&self) -> &'static str {
        "UndoableCmd"
    }
}

impl<T> fmt::Debug for dyn UndoableCmd<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct(self.debug_name())
            .field("description", &self.description())
            .field("size_bytes", &self.size_bytes())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn metadata_defaults_to_user_source() {
        let meta = CommandMetadata::new("Move keys");
        assert_eq!(meta.source, CommandSource::User);
        assert!(meta.size_bytes() >= "Move keys".len());
        let meta = meta.with_source(CommandSource::Programmatic);
        assert_eq!(meta.source, CommandSource::Programmatic);
    }

    #[test]
    fn error_display() {
        assert_eq!(
            CommandError::UnknownKey(KeyId::new(3)).to_string(),
            "unknown key key#3"
        );
        assert_eq!(
            CommandError::UnknownCurve(CurveId::new(1)).to_string(),
            "unknown curve curve#1"
        );
        let dup: CommandError = DuplicateIdError { kind: "key", id: 7 }.into();
        assert_eq!(dup.to_string(), "duplicate key id 7");
        assert!(std::error::Error::source(&dup).is_some());
    }
}
