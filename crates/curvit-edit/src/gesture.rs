#![forbid(unsafe_code)]

//! Live drag gestures.
//!
//! A drag applies its command repeatedly while the pointer moves, without
//! touching history. When the drag ends the command is recorded once with
//! [`HistoryManager::push`](crate::undo::HistoryManager::push), since its
//! effect is already applied; a cancelled drag is undone and dropped.
//!
//! ```text
//! None ──begin──▶ Moving / Scaling / ChangingTangent ──update──▶ (same)
//!   ▲                                   │
//!   └────────── finish (record) ◀───────┤
//!   └────────── cancel (revert) ◀───────┘
//! ```

use curvit_core::Point;

use crate::commands::{ChangeTangentCommand, MoveKeysCommand, ScaleKeysCommand};
use crate::state::EditorState;
use crate::undo::{CommandError, CommandResult, UndoableCmd};

/// The drag currently in progress, if any.
#[derive(Debug, Default)]
pub enum PendingGesture {
    #[default]
    None,
    Moving(MoveKeysCommand),
    Scaling(ScaleKeysCommand),
    ChangingTangent(ChangeTangentCommand),
}

impl PendingGesture {
    /// Whether a drag is in progress.
    #[must_use]
    pub fn is_active(&self) -> bool {
        !matches!(self, Self::None)
    }

    /// Short name for diagnostics.
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            Self::None => "none",
            Self::Moving(_) => "moving",
            Self::Scaling(_) => "scaling",
            Self::ChangingTangent(_) => "changing_tangent",
        }
    }

    /// Re-apply a move or scale drag with a new total offset.
    pub(crate) fn update_offset(
        &mut self,
        state: &mut EditorState,
        offset: Point,
    ) -> CommandResult {
        match self {
            Self::Moving(cmd) => cmd.update_offsets(state, offset),
            Self::Scaling(cmd) => cmd.update_offsets(state, offset),
            Self::None | Self::ChangingTangent(_) => Err(CommandError::InvalidState(format!(
                "offset update during {} gesture",
                self.kind()
            ))),
        }
    }

    /// Re-apply a tangent drag with a new tangent value.
    pub(crate) fn update_tangent(&mut self, state: &mut EditorState, value: f32) -> CommandResult {
        match self {
            Self::ChangingTangent(cmd) => cmd.update_offset(state, value),
            _ => Err(CommandError::InvalidState(format!(
                "tangent update during {} gesture",
                self.kind()
            ))),
        }
    }

    /// End the drag, returning the command to record.
    pub(crate) fn finish(&mut self) -> Option<Box<dyn UndoableCmd<EditorState>>> {
        let kind = self.kind();
        let cmd: Box<dyn UndoableCmd<EditorState>> = match std::mem::take(self) {
            Self::None => return None,
            Self::Moving(cmd) => Box::new(cmd),
            Self::Scaling(cmd) => Box::new(cmd),
            Self::ChangingTangent(cmd) => Box::new(cmd),
        };
        tracing::debug!(gesture = kind, "gesture finished");
        Some(cmd)
    }

    /// Abort the drag, reverting whatever it applied.
    pub(crate) fn cancel(&mut self, state: &mut EditorState) -> CommandResult {
        let kind = self.kind();
        let result = match std::mem::take(self) {
            Self::None => return Ok(()),
            Self::Moving(mut cmd) => cmd.undo(state),
            Self::Scaling(mut cmd) => cmd.undo(state),
            Self::ChangingTangent(mut cmd) => cmd.undo(state),
        };
        tracing::debug!(gesture = kind, "gesture cancelled");
        result
    }
}
