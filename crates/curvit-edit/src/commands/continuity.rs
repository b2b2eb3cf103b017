#![forbid(unsafe_code)]

use curvit_core::Continuity;

use crate::id::KeyId;
use crate::state::EditorState;
use crate::undo::{CommandError, CommandMetadata, CommandResult, UndoableCmd};

/// Set the continuity of the selected keys.
///
/// Tangents are not recomputed.
#[derive(Debug)]
pub struct ChangeContinuityCommand {
    continuity: Continuity,
    before: Option<Vec<(KeyId, Continuity)>>,
    metadata: CommandMetadata,
}

impl ChangeContinuityCommand {
    #[must_use]
    pub fn new(continuity: Continuity) -> Self {
        Self {
            continuity,
            before: None,
            metadata: CommandMetadata::new("Change continuity"),
        }
    }

    fn capture(state: &EditorState) -> Result<Vec<(KeyId, Continuity)>, CommandError> {
        state
            .selection()
            .ids()
            .iter()
            .map(|&id| {
                state
                    .keyframe(id)
                    .map(|k| (id, k.continuity))
                    .ok_or(CommandError::UnknownKey(id))
            })
            .collect()
    }
}

impl UndoableCmd<EditorState> for ChangeContinuityCommand {
    fn execute(&mut self, state: &mut EditorState) -> CommandResult {
        if self.before.is_none() {
            self.before = Some(Self::capture(state)?);
        }
        for &(id, _) in self.before.iter().flatten() {
            state.set_continuity(id, self.continuity)?;
        }
        Ok(())
    }

    fn undo(&mut self, state: &mut EditorState) -> CommandResult {
        for &(id, continuity) in self.before.iter().flatten() {
            state.set_continuity(id, continuity)?;
        }
        Ok(())
    }

    fn size_bytes(&self) -> usize {
        std::mem::size_of::<Self>()
            + self.metadata.size_bytes()
            + self
                .before
                .as_ref()
                .map_or(0, |b| b.len() * std::mem::size_of::<(KeyId, Continuity)>())
    }

    fn metadata(&self) -> &CommandMetadata {
        &self.metadata
    }

    fn debug_name(&self) -> &'static str {
        "ChangeContinuityCommand"
    }
}
