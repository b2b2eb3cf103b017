#![forbid(unsafe_code)]

use super::{restore_all, snapshots_size};
use crate::id::KeyId;
use crate::state::{EditorState, RemovedKey};
use crate::undo::{CommandMetadata, CommandResult, UndoableCmd};
use crate::wrapper::CurveSnapshot;

/// Delete the selected keys.
///
/// The selection is captured on first execution and restored on undo.
/// Deleted keys come back with their ids, modes, indices, and values, and
/// the neighbors whose tangents were recomputed get their old tangents back.
#[derive(Debug)]
pub struct DeleteKeysCommand {
    selection: Option<Vec<KeyId>>,
    removed: Vec<RemovedKey>,
    before: Vec<CurveSnapshot>,
    metadata: CommandMetadata,
}

impl Default for DeleteKeysCommand {
    fn default() -> Self {
        Self::new()
    }
}

impl DeleteKeysCommand {
    #[must_use]
    pub fn new() -> Self {
        Self {
            selection: None,
            removed: Vec::new(),
            before: Vec::new(),
            metadata: CommandMetadata::new("Delete keys"),
        }
    }

    /// Keys removed by the last execution.
    #[must_use]
    pub fn removed(&self) -> &[RemovedKey] {
        &self.removed
    }
}

impl UndoableCmd<EditorState> for DeleteKeysCommand {
    fn execute(&mut self, state: &mut EditorState) -> CommandResult {
        let selection = self
            .selection
            .get_or_insert_with(|| state.selection().ids().to_vec())
            .clone();
        let curves = state.owners_of(&selection)?;
        self.before = state.snapshot_curves(curves.iter().copied())?;

        self.removed.clear();
        for id in selection {
            self.removed.push(state.remove_key(id)?);
        }
        state.clear_selection();
        state.recompute_tangents(curves);
        Ok(())
    }

    fn undo(&mut self, state: &mut EditorState) -> CommandResult {
        // Reverse removal order puts every key back at the index it left.
        for removed in self.removed.iter().rev() {
            state.restore_key(removed)?;
        }
        restore_all(state, &self.before)?;
        state.set_selection(self.selection.as_deref().unwrap_or_default())
    }

    fn size_bytes(&self) -> usize {
        std::mem::size_of::<Self>()
            + self.metadata.size_bytes()
            + self.selection.as_ref().map_or(0, |s| s.len() * std::mem::size_of::<KeyId>())
            + self.removed.len() * std::mem::size_of::<RemovedKey>()
            + snapshots_size(&self.before)
    }

    fn metadata(&self) -> &CommandMetadata {
        &self.metadata
    }

    fn debug_name(&self) -> &'static str {
        "DeleteKeysCommand"
    }
}
