#![forbid(unsafe_code)]

use crate::id::KeyId;
use crate::state::EditorState;
use crate::undo::{CommandError, CommandMetadata, CommandResult, UndoableCmd};

/// Replace the selection with a list of keys.
///
/// An empty list deselects everything. How the list was built (replace,
/// union, ...) is up to the caller; see
/// [`SelectionSet::combine`](crate::selection::SelectionSet::combine).
#[derive(Debug)]
pub struct SelectKeysCommand {
    keys: Vec<KeyId>,
    previous: Option<Vec<KeyId>>,
    metadata: CommandMetadata,
}

impl SelectKeysCommand {
    #[must_use]
    pub fn new(keys: Vec<KeyId>) -> Self {
        Self {
            keys,
            previous: None,
            metadata: CommandMetadata::new("Select keys"),
        }
    }

    /// Deselect everything.
    #[must_use]
    pub fn clear() -> Self {
        Self::new(Vec::new())
    }
}

impl UndoableCmd<EditorState> for SelectKeysCommand {
    fn execute(&mut self, state: &mut EditorState) -> CommandResult {
        let previous = state.selection().ids().to_vec();
        state.set_selection(&self.keys)?;
        self.previous.get_or_insert(previous);
        Ok(())
    }

    fn undo(&mut self, state: &mut EditorState) -> CommandResult {
        let previous = self
            .previous
            .as_deref()
            .ok_or_else(|| CommandError::InvalidState("selection was never changed".into()))?;
        state.set_selection(previous)
    }

    fn size_bytes(&self) -> usize {
        let ids = self.keys.len() + self.previous.as_ref().map_or(0, Vec::len);
        std::mem::size_of::<Self>()
            + self.metadata.size_bytes()
            + ids * std::mem::size_of::<KeyId>()
    }

    fn metadata(&self) -> &CommandMetadata {
        &self.metadata
    }

    fn debug_name(&self) -> &'static str {
        "SelectKeysCommand"
    }
}
