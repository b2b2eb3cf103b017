#![forbid(unsafe_code)]

use curvit_core::{Keyframe, Point};

use super::{capture_selected, restore_all, snapshots_size};
use crate::id::KeyId;
use crate::state::EditorState;
use crate::undo::{CommandError, CommandMetadata, CommandResult, UndoableCmd};
use crate::wrapper::CurveSnapshot;

/// Translate the selected keys by a curve-space offset.
///
/// Keys are captured at construction. Every application places each key at
/// `original + offset`, so a drag that calls
/// [`update_offsets`](Self::update_offsets) many times lands exactly where
/// a single application of the final offset would.
#[derive(Debug)]
pub struct MoveKeysCommand {
    offset: Point,
    originals: Vec<(KeyId, Keyframe)>,
    before: Vec<CurveSnapshot>,
    metadata: CommandMetadata,
}

impl MoveKeysCommand {
    /// Capture the current selection for moving by `offset`.
    pub fn new(state: &EditorState, offset: Point) -> Result<Self, CommandError> {
        let originals = capture_selected(state)?;
        let ids: Vec<KeyId> = originals.iter().map(|&(id, _)| id).collect();
        let before = state.snapshot_curves(state.owners_of(&ids)?)?;
        Ok(Self {
            offset,
            originals,
            before,
            metadata: CommandMetadata::new("Move keys"),
        })
    }

    /// Current offset.
    #[must_use]
    pub fn offset(&self) -> Point {
        self.offset
    }

    /// Ids being moved.
    pub fn keys(&self) -> impl Iterator<Item = KeyId> + '_ {
        self.originals.iter().map(|&(id, _)| id)
    }

    /// Re-apply with a new total offset.
    pub fn update_offsets(&mut self, state: &mut EditorState, offset: Point) -> CommandResult {
        self.offset = offset;
        self.apply(state)
    }

    fn apply(&self, state: &mut EditorState) -> CommandResult {
        for &(id, original) in &self.originals {
            let moved = original.at(
                original.position + self.offset.x,
                original.value + self.offset.y,
            );
            state.replace_keyframe(id, moved)?;
        }
        state.recompute_tangents(self.before.iter().map(|s| s.curve));
        Ok(())
    }
}

impl UndoableCmd<EditorState> for MoveKeysCommand {
    fn execute(&mut self, state: &mut EditorState) -> CommandResult {
        self.apply(state)
    }

    fn undo(&mut self, state: &mut EditorState) -> CommandResult {
        restore_all(state, &self.before)
    }

    fn size_bytes(&self) -> usize {
        std::mem::size_of::<Self>()
            + self.metadata.size_bytes()
            + self.originals.len() * std::mem::size_of::<(KeyId, Keyframe)>()
            + snapshots_size(&self.before)
    }

    fn metadata(&self) -> &CommandMetadata {
        &self.metadata
    }

    fn debug_name(&self) -> &'static str {
        "MoveKeysCommand"
    }
}
