#![forbid(unsafe_code)]

use curvit_core::Keyframe;

use super::snapshots_size;
use crate::id::{CurveId, KeyId};
use crate::state::EditorState;
use crate::undo::{CommandError, CommandMetadata, CommandResult, UndoableCmd};
use crate::wrapper::CurveSnapshot;

/// Insert a key at `(position, value)` into one curve.
///
/// The new key uses the state's default tangent mode on both sides and the
/// curve's tangents are recomputed.
#[derive(Debug)]
pub struct AddKeyCommand {
    curve: CurveId,
    position: f32,
    value: f32,
    key: Option<KeyId>,
    before: Option<CurveSnapshot>,
    metadata: CommandMetadata,
}

impl AddKeyCommand {
    /// Create a command adding a key to `curve`.
    #[must_use]
    pub fn new(curve: CurveId, position: f32, value: f32) -> Self {
        Self {
            curve,
            position,
            value,
            key: None,
            before: None,
            metadata: CommandMetadata::new("Add key"),
        }
    }

    /// Id of the inserted key, once executed.
    #[must_use]
    pub fn key(&self) -> Option<KeyId> {
        self.key
    }
}

impl UndoableCmd<EditorState> for AddKeyCommand {
    fn execute(&mut self, state: &mut EditorState) -> CommandResult {
        let before = state.snapshot_curve(self.curve)?;
        let keyframe = Keyframe::new(self.position, self.value);
        let mode = state.default_tangent_mode();
        match self.key {
            Some(id) => state.add_key_with_id(id, self.curve, keyframe, mode)?,
            None => self.key = Some(state.add_key(self.curve, keyframe, mode)?),
        }
        state.recompute_tangents([self.curve]);
        self.before = Some(before);
        Ok(())
    }

    fn undo(&mut self, state: &mut EditorState) -> CommandResult {
        let (Some(key), Some(before)) = (self.key, self.before.as_ref()) else {
            return Err(CommandError::InvalidState("add key was never executed".into()));
        };
        state.remove_key(key)?;
        state.restore_curve(before)
    }

    fn size_bytes(&self) -> usize {
        std::mem::size_of::<Self>()
            + self.metadata.size_bytes()
            + snapshots_size(self.before.as_slice())
    }

    fn metadata(&self) -> &CommandMetadata {
        &self.metadata
    }

    fn debug_name(&self) -> &'static str {
        "AddKeyCommand"
    }
}
