#![forbid(unsafe_code)]

//! Undoable edit commands over [`EditorState`](crate::state::EditorState).
//!
//! Every command stores ids and captured values only. Commands that create
//! keys allocate ids on their first execution and reuse them on redo, so a
//! key keeps its identity across any number of undo/redo cycles.
//!
//! Keys, curves, and snapshots are captured either at construction (drag
//! commands, which need the originals to apply live offsets) or lazily on
//! first execution (everything else).

mod add_key;
mod continuity;
mod delete_keys;
mod move_keys;
mod scale_keys;
mod select_keys;
mod tangent;

pub use add_key::AddKeyCommand;
pub use continuity::ChangeContinuityCommand;
pub use delete_keys::DeleteKeysCommand;
pub use move_keys::MoveKeysCommand;
pub use scale_keys::{ScaleHandle, ScaleKeysCommand};
pub use select_keys::SelectKeysCommand;
pub use tangent::{ChangeTangentCommand, ChangeTangentModeCommand, ModeChange};

use curvit_core::Keyframe;

use crate::id::KeyId;
use crate::state::EditorState;
use crate::undo::CommandError;
use crate::wrapper::CurveSnapshot;

/// Current keyframes of the selected keys, in selection order.
fn capture_selected(state: &EditorState) -> Result<Vec<(KeyId, Keyframe)>, CommandError> {
    state
        .selection()
        .ids()
        .iter()
        .map(|&id| {
            state
                .keyframe(id)
                .map(|k| (id, k))
                .ok_or(CommandError::UnknownKey(id))
        })
        .collect()
}

/// Restore every snapshot, stopping at the first failure.
fn restore_all(state: &mut EditorState, snapshots: &[CurveSnapshot]) -> Result<(), CommandError> {
    snapshots.iter().try_for_each(|s| state.restore_curve(s))
}

fn snapshots_size(snapshots: &[CurveSnapshot]) -> usize {
    snapshots.iter().map(CurveSnapshot::size_bytes).sum()
}
