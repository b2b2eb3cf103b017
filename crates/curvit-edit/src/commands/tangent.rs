#![forbid(unsafe_code)]

use std::collections::BTreeSet;

use curvit_core::{Continuity, Keyframe, TangentMode};

use super::{restore_all, snapshots_size};
use crate::id::{CurveId, KeyId};
use crate::state::EditorState;
use crate::undo::{CommandError, CommandMetadata, CommandResult, UndoableCmd};
use crate::wrapper::{CurveSnapshot, TangentSide};

// ============================================================================
// Manual tangent drag
// ============================================================================

/// Drag one tangent handle of one key.
///
/// The dragged side switches to [`TangentMode::Custom`] so later automatic
/// recomputation keeps the value. A [`TangentMode::Stepped`] side has no
/// handle and cannot be dragged.
#[derive(Debug)]
pub struct ChangeTangentCommand {
    key: KeyId,
    side: TangentSide,
    value: f32,
    before: Keyframe,
    before_modes: (TangentMode, TangentMode),
    metadata: CommandMetadata,
}

impl ChangeTangentCommand {
    /// Capture `key`'s current tangents and modes.
    ///
    /// Fails with [`CommandError::InvalidState`] if `side` is stepped.
    pub fn new(state: &EditorState, key: KeyId, side: TangentSide) -> Result<Self, CommandError> {
        let before = state.keyframe(key).ok_or(CommandError::UnknownKey(key))?;
        let wrapper = state.key(key).ok_or(CommandError::UnknownKey(key))?;
        if wrapper.mode(side) == TangentMode::Stepped {
            return Err(CommandError::InvalidState(format!(
                "{key} has no {side:?} tangent while stepped"
            )));
        }
        let before_modes = wrapper.modes();
        let value = match side {
            TangentSide::In => before.tangent_in,
            TangentSide::Out => before.tangent_out,
        };
        Ok(Self {
            key,
            side,
            value,
            before,
            before_modes,
            metadata: CommandMetadata::new("Change tangent"),
        })
    }

    /// Key being edited.
    #[must_use]
    pub fn key(&self) -> KeyId {
        self.key
    }

    /// Side being edited.
    #[must_use]
    pub fn side(&self) -> TangentSide {
        self.side
    }

    /// Re-apply with a new tangent value.
    pub fn update_offset(&mut self, state: &mut EditorState, value: f32) -> CommandResult {
        self.value = value;
        self.apply(state)
    }

    fn apply(&self, state: &mut EditorState) -> CommandResult {
        let (mut tangent_in, mut tangent_out) = (self.before.tangent_in, self.before.tangent_out);
        let (mut mode_in, mut mode_out) = self.before_modes;
        match self.side {
            TangentSide::In => {
                tangent_in = self.value;
                mode_in = TangentMode::Custom;
            }
            TangentSide::Out => {
                tangent_out = self.value;
                mode_out = TangentMode::Custom;
            }
        }
        state.set_modes(self.key, mode_in, mode_out)?;
        state.set_tangents(self.key, tangent_in, tangent_out)
    }
}

impl UndoableCmd<EditorState> for ChangeTangentCommand {
    fn execute(&mut self, state: &mut EditorState) -> CommandResult {
        self.apply(state)
    }

    fn undo(&mut self, state: &mut EditorState) -> CommandResult {
        let (mode_in, mode_out) = self.before_modes;
        state.set_modes(self.key, mode_in, mode_out)?;
        state.set_tangents(self.key, self.before.tangent_in, self.before.tangent_out)
    }

    fn size_bytes(&self) -> usize {
        std::mem::size_of::<Self>() + self.metadata.size_bytes()
    }

    fn metadata(&self) -> &CommandMetadata {
        &self.metadata
    }

    fn debug_name(&self) -> &'static str {
        "ChangeTangentCommand"
    }
}

// ============================================================================
// Tangent modes
// ============================================================================

/// What to do with one side's tangent mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ModeChange {
    /// Leave the side as it is.
    #[default]
    Keep,
    /// Switch the side to this mode.
    Set(TangentMode),
}

impl ModeChange {
    /// Mode after applying the change to `current`.
    #[must_use]
    pub fn apply(self, current: TangentMode) -> TangentMode {
        match self {
            Self::Keep => current,
            Self::Set(mode) => mode,
        }
    }

    /// Whether this changes anything.
    #[must_use]
    pub fn is_keep(self) -> bool {
        self == Self::Keep
    }
}

#[derive(Debug, Clone)]
struct ModeCapture {
    modes: Vec<(KeyId, (TangentMode, TangentMode))>,
    affected: BTreeSet<CurveId>,
    before: Vec<CurveSnapshot>,
}

/// Change the tangent modes of the selected keys.
///
/// An out side leaving [`TangentMode::Stepped`] also returns the key to
/// [`Continuity::Smooth`]. Affected curves are recomputed once each.
#[derive(Debug)]
pub struct ChangeTangentModeCommand {
    tangent_in: ModeChange,
    tangent_out: ModeChange,
    captured: Option<ModeCapture>,
    metadata: CommandMetadata,
}

impl ChangeTangentModeCommand {
    #[must_use]
    pub fn new(tangent_in: ModeChange, tangent_out: ModeChange) -> Self {
        Self {
            tangent_in,
            tangent_out,
            captured: None,
            metadata: CommandMetadata::new("Change tangent mode"),
        }
    }

    /// Same mode on both sides.
    #[must_use]
    pub fn both(mode: TangentMode) -> Self {
        Self::new(ModeChange::Set(mode), ModeChange::Set(mode))
    }

    fn capture(&self, state: &EditorState) -> Result<ModeCapture, CommandError> {
        let ids = state.selection().ids();
        let modes = ids
            .iter()
            .map(|&id| {
                state
                    .key(id)
                    .map(|k| (id, k.modes()))
                    .ok_or(CommandError::UnknownKey(id))
            })
            .collect::<Result<Vec<_>, _>>()?;
        let affected = if self.tangent_in.is_keep() && self.tangent_out.is_keep() {
            BTreeSet::new()
        } else {
            state.owners_of(ids)?
        };
        let before = state.snapshot_curves(affected.iter().copied())?;
        Ok(ModeCapture {
            modes,
            affected,
            before,
        })
    }
}

impl UndoableCmd<EditorState> for ChangeTangentModeCommand {
    fn execute(&mut self, state: &mut EditorState) -> CommandResult {
        if self.captured.is_none() {
            self.captured = Some(self.capture(state)?);
        }
        let Some(captured) = self.captured.as_ref() else {
            return Ok(());
        };
        for &(id, (old_in, old_out)) in &captured.modes {
            let new_in = self.tangent_in.apply(old_in);
            let new_out = self.tangent_out.apply(old_out);
            state.set_modes(id, new_in, new_out)?;
            if old_out == TangentMode::Stepped && new_out != TangentMode::Stepped {
                state.set_continuity(id, Continuity::Smooth)?;
            }
        }
        state.recompute_tangents(captured.affected.iter().copied());
        Ok(())
    }

    fn undo(&mut self, state: &mut EditorState) -> CommandResult {
        let Some(captured) = self.captured.as_ref() else {
            return Err(CommandError::InvalidState(
                "tangent mode change was never executed".into(),
            ));
        };
        for &(id, (mode_in, mode_out)) in &captured.modes {
            state.set_modes(id, mode_in, mode_out)?;
        }
        restore_all(state, &captured.before)
    }

    fn size_bytes(&self) -> usize {
        std::mem::size_of::<Self>()
            + self.metadata.size_bytes()
            + self.captured.as_ref().map_or(0, |c| {
                c.modes.len() * std::mem::size_of::<(KeyId, (TangentMode, TangentMode))>()
                    + snapshots_size(&c.before)
            })
    }

    fn metadata(&self) -> &CommandMetadata {
        &self.metadata
    }

    fn debug_name(&self) -> &'static str {
        "ChangeTangentModeCommand"
    }
}
