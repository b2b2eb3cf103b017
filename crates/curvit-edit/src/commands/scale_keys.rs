#![forbid(unsafe_code)]

use curvit_core::{Keyframe, Point};

use super::{capture_selected, restore_all, snapshots_size};
use crate::id::KeyId;
use crate::state::EditorState;
use crate::undo::{CommandError, CommandMetadata, CommandResult, UndoableCmd};
use crate::wrapper::CurveSnapshot;

/// Corner of the selection box being dragged (curve space, y up).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ScaleHandle {
    TopLeft,
    TopRight,
    BottomLeft,
    BottomRight,
}

impl ScaleHandle {
    /// New `(min, max)` box after dragging this corner by `offset`.
    ///
    /// Only the two edges adjacent to the corner move.
    #[must_use]
    pub fn apply(self, min: Point, max: Point, offset: Point) -> (Point, Point) {
        let (mut lo, mut hi) = (min, max);
        match self {
            Self::TopLeft => {
                lo.x += offset.x;
                hi.y += offset.y;
            }
            Self::TopRight => {
                hi.x += offset.x;
                hi.y += offset.y;
            }
            Self::BottomLeft => {
                lo.x += offset.x;
                lo.y += offset.y;
            }
            Self::BottomRight => {
                hi.x += offset.x;
                lo.y += offset.y;
            }
        }
        (lo, hi)
    }
}

/// A selected key with its position normalized to the original box.
#[derive(Debug, Clone, Copy)]
struct Normalized {
    id: KeyId,
    original: Keyframe,
    nx: f32,
    ny: f32,
}

/// Scale the selected keys by dragging a corner of their bounding box.
///
/// Each key keeps its normalized position `n` inside the box; after the box
/// changes it lands at `new_min + n * (new_max - new_min)` on each axis.
#[derive(Debug)]
pub struct ScaleKeysCommand {
    min: Point,
    max: Point,
    handle: ScaleHandle,
    new_min: Point,
    new_max: Point,
    keys: Vec<Normalized>,
    before: Vec<CurveSnapshot>,
    metadata: CommandMetadata,
}

fn normalize(v: f32, lo: f32, hi: f32) -> f32 {
    let span = hi - lo;
    if span.abs() <= f32::EPSILON {
        0.0
    } else {
        (v - lo) / span
    }
}

impl ScaleKeysCommand {
    /// Capture the selection inside the box `[min, max]`, dragged by `handle`.
    pub fn new(
        state: &EditorState,
        min: Point,
        max: Point,
        handle: ScaleHandle,
    ) -> Result<Self, CommandError> {
        let selected = capture_selected(state)?;
        let ids: Vec<KeyId> = selected.iter().map(|&(id, _)| id).collect();
        let before = state.snapshot_curves(state.owners_of(&ids)?)?;
        let keys = selected
            .into_iter()
            .map(|(id, original)| Normalized {
                id,
                original,
                nx: normalize(original.position, min.x, max.x),
                ny: normalize(original.value, min.y, max.y),
            })
            .collect();
        Ok(Self {
            min,
            max,
            handle,
            new_min: min,
            new_max: max,
            keys,
            before,
            metadata: CommandMetadata::new("Scale keys"),
        })
    }

    /// Box after the current offset, as `(new_min, new_max)`.
    #[must_use]
    pub fn new_box(&self) -> (Point, Point) {
        (self.new_min, self.new_max)
    }

    /// Corner being dragged.
    #[must_use]
    pub fn handle(&self) -> ScaleHandle {
        self.handle
    }

    /// Re-apply with a new total corner offset.
    pub fn update_offsets(&mut self, state: &mut EditorState, offset: Point) -> CommandResult {
        (self.new_min, self.new_max) = self.handle.apply(self.min, self.max, offset);
        self.apply(state)
    }

    fn apply(&self, state: &mut EditorState) -> CommandResult {
        let size = self.new_max - self.new_min;
        for key in &self.keys {
            let scaled = key.original.at(
                self.new_min.x + key.nx * size.x,
                self.new_min.y + key.ny * size.y,
            );
            state.replace_keyframe(key.id, scaled)?;
        }
        state.recompute_tangents(self.before.iter().map(|s| s.curve));
        Ok(())
    }
}

impl UndoableCmd<EditorState> for ScaleKeysCommand {
    fn execute(&mut self, state: &mut EditorState) -> CommandResult {
        self.apply(state)
    }

    fn undo(&mut self, state: &mut EditorState) -> CommandResult {
        restore_all(state, &self.before)
    }

    fn size_bytes(&self) -> usize {
        std::mem::size_of::<Self>()
            + self.metadata.size_bytes()
            + self.keys.len() * std::mem::size_of::<Normalized>()
            + snapshots_size(&self.before)
    }

    fn metadata(&self) -> &CommandMetadata {
        &self.metadata
    }

    fn debug_name(&self) -> &'static str {
        "ScaleKeysCommand"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bottom_left_moves_min_only() {
        let (lo, hi) = ScaleHandle::BottomLeft.apply(
            Point::new(0.0, 0.0),
            Point::new(10.0, 10.0),
            Point::new(2.0, 3.0),
        );
        assert_eq!(lo, Point::new(2.0, 3.0));
        assert_eq!(hi, Point::new(10.0, 10.0));
    }

    #[test]
    fn each_corner_moves_its_two_edges() {
        let min = Point::new(0.0, 0.0);
        let max = Point::new(4.0, 4.0);
        let d = Point::new(1.0, 1.0);
        assert_eq!(
            ScaleHandle::TopLeft.apply(min, max, d),
            (Point::new(1.0, 0.0), Point::new(4.0, 5.0))
        );
        assert_eq!(
            ScaleHandle::TopRight.apply(min, max, d),
            (Point::new(0.0, 0.0), Point::new(5.0, 5.0))
        );
        assert_eq!(
            ScaleHandle::BottomRight.apply(min, max, d),
            (Point::new(0.0, 1.0), Point::new(5.0, 4.0))
        );
    }

    #[test]
    fn degenerate_axis_normalizes_to_zero() {
        assert_eq!(normalize(3.0, 3.0, 3.0), 0.0);
        assert_eq!(normalize(5.0, 0.0, 10.0), 0.5);
    }
}
