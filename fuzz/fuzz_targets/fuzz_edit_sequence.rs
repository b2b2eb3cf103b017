#![no_main]

use arbitrary::Arbitrary;
use curvit_core::{Continuity, Curve, Point, TangentMode};
use curvit_edit::{
    AddKeyCommand, ChangeContinuityCommand, ChangeTangentModeCommand, CurveEditor, CurveId,
    DeleteKeysCommand, KeyId, ModeChange, MoveKeysCommand, PendingGesture, ScaleHandle,
    SelectKeysCommand, TangentSide,
};
use libfuzzer_sys::fuzz_target;

#[derive(Debug, Arbitrary)]
enum Op {
    Add { curve: bool, position: i16, value: i16 },
    Select(Vec<u8>),
    Delete,
    Move { dx: i8, dy: i8 },
    Mode { tangent_in: u8, tangent_out: u8 },
    Continuity(bool),
    BeginMove,
    BeginScale(u8),
    BeginTangent { pick: u8, out: bool },
    Drag { dx: i8, dy: i8 },
    Finish,
    Cancel,
    Undo,
    Redo,
    RemoveCurve(bool),
}

// Integer inputs keep every coordinate finite.
fn coord(v: i16) -> f32 {
    f32::from(v) / 64.0
}

fn mode(v: u8) -> ModeChange {
    match v % 6 {
        0 => ModeChange::Keep,
        1 => ModeChange::Set(TangentMode::Smooth),
        2 => ModeChange::Set(TangentMode::Linear),
        3 => ModeChange::Set(TangentMode::Flat),
        4 => ModeChange::Set(TangentMode::Custom),
        _ => ModeChange::Set(TangentMode::Stepped),
    }
}

fn handle(v: u8) -> ScaleHandle {
    match v % 4 {
        0 => ScaleHandle::TopLeft,
        1 => ScaleHandle::TopRight,
        2 => ScaleHandle::BottomLeft,
        _ => ScaleHandle::BottomRight,
    }
}

fn live_keys(editor: &CurveEditor) -> Vec<KeyId> {
    editor.state().keys().ids().collect()
}

fn check(editor: &CurveEditor) {
    let state = editor.state();
    let mut slots = 0;
    for wrapper in state.curves().iter() {
        let keys = wrapper.curve().keys();
        assert_eq!(keys.len(), wrapper.slots().len());
        assert!(keys.windows(2).all(|w| w[0].position <= w[1].position));
        for &slot in wrapper.slots() {
            assert_eq!(state.key(slot).map(|k| k.curve()), Some(wrapper.id()));
        }
        slots += wrapper.slots().len();
    }
    assert_eq!(slots, state.keys().len());
    assert!(state.selection().ids().iter().all(|&k| state.key(k).is_some()));
}

fuzz_target!(|ops: Vec<Op>| {
    let mut editor = CurveEditor::default();
    let mut curves: [Option<CurveId>; 2] = [
        editor.add_curve("Fuzz.A", Curve::new()).ok().map(|o| o.id()),
        editor.add_curve("Fuzz.B", Curve::new()).ok().map(|o| o.id()),
    ];
    let mut gesture = PendingGesture::None;

    for op in ops.into_iter().take(256) {
        // Structural edits are not allowed while a drag holds snapshots.
        if gesture.is_active()
            && !matches!(op, Op::Drag { .. } | Op::Finish | Op::Cancel)
        {
            let _ = editor.cancel_gesture(&mut gesture);
        }
        match op {
            Op::Add { curve, position, value } => {
                if let Some(id) = curves[usize::from(curve)] {
                    let _ = editor.execute(AddKeyCommand::new(id, coord(position), coord(value)));
                }
            }
            Op::Select(picks) => {
                let live = live_keys(&editor);
                let keys = if live.is_empty() {
                    Vec::new()
                } else {
                    picks
                        .iter()
                        .map(|&p| live[usize::from(p) % live.len()])
                        .collect()
                };
                let _ = editor.execute(SelectKeysCommand::new(keys));
            }
            Op::Delete => {
                let _ = editor.execute(DeleteKeysCommand::new());
            }
            Op::Move { dx, dy } => {
                let offset = Point::new(f32::from(dx) / 8.0, f32::from(dy) / 8.0);
                if let Ok(cmd) = MoveKeysCommand::new(editor.state(), offset) {
                    let _ = editor.execute(cmd);
                }
            }
            Op::Mode { tangent_in, tangent_out } => {
                let _ = editor
                    .execute(ChangeTangentModeCommand::new(mode(tangent_in), mode(tangent_out)));
            }
            Op::Continuity(step) => {
                let continuity = if step { Continuity::Step } else { Continuity::Smooth };
                let _ = editor.execute(ChangeContinuityCommand::new(continuity));
            }
            Op::BeginMove => {
                if let Ok(g) = editor.begin_move() {
                    gesture = g;
                }
            }
            Op::BeginScale(corner) => {
                let min = Point::new(-8.0, -8.0);
                let max = Point::new(8.0, 8.0);
                if let Ok(g) = editor.begin_scale(min, max, handle(corner)) {
                    gesture = g;
                }
            }
            Op::BeginTangent { pick, out } => {
                let live = live_keys(&editor);
                if !live.is_empty() {
                    let key = live[usize::from(pick) % live.len()];
                    let side = if out { TangentSide::Out } else { TangentSide::In };
                    if let Ok(g) = editor.begin_tangent_drag(key, side) {
                        gesture = g;
                    }
                }
            }
            Op::Drag { dx, dy } => {
                let offset = Point::new(f32::from(dx) / 8.0, f32::from(dy) / 8.0);
                let _ = editor.update_gesture(&mut gesture, offset);
                let _ = editor.update_gesture_tangent(&mut gesture, offset.y);
            }
            Op::Finish => {
                editor.finish_gesture(&mut gesture);
            }
            Op::Cancel => {
                let _ = editor.cancel_gesture(&mut gesture);
            }
            Op::Undo => {
                if let Some(result) = editor.undo() {
                    assert!(result.is_ok(), "undo failed: {result:?}");
                }
            }
            Op::Redo => {
                if let Some(result) = editor.redo() {
                    assert!(result.is_ok(), "redo failed: {result:?}");
                }
            }
            Op::RemoveCurve(second) => {
                if let Some(id) = curves[usize::from(second)].take() {
                    editor.remove_curve(id);
                }
            }
        }
        check(&editor);
    }

    let _ = editor.cancel_gesture(&mut gesture);
    while let Some(result) = editor.undo() {
        assert!(result.is_ok(), "undo failed: {result:?}");
        check(&editor);
    }
});
