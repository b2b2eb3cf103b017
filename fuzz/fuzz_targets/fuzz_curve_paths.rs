#![no_main]

use curvit_core::Curve;
use curvit_edit::{AddCurveOutcome, CurveEditor};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|paths: Vec<(String, bool)>| {
    let mut editor = CurveEditor::default();

    for (path, remove) in paths.into_iter().take(64) {
        if remove {
            let removed = editor.remove_curve_or_group(&path);
            for id in removed {
                assert!(editor.state().curve(id).is_none());
            }
            continue;
        }
        match editor.add_curve(&path, Curve::new()) {
            Ok(AddCurveOutcome::Added(id) | AddCurveOutcome::Revealed(id)) => {
                let wrapper = editor.state().curve(id).expect("registered curve exists");
                assert!(wrapper.visible);
                assert_eq!(wrapper.path(), path);
                let node = editor.get_child_node(&path).expect("leaf is reachable");
                assert_eq!(node.curve(), Some(id));
            }
            Err(_) => {}
        }
    }

    // Every curve in the tree exists in state and vice versa.
    let mut in_tree: Vec<_> = editor.tree().roots().iter().flat_map(|n| n.curves()).collect();
    in_tree.sort();
    let in_state: Vec<_> = editor.state().curves().ids().collect();
    assert_eq!(in_tree, in_state);
});
