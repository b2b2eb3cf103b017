#![forbid(unsafe_code)]

//! Keyframe curves: storage, evaluation, and automatic tangents.
//!
//! # Invariants
//!
//! 1. `keys` is sorted by position (ties keep insertion order) after every
//!    mutation.
//! 2. Between two adjacent keys the curve is a cubic Hermite segment built
//!    from the left key's `tangent_out` and the right key's `tangent_in`,
//!    unless the left key's continuity is [`Continuity::Step`].
//! 3. Outside the key range, [`CurveLoop`] decides the value.
//!
//! Mutation methods report the index a key ended up at so that callers
//! keeping parallel per-key tables can mirror the move exactly.

use crate::keyframe::{Continuity, Keyframe, TangentMode};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Segments narrower than this are treated as degenerate.
const SPAN_EPSILON: f32 = 1e-6;

/// Behavior of a curve before its first key or after its last key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum CurveLoop {
    /// Hold the endpoint value.
    #[default]
    Constant,
    /// Repeat the key range.
    Cycle,
    /// Repeat the key range, offsetting each cycle by the end-to-start delta.
    CycleOffset,
    /// Repeat the key range, mirroring every other cycle.
    Oscillate,
    /// Extend along the endpoint's outer tangent.
    Linear,
}

/// An ordered sequence of keyframes plus loop behavior.
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(from = "CurveRepr"))]
pub struct Curve {
    keys: Vec<Keyframe>,
    /// Behavior before the first key.
    pub pre_loop: CurveLoop,
    /// Behavior after the last key.
    pub post_loop: CurveLoop,
}

/// Serialized form of a [`Curve`]. Keys are sorted on the way in.
#[cfg(feature = "serde")]
#[derive(Deserialize)]
struct CurveRepr {
    keys: Vec<Keyframe>,
    pre_loop: CurveLoop,
    post_loop: CurveLoop,
}

#[cfg(feature = "serde")]
impl From<CurveRepr> for Curve {
    fn from(repr: CurveRepr) -> Self {
        Self::from_keys(repr.keys).with_loops(repr.pre_loop, repr.post_loop)
    }
}

impl Curve {
    /// Create an empty curve with constant loops.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a curve from keys in any order.
    #[must_use]
    pub fn from_keys(keys: impl IntoIterator<Item = Keyframe>) -> Self {
        let mut curve = Self::new();
        curve.replace_all(keys.into_iter().collect());
        curve
    }

    /// Set both loop behaviors.
    #[must_use]
    pub fn with_loops(mut self, pre_loop: CurveLoop, post_loop: CurveLoop) -> Self {
        self.pre_loop = pre_loop;
        self.post_loop = post_loop;
        self
    }

    // ========================================================================
    // Access
    // ========================================================================

    /// Keys in position order.
    #[inline]
    #[must_use]
    pub fn keys(&self) -> &[Keyframe] {
        &self.keys
    }

    /// Key at `index`.
    #[inline]
    #[must_use]
    pub fn key(&self, index: usize) -> Option<&Keyframe> {
        self.keys.get(index)
    }

    /// Number of keys.
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.keys.len()
    }

    /// Whether the curve has no keys.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    /// `(first, last)` key positions.
    #[must_use]
    pub fn position_range(&self) -> Option<(f32, f32)> {
        Some((self.keys.first()?.position, self.keys.last()?.position))
    }

    /// `(min, max)` over key values.
    #[must_use]
    pub fn value_range(&self) -> Option<(f32, f32)> {
        let first = self.keys.first()?.value;
        Some(
            self.keys
                .iter()
                .fold((first, first), |(lo, hi), k| (lo.min(k.value), hi.max(k.value))),
        )
    }

    // ========================================================================
    // Mutation
    // ========================================================================

    /// Insert a key in position order, after any key at the same position.
    ///
    /// Returns the index it was stored at.
    pub fn add(&mut self, key: Keyframe) -> usize {
        let index = self.sorted_index(key.position);
        self.keys.insert(index, key);
        index
    }

    /// Insert a key at `index` if that keeps the order, otherwise in
    /// position order.
    ///
    /// Used to put a removed key back exactly where it was, which matters
    /// when several keys share a position.
    pub fn insert_at(&mut self, index: usize, key: Keyframe) -> usize {
        if self.fits_at(index, key.position) {
            self.keys.insert(index, key);
            index
        } else {
            self.add(key)
        }
    }

    /// Remove the key at `index`.
    pub fn remove(&mut self, index: usize) -> Option<Keyframe> {
        (index < self.keys.len()).then(|| self.keys.remove(index))
    }

    /// Replace the key at `index`, re-sorting if its position moved past a
    /// neighbor.
    ///
    /// Returns the new index, or `None` if `index` is out of bounds.
    pub fn replace(&mut self, index: usize, key: Keyframe) -> Option<usize> {
        if index >= self.keys.len() {
            return None;
        }
        self.keys.remove(index);
        Some(self.insert_at(index, key))
    }

    /// Replace every key. The keys are stably sorted by position.
    pub fn replace_all(&mut self, mut keys: Vec<Keyframe>) {
        keys.sort_by(|a, b| a.position.total_cmp(&b.position));
        self.keys = keys;
    }

    /// Put back keys previously read from [`keys`](Self::keys), keeping
    /// their order exactly.
    ///
    /// Unlike [`replace_all`](Self::replace_all) nothing is re-sorted, so
    /// keys sharing a position (including `0.0` and `-0.0`) stay where they
    /// were and a caller's parallel per-key table still lines up. Returns
    /// `false` and leaves the curve untouched if a key sits before its
    /// predecessor.
    pub fn restore_keys(&mut self, keys: Vec<Keyframe>) -> bool {
        if keys.windows(2).any(|w| w[1].position < w[0].position) {
            return false;
        }
        self.keys = keys;
        true
    }

    /// Set both tangents of the key at `index` (order is unaffected).
    pub fn set_tangents(&mut self, index: usize, tangent_in: f32, tangent_out: f32) -> bool {
        let Some(key) = self.keys.get_mut(index) else {
            return false;
        };
        key.tangent_in = tangent_in;
        key.tangent_out = tangent_out;
        true
    }

    /// Set the continuity of the key at `index`.
    pub fn set_continuity(&mut self, index: usize, continuity: Continuity) -> bool {
        let Some(key) = self.keys.get_mut(index) else {
            return false;
        };
        key.continuity = continuity;
        true
    }

    fn sorted_index(&self, position: f32) -> usize {
        self.keys.partition_point(|k| k.position <= position)
    }

    fn fits_at(&self, index: usize, position: f32) -> bool {
        if index > self.keys.len() {
            return false;
        }
        let after_prev = index == 0 || self.keys[index - 1].position <= position;
        let before_next = index == self.keys.len() || position <= self.keys[index].position;
        after_prev && before_next
    }

    // ========================================================================
    // Tangents
    // ========================================================================

    /// Recompute the tangents of one key from its neighbors.
    ///
    /// `Custom` sides are left alone. An out side in `Stepped` mode also
    /// switches the key to [`Continuity::Step`].
    pub fn compute_tangent(&mut self, index: usize, in_mode: TangentMode, out_mode: TangentMode) {
        let Some(&key) = self.keys.get(index) else {
            return;
        };

        let (prev_pos, prev_val) = index
            .checked_sub(1)
            .and_then(|i| self.keys.get(i))
            .map_or((key.position, key.value), |k| (k.position, k.value));
        let (next_pos, next_val) = self
            .keys
            .get(index + 1)
            .map_or((key.position, key.value), |k| (k.position, k.value));

        let span = next_pos - prev_pos;
        let smooth = |width: f32| {
            if span.abs() < SPAN_EPSILON {
                0.0
            } else {
                (next_val - prev_val) * (width / span)
            }
        };

        let tangent_in = match in_mode {
            TangentMode::Flat | TangentMode::Stepped => 0.0,
            TangentMode::Linear => key.value - prev_val,
            TangentMode::Smooth => smooth(key.position - prev_pos),
            TangentMode::Custom => key.tangent_in,
        };
        let tangent_out = match out_mode {
            TangentMode::Flat | TangentMode::Stepped => 0.0,
            TangentMode::Linear => next_val - key.value,
            TangentMode::Smooth => smooth(next_pos - key.position),
            TangentMode::Custom => key.tangent_out,
        };

        let slot = &mut self.keys[index];
        slot.tangent_in = tangent_in;
        slot.tangent_out = tangent_out;
        if out_mode == TangentMode::Stepped {
            slot.continuity = Continuity::Step;
        }
    }

    /// Recompute every key's tangents, asking `modes` for the in/out modes
    /// of each key index.
    pub fn compute_tangents(&mut self, mut modes: impl FnMut(usize) -> (TangentMode, TangentMode)) {
        for index in 0..self.keys.len() {
            let (in_mode, out_mode) = modes(index);
            self.compute_tangent(index, in_mode, out_mode);
        }
    }

    /// Recompute every key with the same mode on both sides.
    pub fn compute_all_tangents(&mut self, mode: TangentMode) {
        self.compute_tangents(|_| (mode, mode));
    }

    // ========================================================================
    // Evaluation
    // ========================================================================

    /// Value of the curve at `position`.
    ///
    /// An empty curve evaluates to `0.0`; a single key is constant.
    #[must_use]
    pub fn evaluate(&self, position: f32) -> f32 {
        let (Some(first), Some(last)) = (self.keys.first(), self.keys.last()) else {
            return 0.0;
        };
        if self.keys.len() == 1 {
            return first.value;
        }
        if position < first.position {
            return self.evaluate_outside(position, self.pre_loop, true);
        }
        if position > last.position {
            return self.evaluate_outside(position, self.post_loop, false);
        }
        self.evaluate_inside(position)
    }

    fn evaluate_inside(&self, position: f32) -> f32 {
        let n = self.keys.len();
        let index = self.keys.partition_point(|k| k.position < position);
        if index == 0 {
            return self.keys[0].value;
        }
        if index >= n {
            return self.keys[n - 1].value;
        }

        let prev = &self.keys[index - 1];
        let next = &self.keys[index];
        if prev.continuity == Continuity::Step {
            return if position >= next.position {
                next.value
            } else {
                prev.value
            };
        }

        let width = next.position - prev.position;
        if width < SPAN_EPSILON {
            return next.value;
        }
        let t = (position - prev.position) / width;
        hermite(prev.value, prev.tangent_out, next.value, next.tangent_in, t)
    }

    fn evaluate_outside(&self, position: f32, behavior: CurveLoop, before: bool) -> f32 {
        let n = self.keys.len();
        let first = self.keys[0];
        let last = self.keys[n - 1];
        let endpoint = if before { first.value } else { last.value };

        let span = last.position - first.position;
        if span < SPAN_EPSILON {
            return endpoint;
        }

        let cycle = ((position - first.position) / span).floor();
        let offset = position - first.position - cycle * span;
        let local = (first.position + offset).clamp(first.position, last.position);

        match behavior {
            CurveLoop::Constant => endpoint,
            CurveLoop::Linear => {
                if before {
                    let width = self.keys[1].position - first.position;
                    let slope = if width < SPAN_EPSILON {
                        0.0
                    } else {
                        first.tangent_in / width
                    };
                    first.value - slope * (first.position - position)
                } else {
                    let width = last.position - self.keys[n - 2].position;
                    let slope = if width < SPAN_EPSILON {
                        0.0
                    } else {
                        last.tangent_out / width
                    };
                    last.value + slope * (position - last.position)
                }
            }
            CurveLoop::Cycle => self.evaluate_inside(local),
            CurveLoop::CycleOffset => {
                self.evaluate_inside(local) + cycle * (last.value - first.value)
            }
            CurveLoop::Oscillate => {
                // Even cycles run forwards, odd cycles run backwards.
                let mirrored = cycle.rem_euclid(2.0) >= 1.0;
                if mirrored {
                    let back = (last.position - offset).clamp(first.position, last.position);
                    self.evaluate_inside(back)
                } else {
                    self.evaluate_inside(local)
                }
            }
        }
    }
}

/// Cubic Hermite basis with tangents expressed per segment.
#[inline]
fn hermite(v0: f32, m0: f32, v1: f32, m1: f32, t: f32) -> f32 {
    let t2 = t * t;
    let t3 = t2 * t;
    (2.0 * t3 - 3.0 * t2 + 1.0) * v0
        + (t3 - 2.0 * t2 + t) * m0
        + (3.0 * t2 - 2.0 * t3) * v1
        + (t3 - t2) * m1
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx(a: f32, b: f32) -> bool {
        (a - b).abs() < 1e-4
    }

    fn ramp() -> Curve {
        // Straight line from (0, 0) to (1, 10).
        Curve::from_keys([
            Keyframe::new(0.0, 0.0).with_tangents(10.0, 10.0),
            Keyframe::new(1.0, 10.0).with_tangents(10.0, 10.0),
        ])
    }

    #[test]
    fn empty_curve_evaluates_to_zero() {
        assert_eq!(Curve::new().evaluate(3.0), 0.0);
    }

    #[test]
    fn single_key_is_constant() {
        let curve = Curve::from_keys([Keyframe::new(2.0, 7.0)]);
        assert_eq!(curve.evaluate(-100.0), 7.0);
        assert_eq!(curve.evaluate(2.0), 7.0);
        assert_eq!(curve.evaluate(100.0), 7.0);
    }

    #[test]
    fn hermite_with_matching_tangents_is_linear() {
        let curve = ramp();
        assert!(approx(curve.evaluate(0.25), 2.5));
        assert!(approx(curve.evaluate(0.5), 5.0));
        assert_eq!(curve.evaluate(0.0), 0.0);
        assert_eq!(curve.evaluate(1.0), 10.0);
    }

    #[test]
    fn step_holds_left_value_until_next_key() {
        let curve = Curve::from_keys([
            Keyframe::new(0.0, 0.0).with_continuity(Continuity::Step),
            Keyframe::new(1.0, 10.0).with_continuity(Continuity::Step),
        ]);
        for p in [0.0, 0.25, 0.5, 0.999] {
            assert_eq!(curve.evaluate(p), 0.0, "position {p}");
        }
        assert_eq!(curve.evaluate(1.0), 10.0);
    }

    #[test]
    fn constant_loops_hold_endpoints() {
        let curve = ramp();
        assert_eq!(curve.evaluate(-5.0), 0.0);
        assert_eq!(curve.evaluate(5.0), 10.0);
    }

    #[test]
    fn cycle_wraps_position() {
        let curve = ramp().with_loops(CurveLoop::Cycle, CurveLoop::Cycle);
        assert!(approx(curve.evaluate(1.25), 2.5));
        assert!(approx(curve.evaluate(-0.75), 2.5));
    }

    #[test]
    fn cycle_offset_accumulates() {
        let curve = ramp().with_loops(CurveLoop::CycleOffset, CurveLoop::CycleOffset);
        assert!(approx(curve.evaluate(1.5), 15.0));
        assert!(approx(curve.evaluate(-0.5), -5.0));
    }

    #[test]
    fn oscillate_mirrors_odd_cycles() {
        let curve = ramp().with_loops(CurveLoop::Oscillate, CurveLoop::Oscillate);
        assert!(approx(curve.evaluate(1.25), 7.5));
        assert!(approx(curve.evaluate(2.25), 2.5));
        assert!(approx(curve.evaluate(-0.25), 2.5));
    }

    #[test]
    fn linear_loop_extends_outer_tangent() {
        let curve = ramp().with_loops(CurveLoop::Linear, CurveLoop::Linear);
        assert!(approx(curve.evaluate(2.0), 20.0));
        assert!(approx(curve.evaluate(-1.0), -10.0));
    }

    #[test]
    fn add_keeps_keys_sorted() {
        let mut curve = Curve::new();
        assert_eq!(curve.add(Keyframe::new(2.0, 0.0)), 0);
        assert_eq!(curve.add(Keyframe::new(0.0, 0.0)), 0);
        assert_eq!(curve.add(Keyframe::new(1.0, 0.0)), 1);
        let positions: Vec<f32> = curve.keys().iter().map(|k| k.position).collect();
        assert_eq!(positions, vec![0.0, 1.0, 2.0]);
    }

    #[test]
    fn replace_reorders_past_neighbors() {
        let mut curve = Curve::from_keys([
            Keyframe::new(0.0, 0.0),
            Keyframe::new(1.0, 1.0),
            Keyframe::new(2.0, 2.0),
        ]);
        assert_eq!(curve.replace(0, Keyframe::new(3.0, 0.0)), Some(2));
        assert_eq!(curve.replace(1, Keyframe::new(2.5, 2.0)), Some(1));
        assert_eq!(curve.replace(9, Keyframe::new(0.0, 0.0)), None);
        assert_eq!(curve.key(0).unwrap().position, 1.0);
    }

    #[test]
    fn insert_at_honors_index_between_equal_positions() {
        let mut curve = Curve::from_keys([Keyframe::new(1.0, 1.0), Keyframe::new(1.0, 2.0)]);
        assert_eq!(curve.insert_at(1, Keyframe::new(1.0, 9.0)), 1);
        assert_eq!(curve.key(1).unwrap().value, 9.0);
        // Index that breaks the order falls back to sorted insertion.
        assert_eq!(curve.insert_at(0, Keyframe::new(5.0, 0.0)), 3);
    }

    #[test]
    fn smooth_tangents_average_neighbor_slopes() {
        let mut curve = Curve::from_keys([
            Keyframe::new(0.0, 0.0),
            Keyframe::new(1.0, 10.0),
            Keyframe::new(3.0, 10.0),
        ]);
        curve.compute_all_tangents(TangentMode::Smooth);
        let first = curve.key(0).unwrap();
        assert_eq!(first.tangent_in, 0.0);
        assert!(approx(first.tangent_out, 10.0));
        let mid = curve.key(1).unwrap();
        assert!(approx(mid.tangent_in, 10.0 / 3.0));
        assert!(approx(mid.tangent_out, 20.0 / 3.0));
    }

    #[test]
    fn linear_and_flat_tangents() {
        let mut curve = Curve::from_keys([
            Keyframe::new(0.0, 0.0),
            Keyframe::new(1.0, 4.0),
            Keyframe::new(2.0, 1.0),
        ]);
        curve.compute_tangent(1, TangentMode::Linear, TangentMode::Flat);
        let mid = curve.key(1).unwrap();
        assert_eq!(mid.tangent_in, 4.0);
        assert_eq!(mid.tangent_out, 0.0);
    }

    #[test]
    fn custom_sides_are_untouched() {
        let mut curve = Curve::from_keys([
            Keyframe::new(0.0, 0.0).with_tangents(3.0, -3.0),
            Keyframe::new(1.0, 1.0),
        ]);
        curve.compute_tangent(0, TangentMode::Custom, TangentMode::Custom);
        assert_eq!(curve.key(0).unwrap().tangent_in, 3.0);
        assert_eq!(curve.key(0).unwrap().tangent_out, -3.0);
    }

    #[test]
    fn stepped_out_side_sets_step_continuity() {
        let mut curve = Curve::from_keys([Keyframe::new(0.0, 0.0), Keyframe::new(1.0, 10.0)]);
        curve.compute_tangent(0, TangentMode::Smooth, TangentMode::Stepped);
        assert_eq!(curve.key(0).unwrap().continuity, Continuity::Step);
        assert_eq!(curve.evaluate(0.5), 0.0);
    }

    #[test]
    fn value_range_spans_all_keys() {
        let curve = Curve::from_keys([
            Keyframe::new(0.0, 3.0),
            Keyframe::new(1.0, -2.0),
            Keyframe::new(2.0, 8.0),
        ]);
        assert_eq!(curve.value_range(), Some((-2.0, 8.0)));
        assert_eq!(curve.position_range(), Some((0.0, 2.0)));
        assert_eq!(Curve::new().value_range(), None);
    }

    #[test]
    fn restore_keys_keeps_signed_zero_ties_in_place() {
        let mut curve = Curve::new();
        curve.add(Keyframe::new(0.0, 1.0));
        assert_eq!(curve.add(Keyframe::new(-0.0, 2.0)), 1);
        let saved = curve.keys().to_vec();

        curve.add(Keyframe::new(5.0, 3.0));
        assert!(curve.restore_keys(saved.clone()));
        assert_eq!(curve.key(0).unwrap().value, 1.0);
        assert_eq!(curve.key(1).unwrap().value, 2.0);
        assert_eq!(curve.keys(), saved.as_slice());
    }

    #[test]
    fn restore_keys_rejects_out_of_order_input() {
        let mut curve = ramp();
        let before = curve.clone();
        let reversed: Vec<Keyframe> = before.keys().iter().rev().copied().collect();
        assert!(!curve.restore_keys(reversed));
        assert_eq!(curve, before);
    }

    #[cfg(feature = "serde")]
    #[test]
    fn deserialize_sorts_keys() {
        let mut value = serde_json::to_value(ramp()).unwrap();
        if let Some(keys) = value["keys"].as_array_mut() {
            keys.reverse();
        }
        let curve: Curve = serde_json::from_value(value).unwrap();
        let positions: Vec<f32> = curve.keys().iter().map(|k| k.position).collect();
        assert_eq!(positions, vec![0.0, 1.0]);
        assert!(approx(curve.evaluate(0.5), 5.0));
    }

    #[cfg(feature = "serde")]
    #[test]
    fn serde_preserves_curve() {
        let curve = ramp().with_loops(CurveLoop::Cycle, CurveLoop::Linear);
        let json = serde_json::to_string(&curve).unwrap();
        let back: Curve = serde_json::from_str(&json).unwrap();
        assert_eq!(back, curve);
    }
}
