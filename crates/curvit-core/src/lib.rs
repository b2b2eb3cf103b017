#![forbid(unsafe_code)]

//! Core curve model for curvit.
//!
//! # Role in curvit
//! `curvit-core` owns the data that gets edited: [`Keyframe`] values,
//! [`Curve`] sequences with loop behavior and Hermite evaluation, automatic
//! tangent computation, and the [`ViewTransform`] that relates curve space
//! to a display surface. It has no notion of ids, selection, or undo; those
//! live in `curvit-edit`.

pub mod curve;
pub mod geometry;
pub mod keyframe;

pub use curve::{Curve, CurveLoop};
pub use geometry::{Point, Rect, Size, ViewTransform};
pub use keyframe::{Continuity, Keyframe, TangentMode};
