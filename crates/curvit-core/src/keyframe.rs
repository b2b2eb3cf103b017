#![forbid(unsafe_code)]

//! Keyframe values and the per-key policies attached to them.
//!
//! A [`Keyframe`] is a plain `Copy` value. Editing never mutates a keyframe
//! in place from the outside; the owning [`Curve`](crate::curve::Curve)
//! replaces it and keeps its key sequence sorted.
//!
//! # Tangent units
//!
//! Tangents are stored as the value change across the adjacent segment,
//! i.e. the Hermite basis is evaluated with `t` in `[0, 1]` per segment.
//! A slope `s` over a segment of width `w` is stored as `s * w`.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Interpolation policy between a key and the next one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Continuity {
    /// Cubic Hermite interpolation using the stored tangents.
    #[default]
    Smooth,
    /// Hold this key's value until the next key's position.
    Step,
}

/// How one side (in or out) of a key gets its tangent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum TangentMode {
    /// Average slope of both neighbor segments.
    #[default]
    Smooth,
    /// Slope towards the adjacent key on this side.
    Linear,
    /// Zero tangent.
    Flat,
    /// Whatever was last set explicitly; never recomputed.
    Custom,
    /// Zero tangent; on the out side the key also holds its value (step).
    Stepped,
}

impl TangentMode {
    /// All modes, in menu order.
    pub const ALL: [Self; 5] = [
        Self::Smooth,
        Self::Linear,
        Self::Flat,
        Self::Custom,
        Self::Stepped,
    ];

    /// Whether tangent recomputation rewrites this side.
    #[inline]
    #[must_use]
    pub const fn is_automatic(self) -> bool {
        !matches!(self, Self::Custom)
    }

    /// Short label for UI menus and logs.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Smooth => "smooth",
            Self::Linear => "linear",
            Self::Flat => "flat",
            Self::Custom => "custom",
            Self::Stepped => "stepped",
        }
    }
}

/// One sample on a curve.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Keyframe {
    /// Position along the curve (usually time).
    pub position: f32,
    /// Value at `position`.
    pub value: f32,
    /// Incoming tangent (value change across the previous segment).
    pub tangent_in: f32,
    /// Outgoing tangent (value change across the next segment).
    pub tangent_out: f32,
    /// Interpolation towards the next key.
    pub continuity: Continuity,
}

impl Keyframe {
    /// Create a smooth key with flat tangents.
    #[inline]
    #[must_use]
    pub const fn new(position: f32, value: f32) -> Self {
        Self {
            position,
            value,
            tangent_in: 0.0,
            tangent_out: 0.0,
            continuity: Continuity::Smooth,
        }
    }

    /// Set both tangents.
    #[must_use]
    pub const fn with_tangents(mut self, tangent_in: f32, tangent_out: f32) -> Self {
        self.tangent_in = tangent_in;
        self.tangent_out = tangent_out;
        self
    }

    /// Set the continuity.
    #[must_use]
    pub const fn with_continuity(mut self, continuity: Continuity) -> Self {
        self.continuity = continuity;
        self
    }

    /// Same key moved to another position/value, tangents untouched.
    #[inline]
    #[must_use]
    pub const fn at(mut self, position: f32, value: f32) -> Self {
        self.position = position;
        self.value = value;
        self
    }

    /// Bitwise equality, treating `-0.0 != 0.0` and `NaN == NaN` (same bits).
    ///
    /// Used to verify exact restoration after undo.
    #[must_use]
    pub fn bit_eq(&self, other: &Self) -> bool {
        self.position.to_bits() == other.position.to_bits()
            && self.value.to_bits() == other.value.to_bits()
            && self.tangent_in.to_bits() == other.tangent_in.to_bits()
            && self.tangent_out.to_bits() == other.tangent_out.to_bits()
            && self.continuity == other.continuity
    }
}
