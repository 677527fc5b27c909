use serde::{Deserialize, Serialize};

/// The node attribute an animation channel drives.
///
/// Values are stored flat, so each variant fixes how many floats make up one
/// key (see [`TargetAttribute::components_per_key`]).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TargetAttribute {
    /// Uniform scale, one float.
    ScaleUnit,
    ScaleX,
    ScaleY,
    ScaleZ,
    /// `[x, y, z]`
    Scale,
    /// Quaternion `[x, y, z, w]`
    Rotate,
    /// `[x, y, z]`
    Translate,
    TranslateX,
    TranslateY,
    TranslateZ,
    /// Quaternion followed by translation, `[qx, qy, qz, qw, tx, ty, tz]`
    RotateTranslate,
    /// `[sx, sy, sz, tx, ty, tz]`
    ScaleTranslate,
    /// `[sx, sy, sz, qx, qy, qz, qw, tx, ty, tz]`
    ScaleRotateTranslate,
}

impl TargetAttribute {
    /// Number of floats in one key value.
    #[must_use]
    pub const fn components_per_key(self) -> usize {
        match self {
            Self::ScaleUnit
            | Self::ScaleX
            | Self::ScaleY
            | Self::ScaleZ
            | Self::TranslateX
            | Self::TranslateY
            | Self::TranslateZ => 1,
            Self::Scale | Self::Translate => 3,
            Self::Rotate => 4,
            Self::ScaleTranslate => 6,
            Self::RotateTranslate => 7,
            Self::ScaleRotateTranslate => 10,
        }
    }

    /// True for the attributes that carry a single float per key.
    #[must_use]
    pub const fn is_single_component(self) -> bool {
        self.components_per_key() == 1
    }
}

/// How a channel moves from one key to the next.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum InterpolationMode {
    Bezier,
    BSpline,
    Flat,
    Hermite,
    Linear,
    Smooth,
    Step,
}
