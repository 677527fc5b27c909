use glam::{Mat4, Vec4};

/// Skinning data carried by a joint node.
#[derive(Debug, Clone, PartialEq)]
pub struct Joint {
    /// Inverse of the joint's world transform at bind time.
    pub inverse_bind_pose: Mat4,
    /// Number of skin slots currently bound to this joint.
    pub(crate) skin_count: u32,
}

impl Joint {
    #[must_use]
    pub fn new(inverse_bind_pose: Mat4) -> Self {
        Self {
            inverse_bind_pose,
            skin_count: 0,
        }
    }

    #[inline]
    #[must_use]
    pub fn skin_count(&self) -> u32 {
        self.skin_count
    }

    /// `world * inverse_bind_pose * bind_shape`
    #[inline]
    #[must_use]
    pub fn skinning_matrix(&self, world: Mat4, bind_shape: Mat4) -> Mat4 {
        world * self.inverse_bind_pose * bind_shape
    }

    /// Writes the first three rows of the skinning matrix into `rows`.
    ///
    /// The fourth row of an affine matrix is always `[0, 0, 0, 1]` and is not
    /// stored in the palette.
    pub fn write_palette_rows(&self, world: Mat4, bind_shape: Mat4, rows: &mut [Vec4]) {
        let m = self.skinning_matrix(world, bind_shape);
        rows[0] = m.row(0);
        rows[1] = m.row(1);
        rows[2] = m.row(2);
    }
}

impl Default for Joint {
    fn default() -> Self {
        Self::new(Mat4::IDENTITY)
    }
}
