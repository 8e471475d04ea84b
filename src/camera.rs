//! Camera state and projection.

use std::f32::consts::FRAC_PI_2;

use glam::{Mat4, Quat};

/// Vertical field of view, in radians.
pub const FIELD_OF_VIEW: f32 = FRAC_PI_2;
pub const NEAR: f32 = 0.1;
pub const FAR: f32 = 10.0;

/// Right-handed perspective projection for a viewport of `width` x `height` pixels.
///
/// Returns `None` for an empty viewport, which has no aspect ratio.
pub fn projection(width: u32, height: u32) -> Option<Mat4> {
    if width == 0 || height == 0 {
        return None;
    }
    let aspect = width as f32 / height as f32;
    Some(Mat4::perspective_rh_gl(FIELD_OF_VIEW, aspect, NEAR, FAR))
}

/// Camera orientation and view matrix.
///
/// Reserved for future camera control. Nothing updates it yet, so both values are always
/// identity and the view matrix pushed each frame is a no-op.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Camera {
    rotation: Quat,
    matrix: Mat4,
}

impl Default for Camera {
    fn default() -> Self {
        Self {
            rotation: Quat::IDENTITY,
            matrix: Mat4::IDENTITY,
        }
    }
}

impl Camera {
    pub fn rotation(&self) -> Quat {
        self.rotation
    }

    pub fn matrix(&self) -> &Mat4 {
        &self.matrix
    }
}
