use glam::{Mat4, Vec3};

/// Orthographic 2D camera.
///
/// World units are independent of the window: the view volume is `extent` wide and
/// high, centered on `position`.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Camera2d {
    pub position: Vec3,
    pub extent: f32,
    pub near: f32,
    pub far: f32,
}

impl Camera2d {
    pub fn new(position: Vec3, extent: f32) -> Self {
        Self {
            position,
            extent,
            near: 0.0,
            far: 10.0,
        }
    }

    /// World-to-view transform.
    pub fn view(&self) -> Mat4 {
        Mat4::from_translation(-self.position)
    }

    pub fn projection(&self) -> Mat4 {
        let half = self.extent * 0.5;
        Mat4::orthographic_rh(-half, half, -half, half, self.near, self.far)
    }

    /// `projection * view`, ready to be multiplied by a model matrix.
    pub fn view_projection(&self) -> Mat4 {
        self.projection() * self.view()
    }
}

impl Default for Camera2d {
    /// Looks at the unit square `[0, 1] x [0, 1]`.
    fn default() -> Self {
        Self::new(Vec3::new(0.5, 0.5, 0.0), 1.0)
    }
}
