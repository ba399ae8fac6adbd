use crate::event::WindowEvent;
use glamx::{Mat4, Pose3, Vec3};

/// Trait implemented by cameras.
///
/// A camera turns window events into viewpoint changes and exposes the
/// view/projection transforms the renderer needs. Implementations keep their
/// own input state (pressed buttons, last cursor position), so they can be
/// driven headless by synthetic [`WindowEvent`]s.
pub trait Camera {
    /// Handles a window event to update the camera state.
    fn handle_event(&mut self, event: &WindowEvent);

    /// The camera position in world space.
    fn eye(&self) -> Vec3;

    /// The view transformation (world → camera space).
    fn view_transform(&self) -> Pose3;

    /// The combined projection and view transformation matrix (world → NDC).
    fn transformation(&self) -> Mat4;

    /// The inverse of [`transformation`](Self::transformation).
    fn inverse_transformation(&self) -> Mat4;

    /// The near and far clipping plane distances, as `(znear, zfar)`.
    fn clip_planes(&self) -> (f32, f32);

    /// The view transform and projection matrix used for rendering.
    fn view_proj_pair(&self) -> (Pose3, Mat4);
}
