//! The rendering seam between the scene model and its host.

use crate::camera::Camera;
use crate::scene::SceneNode;

/// Trait implemented by rendering hosts.
///
/// The windowed implementation draws the scene with the GPU; test stubs can
/// walk the scene graph instead and record what they observe.
pub trait Renderer {
    /// Renders one frame of the given scene from the given camera.
    fn render(&mut self, scene: &mut SceneNode, camera: &mut dyn Camera);
}

/// Trait implemented by frame-timing sources.
///
/// Each render-loop iteration first requests the next tick through this
/// trait, then renders. The windowed implementation keeps granting ticks
/// until the window close was requested; pacing comes from vsync
/// presentation.
pub trait FrameClock {
    /// Requests the next frame tick.
    ///
    /// Returns `false` when the host is shutting down and no more frames
    /// should be rendered.
    fn request_frame(&mut self) -> bool;
}
