//! The native window: winit canvas, wgpu surface and the frame renderer.

pub use self::canvas::Canvas;
pub use self::window::Window;

mod canvas;
mod window;
