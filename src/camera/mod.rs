//! Camera trait and the orbit camera implementation.

pub use self::camera::Camera;
pub use self::orbit::OrbitCamera;

mod camera;
mod orbit;
