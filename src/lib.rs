/*!
# skysphere

A tiny "stand inside the backdrop" viewer: a sphere mesh is textured with a
MatCap-style image, mirrored on the X axis so its interior faces the viewer,
and rendered in a loop while an orbit camera lets the user look around and
zoom.

The crate is split the way a small scene-graph engine is:

* a CPU-side scene model ([`scene`], [`camera`], [`light`], [`resource`],
  [`procedural`]) that can be built and exercised without a GPU;
* a wgpu/winit rendering host ([`window`], [`context`], [`builtin`]) that
  draws the scene each frame;
* the [`viewer`] module tying both together: it assembles the backdrop scene
  and runs the schedule-then-render loop.

Opening the viewer is a few lines:

```no_run
use skysphere::prelude::*;

fn main() {
    let mut window = pollster::block_on(Window::new(CONTROLS_HINT));
    let (w, h) = window.size();
    let mut viewer = Viewer::new((w, h), "media/matcap.png");
    viewer.run(&mut window);
}
```

Default controls, handled by the orbit camera:

* `left click + drag`: look around.
* `scroll`: zoom in / zoom out (clamped).
* `escape`: close the window.
*/
#![allow(clippy::module_inception)]

pub use glamx;

pub mod builtin;
pub mod camera;
pub mod color;
pub mod context;
pub mod event;
pub mod light;
pub mod procedural;
pub mod renderer;
pub mod resource;
pub mod scene;
pub mod viewer;
pub mod window;

pub mod prelude {
    pub use crate::builtin::*;
    pub use crate::camera::*;
    pub use crate::color::*;
    pub use crate::context::*;
    pub use crate::event::*;
    pub use crate::light::*;
    pub use crate::renderer::*;
    pub use crate::resource::*;
    pub use crate::scene::*;
    pub use crate::viewer::*;
    pub use crate::window::*;
    pub use glamx::{Mat3, Mat4, Pose3, Quat, Vec2, Vec3};
    pub use std::cell::RefCell;
    pub use std::rc::Rc;
}
