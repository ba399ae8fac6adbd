use skysphere::viewer::{Viewer, CONTROLS_HINT};
use skysphere::window::Window;

/// Relative path of the backdrop image mapped onto the sphere.
const BACKDROP_IMAGE: &str = "media/matcap.png";

fn main() {
    env_logger::init();
    pollster::block_on(run());
}

async fn run() {
    let mut window = Window::new(CONTROLS_HINT).await;

    log::info!("{}", CONTROLS_HINT);

    let mut viewer = Viewer::new(window.size(), BACKDROP_IMAGE);
    viewer.run(&mut window);
}
