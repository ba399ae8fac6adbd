//! Scene assembly and the render loop.
//!
//! [`Viewer`] owns everything the backdrop scene needs: the scene graph, the
//! orbit camera, the camera rig carrying the point light, the backdrop
//! sphere and its lazily-loaded texture. Construction performs the one-time
//! setup; [`Viewer::run`] is the steady-state loop.

use std::cell::RefCell;
use std::path::Path;
use std::rc::Rc;

use crate::camera::{Camera, OrbitCamera};
use crate::color::{hex, WHITE};
use crate::light::Light;
use crate::renderer::{FrameClock, Renderer};
use crate::resource::{ImageTexture, TextureLoader};
use crate::scene::SceneNode;
use glamx::Vec3;

/// The hint shown to the user, as the window title and a log line.
pub const CONTROLS_HINT: &str = "Drag mouse to rotate camera; scroll to zoom";

/// Radius of the backdrop sphere.
const BACKDROP_RADIUS: f32 = 80.0;
/// Longitude subdivisions of the backdrop sphere.
const BACKDROP_NTHETA: u32 = 32;
/// Latitude subdivisions of the backdrop sphere.
const BACKDROP_NPHI: u32 = 16;
/// Draw-order hint pushing the sphere behind everything else.
const BACKDROP_RENDER_ORDER: f32 = 1000.0;

/// Closest allowed orbit distance.
const MIN_ORBIT_DIST: f32 = 75.0;
/// Farthest allowed orbit distance.
const MAX_ORBIT_DIST: f32 = 200.0;

/// The backdrop viewer: one scene, one camera, one render loop.
pub struct Viewer {
    scene: SceneNode,
    camera: OrbitCamera,
    camera_rig: SceneNode,
    backdrop: SceneNode,
    backdrop_texture: Rc<RefCell<ImageTexture>>,
    loader: Option<TextureLoader>,
    stopped: bool,
}

impl Viewer {
    /// Builds the backdrop scene and starts loading the backdrop image.
    ///
    /// The scene contains an ambient light, a camera rig carrying a point
    /// light (so the light follows the camera), and the mirrored sphere the
    /// image is mapped onto. The camera orbits the origin with its distance
    /// clamped to [75, 200]; panning is disabled. The projection aspect
    /// ratio is fixed to the given viewport and never updated afterwards.
    ///
    /// No GPU resource is touched here; the scene stays inspectable headless.
    pub fn new(viewport: (u32, u32), image_path: impl AsRef<Path>) -> Viewer {
        let aspect = viewport.0 as f32 / viewport.1 as f32;

        let mut camera = OrbitCamera::new_with_frustum(
            40.0f32.to_radians(),
            aspect,
            1.0,
            1000.0,
            Vec3::ZERO,
            Vec3::ZERO,
        );
        camera.set_dist_bounds(MIN_ORBIT_DIST, MAX_ORBIT_DIST);
        camera.enable_pan(false);

        let mut scene = SceneNode::empty();

        scene.add_light(Light::ambient(0.8));

        let mut camera_rig = scene.add_group();
        camera_rig.add_light(Light::point(1.0));
        camera_rig.set_position(camera.eye());

        let backdrop_texture = Rc::new(RefCell::new(ImageTexture::new()));

        let mut backdrop =
            scene.add_sphere_with_subdiv(BACKDROP_RADIUS, BACKDROP_NTHETA, BACKDROP_NPHI);
        backdrop
            .set_local_scale(-1.0, 1.0, 1.0)
            .set_render_order(BACKDROP_RENDER_ORDER)
            .set_color(WHITE)
            .set_specular(hex(0x050505))
            .set_shininess(50.0)
            .set_texture(backdrop_texture.clone());
        // The mirrored sphere flips its winding; draw both faces so the
        // interior stays visible.
        backdrop.enable_backface_culling(false);

        let loader = Some(TextureLoader::spawn(image_path.as_ref().to_path_buf()));

        Viewer {
            scene,
            camera,
            camera_rig,
            backdrop,
            backdrop_texture,
            loader,
            stopped: false,
        }
    }

    /// Advances the per-frame bookkeeping.
    ///
    /// Polls the pending image load (raising the texture's needs-update flag
    /// on success, logging a warning on failure) and moves the camera rig to
    /// the camera eye so the point light follows the viewpoint.
    pub fn advance(&mut self) {
        if let Some(loader) = &self.loader {
            if let Some(result) = loader.poll() {
                match result {
                    Ok(image) => {
                        log::info!(
                            "backdrop image loaded ({}x{})",
                            image.width(),
                            image.height()
                        );
                        self.backdrop_texture.borrow_mut().set_image(image);
                    }
                    Err(err) => {
                        // The sphere keeps rendering with the default white
                        // texture; no retry.
                        log::warn!("failed to load backdrop image: {}", err);
                    }
                }
                self.loader = None;
            }
        }

        let eye = self.camera.eye();
        self.camera_rig.set_position(eye);
    }

    /// Runs the render loop until the host stops granting frames or
    /// [`stop`](Viewer::stop) is called.
    ///
    /// Every iteration requests the next frame tick first, then renders the
    /// current scene/camera pair.
    pub fn run<H: FrameClock + Renderer>(&mut self, host: &mut H) {
        while !self.stopped && host.request_frame() {
            self.advance();
            host.render(&mut self.scene, &mut self.camera);
        }
    }

    /// Stops the render loop at the next iteration.
    pub fn stop(&mut self) {
        self.stopped = true;
    }

    /// Whether [`stop`](Viewer::stop) has been called.
    pub fn is_stopped(&self) -> bool {
        self.stopped
    }

    /// The root of the scene graph.
    pub fn scene(&self) -> &SceneNode {
        &self.scene
    }

    /// The orbit camera.
    pub fn camera(&self) -> &OrbitCamera {
        &self.camera
    }

    /// Mutable access to the orbit camera.
    pub fn camera_mut(&mut self) -> &mut OrbitCamera {
        &mut self.camera
    }

    /// The node carrying the point light, synced to the camera eye.
    pub fn camera_rig(&self) -> &SceneNode {
        &self.camera_rig
    }

    /// The backdrop sphere node.
    pub fn backdrop(&self) -> &SceneNode {
        &self.backdrop
    }

    /// The backdrop texture.
    pub fn backdrop_texture(&self) -> Rc<RefCell<ImageTexture>> {
        self.backdrop_texture.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::color::Color;
    use glamx::Vec3;

    fn make_viewer() -> Viewer {
        Viewer::new((800, 600), "media/matcap.png")
    }

    #[test]
    fn test_setup_builds_the_expected_scene() {
        let viewer = make_viewer();

        assert_eq!(viewer.scene().num_objects(), 1);
        assert_eq!(viewer.scene().num_lights(), 2);
        assert_eq!(viewer.camera_rig().num_lights(), 1);

        // A second setup produces the same structure.
        let again = make_viewer();
        assert_eq!(again.scene().num_objects(), 1);
        assert_eq!(again.scene().num_lights(), 2);
    }

    #[test]
    fn test_backdrop_parameters() {
        let viewer = make_viewer();
        let backdrop = viewer.backdrop();

        assert_eq!(backdrop.local_scale(), Vec3::new(-1.0, 1.0, 1.0));
        assert_eq!(backdrop.render_order(), BACKDROP_RENDER_ORDER);

        let data = backdrop.data();
        let object = data.object().unwrap();
        assert!(!object.data().backface_culling_enabled());
        assert_eq!(object.data().shininess(), 50.0);
        assert_eq!(object.data().color(), WHITE);
        let expected = 5.0 / 255.0;
        let specular: Color = object.data().specular();
        assert!((specular.r - expected).abs() < 1.0e-6);

        let mesh = object.mesh().clone();
        let mesh = mesh.borrow();
        assert_eq!(mesh.num_vertices(), 33 * 17);
        for p in mesh.coords() {
            assert!((p.length() - BACKDROP_RADIUS).abs() < 1.0e-3);
        }
    }

    #[test]
    fn test_camera_configuration() {
        let viewer = make_viewer();
        let camera = viewer.camera();

        assert_eq!(camera.dist_bounds(), (75.0, 200.0));
        assert_eq!(camera.dist(), 75.0);
        assert!(camera.pan_button().is_none());
        assert!((camera.fov() - 40.0f32.to_radians()).abs() < 1.0e-6);
        assert_eq!(camera.clip_planes(), (1.0, 1000.0));
        assert!((camera.aspect() - 800.0 / 600.0).abs() < 1.0e-6);
    }

    #[test]
    fn test_texture_starts_clean() {
        let viewer = make_viewer();
        let texture = viewer.backdrop_texture();
        assert!(!texture.borrow().needs_update());
        assert!(texture.borrow().image().is_none());
    }

    #[test]
    fn test_advance_keeps_the_light_on_the_camera() {
        let mut viewer = make_viewer();
        viewer.camera_mut().set_yaw(1.25);
        viewer.advance();

        let eye = viewer.camera().eye();
        assert!((viewer.camera_rig().position() - eye).length() < 1.0e-6);
    }
}
