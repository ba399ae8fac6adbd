//! Render-loop behavior, exercised with a stub host instead of a GPU.

use image::RgbaImage;
use skysphere::camera::Camera;
use skysphere::event::WindowEvent;
use skysphere::renderer::{FrameClock, Renderer};
use skysphere::scene::SceneNode;
use skysphere::viewer::Viewer;
use std::time::{Duration, Instant};

/// A host granting a fixed number of frames and recording what each render
/// observed. It consumes texture needs-update flags the way the real
/// renderer does.
struct StubHost {
    frames_left: u32,
    schedules: u32,
    renders: u32,
    frame_pending: bool,
    dirty_per_render: Vec<bool>,
}

impl StubHost {
    fn new(frames: u32) -> StubHost {
        StubHost {
            frames_left: frames,
            schedules: 0,
            renders: 0,
            frame_pending: false,
            dirty_per_render: Vec::new(),
        }
    }
}

impl FrameClock for StubHost {
    fn request_frame(&mut self) -> bool {
        if self.frames_left == 0 {
            return false;
        }
        self.frames_left -= 1;
        self.schedules += 1;
        assert!(
            !self.frame_pending,
            "a new frame was scheduled before the previous one rendered"
        );
        self.frame_pending = true;
        true
    }
}

impl Renderer for StubHost {
    fn render(&mut self, scene: &mut SceneNode, _camera: &mut dyn Camera) {
        assert!(
            self.frame_pending,
            "render was invoked without a scheduled frame"
        );
        self.frame_pending = false;
        self.renders += 1;

        // Walk the scene the way the real renderer does: gather the draw
        // list, then consume each texture's needs-update flag.
        let mut lights = skysphere::light::LightCollection::new();
        let draw_list = scene.prepare(&mut lights);

        let mut saw_dirty = false;
        for node in &draw_list {
            let mut node = node.clone();
            let mut data = node.data_mut();
            if let Some(object) = data.object_mut() {
                let texture = object.data().texture().clone();
                let mut texture = texture.borrow_mut();
                if texture.needs_update() {
                    saw_dirty = true;
                    texture.clear_needs_update();
                }
            }
        }
        self.dirty_per_render.push(saw_dirty);
    }
}

#[test]
fn render_loop_runs_once_per_granted_frame() {
    let mut viewer = Viewer::new((800, 600), "media/matcap.png");
    let mut host = StubHost::new(7);

    viewer.run(&mut host);

    assert_eq!(host.schedules, 7);
    assert_eq!(host.renders, 7);
}

#[test]
fn render_loop_survives_a_load_that_never_fires() {
    // The image path does not exist; the loop must keep rendering with the
    // needs-update flag down.
    let mut viewer = Viewer::new((800, 600), "does/not/exist.png");
    let mut host = StubHost::new(5);

    viewer.run(&mut host);

    assert_eq!(host.renders, 5);
}

#[test]
fn texture_update_is_observed_by_the_next_render() {
    let mut viewer = Viewer::new((800, 600), "does/not/exist.png");

    // A couple of frames before the image shows up.
    let mut host = StubHost::new(2);
    viewer.run(&mut host);
    assert_eq!(host.dirty_per_render, vec![false, false]);

    // The image "loads" between frames.
    viewer
        .backdrop_texture()
        .borrow_mut()
        .set_image(RgbaImage::new(2, 2));

    let mut host = StubHost::new(3);
    viewer.run(&mut host);

    // The first render after the load sees the flag and consumes it.
    assert_eq!(host.dirty_per_render, vec![true, false, false]);
}

#[test]
fn loaded_image_reaches_the_texture_through_the_loop() {
    let path = std::env::temp_dir().join("skysphere_render_loop_test.png");
    RgbaImage::new(3, 3).save(&path).unwrap();

    let mut viewer = Viewer::new((800, 600), &path);

    // Drive the per-frame bookkeeping until the background load lands.
    let deadline = Instant::now() + Duration::from_secs(10);
    while !viewer.backdrop_texture().borrow().needs_update() {
        assert!(Instant::now() < deadline, "image load never completed");
        viewer.advance();
        std::thread::sleep(Duration::from_millis(5));
    }

    let texture = viewer.backdrop_texture();
    let texture = texture.borrow();
    assert_eq!(texture.image().unwrap().dimensions(), (3, 3));

    let _ = std::fs::remove_file(path);
}

#[test]
fn stopped_viewer_renders_nothing() {
    let mut viewer = Viewer::new((800, 600), "media/matcap.png");
    viewer.stop();

    let mut host = StubHost::new(10);
    viewer.run(&mut host);

    assert!(viewer.is_stopped());
    assert_eq!(host.schedules, 0);
    assert_eq!(host.renders, 0);
}

#[test]
fn framebuffer_resize_leaves_the_projection_alone() {
    let mut viewer = Viewer::new((800, 600), "media/matcap.png");

    let aspect = viewer.camera().aspect();
    let proj_view = viewer.camera().transformation();

    viewer
        .camera_mut()
        .handle_event(&WindowEvent::FramebufferSize(1920, 1080));

    assert_eq!(viewer.camera().aspect(), aspect);
    assert_eq!(viewer.camera().transformation(), proj_view);
}
