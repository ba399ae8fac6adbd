//! The skysphere window.

use std::sync::mpsc::{self, Receiver};

use crate::builtin::PhongMaterial;
use crate::camera::Camera;
use crate::color::{Color, BLACK};
use crate::context::Context;
use crate::event::{Action, Key, WindowEvent};
use crate::light::LightCollection;
use crate::renderer::{FrameClock, Renderer};
use crate::scene::SceneNode;
use crate::window::Canvas;

static DEFAULT_WIDTH: u32 = 800u32;
static DEFAULT_HEIGHT: u32 = 600u32;

/// A window hosting the scene renderer.
///
/// The window owns the canvas (winit window + wgpu surface) and the Phong
/// pipeline. It implements both sides of the render loop seam:
/// [`FrameClock`] grants frames until close is requested (vsync presentation
/// paces them), and [`Renderer`] drains input into the camera and draws one
/// frame.
pub struct Window {
    events: Receiver<WindowEvent>,
    canvas: Canvas,
    material: PhongMaterial,
    background: Color,
    should_close: bool,
}

impl Window {
    /// Creates a new window with default dimensions (800x600).
    pub async fn new(title: &str) -> Window {
        Window::new_with_size(title, DEFAULT_WIDTH, DEFAULT_HEIGHT).await
    }

    /// Creates a new window with custom dimensions.
    pub async fn new_with_size(title: &str, width: u32, height: u32) -> Window {
        let (event_send, event_receive) = mpsc::channel();
        let canvas = Canvas::open(title, width, height, event_send).await;
        let material = PhongMaterial::new();

        Window {
            events: event_receive,
            canvas,
            material,
            background: BLACK,
            should_close: false,
        }
    }

    /// Indicates whether this window should be closed.
    #[inline]
    pub fn should_close(&self) -> bool {
        self.should_close
    }

    /// Requests the window to close.
    ///
    /// The next [`FrameClock::request_frame`] call returns `false`.
    #[inline]
    pub fn close(&mut self) {
        self.should_close = true;
    }

    /// The window width, in pixels.
    #[inline]
    pub fn width(&self) -> u32 {
        self.canvas.size().0
    }

    /// The window height, in pixels.
    #[inline]
    pub fn height(&self) -> u32 {
        self.canvas.size().1
    }

    /// The size of the rendering surface, fixed at creation time.
    #[inline]
    pub fn size(&self) -> (u32, u32) {
        self.canvas.size()
    }

    /// Sets the background color.
    pub fn set_background_color(&mut self, color: Color) {
        self.background = color;
    }

    /// A reference to the underlying canvas.
    pub fn canvas(&self) -> &Canvas {
        &self.canvas
    }

    /// Polls the window system and feeds the resulting events to the camera.
    ///
    /// Escape and the close button request close; everything else goes to the
    /// camera.
    pub fn handle_events(&mut self, camera: &mut dyn Camera) {
        self.canvas.poll_events();

        for event in self.events.try_iter() {
            match event {
                WindowEvent::Key(Key::Escape, Action::Release, _) | WindowEvent::Close => {
                    self.should_close = true;
                }
                _ => {}
            }

            camera.handle_event(&event);
        }
    }

    /// Renders one frame of the scene.
    ///
    /// A frame whose surface texture cannot be acquired (e.g. after an
    /// untracked resize) is logged and skipped.
    pub fn render_frame(&mut self, scene: &mut SceneNode, camera: &mut dyn Camera) {
        let frame = match self.canvas.get_current_texture() {
            Ok(frame) => frame,
            Err(err) => {
                log::error!("Failed to acquire surface texture: {:?}", err);
                return;
            }
        };
        let frame_view = frame
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());
        let depth_view = self.canvas.depth_view().clone();

        let ctxt = Context::get();
        let mut encoder = ctxt.create_command_encoder(Some("skysphere_frame_encoder"));

        // Phase 1: propagate transforms, gather lights, order the draws.
        let mut lights = LightCollection::new();
        let draw_list = scene.prepare(&mut lights);

        // Phase 2: upload uniforms and pending texture pixels.
        self.material.prepare_frame(camera, &lights);
        for node in &draw_list {
            let mut node = node.clone();
            let mut data = node.data_mut();
            let transform = data.world_transform();
            let scale = data.world_scale();
            if let Some(object) = data.object_mut() {
                self.material.prepare_object(object, transform, scale);
            }
        }

        // Phase 3: issue the draw calls in a single render pass.
        {
            let bg = self.background;
            let mut render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("scene_render_pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &frame_view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(wgpu::Color {
                            r: bg.r as f64,
                            g: bg.g as f64,
                            b: bg.b as f64,
                            a: bg.a as f64,
                        }),
                        store: wgpu::StoreOp::Store,
                    },
                    depth_slice: None,
                })],
                depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                    view: &depth_view,
                    depth_ops: Some(wgpu::Operations {
                        load: wgpu::LoadOp::Clear(1.0),
                        store: wgpu::StoreOp::Store,
                    }),
                    stencil_ops: None,
                }),
                timestamp_writes: None,
                occlusion_query_set: None,
            });

            for node in &draw_list {
                let mut node = node.clone();
                let mut data = node.data_mut();
                if let Some(object) = data.object_mut() {
                    self.material.draw_object(object, &mut render_pass);
                }
            }
        }

        ctxt.submit(std::iter::once(encoder.finish()));

        self.canvas.present(frame);
    }
}

impl FrameClock for Window {
    fn request_frame(&mut self) -> bool {
        !self.should_close
    }
}

impl Renderer for Window {
    fn render(&mut self, scene: &mut SceneNode, camera: &mut dyn Camera) {
        self.handle_events(camera);
        self.render_frame(scene, camera);
    }
}
