//! winit-based canvas backed by a wgpu surface.

use std::cell::RefCell;
use std::sync::mpsc::Sender;
use std::sync::Arc;

use crate::context::Context;
use crate::event::{Action, Key, Modifiers, MouseButton, WindowEvent};
use winit::application::ApplicationHandler;
use winit::dpi::LogicalSize;
use winit::event::{ElementState, MouseScrollDelta, WindowEvent as WinitWindowEvent};
use winit::event_loop::{ActiveEventLoop, EventLoop};
use winit::keyboard::{KeyCode, PhysicalKey};
use winit::window::{Window as WinitWindow, WindowAttributes};

// Thread-local EventLoop singleton: winit only allows one EventLoop per
// program, and it is not Send/Sync.
thread_local! {
    static EVENT_LOOP: RefCell<Option<EventLoop<()>>> = const { RefCell::new(None) };
    // Events collected by pump_app_events, drained by poll_events.
    static PENDING_EVENTS: RefCell<Vec<PendingEvent>> = const { RefCell::new(Vec::new()) };
}

/// Internal event type that stores both the event data and state updates needed.
#[derive(Clone)]
enum PendingEvent {
    WindowEvent(WindowEvent),
    ButtonState(MouseButton, Action),
    KeyState(Key, Action),
    CursorPos(f64, f64),
}

/// A window with a wgpu surface and a depth buffer.
///
/// The surface and depth buffer are sized once, when the canvas opens;
/// framebuffer resizes are deliberately not tracked, so after a resize the
/// surface may fail to acquire and the frame is skipped by the caller.
#[allow(dead_code)]
pub struct Canvas {
    window: Arc<WinitWindow>,
    surface: wgpu::Surface<'static>,
    surface_config: wgpu::SurfaceConfiguration,
    cursor_pos: Option<(f64, f64)>,
    key_states: [Action; Key::Unknown as usize + 1],
    button_states: [Action; MouseButton::Button4 as usize + 1],
    out_events: Sender<WindowEvent>,
    depth_texture: wgpu::Texture,
    depth_view: wgpu::TextureView,
}

impl Canvas {
    /// Opens a new window and initializes the wgpu context.
    pub async fn open(
        title: &str,
        width: u32,
        height: u32,
        out_events: Sender<WindowEvent>,
    ) -> Self {
        let window_attrs = WindowAttributes::default()
            .with_title(title)
            .with_inner_size(LogicalSize::new(width as f64, height as f64));

        // Get or create the thread-local EventLoop.
        let window = EVENT_LOOP.with(|event_loop_cell| {
            let mut event_loop_opt = event_loop_cell.borrow_mut();
            if event_loop_opt.is_none() {
                *event_loop_opt = Some(EventLoop::new().expect("Failed to create event loop"));
            }
            let event_loop = event_loop_opt.as_ref().unwrap();
            #[allow(deprecated)]
            let window = event_loop
                .create_window(window_attrs)
                .expect("Failed to create window");
            window
        });

        let window = Arc::new(window);

        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: wgpu::Backends::all(),
            ..Default::default()
        });

        let surface = instance
            .create_surface(window.clone())
            .expect("Failed to create surface");

        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::default(),
                compatible_surface: Some(&surface),
                force_fallback_adapter: false,
            })
            .await
            .expect("Failed to find an appropriate adapter");

        let (device, queue) = adapter
            .request_device(&wgpu::DeviceDescriptor {
                label: Some("skysphere device"),
                required_features: wgpu::Features::empty(),
                required_limits: wgpu::Limits::default(),
                memory_hints: wgpu::MemoryHints::default(),
                experimental_features: wgpu::ExperimentalFeatures::disabled(),
                trace: wgpu::Trace::Off,
            })
            .await
            .expect("Failed to create device");

        // Prefer a non-sRGB format; gamma correction happens in the shader.
        let surface_caps = surface.get_capabilities(&adapter);
        let surface_format = surface_caps
            .formats
            .iter()
            .find(|f| !f.is_srgb())
            .copied()
            .unwrap_or(surface_caps.formats[0]);

        Context::init(instance, device, queue, adapter, surface_format);

        let ctxt = Context::get();
        let surface_caps = surface.get_capabilities(&ctxt.adapter);

        let size = window.inner_size();
        let width = size.width.max(1);
        let height = size.height.max(1);

        let surface_config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format: surface_format,
            width,
            height,
            present_mode: wgpu::PresentMode::AutoVsync,
            alpha_mode: surface_caps.alpha_modes[0],
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };
        surface.configure(&ctxt.device, &surface_config);

        let (depth_texture, depth_view) = Self::create_depth_texture(&ctxt.device, width, height);

        log::info!("canvas opened at {}x{} ({:?})", width, height, surface_format);

        Canvas {
            window,
            surface,
            surface_config,
            cursor_pos: None,
            key_states: [Action::Release; Key::Unknown as usize + 1],
            button_states: [Action::Release; MouseButton::Button4 as usize + 1],
            out_events,
            depth_texture,
            depth_view,
        }
    }

    fn create_depth_texture(
        device: &wgpu::Device,
        width: u32,
        height: u32,
    ) -> (wgpu::Texture, wgpu::TextureView) {
        let texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some("depth_texture"),
            size: wgpu::Extent3d {
                width,
                height,
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: Context::depth_format(),
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            view_formats: &[],
        });
        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
        (texture, view)
    }

    /// Polls events from the window system and forwards them to the event channel.
    pub fn poll_events(&mut self) {
        use winit::platform::pump_events::EventLoopExtPumpEvents;

        struct EventCollector;

        impl ApplicationHandler for EventCollector {
            fn resumed(&mut self, _event_loop: &ActiveEventLoop) {}

            fn window_event(
                &mut self,
                _event_loop: &ActiveEventLoop,
                _window_id: winit::window::WindowId,
                event: WinitWindowEvent,
            ) {
                let pending_events: Vec<PendingEvent> = match event {
                    WinitWindowEvent::CloseRequested => {
                        vec![PendingEvent::WindowEvent(WindowEvent::Close)]
                    }
                    // Resizes are not tracked: the surface keeps its
                    // setup-time dimensions.
                    WinitWindowEvent::Resized(_) => vec![],
                    WinitWindowEvent::CursorMoved { position, .. } => {
                        vec![
                            PendingEvent::CursorPos(position.x, position.y),
                            PendingEvent::WindowEvent(WindowEvent::CursorPos(
                                position.x,
                                position.y,
                                Modifiers::empty(),
                            )),
                        ]
                    }
                    WinitWindowEvent::MouseInput { state, button, .. } => {
                        let action = translate_action(state);
                        let button = translate_mouse_button(button);
                        vec![
                            PendingEvent::ButtonState(button, action),
                            PendingEvent::WindowEvent(WindowEvent::MouseButton(
                                button,
                                action,
                                Modifiers::empty(),
                            )),
                        ]
                    }
                    WinitWindowEvent::MouseWheel { delta, .. } => {
                        let (x, y) = match delta {
                            MouseScrollDelta::LineDelta(dx, dy) => {
                                (dx as f64 * 10.0, dy as f64 * 10.0)
                            }
                            MouseScrollDelta::PixelDelta(delta) => (delta.x, delta.y),
                        };
                        vec![PendingEvent::WindowEvent(WindowEvent::Scroll(
                            x,
                            y,
                            Modifiers::empty(),
                        ))]
                    }
                    WinitWindowEvent::KeyboardInput { event, .. } => {
                        let action = translate_action(event.state);
                        let key = translate_key(event.physical_key);
                        vec![
                            PendingEvent::KeyState(key, action),
                            PendingEvent::WindowEvent(WindowEvent::Key(
                                key,
                                action,
                                Modifiers::empty(),
                            )),
                        ]
                    }
                    _ => vec![],
                };

                if !pending_events.is_empty() {
                    PENDING_EVENTS.with(|storage| {
                        storage.borrow_mut().extend(pending_events);
                    });
                }
            }
        }

        let timeout = Some(std::time::Duration::ZERO);
        EVENT_LOOP.with(|event_loop_cell| {
            if let Some(ref mut event_loop) = *event_loop_cell.borrow_mut() {
                let mut collector = EventCollector;
                let _ = event_loop.pump_app_events(timeout, &mut collector);
            }
        });

        let events = PENDING_EVENTS.with(|storage| std::mem::take(&mut *storage.borrow_mut()));

        for event in events {
            match event {
                PendingEvent::WindowEvent(we) => {
                    let _ = self.out_events.send(we);
                }
                PendingEvent::ButtonState(button, action) => {
                    self.button_states[button as usize] = action;
                }
                PendingEvent::KeyState(key, action) => {
                    self.key_states[key as usize] = action;
                }
                PendingEvent::CursorPos(x, y) => {
                    self.cursor_pos = Some((x, y));
                }
            }
        }
    }

    /// Gets the current surface texture for rendering.
    pub fn get_current_texture(&self) -> Result<wgpu::SurfaceTexture, wgpu::SurfaceError> {
        self.surface.get_current_texture()
    }

    /// Presents the current frame.
    pub fn present(&self, frame: wgpu::SurfaceTexture) {
        frame.present();
    }

    /// Gets the depth texture view for rendering.
    pub fn depth_view(&self) -> &wgpu::TextureView {
        &self.depth_view
    }

    /// The surface format.
    pub fn surface_format(&self) -> wgpu::TextureFormat {
        self.surface_config.format
    }

    /// The size of the rendering surface, fixed at open time.
    pub fn size(&self) -> (u32, u32) {
        (self.surface_config.width, self.surface_config.height)
    }

    /// The current position of the cursor, if known.
    pub fn cursor_pos(&self) -> Option<(f64, f64)> {
        self.cursor_pos
    }

    /// The state of a mouse button.
    pub fn get_mouse_button(&self, button: MouseButton) -> Action {
        self.button_states[button as usize]
    }

    /// The state of a key.
    pub fn get_key(&self, key: Key) -> Action {
        self.key_states[key as usize]
    }

    /// Requests a redraw from the window system.
    pub fn request_redraw(&self) {
        self.window.request_redraw();
    }
}

fn translate_action(state: ElementState) -> Action {
    match state {
        ElementState::Pressed => Action::Press,
        ElementState::Released => Action::Release,
    }
}

fn translate_mouse_button(button: winit::event::MouseButton) -> MouseButton {
    match button {
        winit::event::MouseButton::Left => MouseButton::Button1,
        winit::event::MouseButton::Right => MouseButton::Button2,
        winit::event::MouseButton::Middle => MouseButton::Button3,
        _ => MouseButton::Button4,
    }
}

fn translate_key(key: PhysicalKey) -> Key {
    match key {
        PhysicalKey::Code(KeyCode::Escape) => Key::Escape,
        PhysicalKey::Code(KeyCode::Enter) => Key::Return,
        PhysicalKey::Code(KeyCode::Space) => Key::Space,
        _ => Key::Unknown,
    }
}
