use crate::camera::Camera;
use crate::event::{Action, MouseButton, WindowEvent};
use glamx::{Mat4, Pose3, Vec2, Vec3};
use std::f32;

/// An orbit camera: the eye circles a focus point at a bounded distance.
///
/// # Default Controls
/// - **Left mouse + drag**: rotate around the focus point
/// - **Right mouse + drag**: pan (translate the focus point), when enabled
/// - **Mouse wheel**: zoom in/out, clamped to the configured distance bounds
///
/// The projection is fixed at construction time: the camera does not react to
/// framebuffer-size events, so the aspect ratio it was created with is the
/// aspect ratio it keeps.
#[derive(Copy, Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct OrbitCamera {
    at: Vec3,
    yaw: f32,
    pitch: f32,
    dist: f32,
    min_dist: f32,
    max_dist: f32,

    yaw_step: f32,
    pitch_step: f32,
    dist_step: f32,
    pan_step: f32,
    rotate_button: Option<MouseButton>,
    pan_button: Option<MouseButton>,

    fov: f32,
    aspect: f32,
    znear: f32,
    zfar: f32,
    proj: Mat4,
    view: Mat4,
    proj_view: Mat4,
    inverse_proj_view: Mat4,
    last_cursor_pos: Vec2,
    rotate_pressed: bool,
    pan_pressed: bool,
}

impl OrbitCamera {
    /// Creates a new orbit camera with default frustum settings.
    ///
    /// Default frustum: 45° field of view, near plane at 0.1, far plane at 1024.
    ///
    /// # Arguments
    /// * `aspect` - The viewport aspect ratio (width / height)
    /// * `eye` - Initial camera position
    /// * `at` - The focus point to orbit around
    pub fn new(aspect: f32, eye: Vec3, at: Vec3) -> OrbitCamera {
        OrbitCamera::new_with_frustum(f32::consts::PI / 4.0, aspect, 0.1, 1024.0, eye, at)
    }

    /// Creates a new orbit camera with custom frustum parameters.
    ///
    /// # Arguments
    /// * `fov` - Field of view in radians
    /// * `aspect` - The viewport aspect ratio (width / height)
    /// * `znear` - Near clipping plane distance
    /// * `zfar` - Far clipping plane distance
    /// * `eye` - Initial camera position
    /// * `at` - The focus point to orbit around
    pub fn new_with_frustum(
        fov: f32,
        aspect: f32,
        znear: f32,
        zfar: f32,
        eye: Vec3,
        at: Vec3,
    ) -> OrbitCamera {
        let mut res = OrbitCamera {
            at: Vec3::ZERO,
            yaw: 0.0,
            pitch: f32::consts::FRAC_PI_2,
            dist: 0.0,
            min_dist: 0.00001,
            max_dist: f32::MAX,
            yaw_step: 0.005,
            pitch_step: 0.005,
            dist_step: 2.0,
            pan_step: 0.005,
            rotate_button: Some(MouseButton::Button1),
            pan_button: Some(MouseButton::Button2),
            fov,
            aspect,
            znear,
            zfar,
            proj: Mat4::IDENTITY,
            view: Mat4::IDENTITY,
            proj_view: Mat4::IDENTITY,
            inverse_proj_view: Mat4::IDENTITY,
            last_cursor_pos: Vec2::ZERO,
            rotate_pressed: false,
            pan_pressed: false,
        };

        res.look_at(eye, at);

        res
    }

    /// Changes the orbit to look at `at` from `eye`.
    ///
    /// A degenerate placement (eye on the focus point) keeps the default
    /// orientation; the distance is still clamped to the configured bounds,
    /// so the eye settles on the nearest allowed orbit.
    pub fn look_at(&mut self, eye: Vec3, at: Vec3) {
        let delta = eye - at;
        let dist = delta.length();

        if dist > 1.0e-6 {
            self.yaw = delta.z.atan2(delta.x);
            self.pitch = (delta.y / dist).acos();
        }

        self.at = at;
        self.dist = dist;
        self.update_restrictions();
        self.update_projviews();
    }

    /// The focus point the camera orbits around.
    pub fn at(&self) -> Vec3 {
        self.at
    }

    /// The current orbit distance.
    pub fn dist(&self) -> f32 {
        self.dist
    }

    /// The distance bounds the orbit is clamped to, as `(min, max)`.
    pub fn dist_bounds(&self) -> (f32, f32) {
        (self.min_dist, self.max_dist)
    }

    /// Clamps the orbit distance to `[min, max]`.
    ///
    /// The current distance is re-clamped immediately.
    pub fn set_dist_bounds(&mut self, min: f32, max: f32) {
        self.min_dist = min;
        self.max_dist = max;
        self.update_restrictions();
        self.update_projviews();
    }

    /// The current yaw angle, in radians.
    pub fn yaw(&self) -> f32 {
        self.yaw
    }

    /// Sets the yaw angle, in radians.
    pub fn set_yaw(&mut self, yaw: f32) {
        self.yaw = yaw;
        self.update_projviews();
    }

    /// The current pitch angle, in radians.
    pub fn pitch(&self) -> f32 {
        self.pitch
    }

    /// The field of view, in radians.
    pub fn fov(&self) -> f32 {
        self.fov
    }

    /// The fixed aspect ratio the projection was built with.
    pub fn aspect(&self) -> f32 {
        self.aspect
    }

    /// The button used to rotate the camera. `None` disables rotation.
    pub fn rotate_button(&self) -> Option<MouseButton> {
        self.rotate_button
    }

    /// Sets the button used to rotate the camera. Use `None` to disable rotation.
    pub fn rebind_rotate_button(&mut self, new_button: Option<MouseButton>) {
        self.rotate_button = new_button;
    }

    /// The button used to pan the focus point. `None` disables panning.
    pub fn pan_button(&self) -> Option<MouseButton> {
        self.pan_button
    }

    /// Sets the button used to pan the focus point. Use `None` to disable panning.
    pub fn rebind_pan_button(&mut self, new_button: Option<MouseButton>) {
        self.pan_button = new_button;
    }

    /// Enables or disables panning.
    ///
    /// Disabling unbinds the pan button; a pan drag then has no effect at all.
    pub fn enable_pan(&mut self, enabled: bool) {
        self.pan_button = if enabled {
            Some(MouseButton::Button2)
        } else {
            None
        };
    }

    /// Sets the zoom increment per scroll offset unit.
    pub fn set_dist_step(&mut self, step: f32) {
        self.dist_step = step;
    }

    #[doc(hidden)]
    pub fn handle_rotate_displacement(&mut self, dpos: Vec2) {
        self.yaw += dpos.x * self.yaw_step;
        self.pitch -= dpos.y * self.pitch_step;

        self.update_restrictions();
        self.update_projviews();
    }

    #[doc(hidden)]
    pub fn handle_pan_displacement(&mut self, dpos: Vec2) {
        let eye_dir = (self.at - self.eye()).normalize();
        let tangent = Vec3::Y.cross(eye_dir).normalize();
        let bitangent = eye_dir.cross(tangent);

        self.at = self.at + tangent * (dpos.x * self.pan_step * self.dist)
            + bitangent * (dpos.y * self.pan_step * self.dist);
        self.update_projviews();
    }

    #[doc(hidden)]
    pub fn handle_scroll(&mut self, yoff: f32) {
        self.dist -= yoff * self.dist_step;
        self.update_restrictions();
        self.update_projviews();
    }

    fn update_restrictions(&mut self) {
        if self.pitch <= 0.01 {
            self.pitch = 0.01
        }

        let _pi: f32 = f32::consts::PI;
        if self.pitch > _pi - 0.01 {
            self.pitch = _pi - 0.01
        }

        self.dist = self.dist.clamp(self.min_dist, self.max_dist);
    }

    fn update_projviews(&mut self) {
        self.view = self.view_transform().to_mat4();
        self.proj = Mat4::perspective_rh_gl(self.fov, self.aspect, self.znear, self.zfar);
        self.proj_view = self.proj * self.view;
        self.inverse_proj_view = self.proj_view.inverse();
    }
}

impl Camera for OrbitCamera {
    fn clip_planes(&self) -> (f32, f32) {
        (self.znear, self.zfar)
    }

    fn view_transform(&self) -> Pose3 {
        Pose3::look_at_rh(self.eye(), self.at, Vec3::Y)
    }

    fn handle_event(&mut self, event: &WindowEvent) {
        match *event {
            WindowEvent::CursorPos(x, y, _) => {
                let curr_pos = Vec2::new(x as f32, y as f32);
                let dpos = curr_pos - self.last_cursor_pos;

                if self.rotate_pressed {
                    self.handle_rotate_displacement(dpos)
                }

                if self.pan_pressed && self.pan_button.is_some() {
                    self.handle_pan_displacement(dpos)
                }

                self.last_cursor_pos = curr_pos;
            }
            WindowEvent::MouseButton(button, action, _) => {
                if Some(button) == self.rotate_button {
                    self.rotate_pressed = action == Action::Press;
                }
                if Some(button) == self.pan_button {
                    self.pan_pressed = action == Action::Press;
                }
            }
            WindowEvent::Scroll(_, off, _) => self.handle_scroll(off as f32),
            // FramebufferSize is intentionally ignored: the projection keeps
            // its setup-time aspect ratio.
            _ => {}
        }
    }

    fn eye(&self) -> Vec3 {
        let dir = Vec3::new(
            self.yaw.cos() * self.pitch.sin(),
            self.pitch.cos(),
            self.yaw.sin() * self.pitch.sin(),
        );
        self.at + dir * self.dist
    }

    fn transformation(&self) -> Mat4 {
        self.proj_view
    }

    fn inverse_transformation(&self) -> Mat4 {
        self.inverse_proj_view
    }

    fn view_proj_pair(&self) -> (Pose3, Mat4) {
        (self.view_transform(), self.proj)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::Modifiers;

    fn camera() -> OrbitCamera {
        let mut camera = OrbitCamera::new_with_frustum(
            40.0f32.to_radians(),
            800.0 / 600.0,
            1.0,
            1000.0,
            Vec3::ZERO,
            Vec3::ZERO,
        );
        camera.set_dist_bounds(75.0, 200.0);
        camera.enable_pan(false);
        camera
    }

    fn press(camera: &mut OrbitCamera, button: MouseButton) {
        camera.handle_event(&WindowEvent::MouseButton(
            button,
            Action::Press,
            Modifiers::empty(),
        ));
    }

    #[test]
    fn test_degenerate_eye_settles_on_min_dist() {
        let camera = camera();
        assert_eq!(camera.dist(), 75.0);
        assert!((camera.eye() - camera.at()).length() > 74.0);
    }

    #[test]
    fn test_scroll_clamps_dist_to_bounds() {
        let mut camera = camera();

        // Zoom far out, then far in; the orbit must stay within bounds the
        // whole time.
        for _ in 0..500 {
            camera.handle_event(&WindowEvent::Scroll(0.0, -10.0, Modifiers::empty()));
            let d = camera.dist();
            assert!((75.0..=200.0).contains(&d), "dist {} out of bounds", d);
        }
        assert_eq!(camera.dist(), 200.0);

        for _ in 0..500 {
            camera.handle_event(&WindowEvent::Scroll(0.0, 10.0, Modifiers::empty()));
            let d = camera.dist();
            assert!((75.0..=200.0).contains(&d), "dist {} out of bounds", d);
        }
        assert_eq!(camera.dist(), 75.0);
    }

    #[test]
    fn test_pan_disabled_has_zero_effect() {
        let mut camera = camera();
        let at_before = camera.at();
        let eye_before = camera.eye();

        press(&mut camera, MouseButton::Button2);
        camera.handle_event(&WindowEvent::CursorPos(40.0, 25.0, Modifiers::empty()));
        camera.handle_event(&WindowEvent::CursorPos(250.0, 180.0, Modifiers::empty()));

        assert_eq!(camera.at(), at_before);
        assert_eq!(camera.eye(), eye_before);
    }

    #[test]
    fn test_pan_enabled_moves_focus() {
        let mut camera = camera();
        camera.enable_pan(true);

        press(&mut camera, MouseButton::Button2);
        camera.handle_event(&WindowEvent::CursorPos(0.0, 0.0, Modifiers::empty()));
        camera.handle_event(&WindowEvent::CursorPos(120.0, 0.0, Modifiers::empty()));

        assert!(camera.at() != Vec3::ZERO);
    }

    #[test]
    fn test_drag_rotates_but_keeps_dist() {
        let mut camera = camera();
        let yaw_before = camera.yaw();

        press(&mut camera, MouseButton::Button1);
        camera.handle_event(&WindowEvent::CursorPos(0.0, 0.0, Modifiers::empty()));
        camera.handle_event(&WindowEvent::CursorPos(200.0, 0.0, Modifiers::empty()));

        assert!(camera.yaw() != yaw_before);
        assert_eq!(camera.dist(), 75.0);
    }

    #[test]
    fn test_framebuffer_size_is_ignored() {
        let mut camera = camera();
        let aspect = camera.aspect();
        let proj_view = camera.transformation();

        camera.handle_event(&WindowEvent::FramebufferSize(1920, 1080));

        assert_eq!(camera.aspect(), aspect);
        assert_eq!(camera.transformation(), proj_view);
    }

    #[test]
    fn test_pitch_stays_off_the_poles() {
        let mut camera = camera();

        press(&mut camera, MouseButton::Button1);
        camera.handle_event(&WindowEvent::CursorPos(0.0, 0.0, Modifiers::empty()));
        // A huge vertical drag would push the pitch past the pole.
        camera.handle_event(&WindowEvent::CursorPos(0.0, 100_000.0, Modifiers::empty()));

        assert!(camera.pitch() >= 0.01);
        assert!(camera.pitch() <= std::f32::consts::PI - 0.01);
    }
}
