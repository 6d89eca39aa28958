use glam::{Mat4, Vec3};

const FIELD_OF_VIEW_DEGREES: f32 = 90.0;
const NEAR_PLANE: f32 = 0.1;
const FAR_PLANE: f32 = 10000.0;

const INITIAL_DISTANCE: f32 = 45.0;
const MIN_DISTANCE: f32 = 2.0;
const MAX_DISTANCE: f32 = 2000.0;
const PITCH_LIMIT: f32 = 1.5;

// Radians per dragged pixel
const ORBIT_SPEED: f32 = 0.005;

// View and projection as uploaded to the particle shader
#[repr(C)]
#[derive(Debug, Copy, Clone, bytemuck::Pod, bytemuck::Zeroable)]
pub struct CameraUniform {
    pub view_matrix: [f32; 16],
    pub projection_matrix: [f32; 16],
}

// Orbit camera around the simulation origin
pub struct Camera {
    yaw: f32,
    pitch: f32,
    distance: f32,
    target_distance: f32,

    // Mouse interaction state for camera control
    mouse_pressed: bool,
    last_mouse_position: [f32; 2],
}

impl Camera {
    pub fn new() -> Self {
        Self {
            // Start on the -z axis looking at the origin
            yaw: std::f32::consts::PI,
            pitch: 0.0,
            distance: INITIAL_DISTANCE,
            target_distance: INITIAL_DISTANCE,
            mouse_pressed: false,
            last_mouse_position: [0.0, 0.0],
        }
    }

    pub fn eye(&self) -> Vec3 {
        let (sin_yaw, cos_yaw) = self.yaw.sin_cos();
        let (sin_pitch, cos_pitch) = self.pitch.sin_cos();
        Vec3::new(cos_pitch * sin_yaw, sin_pitch, cos_pitch * cos_yaw) * self.distance
    }

    pub fn view_matrix(&self) -> Mat4 {
        Mat4::look_at_rh(self.eye(), Vec3::ZERO, Vec3::Y)
    }

    pub fn projection_matrix(aspect: f32) -> Mat4 {
        Mat4::perspective_rh(
            FIELD_OF_VIEW_DEGREES.to_radians(),
            aspect,
            NEAR_PLANE,
            FAR_PLANE,
        )
    }

    pub fn uniform(&self, aspect: f32) -> CameraUniform {
        CameraUniform {
            view_matrix: self.view_matrix().to_cols_array(),
            projection_matrix: Self::projection_matrix(aspect).to_cols_array(),
        }
    }

    /// Eases the distance toward the zoom target.
    pub fn update(&mut self, delta_time: f32) {
        let blend = (delta_time * 8.0).clamp(0.0, 1.0);
        self.distance += (self.target_distance - self.distance) * blend;
    }

    pub fn orbit(&mut self, delta_x: f32, delta_y: f32) {
        self.yaw -= delta_x * ORBIT_SPEED;
        self.pitch = (self.pitch + delta_y * ORBIT_SPEED).clamp(-PITCH_LIMIT, PITCH_LIMIT);

        // Keep yaw in 0-2π range
        self.yaw = self.yaw.rem_euclid(std::f32::consts::TAU);
    }

    pub fn zoom(&mut self, delta: f32) {
        // Positive delta zooms in
        let factor = 1.0 - delta * 0.1;
        self.target_distance = (self.target_distance * factor).clamp(MIN_DISTANCE, MAX_DISTANCE);
    }

    // Input handling methods
    pub fn handle_mouse_press(&mut self, position: [f32; 2]) {
        self.mouse_pressed = true;
        self.last_mouse_position = position;
    }

    pub fn handle_mouse_release(&mut self) {
        self.mouse_pressed = false;
    }

    pub fn handle_mouse_move(&mut self, position: [f32; 2]) {
        if self.mouse_pressed {
            let delta_x = position[0] - self.last_mouse_position[0];
            let delta_y = position[1] - self.last_mouse_position[1];
            self.orbit(delta_x, delta_y);
        }
        self.last_mouse_position = position;
    }

    pub fn handle_mouse_wheel(&mut self, delta: f32) {
        self.zoom(delta);
    }
}

impl Default for Camera {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: Vec3, b: Vec3) -> bool {
        (a - b).length() < 1e-3
    }

    #[test]
    fn starts_behind_origin() {
        let camera = Camera::new();
        assert!(close(camera.eye(), Vec3::new(0.0, 0.0, -45.0)));
        let origin_in_view = camera.view_matrix().transform_point3(Vec3::ZERO);
        assert!(close(origin_in_view, Vec3::new(0.0, 0.0, -45.0)));
    }

    #[test]
    fn drag_without_press_does_nothing() {
        let mut camera = Camera::new();
        let eye = camera.eye();
        camera.handle_mouse_move([100.0, 40.0]);
        assert!(close(camera.eye(), eye));
    }

    #[test]
    fn drag_orbits_at_constant_distance() {
        let mut camera = Camera::new();
        camera.handle_mouse_press([0.0, 0.0]);
        camera.handle_mouse_move([120.0, 60.0]);
        camera.handle_mouse_release();
        assert!((camera.eye().length() - 45.0).abs() < 1e-3);
        assert!(!close(camera.eye(), Vec3::new(0.0, 0.0, -45.0)));
    }

    #[test]
    fn pitch_is_limited() {
        let mut camera = Camera::new();
        camera.orbit(0.0, 1.0e6);
        assert!(camera.eye().y < 45.0);
        assert!(camera.eye().y > 0.0);
    }

    #[test]
    fn zoom_eases_in_and_clamps() {
        let mut camera = Camera::new();
        camera.zoom(5.0);
        camera.update(0.05);
        assert!(camera.eye().length() < 45.0);

        for _ in 0..100 {
            camera.zoom(-50.0);
            camera.update(1.0);
        }
        assert!(camera.eye().length() <= MAX_DISTANCE + 1e-3);
    }
}
