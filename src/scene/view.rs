use glam::{Mat4, Vec2, Vec3};

/// Camera and map state for one frame, supplied by the host.
#[derive(Debug, Clone, PartialEq)]
pub struct ViewState {
    pub zoom: f32,
    pub view_matrix: Mat4,
    pub proj_matrix: Mat4,
    /// Drawable size of the screen in pixels.
    pub viewport: (i32, i32),
    /// Distance from the lower screen edge where fog starts.
    pub fog_distance: f32,
    /// Distance over which fog goes from clear to opaque.
    pub fog_blur_distance: f32,
    /// Direction the camera looks in, projected onto the map plane.
    pub view_dir_on_map: Vec2,
    /// Where the lower left screen corner hits the map plane.
    pub lower_left_on_map: Vec2,
    /// Map position under the screen center.
    pub map_center: Vec2,
    pub highlight_color: Vec3,
    /// Animation clock for the per-vertex filter windows, in seconds.
    pub time: f32,
}

impl ViewState {
    pub fn view_proj(&self) -> Mat4 {
        self.proj_matrix * self.view_matrix
    }
}

impl Default for ViewState {
    fn default() -> Self {
        ViewState {
            zoom: 16.0,
            view_matrix: Mat4::IDENTITY,
            proj_matrix: Mat4::IDENTITY,
            viewport: (1, 1),
            fog_distance: 1000.0,
            fog_blur_distance: 300.0,
            view_dir_on_map: Vec2::Y,
            lower_left_on_map: Vec2::ZERO,
            map_center: Vec2::ZERO,
            highlight_color: Vec3::new(1.0, 0.9, 0.4),
            time: 0.0,
        }
    }
}

/// The light casting shadows, with the camera used to render its depth map.
#[derive(Debug, Clone, PartialEq)]
pub struct Sun {
    /// Unit vector pointing towards the sun.
    pub direction: Vec3,
    pub view_matrix: Mat4,
    pub proj_matrix: Mat4,
}

impl Sun {
    pub fn view_proj(&self) -> Mat4 {
        self.proj_matrix * self.view_matrix
    }
}

impl Default for Sun {
    fn default() -> Self {
        Sun {
            direction: Vec3::new(0.3, -0.4, 0.87).normalize(),
            view_matrix: Mat4::IDENTITY,
            proj_matrix: Mat4::IDENTITY,
        }
    }
}
