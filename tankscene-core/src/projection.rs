/// Projection policies and viewport pixel math
use nalgebra::{Matrix4, Point3};

/// Near/far planes of the orthographic and oblique volumes
pub const ORTHO_NEAR: f32 = -20.0;
pub const ORTHO_FAR: f32 = 20.0;

/// Shear length and angle of the cabinet-style oblique projection
pub const OBLIQUE_LENGTH: f32 = 0.5;
pub const OBLIQUE_ANGLE_DEG: f32 = 45.0;

const PERSPECTIVE_FOV_DEG: f32 = 45.0;
const PERSPECTIVE_NEAR: f32 = 0.1;
const PERSPECTIVE_FAR: f32 = 50.0;

/// Projection policy of a single viewport
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProjectionMode {
    Orthographic,
    /// Orthographic followed by a fixed oblique shear
    Oblique,
    Perspective,
}

/// Pixel rectangle with a bottom-left origin, as handed to `glViewport`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PixelRect {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

impl PixelRect {
    pub fn new(x: u32, y: u32, width: u32, height: u32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn full(width: u32, height: u32) -> Self {
        Self::new(0, 0, width, height)
    }

    pub fn aspect(&self) -> f32 {
        if self.height == 0 {
            return 1.0;
        }
        self.width as f32 / self.height as f32
    }

    pub fn area(&self) -> u64 {
        self.width as u64 * self.height as u64
    }

    pub fn contains(&self, px: u32, py: u32) -> bool {
        px >= self.x && px < self.x + self.width && py >= self.y && py < self.y + self.height
    }
}

/// Partition a canvas into four quadrants.
///
/// Odd sizes give the extra column/row to the right/top quadrants so the
/// rectangles always tile the canvas exactly.
pub fn split_rects(width: u32, height: u32) -> [PixelRect; 4] {
    let w2 = width / 2;
    let h2 = height / 2;
    [
        PixelRect::new(0, 0, w2, h2),
        PixelRect::new(w2, 0, width - w2, h2),
        PixelRect::new(0, h2, w2, height - h2),
        PixelRect::new(w2, h2, width - w2, height - h2),
    ]
}

/// Half extents `(x, y)` of the orthographic volume.
///
/// Landscape viewports widen with the aspect ratio, portrait ones grow taller,
/// so `view_size` is always the half-extent of the shorter side.
pub fn ortho_half_extents(view_size: f32, aspect: f32, zoom: f32) -> (f32, f32) {
    if aspect > 1.0 {
        (view_size * aspect * zoom, view_size * zoom)
    } else {
        (view_size * zoom, view_size / aspect * zoom)
    }
}

/// Cabinet shear: depth displaces x and y along a 45 degree receding axis
pub fn oblique_shear() -> Matrix4<f32> {
    let alpha = OBLIQUE_ANGLE_DEG.to_radians();
    let (sx, sy) = (-OBLIQUE_LENGTH * alpha.cos(), -OBLIQUE_LENGTH * alpha.sin());
    #[rustfmt::skip]
    let shear = Matrix4::new(
        1.0, 0.0, sx,  0.0,
        0.0, 1.0, sy,  0.0,
        0.0, 0.0, 1.0, 0.0,
        0.0, 0.0, 0.0, 1.0,
    );
    shear
}

/// Build the projection matrix for a viewport of the given aspect ratio
pub fn projection_matrix(mode: ProjectionMode, view_size: f32, aspect: f32, zoom: f32) -> Matrix4<f32> {
    match mode {
        ProjectionMode::Orthographic | ProjectionMode::Oblique => {
            let (hx, hy) = ortho_half_extents(view_size, aspect, zoom);
            let ortho = Matrix4::new_orthographic(-hx, hx, -hy, hy, ORTHO_NEAR, ORTHO_FAR);
            if mode == ProjectionMode::Oblique {
                ortho * oblique_shear()
            } else {
                ortho
            }
        }
        ProjectionMode::Perspective => {
            // Zoom widens the field of view the same way it widens the ortho volume.
            let fov = (PERSPECTIVE_FOV_DEG * zoom).clamp(1.0, 170.0).to_radians();
            Matrix4::new_perspective(aspect, fov, PERSPECTIVE_NEAR, PERSPECTIVE_FAR)
        }
    }
}

/// Project a model-space point into a viewport.
///
/// Returns `(column, row, depth)` in pixels with a top-left origin on a canvas
/// `canvas_height` pixels tall, and NDC depth in [-1, 1]. Points behind a
/// perspective camera or outside the clip volume yield `None`.
pub fn project_to_screen(
    clip_from_model: &Matrix4<f32>,
    point: &Point3<f32>,
    rect: &PixelRect,
    canvas_height: u32,
) -> Option<(f32, f32, f32)> {
    let clip = clip_from_model * point.to_homogeneous();

    // Prevent division by near-zero w
    if clip.w <= 1e-6 {
        return None;
    }

    let ndc_x = clip.x / clip.w;
    let ndc_y = clip.y / clip.w;
    let depth = clip.z / clip.w;

    if !(-1.0..=1.0).contains(&depth) {
        return None;
    }

    let screen_x = rect.x as f32 + (ndc_x + 1.0) * 0.5 * rect.width as f32;
    let from_bottom = rect.y as f32 + (ndc_y + 1.0) * 0.5 * rect.height as f32;
    let screen_y = canvas_height as f32 - from_bottom;

    Some((screen_x, screen_y, depth))
}
