/// Camera presets, split view and the free axonometric camera
use nalgebra::{Matrix4, Point3, Vector3};
use tracing::debug;

use crate::projection::{projection_matrix, split_rects, PixelRect, ProjectionMode};
use crate::transform::Transform;

/// Zoom multiplier applied per wheel notch
pub const ZOOM_STEP: f32 = 1.1;
/// Arrow-key increment of the free camera tilt
pub const TILT_STEP: f32 = 0.01;
/// Zoom is kept inside this range so the projection stays finite
pub const ZOOM_RANGE: std::ops::RangeInclusive<f32> = 1e-3..=1e3;

/// Axonometric base rotation of the free camera, in degrees
const AXONOMETRIC_YAW: f32 = 45.0;
const AXONOMETRIC_PITCH: f32 = 35.264;

/// Fixed camera placements selectable from the keyboard
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Preset {
    Left,
    Front,
    Top,
    /// Axonometric camera that also honours tilt and the oblique/perspective toggles
    Free,
}

impl Preset {
    /// Quadrant order used by split view
    pub const SPLIT_ORDER: [Preset; 4] = [Preset::Left, Preset::Top, Preset::Front, Preset::Free];

    pub fn view_matrix(self) -> Matrix4<f32> {
        let target = Point3::new(0.0, 0.3, 0.0);
        let (eye, up) = match self {
            Preset::Left => (Point3::new(-5.0, 0.3, 0.0), Vector3::y()),
            Preset::Front => (Point3::new(0.0, 0.3, 5.0), Vector3::y()),
            Preset::Top => (Point3::new(0.0, 5.0, 0.0), -Vector3::z()),
            Preset::Free => (Point3::new(2.0, 1.2, 5.0), Vector3::y()),
        };
        Matrix4::look_at_rh(&eye, &target, &up)
    }

    pub fn view_size(self) -> f32 {
        match self {
            Preset::Left | Preset::Top => 0.8,
            Preset::Front => 1.0,
            Preset::Free => 1.5,
        }
    }
}

/// User tilt of the free camera, both components in [-1, 1]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Tilt {
    pub gamma: f32,
    pub theta: f32,
}

impl Tilt {
    pub fn adjust(&mut self, d_gamma: f32, d_theta: f32) {
        self.gamma = (self.gamma + d_gamma).clamp(-1.0, 1.0);
        self.theta = (self.theta + d_theta).clamp(-1.0, 1.0);
    }

    /// `Y(gamma * 180) * X(theta * 90)`
    pub fn matrix(&self) -> Matrix4<f32> {
        Transform::rotation_y(self.gamma * 180.0) * Transform::rotation_x(self.theta * 90.0)
    }
}

impl Default for Tilt {
    fn default() -> Self {
        Self {
            gamma: 0.2,
            theta: 0.1,
        }
    }
}

/// One viewport's camera configuration
#[derive(Debug, Clone, PartialEq)]
pub struct ViewConfig {
    pub preset: Preset,
    pub zoom: f32,
    pub rect: PixelRect,
}

impl ViewConfig {
    pub fn new(preset: Preset) -> Self {
        Self {
            preset,
            zoom: 1.0,
            rect: PixelRect::default(),
        }
    }
}

/// Everything a frame needs to render one viewport
#[derive(Debug, Clone, PartialEq)]
pub struct ViewPass {
    pub rect: PixelRect,
    pub projection: Matrix4<f32>,
    /// Root of the transform stack for this viewport
    pub view: Matrix4<f32>,
}

/// Camera state for single and split view.
///
/// The oblique/perspective toggles and the tilt only apply to the free camera.
#[derive(Debug, Clone)]
pub struct CameraRig {
    single: ViewConfig,
    quadrants: [ViewConfig; 4],
    split: bool,
    free_mode: ProjectionMode,
    tilt: Tilt,
    canvas: (u32, u32),
}

impl CameraRig {
    pub fn new(width: u32, height: u32) -> Self {
        let mut rig = Self {
            single: ViewConfig::new(Preset::Left),
            quadrants: Preset::SPLIT_ORDER.map(ViewConfig::new),
            split: false,
            free_mode: ProjectionMode::Orthographic,
            tilt: Tilt::default(),
            canvas: (width, height),
        };
        rig.layout();
        rig
    }

    pub fn is_split(&self) -> bool {
        self.split
    }

    pub fn canvas(&self) -> (u32, u32) {
        self.canvas
    }

    pub fn current(&self) -> Preset {
        self.single.preset
    }

    /// Zoom of the single-view camera
    pub fn zoom(&self) -> f32 {
        self.single.zoom
    }

    pub fn quadrants(&self) -> &[ViewConfig; 4] {
        &self.quadrants
    }

    pub fn tilt(&self) -> Tilt {
        self.tilt
    }

    pub fn free_mode(&self) -> ProjectionMode {
        self.free_mode
    }

    /// Switch to a preset in single view
    pub fn select(&mut self, preset: Preset) {
        self.single.preset = preset;
        self.free_mode = if preset == Preset::Free {
            ProjectionMode::Oblique
        } else {
            ProjectionMode::Orthographic
        };
        self.split = false;
        self.layout();
        debug!(?preset, "camera preset selected");
    }

    pub fn toggle_split(&mut self) {
        self.split = !self.split;
        if self.split {
            self.free_mode = ProjectionMode::Oblique;
        }
        self.layout();
        debug!(split = self.split, "split view toggled");
    }

    /// Flip between `mode` and orthographic; no-op unless the free camera is visible
    pub fn toggle_mode(&mut self, mode: ProjectionMode) {
        if !self.split && self.single.preset != Preset::Free {
            return;
        }
        self.free_mode = if self.free_mode == mode {
            ProjectionMode::Orthographic
        } else {
            mode
        };
        debug!(mode = ?self.free_mode, "free camera projection");
    }

    pub fn adjust_tilt(&mut self, d_gamma: f32, d_theta: f32) {
        self.tilt.adjust(d_gamma, d_theta);
    }

    /// Apply one wheel notch; negative deltas zoom in
    pub fn wheel(&mut self, delta_y: f32) {
        let factor = if delta_y < 0.0 { 1.0 / ZOOM_STEP } else { ZOOM_STEP };
        let scaled = |zoom: f32| (zoom * factor).clamp(*ZOOM_RANGE.start(), *ZOOM_RANGE.end());
        self.single.zoom = scaled(self.single.zoom);
        if self.split {
            for quadrant in &mut self.quadrants {
                quadrant.zoom = scaled(quadrant.zoom);
            }
        }
    }

    /// Restore zoom and tilt; the selected preset and split state are kept
    pub fn reset(&mut self) {
        self.single.zoom = 1.0;
        for quadrant in &mut self.quadrants {
            quadrant.zoom = 1.0;
        }
        self.tilt = Tilt::default();
    }

    pub fn resize(&mut self, width: u32, height: u32) {
        self.canvas = (width, height);
        self.layout();
    }

    fn layout(&mut self) {
        let (w, h) = self.canvas;
        self.single.rect = PixelRect::full(w, h);
        for (quadrant, rect) in self.quadrants.iter_mut().zip(split_rects(w, h)) {
            quadrant.rect = rect;
        }
    }

    /// The viewports to render this frame, in draw order
    pub fn passes(&self) -> Vec<ViewPass> {
        if self.split {
            self.quadrants.iter().map(|q| self.pass(q)).collect()
        } else {
            vec![self.pass(&self.single)]
        }
    }

    fn pass(&self, config: &ViewConfig) -> ViewPass {
        let preset = config.preset;
        let mode = if preset == Preset::Free {
            self.free_mode
        } else {
            ProjectionMode::Orthographic
        };
        let projection = projection_matrix(mode, preset.view_size(), config.rect.aspect(), config.zoom);

        let mut view = preset.view_matrix();
        if preset == Preset::Free {
            if mode != ProjectionMode::Oblique {
                view *= Transform::rotation_y(AXONOMETRIC_YAW) * Transform::rotation_x(AXONOMETRIC_PITCH);
            }
            view *= self.tilt.matrix();
        }

        ViewPass {
            rect: config.rect,
            projection,
            view,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_single_view_covers_canvas() {
        let rig = CameraRig::new(640, 480);
        let passes = rig.passes();
        assert_eq!(passes.len(), 1);
        assert_eq!(passes[0].rect, PixelRect::full(640, 480));
    }

    #[test]
    fn test_split_view_yields_four_quadrants() {
        let mut rig = CameraRig::new(641, 479);
        rig.toggle_split();
        let passes = rig.passes();
        assert_eq!(passes.len(), 4);
        let area: u64 = passes.iter().map(|p| p.rect.area()).sum();
        assert_eq!(area, 641 * 479);

        rig.resize(100, 50);
        let rects: Vec<_> = rig.passes().iter().map(|p| p.rect).collect();
        assert_eq!(rects, split_rects(100, 50).to_vec());
    }

    #[test]
    fn test_select_leaves_split_view() {
        let mut rig = CameraRig::new(100, 100);
        rig.toggle_split();
        rig.select(Preset::Top);
        assert!(!rig.is_split());
        assert_eq!(rig.current(), Preset::Top);
        assert_eq!(rig.free_mode(), ProjectionMode::Orthographic);
    }

    #[test]
    fn test_mode_toggles_only_affect_free_camera() {
        let mut rig = CameraRig::new(100, 100);
        rig.select(Preset::Front);
        rig.toggle_mode(ProjectionMode::Perspective);
        assert_eq!(rig.free_mode(), ProjectionMode::Orthographic);

        rig.select(Preset::Free);
        assert_eq!(rig.free_mode(), ProjectionMode::Oblique);
        rig.toggle_mode(ProjectionMode::Oblique);
        assert_eq!(rig.free_mode(), ProjectionMode::Orthographic);
        rig.toggle_mode(ProjectionMode::Perspective);
        assert_eq!(rig.free_mode(), ProjectionMode::Perspective);
        // Switching straight to oblique replaces perspective
        rig.toggle_mode(ProjectionMode::Oblique);
        assert_eq!(rig.free_mode(), ProjectionMode::Oblique);
    }

    #[test]
    fn test_wheel_zooms_all_quadrants_in_split_view() {
        let mut rig = CameraRig::new(100, 100);
        rig.toggle_split();
        rig.wheel(1.0);
        rig.wheel(1.0);
        for q in rig.quadrants() {
            assert!((q.zoom - ZOOM_STEP * ZOOM_STEP).abs() < 1e-5);
        }
        rig.wheel(-1.0);
        assert!((rig.zoom() - ZOOM_STEP).abs() < 1e-5);
    }

    #[test]
    fn test_zoom_is_bounded() {
        let mut rig = CameraRig::new(100, 100);
        rig.toggle_split();
        for _ in 0..2000 {
            rig.wheel(-1.0);
        }
        assert_eq!(rig.zoom(), *ZOOM_RANGE.start());
        for pass in rig.passes() {
            assert!(pass.projection.iter().all(|v| v.is_finite()));
        }

        for _ in 0..4000 {
            rig.wheel(1.0);
        }
        assert_eq!(rig.zoom(), *ZOOM_RANGE.end());
        assert!(rig.quadrants().iter().all(|q| q.zoom == *ZOOM_RANGE.end()));
    }

    #[test]
    fn test_presets_are_hashable() {
        let presets: HashSet<Preset> = Preset::SPLIT_ORDER.into_iter().collect();
        assert_eq!(presets.len(), 4);
        assert!(presets.contains(&Preset::Free));
    }

    #[test]
    fn test_tilt_stays_clamped() {
        let mut rig = CameraRig::new(100, 100);
        for _ in 0..500 {
            rig.adjust_tilt(TILT_STEP, -TILT_STEP);
        }
        assert_eq!(rig.tilt().gamma, 1.0);
        assert_eq!(rig.tilt().theta, -1.0);
    }

    #[test]
    fn test_reset_restores_zoom_and_tilt() {
        let mut rig = CameraRig::new(100, 100);
        rig.toggle_split();
        rig.wheel(1.0);
        rig.adjust_tilt(0.3, 0.3);
        rig.reset();
        assert_eq!(rig.zoom(), 1.0);
        assert!(rig.quadrants().iter().all(|q| q.zoom == 1.0));
        assert_eq!(rig.tilt(), Tilt::default());
        assert!(rig.is_split());
    }

    #[test]
    fn test_free_view_includes_tilt() {
        let mut rig = CameraRig::new(100, 100);
        rig.select(Preset::Free);
        let before = rig.passes()[0].view;
        rig.adjust_tilt(0.5, 0.0);
        let after = rig.passes()[0].view;
        assert!((before - after).norm() > 1e-3);
    }
}
