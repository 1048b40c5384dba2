/// Application state: everything input handlers mutate and frames read
use tracing::{debug, trace, warn};

use crate::articulation::Articulation;
use crate::camera::{CameraRig, TILT_STEP};
use crate::error::{Error, Result};
use crate::input::{Action, Key, Keymap};
use crate::projectile::{ProjectileSim, StepReport};
use crate::projection::ProjectionMode;
use crate::scene::{compose, Composer, Frame, RenderTarget, SceneKind, WireframeMode};
use crate::transform::TransformStack;

/// The whole session. Frontends own one of these, feed it input events and
/// call [`App::frame`] once per display refresh.
#[derive(Debug, Clone)]
pub struct App {
    pub camera: CameraRig,
    pub pose: Articulation,
    pub sim: ProjectileSim,
    pub wireframe: WireframeMode,
    pub scene: SceneKind,
    keymap: Keymap,
    stack: TransformStack,
    frames: u64,
}

impl App {
    pub fn new(scene: SceneKind, width: u32, height: u32) -> Self {
        Self {
            camera: CameraRig::new(width, height),
            pose: Articulation::default(),
            sim: ProjectileSim::default(),
            wireframe: WireframeMode::default(),
            scene,
            keymap: Keymap::default(),
            stack: TransformStack::new(),
            frames: 0,
        }
    }

    pub fn with_keymap(mut self, keymap: Keymap) -> Self {
        self.keymap = keymap;
        self
    }

    pub fn keymap(&self) -> &Keymap {
        &self.keymap
    }

    pub fn frames(&self) -> u64 {
        self.frames
    }

    /// Translate a key press and apply it; unbound keys are ignored
    pub fn key_down(&mut self, key: Key) -> Option<Action> {
        let action = self.keymap.lookup(key)?;
        self.apply(action);
        Some(action)
    }

    pub fn apply(&mut self, action: Action) {
        debug!(action = action.name(), "input");
        match action {
            Action::Camera(preset) => self.camera.select(preset),
            Action::ToggleSplit => self.camera.toggle_split(),
            Action::ToggleOblique => self.camera.toggle_mode(ProjectionMode::Oblique),
            Action::TogglePerspective => self.camera.toggle_mode(ProjectionMode::Perspective),
            Action::TiltUp => self.camera.adjust_tilt(0.0, TILT_STEP),
            Action::TiltDown => self.camera.adjust_tilt(0.0, -TILT_STEP),
            Action::TiltLeft => self.camera.adjust_tilt(-TILT_STEP, 0.0),
            Action::TiltRight => self.camera.adjust_tilt(TILT_STEP, 0.0),
            Action::DriveBack => self.pose.drive(-1.0),
            Action::DriveForward => self.pose.drive(1.0),
            Action::BarrelUp => self.pose.adjust_barrel(-1.0),
            Action::BarrelDown => self.pose.adjust_barrel(1.0),
            Action::TurretLeft => self.pose.adjust_turret(1.0),
            Action::TurretRight => self.pose.adjust_turret(-1.0),
            Action::ClawOpen => self.pose.adjust_claw(1.0),
            Action::ClawClose => self.pose.adjust_claw(-1.0),
            Action::CycleWireframe => self.wireframe = self.wireframe.next(),
            Action::ZoomIn => self.camera.wheel(-1.0),
            Action::ZoomOut => self.camera.wheel(1.0),
            Action::Reset => self.reset(),
            Action::Fire => self.fire(),
        }
    }

    /// Mouse wheel; the sign of `delta_y` picks the zoom direction
    pub fn wheel(&mut self, delta_y: f32) {
        self.camera.wheel(delta_y);
    }

    pub fn resize(&mut self, width: u32, height: u32) -> Result<()> {
        if width == 0 || height == 0 {
            warn!(width, height, "ignoring degenerate resize");
            return Err(Error::EmptyCanvas { width, height });
        }
        self.camera.resize(width, height);
        Ok(())
    }

    /// Zoom, tilt and target hits back to their initial values.
    /// Projectiles in flight and the model pose are left alone.
    pub fn reset(&mut self) {
        self.camera.reset();
        self.sim.clear_hits();
    }

    fn fire(&mut self) {
        match self.scene.muzzle(&self.pose) {
            Some(muzzle) => {
                self.sim.fire(&muzzle);
            }
            None => debug!(scene = ?self.scene, "scene has no muzzle"),
        }
    }

    /// Advance the simulation one step and draw every active viewport
    pub fn frame<T: RenderTarget + ?Sized>(&mut self, target: &mut T) -> StepReport {
        let report = self.sim.step();
        self.frames += 1;

        let frame = Frame {
            kind: self.scene,
            pose: &self.pose,
            targets: self.sim.targets(),
            projectiles: self.sim.projectiles(),
        };

        for pass in self.camera.passes() {
            target.begin_viewport(&pass.rect, &pass.projection);
            self.stack.load(pass.view);
            let mut composer = Composer::new(&mut *target, self.wireframe);
            compose(&mut composer, &mut self.stack, &frame);
            assert_eq!(self.stack.depth(), 1, "unbalanced transform stack after a viewport");
        }

        trace!(frame = self.frames, live = self.sim.projectiles().len(), "frame");
        report
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::articulation::BARREL_PITCH_RANGE;
    use crate::geometry::Shape;
    use crate::scene::{DrawLog, DrawPass};
    use nalgebra::{Matrix4, Vector3};

    #[test]
    fn test_frame_draws_each_viewport() {
        let mut app = App::new(SceneKind::Tank, 800, 600);
        let mut log = DrawLog::new();
        app.frame(&mut log);
        assert_eq!(log.viewports.len(), 1);
        let single = log.calls.len();

        log.clear();
        app.key_down(Key::Char('0'));
        app.frame(&mut log);
        assert_eq!(log.viewports.len(), 4);
        assert_eq!(log.calls.len(), 4 * single);
        assert_eq!(app.frames(), 2);
    }

    #[test]
    fn test_repeated_barrel_keys_stay_in_range() {
        let mut app = App::new(SceneKind::Tank, 100, 100);
        for _ in 0..200 {
            app.key_down(Key::Char('s'));
        }
        assert_eq!(app.pose.barrel_pitch(), *BARREL_PITCH_RANGE.end());
        for _ in 0..200 {
            app.key_down(Key::Char('w'));
        }
        assert_eq!(app.pose.barrel_pitch(), *BARREL_PITCH_RANGE.start());
    }

    #[test]
    fn test_space_cycles_wireframe() {
        let mut app = App::new(SceneKind::Tank, 100, 100);
        app.key_down(Key::Space);
        let mut log = DrawLog::new();
        app.frame(&mut log);
        assert!(log.calls.iter().all(|c| c.pass == DrawPass::Solid));

        app.key_down(Key::Space);
        app.key_down(Key::Space);
        assert_eq!(app.wireframe, WireframeMode::Both);
    }

    #[test]
    fn test_fire_spawns_shell_that_is_drawn() {
        let mut app = App::new(SceneKind::Tank, 100, 100);
        app.key_down(Key::Space);
        let mut log = DrawLog::new();
        app.frame(&mut log);
        let spheres = log.count(Shape::Sphere, DrawPass::Solid);

        assert_eq!(app.key_down(Key::Char('z')), Some(Action::Fire));
        assert_eq!(app.sim.projectiles().len(), 1);
        log.clear();
        app.frame(&mut log);
        assert_eq!(log.count(Shape::Sphere, DrawPass::Solid), spheres + 1);
    }

    #[test]
    fn test_arm_scene_cannot_fire() {
        let mut app = App::new(SceneKind::Arm, 100, 100);
        app.apply(Action::Fire);
        assert!(app.sim.projectiles().is_empty());
    }

    #[test]
    fn test_shell_eventually_lands() {
        let mut app = App::new(SceneKind::Tank, 100, 100);
        app.apply(Action::Fire);
        let mut log = DrawLog::new();
        let mut frames = 0;
        while !app.sim.projectiles().is_empty() {
            app.frame(&mut log);
            log.clear();
            frames += 1;
            assert!(frames < 500);
        }
    }

    #[test]
    fn test_reset_scenario() {
        let mut app = App::new(SceneKind::Tank, 100, 100);
        app.wheel(1.0);
        app.wheel(1.0);
        for _ in 0..3 {
            app.apply(Action::Fire);
        }
        let mut log = DrawLog::new();
        while !app.sim.projectiles().is_empty() {
            app.frame(&mut log);
        }
        // One shell per target, fired straight up from just below it
        let below: Vec<_> = app
            .sim
            .targets()
            .iter()
            .map(|t| t.position.coords - Vector3::y() * app.sim.config().launch_speed)
            .collect();
        for offset in below {
            app.sim.fire(&Matrix4::new_translation(&offset));
        }
        app.frame(&mut log);
        assert_eq!(app.sim.hit_count(), app.sim.targets().len());
        let pose = app.pose;

        app.key_down(Key::Char('r'));
        assert_eq!(app.camera.zoom(), 1.0);
        assert_eq!(app.sim.hit_count(), 0);
        assert!(app.sim.projectiles().is_empty());
        assert_eq!(app.pose, pose);
    }

    #[test]
    fn test_resize_rejects_empty_canvas() {
        let mut app = App::new(SceneKind::Tank, 100, 100);
        assert_eq!(
            app.resize(0, 10),
            Err(Error::EmptyCanvas {
                width: 0,
                height: 10
            })
        );
        assert_eq!(app.camera.canvas(), (100, 100));
        assert!(app.resize(300, 200).is_ok());
        assert_eq!(app.camera.canvas(), (300, 200));
    }

    #[test]
    fn test_custom_keymap() {
        let mut keymap = Keymap::empty();
        keymap.overlay("f = fire").unwrap();
        let mut app = App::new(SceneKind::Tank, 100, 100).with_keymap(keymap);
        assert_eq!(app.key_down(Key::Char('z')), None);
        assert_eq!(app.key_down(Key::Char('f')), Some(Action::Fire));
    }
}
