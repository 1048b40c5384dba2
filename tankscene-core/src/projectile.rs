/// Ballistic projectiles and static targets
use nalgebra::{Matrix4, Point3, Vector3};
use tracing::{info, trace};

/// Tunables of the projectile simulation, in world units per frame
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SimConfig {
    /// Subtracted from the vertical velocity once per frame
    pub gravity: f32,
    pub launch_speed: f32,
    /// Hit distance as a multiple of the target's scale
    pub hit_radius_factor: f32,
    /// Projectiles below this height are removed
    pub ground_level: f32,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            gravity: 0.002,
            launch_speed: 0.04,
            hit_radius_factor: 0.75,
            ground_level: 0.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Projectile {
    pub position: Point3<f32>,
    pub velocity: Vector3<f32>,
}

impl Projectile {
    /// Advance one frame. Velocity is applied undivided by frame time, so
    /// trajectories depend on the frame rate.
    fn integrate(&mut self, gravity: f32) {
        self.position += self.velocity;
        self.velocity.y -= gravity;
    }
}

/// Spherical target; once hit it stays hit until an explicit reset
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Target {
    pub position: Point3<f32>,
    pub scale: f32,
    pub hit: bool,
}

impl Target {
    pub fn new(position: Point3<f32>, scale: f32) -> Self {
        Self {
            position,
            scale,
            hit: false,
        }
    }
}

/// Targets laid out downrange of the tank cannon
pub fn default_targets() -> Vec<Target> {
    vec![
        Target::new(Point3::new(-2.2, 0.25, 0.0), 0.3),
        Target::new(Point3::new(-2.6, 0.25, 1.1), 0.3),
        Target::new(Point3::new(-2.6, 0.25, -1.1), 0.3),
    ]
}

/// What happened during one simulation step
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StepReport {
    /// Indices of targets that became hit this step
    pub newly_hit: Vec<usize>,
    /// Projectiles removed on a target hit
    pub absorbed: usize,
    /// Projectiles removed below the ground plane
    pub landed: usize,
}

/// Live projectiles plus the target set
#[derive(Debug, Clone)]
pub struct ProjectileSim {
    config: SimConfig,
    projectiles: Vec<Projectile>,
    targets: Vec<Target>,
}

impl ProjectileSim {
    pub fn new(config: SimConfig, targets: Vec<Target>) -> Self {
        Self {
            config,
            projectiles: Vec::new(),
            targets,
        }
    }

    pub fn config(&self) -> &SimConfig {
        &self.config
    }

    pub fn projectiles(&self) -> &[Projectile] {
        &self.projectiles
    }

    pub fn targets(&self) -> &[Target] {
        &self.targets
    }

    /// Launch from a muzzle frame whose origin is the barrel tip and whose
    /// local +Y axis points down the barrel.
    pub fn fire(&mut self, muzzle: &Matrix4<f32>) -> &Projectile {
        let position = muzzle.transform_point(&Point3::origin());
        let direction = muzzle
            .transform_vector(&Vector3::y())
            .try_normalize(1e-9)
            .unwrap_or_else(Vector3::y);
        let velocity = direction * self.config.launch_speed;

        info!(
            x = position.x,
            y = position.y,
            z = position.z,
            live = self.projectiles.len() + 1,
            "projectile fired"
        );
        self.projectiles.push(Projectile { position, velocity });
        &self.projectiles[self.projectiles.len() - 1]
    }

    /// One frame: integrate, mark hit targets, then drop projectiles that hit
    /// something or fell below the ground.
    pub fn step(&mut self) -> StepReport {
        let mut report = StepReport::default();
        let gravity = self.config.gravity;
        let factor = self.config.hit_radius_factor;
        let ground = self.config.ground_level;
        let targets = &mut self.targets;

        self.projectiles.retain_mut(|projectile| {
            projectile.integrate(gravity);

            let mut struck = false;
            for (index, target) in targets.iter_mut().enumerate() {
                let distance = (projectile.position - target.position).norm();
                if distance < factor * target.scale {
                    struck = true;
                    if !target.hit {
                        target.hit = true;
                        report.newly_hit.push(index);
                        info!(target = index, "target hit");
                    }
                }
            }

            if struck {
                report.absorbed += 1;
                false
            } else if projectile.position.y < ground {
                report.landed += 1;
                trace!(x = projectile.position.x, z = projectile.position.z, "projectile landed");
                false
            } else {
                true
            }
        });

        report
    }

    /// Clear every hit flag; positions and live projectiles are untouched
    pub fn clear_hits(&mut self) {
        for target in &mut self.targets {
            target.hit = false;
        }
    }

    pub fn hit_count(&self) -> usize {
        self.targets.iter().filter(|t| t.hit).count()
    }
}

impl Default for ProjectileSim {
    fn default() -> Self {
        Self::new(SimConfig::default(), default_targets())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transform::Transform;

    fn muzzle_at(x: f32, y: f32, z: f32) -> Matrix4<f32> {
        Transform::translation_matrix(x, y, z)
    }

    #[test]
    fn test_fire_uses_muzzle_axis() {
        let mut sim = ProjectileSim::new(SimConfig::default(), Vec::new());
        let muzzle = muzzle_at(1.0, 2.0, 3.0) * Transform::rotation_z(90.0);
        let p = *sim.fire(&muzzle);

        assert!((p.position - Point3::new(1.0, 2.0, 3.0)).norm() < 1e-5);
        // +Y rotated 90 degrees about Z points down -X
        let expected = Vector3::new(-1.0, 0.0, 0.0) * SimConfig::default().launch_speed;
        assert!((p.velocity - expected).norm() < 1e-5);
    }

    #[test]
    fn test_fire_ignores_muzzle_scale() {
        let mut sim = ProjectileSim::new(SimConfig::default(), Vec::new());
        let muzzle = Transform::scale_matrix(0.1, 5.0, 0.1);
        let p = *sim.fire(&muzzle);
        assert!((p.velocity.norm() - sim.config().launch_speed).abs() < 1e-6);
    }

    #[test]
    fn test_projectile_falls_and_is_removed() {
        let config = SimConfig::default();
        let mut sim = ProjectileSim::new(config, Vec::new());
        sim.fire(&muzzle_at(0.0, 1.0, 0.0));

        let mut frames = 0;
        while !sim.projectiles().is_empty() {
            let before = sim.projectiles()[0];
            let report = sim.step();
            frames += 1;

            if let Some(after) = sim.projectiles().first() {
                // Position advances by exactly the pre-step velocity
                assert!((after.position - (before.position + before.velocity)).norm() < 1e-6);
                assert!((after.velocity.y - (before.velocity.y - config.gravity)).abs() < 1e-6);
            } else {
                assert_eq!(report.landed, 1);
            }
            assert!(frames < 1000, "projectile never landed");
        }
        assert!(frames > 1);
    }

    #[test]
    fn test_hit_marks_target_permanently() {
        let config = SimConfig::default();
        let target = Target::new(Point3::new(0.5, 1.0, 0.0), 0.3);
        let mut sim = ProjectileSim::new(config, vec![target]);

        // Horizontal shot straight through the target
        let muzzle = muzzle_at(0.0, 1.0, 0.0) * Transform::rotation_z(-90.0);
        sim.fire(&muzzle);
        let mut hits = Vec::new();
        for _ in 0..50 {
            hits.extend(sim.step().newly_hit);
        }
        assert_eq!(hits, vec![0]);
        assert!(sim.targets()[0].hit);

        // A miss afterwards leaves the flag set
        sim.fire(&(muzzle_at(0.0, 1.0, 2.0) * Transform::rotation_z(-90.0)));
        for _ in 0..200 {
            assert!(sim.step().newly_hit.is_empty());
        }
        assert!(sim.targets()[0].hit);
        assert!(sim.projectiles().is_empty());
    }

    #[test]
    fn test_hit_radius_scales_with_target() {
        let config = SimConfig {
            gravity: 0.0,
            ..SimConfig::default()
        };
        // Straight shot along +X passing 0.5 from the target centre
        let muzzle = muzzle_at(0.0, 1.0, 0.0) * Transform::rotation_z(-90.0);
        let pass_by = |scale: f32| {
            let target = Target::new(Point3::new(1.0, 1.0, 0.5), scale);
            let mut sim = ProjectileSim::new(config, vec![target]);
            sim.fire(&muzzle);
            for _ in 0..100 {
                sim.step();
            }
            sim.targets()[0].hit
        };

        // 0.5 < 0.75 * 1.0
        assert!(pass_by(1.0));
        // 0.5 > 0.75 * 0.1
        assert!(!pass_by(0.1));
    }

    #[test]
    fn test_hit_projectile_is_absorbed() {
        let target = Target::new(Point3::new(0.0, 1.04, 0.0), 0.3);
        let mut sim = ProjectileSim::new(SimConfig::default(), vec![target]);
        sim.fire(&muzzle_at(0.0, 1.0, 0.0));
        let report = sim.step();
        assert_eq!(report.absorbed, 1);
        assert!(sim.projectiles().is_empty());
    }

    #[test]
    fn test_rehit_is_noop() {
        let mut target = Target::new(Point3::new(0.0, 1.04, 0.0), 0.3);
        target.hit = true;
        let mut sim = ProjectileSim::new(SimConfig::default(), vec![target]);
        sim.fire(&muzzle_at(0.0, 1.0, 0.0));
        let report = sim.step();
        assert!(report.newly_hit.is_empty());
        assert_eq!(sim.hit_count(), 1);
    }

    #[test]
    fn test_clear_hits_keeps_positions() {
        let mut sim = ProjectileSim::default();
        let positions: Vec<_> = sim.targets().iter().map(|t| t.position).collect();
        sim.targets.iter_mut().for_each(|t| t.hit = true);

        sim.clear_hits();
        assert_eq!(sim.hit_count(), 0);
        let after: Vec<_> = sim.targets().iter().map(|t| t.position).collect();
        assert_eq!(positions, after);
    }
}
