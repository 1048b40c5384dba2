/// Tank model: hull, wheels and a yawing turret with a pitching cannon
use nalgebra::{Matrix4, Point3};

use super::{Color, Composer, Part, RenderTarget};
use crate::articulation::Articulation;
use crate::geometry::Shape;
use crate::transform::TransformStack;

const HULL_HEIGHT: f32 = 0.08;
/// Fixed rake of the cannon relative to its pivot, in degrees
const CANNON_RAKE: f32 = 45.0;
const CANNON_LENGTH: f32 = 1.2;

const BODY: Color = [0.7, 0.6, 0.35];
const OUTLINE: Color = [0.3, 0.3, 0.3];

const BASE: Part = Part::new(Shape::Cube, [1.5, 0.16, 0.8], BODY, OUTLINE);
const MIDDLE: Part = Part::new(Shape::Cube, [1.6, 0.1, 0.9], BODY, OUTLINE);
const CABIN: Part = Part::new(Shape::Cube, [1.0, 0.24, 0.5], BODY, OUTLINE);
const DOME: Part = Part::new(Shape::Sphere, [0.4, 0.2, 0.4], BODY, OUTLINE);
const HATCH: Part = Part::new(Shape::Cylinder, [0.16; 3], BODY, OUTLINE);
const PIVOT: Part = Part::new(Shape::Cylinder, [0.12; 3], BODY, OUTLINE);
const CANNON: Part = Part::new(Shape::Cylinder, [0.025, CANNON_LENGTH, 0.025], [0.25; 3], [0.2; 3]).unpadded();

const WHEELS_PER_SIDE: usize = 6;
const WHEELBASE: f32 = 1.4;
const TRACK_WIDTH: f32 = 0.855;
const AXLE_HEIGHT: f32 = 0.03;
const TYRE_RADIUS: f32 = 0.15;
const RIM_RADIUS: f32 = 0.10;
const RIM_THICKNESS: f32 = 0.05;

const TYRE: Part = Part::new(Shape::Torus, [TYRE_RADIUS, TYRE_RADIUS * 0.6, TYRE_RADIUS], [0.2; 3], [0.4; 3]);
const RIGHT_RIM: Part = Part::new(Shape::Cylinder, [RIM_RADIUS, RIM_THICKNESS * 0.6, RIM_RADIUS], [0.2; 3], [0.25; 3]);
const LEFT_RIM: Part = RIGHT_RIM.with_fill([0.5; 3]).with_outline([0.7; 3]);

/// Hull frame: lateral offset along X above the ground
fn place_hull(stack: &mut TransformStack, pose: &Articulation) {
    stack.translate(pose.hull_offset(), HULL_HEIGHT, 0.0);
}

fn place_turret(stack: &mut TransformStack, pose: &Articulation) {
    stack.rotate_y(pose.turret_yaw());
}

/// Barrel pivot frame, relative to the turret
fn place_barrel_pivot(stack: &mut TransformStack, pose: &Articulation) {
    stack.translate(-0.5, 0.41, 0.0).rotate_z(pose.barrel_pitch());
}

/// World frame at the cannon tip with +Y pointing down the barrel
pub fn muzzle(pose: &Articulation) -> Matrix4<f32> {
    let mut stack = TransformStack::new();
    place_hull(&mut stack, pose);
    place_turret(&mut stack, pose);
    place_barrel_pivot(&mut stack, pose);
    stack.rotate_z(CANNON_RAKE).translate(0.0, CANNON_LENGTH, 0.0);
    *stack.current()
}

/// World position of the muzzle
pub fn muzzle_point(pose: &Articulation) -> Point3<f32> {
    muzzle(pose).transform_point(&Point3::origin())
}

pub fn draw<T: RenderTarget + ?Sized>(c: &mut Composer<'_, T>, stack: &mut TransformStack, pose: &Articulation) {
    let mut hull = stack.scope();
    place_hull(&mut hull, pose);

    {
        let mut base = hull.scope();
        base.translate(0.0, 0.1, 0.0);
        c.part(&mut base, &BASE);
    }

    wheels(c, &mut hull, pose);

    {
        let mut middle = hull.scope();
        middle.translate(0.0, 0.23, 0.0);
        c.part(&mut middle, &MIDDLE);
    }

    let mut turret = hull.scope();
    place_turret(&mut turret, pose);
    {
        let mut barrel = turret.scope();
        place_barrel_pivot(&mut barrel, pose);
        {
            let mut pivot = barrel.scope();
            pivot.rotate_x(90.0);
            c.part(&mut pivot, &PIVOT);
        }
        barrel
            .rotate_z(CANNON_RAKE)
            .translate(0.0, CANNON_LENGTH / 2.0, 0.0);
        c.part(&mut barrel, &CANNON);
    }
    {
        let mut dome = turret.scope();
        dome.translate(0.0, 0.52, 0.0).rotate_x(180.0);
        c.part(&mut dome, &DOME);
    }
    {
        let mut hatch = turret.scope();
        hatch.translate(0.0, 0.55, 0.0);
        c.part(&mut hatch, &HATCH);
    }
    {
        let mut cabin = turret.scope();
        cabin.translate(0.0, 0.40, 0.0);
        c.part(&mut cabin, &CABIN);
    }
}

/// Six wheels per side, spread evenly under the base
fn wheels<T: RenderTarget + ?Sized>(c: &mut Composer<'_, T>, stack: &mut TransformStack, pose: &Articulation) {
    let spacing = WHEELBASE / WHEELS_PER_SIDE as f32;
    let start = -WHEELBASE / 2.0 + spacing / 2.0;
    let sides = [(TRACK_WIDTH / 2.0 - 0.004, &RIGHT_RIM), (-TRACK_WIDTH / 2.0 + 0.004, &LEFT_RIM)];

    for i in 0..WHEELS_PER_SIDE {
        let x = start + i as f32 * spacing;
        for (z, rim) in sides {
            let mut wheel = stack.scope();
            wheel
                .translate(x, AXLE_HEIGHT, z)
                .rotate_x(90.0)
                .rotate_y(pose.wheel_spin());
            c.part(&mut wheel, &TYRE);
            c.part(&mut wheel, rim);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scene::{DrawLog, DrawPass, WireframeMode};

    fn draw_tank(pose: &Articulation) -> DrawLog {
        let mut log = DrawLog::new();
        let mut stack = TransformStack::new();
        draw(&mut Composer::new(&mut log, WireframeMode::SolidOnly), &mut stack, pose);
        assert_eq!(stack.depth(), 1);
        log
    }

    fn cannon_call(log: &DrawLog) -> Matrix4<f32> {
        log.calls
            .iter()
            .find(|c| c.shape == Shape::Cylinder && c.color == CANNON.fill)
            .map(|c| c.model_view)
            .unwrap()
    }

    #[test]
    fn test_part_counts() {
        let log = draw_tank(&Articulation::default());
        assert_eq!(log.count(Shape::Torus, DrawPass::Solid), 2 * WHEELS_PER_SIDE);
        // rims + pivot + cannon + hatch
        assert_eq!(log.count(Shape::Cylinder, DrawPass::Solid), 2 * WHEELS_PER_SIDE + 3);
        assert_eq!(log.count(Shape::Cube, DrawPass::Solid), 3);
        assert_eq!(log.count(Shape::Sphere, DrawPass::Solid), 1);
    }

    #[test]
    fn test_muzzle_sits_on_cannon_tip() {
        let mut pose = Articulation::default();
        pose.adjust_turret(12.0);
        pose.adjust_barrel(-7.0);
        pose.drive(30.0);

        let log = draw_tank(&pose);
        // The unit cylinder's top cap centre is the cannon tip.
        let tip = cannon_call(&log).transform_point(&Point3::new(0.0, 0.5, 0.0));
        assert!((tip - muzzle_point(&pose)).norm() < 1e-4);
    }

    #[test]
    fn test_turret_yaw_moves_cannon_not_wheels() {
        let rest = draw_tank(&Articulation::default());
        let mut yawed_pose = Articulation::default();
        yawed_pose.adjust_turret(20.0);
        let yawed = draw_tank(&yawed_pose);

        let wheels = |log: &DrawLog| -> Vec<Matrix4<f32>> {
            log.calls
                .iter()
                .filter(|c| c.shape == Shape::Torus)
                .map(|c| c.model_view)
                .collect()
        };
        assert_eq!(wheels(&rest), wheels(&yawed));
        assert!((cannon_call(&rest) - cannon_call(&yawed)).norm() > 1e-3);
    }

    #[test]
    fn test_default_muzzle_points_up_and_downrange() {
        let m = muzzle(&Articulation::default());
        let dir = m.transform_vector(&nalgebra::Vector3::y());
        assert!(dir.x < 0.0);
        assert!(dir.y > 0.0);
        assert!(muzzle_point(&Articulation::default()).y > 1.0);
    }
}
