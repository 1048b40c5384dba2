/// Robot arm model: yawing column, pitching upper arm, fixed elbow and a
/// two-finger claw
use super::{Color, Composer, Part, RenderTarget};
use crate::articulation::Articulation;
use crate::geometry::Shape;
use crate::transform::TransformStack;

const PAINT: Color = [0.85, 0.5, 0.1];
const JOINT: Color = [0.35, 0.35, 0.4];
const OUTLINE: Color = [0.25, 0.15, 0.05];

const PLATE: Part = Part::new(Shape::Cylinder, [0.6, 0.1, 0.6], JOINT, OUTLINE);
const COLUMN: Part = Part::new(Shape::Cube, [0.15, 0.5, 0.15], PAINT, OUTLINE);
const SHOULDER: Part = Part::new(Shape::Sphere, [0.2; 3], JOINT, OUTLINE);
const UPPER_ARM: Part = Part::new(Shape::Cube, [0.1, 0.6, 0.1], PAINT, OUTLINE);
const ELBOW: Part = Part::new(Shape::Sphere, [0.14; 3], JOINT, OUTLINE);
const FOREARM: Part = Part::new(Shape::Cube, [0.08, 0.5, 0.08], PAINT, OUTLINE);
const PALM: Part = Part::new(Shape::Cube, [0.2, 0.05, 0.1], JOINT, OUTLINE);
const FINGER: Part = Part::new(Shape::Cube, [0.03, 0.16, 0.05], PAINT, OUTLINE);

const UPPER_ARM_LENGTH: f32 = 0.6;
const FOREARM_LENGTH: f32 = 0.5;
/// Fixed bend at the elbow, in degrees
const ELBOW_BEND: f32 = 90.0;

pub fn draw<T: RenderTarget + ?Sized>(c: &mut Composer<'_, T>, stack: &mut TransformStack, pose: &Articulation) {
    {
        let mut plate = stack.scope();
        plate.translate(0.0, 0.05, 0.0);
        c.part(&mut plate, &PLATE);
    }

    let mut column = stack.scope();
    column.rotate_y(pose.turret_yaw());
    {
        let mut body = column.scope();
        body.translate(0.0, 0.35, 0.0);
        c.part(&mut body, &COLUMN);
    }

    let mut shoulder = column.scope();
    shoulder.translate(0.0, 0.6, 0.0).rotate_z(pose.barrel_pitch());
    c.part(&mut shoulder, &SHOULDER);
    {
        let mut upper = shoulder.scope();
        upper.translate(0.0, UPPER_ARM_LENGTH / 2.0, 0.0);
        c.part(&mut upper, &UPPER_ARM);
    }

    let mut elbow = shoulder.scope();
    elbow.translate(0.0, UPPER_ARM_LENGTH, 0.0).rotate_z(ELBOW_BEND);
    c.part(&mut elbow, &ELBOW);
    {
        let mut forearm = elbow.scope();
        forearm.translate(0.0, FOREARM_LENGTH / 2.0, 0.0);
        c.part(&mut forearm, &FOREARM);
    }

    let mut wrist = elbow.scope();
    wrist.translate(0.0, FOREARM_LENGTH, 0.0);
    c.part(&mut wrist, &PALM);
    claw(c, &mut wrist, pose.claw_spread());
}

/// Fingers hinge outwards from the palm edges by `spread` degrees
fn claw<T: RenderTarget + ?Sized>(c: &mut Composer<'_, T>, stack: &mut TransformStack, spread: f32) {
    for side in [-1.0_f32, 1.0] {
        let mut finger = stack.scope();
        finger
            .translate(side * 0.07, 0.025, 0.0)
            .rotate_z(-side * spread)
            .translate(0.0, 0.08, 0.0);
        c.part(&mut finger, &FINGER);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scene::{DrawLog, WireframeMode};
    use nalgebra::Point3;

    fn finger_tips(spread_steps: f32) -> Vec<Point3<f32>> {
        let mut pose = Articulation::default();
        pose.adjust_claw(spread_steps);
        let mut log = DrawLog::new();
        let mut stack = TransformStack::new();
        draw(&mut Composer::new(&mut log, WireframeMode::SolidOnly), &mut stack, &pose);
        assert_eq!(stack.depth(), 1);

        // Fingers are the last two draws
        log.calls
            .iter()
            .rev()
            .take(2)
            .map(|c| c.model_view.transform_point(&Point3::new(0.0, 0.5, 0.0)))
            .collect()
    }

    #[test]
    fn test_claw_opens_with_spread() {
        let closed = finger_tips(0.0);
        let open = finger_tips(10.0);
        let gap = |tips: &[Point3<f32>]| (tips[0] - tips[1]).norm();
        assert!(gap(&open) > gap(&closed) + 0.05);
    }

    #[test]
    fn test_column_yaw_swings_the_wrist() {
        let mut log_a = DrawLog::new();
        let mut log_b = DrawLog::new();
        let mut yawed = Articulation::default();
        yawed.adjust_turret(30.0);

        draw(&mut Composer::new(&mut log_a, WireframeMode::SolidOnly), &mut TransformStack::new(), &Articulation::default());
        draw(&mut Composer::new(&mut log_b, WireframeMode::SolidOnly), &mut TransformStack::new(), &yawed);

        let last = |log: &DrawLog| log.calls.last().map(|c| c.model_view).unwrap();
        assert!((last(&log_a) - last(&log_b)).norm() > 1e-3);
        // The base plate does not yaw
        assert_eq!(log_a.calls[0].model_view, log_b.calls[0].model_view);
    }
}
