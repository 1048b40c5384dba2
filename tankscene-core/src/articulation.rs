/// Keyboard-driven articulation parameters of the models
use std::ops::RangeInclusive;

pub const HULL_OFFSET_RANGE: RangeInclusive<f32> = -2.5..=2.5;
pub const HULL_STEP: f32 = 0.01;

/// Wheel spin per hull step, in degrees
pub const WHEEL_STEP: f32 = 15.0;

pub const BARREL_PITCH_RANGE: RangeInclusive<f32> = -30.0..=60.0;
pub const BARREL_STEP: f32 = 1.0;

pub const TURRET_YAW_RANGE: RangeInclusive<f32> = -40.0..=40.0;
pub const TURRET_STEP: f32 = 1.0;

pub const CLAW_SPREAD_RANGE: RangeInclusive<f32> = 0.0..=30.0;
pub const CLAW_STEP: f32 = 2.0;

/// Pose of the articulated parts. Angles are in degrees.
///
/// Only the `adjust_*` methods mutate it, and each keeps its parameter inside
/// the documented range no matter how many steps are applied.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Articulation {
    hull_offset: f32,
    wheel_spin: f32,
    barrel_pitch: f32,
    turret_yaw: f32,
    claw_spread: f32,
}

fn step_clamped(value: f32, delta: f32, range: &RangeInclusive<f32>) -> f32 {
    (value + delta).clamp(*range.start(), *range.end())
}

impl Articulation {
    pub fn hull_offset(&self) -> f32 {
        self.hull_offset
    }

    /// Wheel rotation in [0, 360)
    pub fn wheel_spin(&self) -> f32 {
        self.wheel_spin
    }

    pub fn barrel_pitch(&self) -> f32 {
        self.barrel_pitch
    }

    pub fn turret_yaw(&self) -> f32 {
        self.turret_yaw
    }

    pub fn claw_spread(&self) -> f32 {
        self.claw_spread
    }

    /// Move the hull `steps` increments along X; the wheels roll with it
    /// until the hull reaches the end of its travel.
    pub fn drive(&mut self, steps: f32) {
        let moved = step_clamped(self.hull_offset, steps * HULL_STEP, &HULL_OFFSET_RANGE);
        if moved != self.hull_offset {
            self.wheel_spin = (self.wheel_spin + steps * WHEEL_STEP).rem_euclid(360.0);
        }
        self.hull_offset = moved;
    }

    pub fn adjust_barrel(&mut self, steps: f32) {
        self.barrel_pitch = step_clamped(self.barrel_pitch, steps * BARREL_STEP, &BARREL_PITCH_RANGE);
    }

    pub fn adjust_turret(&mut self, steps: f32) {
        self.turret_yaw = step_clamped(self.turret_yaw, steps * TURRET_STEP, &TURRET_YAW_RANGE);
    }

    pub fn adjust_claw(&mut self, steps: f32) {
        self.claw_spread = step_clamped(self.claw_spread, steps * CLAW_STEP, &CLAW_SPREAD_RANGE);
    }
}
