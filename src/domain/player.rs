/// Player entity and the per-tick input snapshot.

use std::f32::consts::FRAC_1_SQRT_2;

use super::geometry::Vec2;

/// Snapshot of input state for one tick. Direction flags are
/// level-triggered (key held), `interact` is edge-triggered (fresh
/// press this frame). Built once per tick from keyboard + gamepad;
/// the step never reads the devices directly.
#[derive(Clone, Copy, Debug, Default)]
pub struct FrameInput {
    pub left: bool,
    pub right: bool,
    pub up: bool,
    pub down: bool,
    pub interact: bool,
}

impl FrameInput {
    /// Resolve the flags to a direction vector. Each axis is -1, 0 or
    /// +1; when both axes are active, both are scaled by 1/√2 so
    /// diagonal movement keeps the same speed as cardinal movement.
    pub fn direction(&self) -> (f32, f32) {
        let mut dx = (self.right as i32 - self.left as i32) as f32;
        let mut dy = (self.down as i32 - self.up as i32) as f32;
        if dx != 0.0 && dy != 0.0 {
            dx *= FRAC_1_SQRT_2;
            dy *= FRAC_1_SQRT_2;
        }
        (dx, dy)
    }
}

/// The player: a center position plus bounding-box half-extents.
#[derive(Clone, Debug)]
pub struct Player {
    pub pos: Vec2,
    pub half_w: f32,
    pub half_h: f32,
}

impl Player {
    pub fn new(pos: Vec2, width: f32, height: f32) -> Self {
        Player {
            pos,
            half_w: width / 2.0,
            half_h: height / 2.0,
        }
    }
}
