/// WorldState: the complete snapshot of the running demo.
///
/// The original had the player position, input flags, and current
/// sprite as free-floating globals; here they are fields of one owned
/// state object and only the step function mutates them.
///
/// ## Camera / Viewport
///
/// World coordinates and screen coordinates are separate:
///   - `camera` — viewport window into the world (top-left + size),
///     all in world pixels
///   - The renderer maps world pixels to terminal cells and sets
///     `view_w` / `view_h` from the terminal size each frame
///   - Worlds smaller than the viewport are centered

use crate::config::GameConfig;
use crate::domain::geometry::{clamp, Vec2};
use crate::domain::player::Player;
use crate::domain::sprite::SpriteSelector;
use super::room::Room;

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Phase {
    Title,
    Playing,
    NextScene,
}

/// Camera: a viewport window over the bounded world.
///
/// `(x, y)` is the world coordinate of the viewport's top-left corner
/// (negative when a small world is centered). `view_w` / `view_h` are
/// set by the renderer before each follow.
#[derive(Clone, Debug)]
pub struct Camera {
    pub x: f32,
    pub y: f32,
    pub view_w: f32,
    pub view_h: f32,
}

impl Camera {
    pub fn new() -> Self {
        Camera { x: 0.0, y: 0.0, view_w: 0.0, view_h: 0.0 }
    }

    /// Center the viewport on `focus`, clamped so the window never
    /// shows outside `[0, world - view]` on an axis. When the world is
    /// smaller than the viewport on an axis, the world is centered
    /// instead (the clamp bounds would invert).
    pub fn follow(&mut self, focus: Vec2, world_w: f32, world_h: f32) {
        if self.view_w <= 0.0 || self.view_h <= 0.0 {
            return;
        }

        self.x = if world_w < self.view_w {
            -(self.view_w - world_w) / 2.0
        } else {
            clamp(focus.x - self.view_w / 2.0, 0.0, world_w - self.view_w)
        };

        self.y = if world_h < self.view_h {
            -(self.view_h - world_h) / 2.0
        } else {
            clamp(focus.y - self.view_h / 2.0, 0.0, world_h - self.view_h)
        };
    }

    /// World pixel → viewport-relative pixel.
    pub fn to_view(&self, p: Vec2) -> Vec2 {
        Vec2::new(p.x - self.x, p.y - self.y)
    }
}

pub struct WorldState {
    pub room: Room,
    pub player: Player,
    pub sprite: SpriteSelector,
    pub camera: Camera,

    /// Player is within interaction range of the room target.
    /// Maintained by the step; drives the affordance in the HUD.
    pub near_target: bool,

    /// Walk speed in world pixels per second (from config).
    pub speed: f32,

    pub phase: Phase,
    pub tick: u64,

    // ── UI ──
    pub message: String,
    pub message_timer: u32,
}

impl WorldState {
    pub fn new(room: Room, config: &GameConfig) -> Self {
        let player = Player::new(
            room.spawn,
            config.movement.player_w,
            config.movement.player_h,
        );
        WorldState {
            room,
            player,
            sprite: SpriteSelector::new(),
            camera: Camera::new(),
            near_target: false,
            speed: config.movement.speed,
            phase: Phase::Title,
            tick: 0,
            message: String::new(),
            message_timer: 0,
        }
    }

    /// Put the player back at spawn with a fresh sprite state.
    /// Used when starting (or restarting) a walk.
    pub fn reset(&mut self) {
        self.player.pos = self.room.spawn;
        self.sprite = SpriteSelector::new();
        self.near_target = false;
        self.tick = 0;
    }

    pub fn set_message(&mut self, msg: &str, duration: u32) {
        self.message = msg.to_string();
        self.message_timer = duration;
    }
}
