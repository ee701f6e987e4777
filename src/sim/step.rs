/// The step function: advances the world by one tick.
///
/// Processing order:
///   1. Direction resolution from the input snapshot
///   2. Axis-separated collision resolution (X, then Y against the
///      already-updated X)
///   3. Sprite selection from the *intended* direction
///   4. Affordance proximity evaluation
///   5. Interaction intent
///
/// Single pass per axis per tick — no retries, no sub-stepping.
/// Tunneling through thin obstacles at very large `dt * speed` is an
/// accepted limitation.

use crate::domain::geometry::{clamp, Vec2};
use crate::domain::player::FrameInput;
use super::event::TickEvent;
use super::world::{Phase, WorldState};

// ══════════════════════════════════════════════════════════════
// Main entry point
// ══════════════════════════════════════════════════════════════

pub fn step(world: &mut WorldState, input: FrameInput, dt: f32) -> Vec<TickEvent> {
    if world.phase != Phase::Playing {
        return vec![];
    }

    let mut events: Vec<TickEvent> = Vec::new();
    world.tick += 1;

    if world.message_timer > 0 {
        world.message_timer -= 1;
        if world.message_timer == 0 {
            world.message.clear();
        }
    }

    let (dx, dy) = input.direction();

    resolve_movement(world, dx, dy, dt);

    // Sprite reflects intent, not displacement: pushing into a wall
    // still shows the walking sprite for that direction.
    if let Some(key) = world.sprite.select(dx, dy) {
        events.push(TickEvent::SpriteChanged(key));
    }

    resolve_affordance(world, &mut events);

    if input.interact && world.near_target {
        events.push(TickEvent::TransitionRequested);
    }

    events
}

// ══════════════════════════════════════════════════════════════
// Movement: axis-separated collision resolution
// ══════════════════════════════════════════════════════════════

/// Test and apply X displacement, then Y displacement, independently.
/// A blocked axis leaves that coordinate unchanged, so the player
/// slides along walls on the free axis.
///
/// The Y check runs against the already-updated X — this ordering
/// makes corner sliding axis-dependent and matches the reference
/// behavior exactly.
fn resolve_movement(world: &mut WorldState, dx: f32, dy: f32, dt: f32) {
    let half_w = world.player.half_w;
    let half_h = world.player.half_h;
    let room = &world.room;

    let new_x = world.player.pos.x + dx * world.speed * dt;
    if !room.obstacles.collides_at(
        Vec2::new(new_x, world.player.pos.y), half_w, half_h,
    ) {
        // Hard clamp to world bounds: a second net independent of the
        // border-wall obstacles.
        world.player.pos.x = clamp(new_x, half_w, room.width - half_w);
    }

    let new_y = world.player.pos.y + dy * world.speed * dt;
    if !room.obstacles.collides_at(
        Vec2::new(world.player.pos.x, new_y), half_w, half_h,
    ) {
        world.player.pos.y = clamp(new_y, half_h, room.height - half_h);
    }
}

// ══════════════════════════════════════════════════════════════
// Affordance
// ══════════════════════════════════════════════════════════════

/// Re-evaluate proximity to the interaction point. Events fire only on
/// transitions; `near_target` holds the level for the HUD.
fn resolve_affordance(world: &mut WorldState, events: &mut Vec<TickEvent>) {
    let near = world.room.in_range(world.player.pos);
    if near != world.near_target {
        world.near_target = near;
        events.push(if near {
            TickEvent::AffordanceShown
        } else {
            TickEvent::AffordanceHidden
        });
    }
}

// ══════════════════════════════════════════════════════════════
// Unit tests
// ══════════════════════════════════════════════════════════════

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{GameConfig, GamepadConfig, MovementConfig};
    use crate::domain::geometry::Rect;
    use crate::domain::obstacles::ObstacleSet;
    use crate::domain::sprite::SpriteKey;
    use crate::sim::room::Room;
    use std::path::PathBuf;

    const SPEED: f32 = 210.0;
    const EPS: f32 = 1e-3;

    fn test_config() -> GameConfig {
        GameConfig {
            movement: MovementConfig { speed: SPEED, player_w: 64.0, player_h: 64.0 },
            gamepad: GamepadConfig { confirm: vec![], cancel: vec![] },
            room_file: PathBuf::from("room.toml"),
        }
    }

    /// A 1030x1450 room with the given obstacles and no others.
    fn open_world(obstacles: Vec<Rect>) -> WorldState {
        let mut room = Room::default_room();
        room.obstacles = ObstacleSet::new(obstacles);
        let mut world = WorldState::new(room, &test_config());
        world.phase = Phase::Playing;
        world
    }

    fn held(left: bool, right: bool, up: bool, down: bool) -> FrameInput {
        FrameInput { left, right, up, down, interact: false }
    }

    // ── Free movement ──

    #[test]
    fn single_axis_moves_speed_times_dt() {
        let mut world = open_world(vec![]);
        world.player.pos = Vec2::new(515.0, 700.0);

        step(&mut world, held(false, true, false, false), 0.1);
        assert!((world.player.pos.x - 536.0).abs() < EPS);
        assert!((world.player.pos.y - 700.0).abs() < EPS);
    }

    #[test]
    fn hold_up_from_bottom_scenario() {
        // World 1030x1450, player at (515, 1450), "up" for 1s at 210 px/s
        let mut world = open_world(vec![]);
        world.player.pos = Vec2::new(515.0, 1450.0);

        step(&mut world, held(false, false, true, false), 1.0);
        assert!((world.player.pos.x - 515.0).abs() < EPS);
        assert!((world.player.pos.y - 1240.0).abs() < EPS);
    }

    #[test]
    fn diagonal_displacement_magnitude_is_speed_times_dt() {
        let mut world = open_world(vec![]);
        world.player.pos = Vec2::new(515.0, 700.0);
        let start = world.player.pos;

        step(&mut world, held(false, true, false, true), 0.5);
        let moved = world.player.pos.distance(start);
        assert!((moved - SPEED * 0.5).abs() < EPS);
    }

    #[test]
    fn movement_clamps_to_world_bounds() {
        let mut world = open_world(vec![]);
        world.player.pos = Vec2::new(50.0, 700.0);

        // A huge step left cannot pass the half-extent boundary
        step(&mut world, held(true, false, false, false), 5.0);
        assert_eq!(world.player.pos.x, 32.0);

        world.player.pos = Vec2::new(1000.0, 700.0);
        step(&mut world, held(false, true, false, false), 5.0);
        assert_eq!(world.player.pos.x, 1030.0 - 32.0);
    }

    // ── Collision ──

    #[test]
    fn blocked_axis_leaves_position_unchanged() {
        // Wall directly right of the player
        let mut world = open_world(vec![Rect::new(600.0, 0.0, 50.0, 1450.0)]);
        world.player.pos = Vec2::new(560.0, 700.0);

        step(&mut world, held(false, true, false, false), 0.5);
        assert_eq!(world.player.pos.x, 560.0);
        assert_eq!(world.player.pos.y, 700.0);
    }

    #[test]
    fn diagonal_slides_along_blocking_wall() {
        use std::f32::consts::FRAC_1_SQRT_2;

        // Wall blocks X; Y is free. Diagonal input keeps the Y
        // component moving at its commanded (normalized) rate.
        let mut world = open_world(vec![Rect::new(600.0, 0.0, 50.0, 1450.0)]);
        world.player.pos = Vec2::new(560.0, 700.0);

        step(&mut world, held(false, true, false, true), 0.5);
        assert_eq!(world.player.pos.x, 560.0);
        let expected_dy = FRAC_1_SQRT_2 * SPEED * 0.5;
        assert!((world.player.pos.y - (700.0 + expected_dy)).abs() < EPS);
    }

    #[test]
    fn resolved_position_never_overlaps_obstacles() {
        let wall = Rect::new(600.0, 0.0, 50.0, 1450.0);
        let mut world = open_world(vec![wall]);
        world.player.pos = Vec2::new(400.0, 700.0);

        // Push into the wall for many ticks
        for _ in 0..200 {
            step(&mut world, held(false, true, false, true), 0.016);
            let body = Rect::from_center(world.player.pos, 32.0, 32.0);
            assert!(!body.overlaps(&wall), "player at {:?}", world.player.pos);
        }
    }

    #[test]
    fn corner_resolution_is_x_first() {
        // A block below-right. Moving down-right: the X move is tested
        // against the old Y (clear), then the Y move is tested against
        // the NEW X (blocked). The player ends shifted right only.
        let block = Rect::new(560.0, 760.0, 200.0, 200.0);
        let mut world = open_world(vec![block]);
        world.player.pos = Vec2::new(500.0, 720.0);

        step(&mut world, held(false, true, false, true), 0.2);
        assert!(world.player.pos.x > 500.0);
        assert_eq!(world.player.pos.y, 720.0);
    }

    // ── Sprite intent ──

    #[test]
    fn sprite_change_fires_once_per_direction() {
        let mut world = open_world(vec![]);
        world.player.pos = Vec2::new(515.0, 700.0);

        let events = step(&mut world, held(false, true, false, false), 0.016);
        assert!(events.contains(&TickEvent::SpriteChanged(SpriteKey::Right)));

        for _ in 0..50 {
            let events = step(&mut world, held(false, true, false, false), 0.016);
            assert!(!events.iter().any(|e| matches!(e, TickEvent::SpriteChanged(_))));
        }

        let events = step(&mut world, held(false, false, true, false), 0.016);
        assert!(events.contains(&TickEvent::SpriteChanged(SpriteKey::Up)));
    }

    #[test]
    fn walking_into_wall_keeps_walking_sprite() {
        let mut world = open_world(vec![Rect::new(600.0, 0.0, 50.0, 1450.0)]);
        world.player.pos = Vec2::new(560.0, 700.0);

        let events = step(&mut world, held(false, true, false, false), 0.016);
        // No displacement, but the intent selects the Right sprite
        assert_eq!(world.player.pos.x, 560.0);
        assert!(events.contains(&TickEvent::SpriteChanged(SpriteKey::Right)));
    }

    // ── Affordance ──

    #[test]
    fn affordance_toggles_on_range_transitions() {
        let mut world = open_world(vec![]); // target (700, 250), radius 30
        world.player.pos = Vec2::new(700.0, 250.0);

        let events = step(&mut world, held(false, false, false, false), 0.016);
        assert!(events.contains(&TickEvent::AffordanceShown));
        assert!(world.near_target);

        // Staying put: no repeated signal
        let events = step(&mut world, held(false, false, false, false), 0.016);
        assert!(events.is_empty());

        // dist 35 > 30: hidden again
        world.player.pos = Vec2::new(735.0, 250.0);
        let events = step(&mut world, held(false, false, false, false), 0.016);
        assert!(events.contains(&TickEvent::AffordanceHidden));
        assert!(!world.near_target);
    }

    #[test]
    fn affordance_inclusive_at_exact_radius() {
        let mut world = open_world(vec![]);
        world.player.pos = Vec2::new(730.0, 250.0); // dist == 30

        let events = step(&mut world, held(false, false, false, false), 0.016);
        assert!(events.contains(&TickEvent::AffordanceShown));
    }

    // ── Interaction trigger ──

    fn confirm() -> FrameInput {
        FrameInput { interact: true, ..FrameInput::default() }
    }

    #[test]
    fn interact_in_range_requests_transition() {
        let mut world = open_world(vec![]);
        world.player.pos = Vec2::new(700.0, 279.0); // dist 29 < 30

        let events = step(&mut world, confirm(), 0.016);
        assert!(events.contains(&TickEvent::TransitionRequested));
    }

    #[test]
    fn interact_out_of_range_does_nothing() {
        let mut world = open_world(vec![]);
        world.player.pos = Vec2::new(700.0, 281.0); // dist 31 > 30

        let events = step(&mut world, confirm(), 0.016);
        assert!(!events.contains(&TickEvent::TransitionRequested));
    }

    #[test]
    fn transition_fires_once_per_confirm_press() {
        let mut world = open_world(vec![]);
        world.player.pos = Vec2::new(700.0, 250.0);

        // interact is edge-triggered by the input layer: one press,
        // one tick with the flag set
        let events = step(&mut world, confirm(), 0.016);
        assert_eq!(
            events.iter().filter(|e| **e == TickEvent::TransitionRequested).count(),
            1,
        );
        let events = step(&mut world, held(false, false, false, false), 0.016);
        assert!(!events.contains(&TickEvent::TransitionRequested));
    }

    // ── Phase gating ──

    #[test]
    fn step_is_inert_outside_playing() {
        let mut world = open_world(vec![]);
        world.phase = Phase::Title;
        world.player.pos = Vec2::new(515.0, 700.0);

        let events = step(&mut world, held(false, true, false, false), 1.0);
        assert!(events.is_empty());
        assert_eq!(world.player.pos, Vec2::new(515.0, 700.0));
    }
}
