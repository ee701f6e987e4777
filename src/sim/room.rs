/// Room definitions: world size, static obstacles, spawn point, and
/// the interaction target.
///
/// ## Sources (priority order):
///   1. `room.toml` next to the binary or in the CWD
///   2. Built-in default room
///
/// A parse error in `room.toml` warns and falls back to the built-in
/// room; a *degenerate* room (zero-area obstacle, world smaller than
/// the player, spawn outside the world or wedged inside an obstacle)
/// is rejected by `validate()` before the terminal enters raw mode.

use serde::Deserialize;

use crate::config::GameConfig;
use crate::domain::geometry::{Rect, Vec2};
use crate::domain::obstacles::ObstacleSet;

#[derive(Clone, Debug)]
pub struct Room {
    pub name: String,
    /// World extent in pixels.
    pub width: f32,
    pub height: f32,
    /// Player start, world coordinates (center of the player box).
    pub spawn: Vec2,
    pub obstacles: ObstacleSet,
    /// Fixed world-space interaction point and its radius. Standing
    /// within `radius` of `target` shows the affordance and arms the
    /// confirm action.
    pub target: Vec2,
    pub radius: f32,
    /// Name of the scene entered on interaction.
    pub next_room: String,
}

// ── TOML schema ──

#[derive(Deserialize, Debug)]
struct TomlRoom {
    #[serde(default = "default_name")]
    name: String,
    #[serde(default = "default_width")]
    width: f32,
    #[serde(default = "default_height")]
    height: f32,
    #[serde(default)]
    spawn: Option<[f32; 2]>,
    #[serde(default = "default_next_room")]
    next_room: String,
    #[serde(default)]
    interaction: TomlInteraction,
    /// Omitting `[[obstacle]]` entirely keeps the built-in layout;
    /// an explicit empty list yields an open room.
    #[serde(default, rename = "obstacle")]
    obstacles: Option<Vec<TomlObstacle>>,
}

#[derive(Deserialize, Debug)]
struct TomlInteraction {
    #[serde(default = "default_target_x")]
    x: f32,
    #[serde(default = "default_target_y")]
    y: f32,
    #[serde(default = "default_radius")]
    radius: f32,
}

#[derive(Deserialize, Debug)]
struct TomlObstacle {
    x: f32,
    y: f32,
    w: f32,
    h: f32,
}

fn default_name() -> String { "Studio".into() }
fn default_width() -> f32 { 1030.0 }
fn default_height() -> f32 { 1450.0 }
fn default_next_room() -> String { "atrium".into() }
fn default_target_x() -> f32 { 700.0 }
fn default_target_y() -> f32 { 250.0 }
fn default_radius() -> f32 { 30.0 }

impl Default for TomlInteraction {
    fn default() -> Self {
        TomlInteraction {
            x: default_target_x(),
            y: default_target_y(),
            radius: default_radius(),
        }
    }
}

// ── Built-in room ──

/// The default room layout. Border walls are part of the list, so the
/// world edge collides like any other obstacle.
const DEFAULT_OBSTACLES: &[(f32, f32, f32, f32)] = &[
    (0.0, 0.0, 1220.0, 200.0),     // north wall band
    (410.0, 140.0, 220.0, 300.0),  // pillar
    (0.0, 640.0, 430.0, 110.0),    // west partition
    (610.0, 640.0, 430.0, 145.0),  // east partition
    (0.0, 750.0, 80.0, 50.0),      // shelf stub
    (416.0, 640.0, 12.0, 180.0),   // doorway jamb, left
    (608.0, 640.0, 12.0, 180.0),   // doorway jamb, right
    (52.0, 200.0, 210.0, 50.0),    // desk
    (740.0, 200.0, 250.0, 60.0),   // sideboard
    (790.0, 230.0, 90.0, 60.0),    // sideboard overhang
    (0.0, 0.0, 30.0, 1440.0),      // west border wall
    (1000.0, 0.0, 30.0, 1440.0),   // east border wall
    (0.0, 1440.0, 430.0, 10.0),    // south border, left of the doorway
    (600.0, 1440.0, 430.0, 10.0),  // south border, right of the doorway
    (300.0, 1100.0, 400.0, 120.0), // couch
];

impl Room {
    pub fn default_room() -> Self {
        let rects = DEFAULT_OBSTACLES
            .iter()
            .map(|&(x, y, w, h)| Rect::new(x, y, w, h))
            .collect();
        Room {
            name: default_name(),
            width: default_width(),
            height: default_height(),
            spawn: Vec2::new(default_width() / 2.0, default_height()),
            obstacles: ObstacleSet::new(rects),
            target: Vec2::new(default_target_x(), default_target_y()),
            radius: default_radius(),
            next_room: default_next_room(),
        }
    }

    /// Load the room from `config.room_file` if it exists; otherwise
    /// return the built-in room. Parse errors warn and fall back.
    pub fn load(config: &GameConfig) -> Self {
        if config.room_file.is_file() {
            match std::fs::read_to_string(&config.room_file) {
                Ok(text) => match toml::from_str::<TomlRoom>(&text) {
                    Ok(def) => return Room::from_toml(def),
                    Err(e) => {
                        eprintln!("Warning: {} parse error: {e}", config.room_file.display());
                        eprintln!("Using the built-in room.");
                    }
                },
                Err(e) => {
                    eprintln!("Warning: could not read {}: {e}", config.room_file.display());
                }
            }
        }
        Room::default_room()
    }

    fn from_toml(def: TomlRoom) -> Self {
        let rects = match def.obstacles {
            Some(list) => list
                .iter()
                .map(|o| Rect::new(o.x, o.y, o.w, o.h))
                .collect(),
            None => DEFAULT_OBSTACLES
                .iter()
                .map(|&(x, y, w, h)| Rect::new(x, y, w, h))
                .collect(),
        };
        let spawn = match def.spawn {
            Some([x, y]) => Vec2::new(x, y),
            None => Vec2::new(def.width / 2.0, def.height),
        };
        Room {
            name: def.name,
            width: def.width,
            height: def.height,
            spawn,
            obstacles: ObstacleSet::new(rects),
            target: Vec2::new(def.interaction.x, def.interaction.y),
            radius: def.interaction.radius,
            next_room: def.next_room,
        }
    }

    /// Is `pos` within interaction range of the target point?
    /// Inclusive at the boundary: `dist == radius` counts as in range.
    /// The target is a fixed world-space anchor, independent of where
    /// the camera happens to be.
    pub fn in_range(&self, pos: Vec2) -> bool {
        pos.distance(self.target) <= self.radius
    }

    /// Startup validation. The simulation has no recoverable runtime
    /// errors, so every degenerate configuration is caught here.
    pub fn validate(&self, player_w: f32, player_h: f32) -> Result<(), String> {
        if !(self.width > 0.0) || !(self.height > 0.0) {
            return Err(format!(
                "room '{}': world size must be positive (got {}x{})",
                self.name, self.width, self.height,
            ));
        }
        if self.width < player_w || self.height < player_h {
            return Err(format!(
                "room '{}': world {}x{} is smaller than the player box {}x{}",
                self.name, self.width, self.height, player_w, player_h,
            ));
        }
        for (i, r) in self.obstacles.rects().iter().enumerate() {
            if !(r.w > 0.0) || !(r.h > 0.0) {
                return Err(format!(
                    "room '{}': obstacle #{i} has degenerate size {}x{}",
                    self.name, r.w, r.h,
                ));
            }
        }
        if self.spawn.x < 0.0 || self.spawn.x > self.width
            || self.spawn.y < 0.0 || self.spawn.y > self.height
        {
            return Err(format!(
                "room '{}': spawn ({}, {}) is outside the world",
                self.name, self.spawn.x, self.spawn.y,
            ));
        }
        if self.obstacles.collides_at(self.spawn, player_w / 2.0, player_h / 2.0) {
            // Every candidate move from a wedged spawn collides, so
            // the player could never leave it.
            return Err(format!(
                "room '{}': spawn ({}, {}) overlaps an obstacle",
                self.name, self.spawn.x, self.spawn.y,
            ));
        }
        if !(self.radius > 0.0) {
            return Err(format!(
                "room '{}': interaction radius must be positive (got {})",
                self.name, self.radius,
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_room_is_valid() {
        let room = Room::default_room();
        assert!(room.validate(64.0, 64.0).is_ok());
        assert_eq!(room.width, 1030.0);
        assert_eq!(room.height, 1450.0);
        assert_eq!(room.obstacles.len(), 15);
        assert_eq!(room.spawn, Vec2::new(515.0, 1450.0));
    }

    #[test]
    fn default_spawn_is_collision_free() {
        let room = Room::default_room();
        assert!(!room.obstacles.collides_at(room.spawn, 32.0, 32.0));
    }

    #[test]
    fn toml_overrides_interaction_point() {
        let def: TomlRoom = toml::from_str(
            "name = \"Test\"\n[interaction]\nx = 100.0\ny = 200.0\nradius = 15.0\n",
        ).unwrap();
        let room = Room::from_toml(def);
        assert_eq!(room.target, Vec2::new(100.0, 200.0));
        assert_eq!(room.radius, 15.0);
        // Obstacles untouched → built-in layout
        assert_eq!(room.obstacles.len(), 15);
    }

    #[test]
    fn toml_explicit_obstacles_replace_builtin() {
        let def: TomlRoom = toml::from_str(
            "[[obstacle]]\nx = 0.0\ny = 0.0\nw = 10.0\nh = 10.0\n",
        ).unwrap();
        let room = Room::from_toml(def);
        assert_eq!(room.obstacles.len(), 1);
    }

    #[test]
    fn in_range_is_inclusive_at_radius() {
        let room = Room::default_room(); // target (700, 250), radius 30
        assert!(room.in_range(Vec2::new(700.0, 250.0)));
        assert!(room.in_range(Vec2::new(730.0, 250.0))); // dist == 30
        assert!(!room.in_range(Vec2::new(735.0, 250.0))); // dist == 35
    }

    #[test]
    fn zero_area_obstacle_rejected() {
        let mut room = Room::default_room();
        room.obstacles = ObstacleSet::new(vec![Rect::new(0.0, 0.0, 0.0, 10.0)]);
        assert!(room.validate(64.0, 64.0).is_err());
    }

    #[test]
    fn world_smaller_than_player_rejected() {
        let mut room = Room::default_room();
        room.width = 32.0;
        assert!(room.validate(64.0, 64.0).is_err());
    }

    #[test]
    fn spawn_outside_world_rejected() {
        let mut room = Room::default_room();
        room.spawn = Vec2::new(-10.0, 100.0);
        assert!(room.validate(64.0, 64.0).is_err());
    }

    #[test]
    fn spawn_inside_obstacle_rejected() {
        let mut room = Room::default_room();
        // Center of the couch: the player box would overlap it and
        // every move out would collide
        room.spawn = Vec2::new(500.0, 1160.0);
        assert!(room.obstacles.collides_at(room.spawn, 32.0, 32.0));
        assert!(room.validate(64.0, 64.0).is_err());
    }

    #[test]
    fn nonpositive_radius_rejected() {
        let mut room = Room::default_room();
        room.radius = 0.0;
        assert!(room.validate(64.0, 64.0).is_err());
    }
}
