/// Sprite selection with animation-restart suppression.
///
/// The renderer swaps a looping walk animation per direction; swapping
/// to the image already shown would restart the loop. The selector
/// therefore reports a key only on transitions and stays silent while
/// the resolved key is unchanged.
///
/// Precedence is a fixed total order, horizontal before vertical:
/// Left, Right, Up, Down, Idle. Diagonal movement resolves to the
/// horizontal component (a diagonal walk shows the left/right sprite).

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum SpriteKey {
    Idle,
    Left,
    Right,
    Up,
    Down,
}

impl SpriteKey {
    /// Map an intended direction vector to a sprite key.
    /// `dx`/`dy` reflect intent (pre-collision), so a player pushing
    /// into a wall still gets the walking sprite for that direction.
    pub fn for_direction(dx: f32, dy: f32) -> SpriteKey {
        if dx < 0.0 {
            SpriteKey::Left
        } else if dx > 0.0 {
            SpriteKey::Right
        } else if dy < 0.0 {
            SpriteKey::Up
        } else if dy > 0.0 {
            SpriteKey::Down
        } else {
            SpriteKey::Idle
        }
    }
}

/// Retains the last resolved key across ticks; `select` is the only
/// mutation point.
#[derive(Clone, Debug)]
pub struct SpriteSelector {
    current: SpriteKey,
}

impl SpriteSelector {
    pub fn new() -> Self {
        SpriteSelector { current: SpriteKey::Idle }
    }

    pub fn current(&self) -> SpriteKey {
        self.current
    }

    /// Resolve the key for `(dx, dy)` and return `Some(key)` only when
    /// it differs from the previous tick's key. No-op otherwise.
    pub fn select(&mut self, dx: f32, dy: f32) -> Option<SpriteKey> {
        let key = SpriteKey::for_direction(dx, dy);
        if key == self.current {
            return None;
        }
        self.current = key;
        Some(key)
    }
}
