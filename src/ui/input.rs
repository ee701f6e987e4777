/// Keyboard input tracker.
///
/// Tracks which direction keys are currently held down, enabling:
///   - Continuous movement while a key is held
///   - Edge-triggered confirm (only fires on initial press)
///
/// Uses crossterm's keyboard enhancement for Release events when
/// available. Falls back to timeout-based release detection on
/// terminals that don't report them.
///
/// The asynchronous key event stream is folded into a `FrameInput`
/// snapshot once per frame; the simulation only ever sees snapshots.

use std::collections::HashMap;
use std::time::{Duration, Instant};

use crossterm::event::{self, Event, KeyCode, KeyEventKind, KeyModifiers, poll};
use crossterm::terminal;

use crate::domain::player::FrameInput;

/// After this duration without a Press/Repeat event, consider the key
/// released. Only used when the terminal doesn't report Release events.
const HOLD_TIMEOUT: Duration = Duration::from_millis(160);

// ── Key bindings ──

const KEYS_LEFT: &[KeyCode] = &[KeyCode::Left, KeyCode::Char('a'), KeyCode::Char('A')];
const KEYS_RIGHT: &[KeyCode] = &[KeyCode::Right, KeyCode::Char('d'), KeyCode::Char('D')];
const KEYS_UP: &[KeyCode] = &[KeyCode::Up, KeyCode::Char('w'), KeyCode::Char('W')];
const KEYS_DOWN: &[KeyCode] = &[KeyCode::Down, KeyCode::Char('s'), KeyCode::Char('S')];
const KEYS_CONFIRM: &[KeyCode] = &[KeyCode::Enter, KeyCode::Char(' ')];

pub struct InputState {
    /// Timestamp of last Press/Repeat event for each key.
    last_active: HashMap<KeyCode, Instant>,

    /// Keys that transitioned from "not held" → "held" during the most
    /// recent drain_events() call. Used for edge-triggered actions.
    fresh_presses: Vec<KeyCode>,

    /// Ctrl+C seen during the most recent drain.
    ctrl_c: bool,

    /// Whether to honor Release events. Only true when keyboard
    /// enhancement is supported by the terminal.
    honor_release: bool,
}

impl InputState {
    pub fn new() -> Self {
        InputState {
            last_active: HashMap::with_capacity(16),
            fresh_presses: Vec::with_capacity(8),
            ctrl_c: false,
            honor_release: terminal::supports_keyboard_enhancement().unwrap_or(false),
        }
    }

    /// Drain all pending terminal events and update key states.
    /// Call this once per frame, before the simulation tick.
    pub fn drain_events(&mut self) {
        self.fresh_presses.clear();
        self.ctrl_c = false;

        // Read all available events without blocking
        while poll(Duration::ZERO).unwrap_or(false) {
            match event::read() {
                Ok(Event::Key(key)) => {
                    if key.modifiers.contains(KeyModifiers::CONTROL)
                        && (key.code == KeyCode::Char('c') || key.code == KeyCode::Char('C'))
                    {
                        self.ctrl_c = true;
                    }

                    match key.kind {
                        KeyEventKind::Release if self.honor_release => {
                            self.last_active.remove(&key.code);
                        }
                        KeyEventKind::Release => {
                            // Enhancement not supported: rely on the
                            // timeout-based expiry instead
                        }
                        _ => {
                            // Press or Repeat: active key input
                            let was_held = self.is_held(key.code);
                            self.last_active.insert(key.code, Instant::now());
                            if !was_held {
                                self.fresh_presses.push(key.code);
                            }
                        }
                    }
                }
                _ => {}
            }
        }

        // Expire keys that timed out (terminals without Release events)
        let now = Instant::now();
        self.last_active.retain(|_, t| now.duration_since(*t) < HOLD_TIMEOUT);
    }

    /// Fold the current key states into a per-tick snapshot.
    /// Direction flags are level-triggered; `interact` is an edge.
    pub fn snapshot(&self) -> FrameInput {
        FrameInput {
            left: self.any_active(KEYS_LEFT),
            right: self.any_active(KEYS_RIGHT),
            up: self.any_active(KEYS_UP),
            down: self.any_active(KEYS_DOWN),
            interact: self.any_pressed(KEYS_CONFIRM),
        }
    }

    /// Was any of these keys freshly pressed this frame? (edge trigger)
    pub fn any_pressed(&self, codes: &[KeyCode]) -> bool {
        codes.iter().any(|c| self.fresh_presses.contains(c))
    }

    pub fn confirm_pressed(&self) -> bool {
        self.any_pressed(KEYS_CONFIRM)
    }

    pub fn esc_pressed(&self) -> bool {
        self.any_pressed(&[KeyCode::Esc])
    }

    pub fn ctrl_c_pressed(&self) -> bool {
        self.ctrl_c
    }

    /// Swallow the current confirm edge. Called when the phase machine
    /// acts on a confirm press, so the same press does not also read as
    /// `interact` in this frame's snapshot.
    pub fn consume_confirm(&mut self) {
        self.fresh_presses.retain(|c| !KEYS_CONFIRM.contains(c));
    }

    // ── Internal ──

    fn is_held(&self, code: KeyCode) -> bool {
        self.last_active.get(&code)
            .map(|t| t.elapsed() < HOLD_TIMEOUT)
            .unwrap_or(false)
    }

    /// Held, or freshly pressed this frame (so a tap shorter than one
    /// frame still moves the player for a tick).
    fn any_active(&self, codes: &[KeyCode]) -> bool {
        codes.iter().any(|c| self.is_held(*c) || self.fresh_presses.contains(c))
    }
}
