/// Events emitted during a simulation step.
/// The presentation layer consumes these; the step itself never
/// touches the terminal.

use crate::domain::sprite::SpriteKey;

#[derive(Clone, Copy, PartialEq, Debug)]
pub enum TickEvent {
    /// The resolved sprite key changed this tick. Emitted only on
    /// transitions so the renderer never restarts a looping animation.
    SpriteChanged(SpriteKey),
    /// The player entered interaction range of the target point.
    AffordanceShown,
    /// The player left interaction range.
    AffordanceHidden,
    /// Confirm pressed while in range: switch to the next scene.
    TransitionRequested,
}
