/// Entry point and game loop.

mod config;
mod domain;
mod sim;
mod ui;

use std::time::{Duration, Instant};

use crossterm::event::KeyCode;

use config::GameConfig;
use sim::event::TickEvent;
use sim::room::Room;
use sim::step;
use sim::world::{Phase, WorldState};
use ui::gamepad::GamepadState;
use ui::input::InputState;
use ui::renderer::Renderer;

const FRAME_SLEEP: Duration = Duration::from_millis(5);

const KEYS_QUIT: &[KeyCode] = &[KeyCode::Char('q'), KeyCode::Char('Q')];

fn main() {
    let config = GameConfig::load();
    if let Err(e) = config.validate() {
        eprintln!("Invalid config.toml: {e}");
        std::process::exit(1);
    }

    // Degenerate rooms are rejected here, before the terminal enters
    // raw mode. The simulation itself has no runtime error path.
    let room = Room::load(&config);
    if let Err(e) = room.validate(config.movement.player_w, config.movement.player_h) {
        eprintln!("Invalid room: {e}");
        std::process::exit(1);
    }

    let mut world = WorldState::new(room, &config);

    let mut renderer = Renderer::new();
    if let Err(e) = renderer.init() {
        eprintln!("Terminal init failed: {e}");
        return;
    }

    let result = game_loop(&mut world, &mut renderer, &config);

    if let Err(e) = renderer.cleanup() {
        eprintln!("Terminal cleanup failed: {e}");
    }

    if let Err(e) = result {
        eprintln!("Game error: {e}");
    }

    println!();
    println!("Thanks for walking the {}!", world.room.name);
}

fn game_loop(
    world: &mut WorldState,
    renderer: &mut Renderer,
    config: &GameConfig,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut kb = InputState::new();
    let mut gp = GamepadState::new();
    gp.load_button_config(&config.gamepad);
    let mut last_frame = Instant::now();

    loop {
        kb.drain_events();
        gp.update();

        if kb.ctrl_c_pressed() {
            break;
        }
        if handle_meta(world, &mut kb, &mut gp) {
            break;
        }

        // Wall-clock time since the previous frame drives the step, so
        // walk speed is independent of frame rate.
        let dt = last_frame.elapsed().as_secs_f32();
        last_frame = Instant::now();

        if world.phase == Phase::Playing {
            let mut input = kb.snapshot();
            gp.merge_into(&mut input);
            let events = step::step(world, input, dt);
            process_events(world, &events);
        }

        renderer.render(world)?;
        std::thread::sleep(FRAME_SLEEP);
    }

    Ok(())
}

/// Fold tick events into the surrounding state machine. Sprite and
/// affordance events need nothing here: the renderer reads the retained
/// state each frame, and the events exist for presentations that want
/// to react only to transitions.
fn process_events(world: &mut WorldState, events: &[TickEvent]) {
    for event in events {
        match event {
            TickEvent::TransitionRequested => {
                world.phase = Phase::NextScene;
            }
            TickEvent::SpriteChanged(_)
            | TickEvent::AffordanceShown
            | TickEvent::AffordanceHidden => {}
        }
    }
}

/// Phase handling outside the simulation: title and next-scene screens,
/// plus quitting. Returns true to exit the loop.
fn handle_meta(world: &mut WorldState, kb: &mut InputState, gp: &mut GamepadState) -> bool {
    let confirm = kb.confirm_pressed() || gp.confirm_pressed();
    let esc = kb.esc_pressed() || gp.cancel_pressed();

    match world.phase {
        // ── Title Screen ──
        Phase::Title => {
            if confirm {
                // Don't let the same press read as interact on the
                // first Playing tick.
                kb.consume_confirm();
                gp.consume_confirm();
                world.reset();
                world.phase = Phase::Playing;
                world.set_message("Find the glowing spot", 400);
            } else if esc || kb.any_pressed(KEYS_QUIT) {
                return true;
            }
        }

        // ── Playing ──
        Phase::Playing => {
            // Confirm doubles as the interact key here; it reaches the
            // step through the input snapshot instead.
            if esc {
                world.phase = Phase::Title;
            }
        }

        // ── Next Scene ──
        Phase::NextScene => {
            if confirm {
                kb.consume_confirm();
                gp.consume_confirm();
                world.reset();
                world.phase = Phase::Playing;
            } else if esc || kb.any_pressed(KEYS_QUIT) {
                return true;
            }
        }
    }

    false
}
