//! Focus timer commands.
//!
//! The engine is persisted as JSON in the store's kv table between
//! invocations, so `start`, `tick` and `status` compose from separate
//! processes. `run` drives the countdown in-process at one tick per second
//! and records completed work phases without blocking the countdown.

use std::io::Write as _;

use clap::Subcommand;
use focusnest_core::{
    Config, CoreError, Event, Phase, SessionRecorder, StatsCache, StoreClient, TimerEngine,
};

const ENGINE_KEY: &str = "timer_engine";

#[derive(Subcommand)]
pub enum TimerAction {
    /// Start or resume the countdown
    Start,
    /// Pause the countdown
    Pause,
    /// Reset the current phase to its full duration
    Reset,
    /// Advance the countdown by one second
    Tick,
    /// Print current timer state as JSON
    Status,
    /// Switch to the work or break phase
    Phase {
        /// "work" or "break"
        phase: String,
    },
    /// Switch the active preset
    Preset {
        /// Preset id: 15-2, 25-5, 50-10 or custom
        id: String,
    },
    /// After a completed phase: move on to the next phase
    Continue,
    /// After a completed phase: redo the same phase
    Later,
    /// Run the countdown interactively until quit
    Run,
}

fn load_engine(store: &StoreClient, config: &Config) -> TimerEngine {
    if let Ok(Some(json)) = store.kv_get(ENGINE_KEY) {
        if let Ok(engine) = serde_json::from_str::<TimerEngine>(&json) {
            return engine;
        }
    }
    let mut engine = TimerEngine::new(config.preset());
    engine.set_chime_enabled(config.notifications.sound_enabled);
    engine
}

fn save_engine(store: &StoreClient, engine: &TimerEngine) -> Result<(), Box<dyn std::error::Error>> {
    let json = serde_json::to_string(engine)?;
    store.kv_set(ENGINE_KEY, &json)?;
    Ok(())
}

fn print_event(event: &Event) -> Result<(), Box<dyn std::error::Error>> {
    println!("{}", serde_json::to_string_pretty(event)?);
    Ok(())
}

pub fn run(action: TimerAction) -> Result<(), Box<dyn std::error::Error>> {
    let store = StoreClient::open()?;
    let config = Config::load_or_default();
    let mut engine = load_engine(&store, &config);

    match action {
        TimerAction::Start => {
            if let Some(event) = engine.start() {
                print_event(&event)?;
            } else {
                print_event(&engine.snapshot())?;
            }
        }
        TimerAction::Pause => {
            if let Some(event) = engine.pause() {
                print_event(&event)?;
            } else {
                print_event(&engine.snapshot())?;
            }
        }
        TimerAction::Reset => {
            if let Some(event) = engine.reset() {
                print_event(&event)?;
            }
        }
        TimerAction::Tick => {
            if let Some(event) = engine.tick() {
                print_event(&event)?;
                handle_completion(&store, &event);
            } else {
                print_event(&engine.snapshot())?;
            }
        }
        TimerAction::Status => {
            print_event(&engine.snapshot())?;
        }
        TimerAction::Phase { phase } => {
            let phase = match phase.as_str() {
                "work" => Phase::Work,
                "break" => Phase::Break,
                other => return Err(format!("unknown phase: {other} (use work or break)").into()),
            };
            if let Some(event) = engine.set_phase(phase) {
                print_event(&event)?;
            }
        }
        TimerAction::Preset { id } => {
            let preset = config
                .preset_by_id(&id)
                .ok_or_else(|| format!("unknown preset: {id} (use 15-2, 25-5, 50-10 or custom)"))?;
            if let Some(event) = engine.set_preset(preset) {
                print_event(&event)?;
            }
        }
        TimerAction::Continue => match engine.resolve_completion(true) {
            Some(event) => print_event(&event)?,
            None => return Err("no completed phase awaiting a decision".into()),
        },
        TimerAction::Later => match engine.resolve_completion(false) {
            Some(event) => print_event(&event)?,
            None => return Err("no completed phase awaiting a decision".into()),
        },
        TimerAction::Run => {
            let rt = tokio::runtime::Runtime::new()?;
            rt.block_on(run_interactive(&store, &mut engine))?;
        }
    }

    save_engine(&store, &engine)?;
    Ok(())
}

/// React to a tick that completed a phase: record work sessions, never
/// break phases. A failed record is reported and dropped; the timer state
/// is already past the completion and stays that way.
fn handle_completion(store: &StoreClient, event: &Event) {
    let Event::PhaseCompleted {
        phase: Phase::Work,
        duration_min,
        ..
    } = event
    else {
        return;
    };
    record_session(store, *duration_min);
}

fn record_session(store: &StoreClient, duration_min: u32) {
    let recorder = SessionRecorder::new(store);
    let result = recorder.record_with_refresh(duration_min as i64, || {
        let user = store.current_user()?;
        let mut cache = StatsCache::new();
        cache.refresh(store, user)?;
        Ok(())
    });
    match result {
        Ok(outcome) => {
            let event = Event::SessionRecorded {
                session_id: outcome.session.id,
                duration_min: outcome.session.duration_min,
                at: outcome.session.created_at,
            };
            if let Ok(json) = serde_json::to_string_pretty(&event) {
                println!("{json}");
            }
            if let Some(err) = outcome.refresh_error {
                eprintln!("warning: stats refresh failed: {err}");
            }
        }
        Err(CoreError::Store(e)) => eprintln!("{}", e.user_message()),
        Err(e) => eprintln!("error: {e}"),
    }
}

/// Countdown loop: one tick per second, a chime and a continue/redo prompt
/// at each phase boundary. Recording runs on a blocking worker so the
/// prompt appears immediately.
async fn run_interactive(
    store: &StoreClient,
    engine: &mut TimerEngine,
) -> Result<(), Box<dyn std::error::Error>> {
    // A decision left over from a previous invocation blocks ticking;
    // settle it before entering the countdown.
    if engine.awaiting_decision() {
        let next = engine.phase().flipped();
        match prompt_decision(next).await? {
            Decision::Continue => {
                engine.resolve_completion(true);
            }
            Decision::Later => {
                engine.resolve_completion(false);
            }
            Decision::Quit => return Ok(()),
        }
    }
    engine.start();

    let mut interval = tokio::time::interval(std::time::Duration::from_secs(1));
    interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);

    loop {
        interval.tick().await;

        let completed = engine.tick();
        print!(
            "\r{} {:02}:{:02}  ",
            match engine.phase() {
                Phase::Work => "work ",
                Phase::Break => "break",
            },
            engine.seconds_remaining() / 60,
            engine.seconds_remaining() % 60,
        );
        std::io::stdout().flush()?;

        let Some(event) = completed else {
            continue;
        };
        println!();

        if let Event::PhaseCompleted {
            phase,
            duration_min,
            chime,
            ..
        } = event
        {
            if chime {
                tokio::spawn(chime_twice());
            }
            if phase == Phase::Work {
                let duration = duration_min;
                tokio::task::spawn_blocking(move || match StoreClient::open() {
                    Ok(store) => record_session(&store, duration),
                    Err(e) => eprintln!("error: {e}"),
                });
                println!("Work phase complete ({duration_min} min).");
            } else {
                println!("Break complete ({duration_min} min).");
            }

            let next = engine.phase().flipped();
            match prompt_decision(next).await? {
                Decision::Continue => {
                    engine.resolve_completion(true);
                }
                Decision::Later => {
                    engine.resolve_completion(false);
                }
                Decision::Quit => {
                    save_engine(store, engine)?;
                    return Ok(());
                }
            }
            save_engine(store, engine)?;
        }
    }
}

enum Decision {
    Continue,
    Later,
    Quit,
}

async fn prompt_decision(next: Phase) -> Result<Decision, Box<dyn std::error::Error>> {
    let label = match next {
        Phase::Work => "work",
        Phase::Break => "break",
    };
    print!("Continue to {label}? [Y]es / [l]ater / [q]uit: ");
    std::io::stdout().flush()?;

    let line = tokio::task::spawn_blocking(|| {
        let mut line = String::new();
        std::io::stdin().read_line(&mut line).map(|_| line)
    })
    .await??;

    Ok(match line.trim().to_lowercase().as_str() {
        "l" | "later" => Decision::Later,
        "q" | "quit" => Decision::Quit,
        _ => Decision::Continue,
    })
}

/// Two terminal bells roughly half a second apart.
async fn chime_twice() {
    print!("\x07");
    let _ = std::io::stdout().flush();
    tokio::time::sleep(std::time::Duration::from_millis(500)).await;
    print!("\x07");
    let _ = std::io::stdout().flush();
}
