mod engine;
mod preset;

pub use engine::{TimerEngine, TimerStatus};
pub use preset::{
    validate_durations, Phase, Preset, BREAK_MAX, BREAK_MIN, DEFAULT_PRESET_ID, WORK_MAX, WORK_MIN,
};
