use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::timer::{Phase, TimerStatus};

/// Every timer state change produces an Event.
/// The CLI prints them as JSON; hosts react to `PhaseCompleted`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Event {
    TimerStarted {
        phase: Phase,
        seconds_total: u32,
        at: DateTime<Utc>,
    },
    TimerPaused {
        seconds_remaining: u32,
        at: DateTime<Utc>,
    },
    TimerReset {
        phase: Phase,
        seconds_total: u32,
        at: DateTime<Utc>,
    },
    /// A countdown reached zero. `duration_min` is the configured total for
    /// the finished phase, not wall-clock elapsed time. `chime` asks the
    /// host to play the notification sound.
    PhaseCompleted {
        phase: Phase,
        duration_min: u32,
        chime: bool,
        at: DateTime<Utc>,
    },
    PhaseSwitched {
        phase: Phase,
        seconds_total: u32,
        at: DateTime<Utc>,
    },
    PresetChanged {
        preset: String,
        phase: Phase,
        seconds_total: u32,
        at: DateTime<Utc>,
    },
    /// A work session was durably recorded.
    SessionRecorded {
        session_id: Uuid,
        duration_min: u32,
        at: DateTime<Utc>,
    },
    StateSnapshot {
        phase: Phase,
        status: TimerStatus,
        awaiting_decision: bool,
        preset: String,
        seconds_remaining: u32,
        seconds_total: u32,
        progress: f64,
        at: DateTime<Utc>,
    },
}
