//! Timer engine implementation.
//!
//! The engine is a tick-driven state machine: it holds no thread and no
//! clock of its own. The caller fires `tick()` once per second while the
//! timer is running; the countdown is authoritative, so pausing never
//! changes the duration a completed phase reports.
//!
//! ## State Transitions
//!
//! ```text
//! Idle -> Running <-> Paused
//!           |
//!           v  (seconds_remaining hits 0)
//!         Paused + awaiting_decision -> resolve_completion -> Running
//! ```
//!
//! A completed countdown is not a rest state: the engine parks in `Paused`
//! with `awaiting_decision` set and stays there until the host resolves the
//! continue/restart choice. Both choices go straight back to `Running`;
//! declining to switch phases restarts the phase that just finished.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::preset::{Phase, Preset};
use crate::events::Event;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TimerStatus {
    Idle,
    Running,
    Paused,
}

/// Core timer state machine.
///
/// Serializable so a host can persist it between invocations.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TimerEngine {
    preset: Preset,
    phase: Phase,
    status: TimerStatus,
    seconds_total: u32,
    seconds_remaining: u32,
    /// Set when a countdown finished and the continue/restart choice is
    /// still pending. Suspends ticking.
    #[serde(default)]
    awaiting_decision: bool,
    /// Whether a completed phase should request the notification chime.
    #[serde(default)]
    chime_enabled: bool,
    /// Wall-clock start of the current run. Bookkeeping only; the countdown
    /// is the tick-down, not elapsed time.
    #[serde(default)]
    started_at: Option<DateTime<Utc>>,
}

impl TimerEngine {
    /// Create an idle Work-phase engine from a preset.
    pub fn new(preset: Preset) -> Self {
        let seconds_total = preset.duration_secs(Phase::Work);
        Self {
            preset,
            phase: Phase::Work,
            status: TimerStatus::Idle,
            seconds_total,
            seconds_remaining: seconds_total,
            awaiting_decision: false,
            chime_enabled: true,
            started_at: None,
        }
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn status(&self) -> TimerStatus {
        self.status
    }

    pub fn seconds_remaining(&self) -> u32 {
        self.seconds_remaining
    }

    pub fn seconds_total(&self) -> u32 {
        self.seconds_total
    }

    pub fn awaiting_decision(&self) -> bool {
        self.awaiting_decision
    }

    pub fn preset(&self) -> &Preset {
        &self.preset
    }

    /// 0.0 .. 1.0 progress through the current phase.
    pub fn progress(&self) -> f64 {
        if self.seconds_total == 0 {
            return 0.0;
        }
        1.0 - (self.seconds_remaining as f64 / self.seconds_total as f64)
    }

    /// Build a full state snapshot event.
    pub fn snapshot(&self) -> Event {
        Event::StateSnapshot {
            phase: self.phase,
            status: self.status,
            awaiting_decision: self.awaiting_decision,
            preset: self.preset.id.clone(),
            seconds_remaining: self.seconds_remaining,
            seconds_total: self.seconds_total,
            progress: self.progress(),
            at: Utc::now(),
        }
    }

    // ── Commands ─────────────────────────────────────────────────────

    pub fn set_chime_enabled(&mut self, enabled: bool) {
        self.chime_enabled = enabled;
    }

    pub fn start(&mut self) -> Option<Event> {
        if self.awaiting_decision {
            // A finished countdown is resolved via resolve_completion.
            return None;
        }
        match self.status {
            TimerStatus::Idle | TimerStatus::Paused => {
                self.status = TimerStatus::Running;
                self.started_at.get_or_insert_with(Utc::now);
                Some(Event::TimerStarted {
                    phase: self.phase,
                    seconds_total: self.seconds_total,
                    at: Utc::now(),
                })
            }
            TimerStatus::Running => None, // Already running.
        }
    }

    pub fn pause(&mut self) -> Option<Event> {
        match self.status {
            TimerStatus::Running => {
                self.status = TimerStatus::Paused;
                Some(Event::TimerPaused {
                    seconds_remaining: self.seconds_remaining,
                    at: Utc::now(),
                })
            }
            _ => None,
        }
    }

    /// Advance the countdown by one second. Call once per second while
    /// running; returns `Some(Event::PhaseCompleted)` when the countdown
    /// reaches zero.
    ///
    /// Only a Work-phase completion should be recorded as a session; the
    /// event's `duration_min` is the configured total in whole minutes.
    pub fn tick(&mut self) -> Option<Event> {
        if self.status != TimerStatus::Running {
            return None;
        }
        self.seconds_remaining = self.seconds_remaining.saturating_sub(1);
        if self.seconds_remaining > 0 {
            return None;
        }
        self.status = TimerStatus::Paused;
        self.awaiting_decision = true;
        self.started_at = None;
        Some(Event::PhaseCompleted {
            phase: self.phase,
            duration_min: self.seconds_total / 60,
            chime: self.chime_enabled,
            at: Utc::now(),
        })
    }

    /// Reload the current phase's full duration without changing phase.
    pub fn reset(&mut self) -> Option<Event> {
        self.status = TimerStatus::Paused;
        self.awaiting_decision = false;
        self.started_at = None;
        self.load_phase(self.phase);
        Some(Event::TimerReset {
            phase: self.phase,
            seconds_total: self.seconds_total,
            at: Utc::now(),
        })
    }

    /// Switch to the given phase and load its duration, without starting.
    pub fn set_phase(&mut self, phase: Phase) -> Option<Event> {
        self.status = TimerStatus::Paused;
        self.awaiting_decision = false;
        self.started_at = None;
        self.load_phase(phase);
        Some(Event::PhaseSwitched {
            phase: self.phase,
            seconds_total: self.seconds_total,
            at: Utc::now(),
        })
    }

    /// Change the active preset and re-derive the current phase's
    /// durations, without starting.
    pub fn set_preset(&mut self, preset: Preset) -> Option<Event> {
        self.preset = preset;
        self.status = TimerStatus::Paused;
        self.awaiting_decision = false;
        self.started_at = None;
        self.load_phase(self.phase);
        Some(Event::PresetChanged {
            preset: self.preset.id.clone(),
            phase: self.phase,
            seconds_total: self.seconds_total,
            at: Utc::now(),
        })
    }

    /// Resolve the pending continue/restart choice after a completion.
    ///
    /// `continue_on = true` flips the phase; `false` restarts the phase
    /// that just finished. Either way the timer immediately runs again with
    /// that phase's full configured duration.
    pub fn resolve_completion(&mut self, continue_on: bool) -> Option<Event> {
        if !self.awaiting_decision {
            return None;
        }
        self.awaiting_decision = false;
        let next = if continue_on {
            self.phase.flipped()
        } else {
            self.phase
        };
        self.load_phase(next);
        self.status = TimerStatus::Running;
        self.started_at = Some(Utc::now());
        Some(Event::TimerStarted {
            phase: self.phase,
            seconds_total: self.seconds_total,
            at: Utc::now(),
        })
    }

    // ── Internal ─────────────────────────────────────────────────────

    fn load_phase(&mut self, phase: Phase) {
        self.phase = phase;
        self.seconds_total = self.preset.duration_secs(phase);
        self.seconds_remaining = self.seconds_total;
    }
}

impl Default for TimerEngine {
    fn default() -> Self {
        Self::new(Preset::default())
    }
}
