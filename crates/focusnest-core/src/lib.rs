//! # Focusnest Core Library
//!
//! Core business logic for Focusnest, a personal productivity app built
//! around a pomodoro-style focus timer, a task list, weekly statistics and
//! achievements. The CLI binary is a thin layer over this crate.
//!
//! ## Architecture
//!
//! - **Timer Engine**: a tick-driven state machine; the host fires
//!   `tick()` once per second while running
//! - **Store**: SQLite row store mirroring the hosted backend's tables,
//!   scoped to the signed-in user, with degraded-mode reads when a table
//!   is absent
//! - **Session Recorder**: bridges work-phase completions to the store and
//!   runs the host's refresh callback
//! - **Stats**: 7-day-trailing aggregation behind a time-boxed per-user
//!   cache with an injectable clock
//!
//! ## Key Components
//!
//! - [`TimerEngine`]: core timer state machine
//! - [`StoreClient`]: tasks, profiles, focus sessions, achievements
//! - [`SessionRecorder`]: record-a-completed-session operation
//! - [`StatsCache`]: memoized weekly stats
//! - [`Config`]: preset, sound and daily-target preferences

pub mod config;
pub mod error;
pub mod events;
pub mod session;
pub mod stats;
pub mod store;
pub mod timer;

pub use config::Config;
pub use error::{ConfigError, CoreError, StoreError, ValidationError};
pub use events::Event;
pub use session::{RecordOutcome, SessionRecorder};
pub use stats::{aggregate_weekly, Clock, StatsCache, StatsSource, SystemClock, WeeklyStats};
pub use store::{Achievement, FocusSession, Priority, Profile, StoreClient, Task, TaskColor, TaskUpdate};
pub use timer::{Phase, Preset, TimerEngine, TimerStatus};
