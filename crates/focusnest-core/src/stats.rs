//! Weekly statistics: aggregation over the trailing seven days plus a
//! time-boxed per-user cache.
//!
//! The cache replaces the original ambient module-level memoization with an
//! explicit object owning its clock and freshness window, so tests can
//! drive expiry with a fake clock. Entries are never invalidated on write;
//! staleness is purely time-based. Callers that need immediate consistency
//! after a mutation use `refresh`, which bypasses the freshness check and
//! re-primes the entry.

use std::collections::{BTreeMap, HashMap};

use chrono::{DateTime, Datelike, Duration, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::StoreError;
use crate::store::{FocusSession, StoreClient, Task};

/// Three-letter weekday labels, Sunday first (bucket order for
/// `daily_completions`).
pub const WEEKDAY_LABELS: [&str; 7] = ["Sun", "Mon", "Tue", "Wed", "Thu", "Fri", "Sat"];

/// How long a cached value stays fresh.
pub const FRESHNESS_WINDOW_SECS: i64 = 5 * 60;

/// Derived 7-day-trailing summary. Recomputed from raw rows on each cache
/// miss, never stored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WeeklyStats {
    pub completed_tasks: u64,
    pub focus_sessions: u64,
    pub focus_minutes: u64,
    /// Completed-task counts bucketed by the task's creation weekday.
    /// Always contains all seven labels.
    pub daily_completions: BTreeMap<String, u64>,
}

impl WeeklyStats {
    /// All-zero stats with every weekday bucket present.
    pub fn zeroed() -> Self {
        Self {
            completed_tasks: 0,
            focus_sessions: 0,
            focus_minutes: 0,
            daily_completions: WEEKDAY_LABELS
                .iter()
                .map(|d| (d.to_string(), 0))
                .collect(),
        }
    }
}

/// Source of the raw rows the aggregation reads. `StoreClient` is the real
/// one; tests substitute counting fakes.
pub trait StatsSource {
    fn completed_tasks_since(
        &self,
        user: Uuid,
        since: DateTime<Utc>,
    ) -> Result<Vec<Task>, StoreError>;

    fn sessions_since(
        &self,
        user: Uuid,
        since: DateTime<Utc>,
    ) -> Result<Vec<FocusSession>, StoreError>;
}

impl StatsSource for StoreClient {
    fn completed_tasks_since(
        &self,
        user: Uuid,
        since: DateTime<Utc>,
    ) -> Result<Vec<Task>, StoreError> {
        StoreClient::completed_tasks_since(self, user, since)
    }

    fn sessions_since(
        &self,
        user: Uuid,
        since: DateTime<Utc>,
    ) -> Result<Vec<FocusSession>, StoreError> {
        StoreClient::sessions_since(self, user, since)
    }
}

/// Compute weekly stats over `[now - 7d, now]`.
///
/// A structurally absent table yields zeroed stats so the dashboard always
/// has something to render; other store failures propagate.
pub fn aggregate_weekly(
    source: &dyn StatsSource,
    user: Uuid,
    now: DateTime<Utc>,
) -> Result<WeeklyStats, StoreError> {
    let since = now - Duration::days(7);

    let tasks = match source.completed_tasks_since(user, since) {
        Ok(tasks) => tasks,
        Err(StoreError::SchemaMissing { .. }) => return Ok(WeeklyStats::zeroed()),
        Err(e) => return Err(e),
    };
    let sessions = match source.sessions_since(user, since) {
        Ok(sessions) => sessions,
        Err(StoreError::SchemaMissing { .. }) => return Ok(WeeklyStats::zeroed()),
        Err(e) => return Err(e),
    };

    let mut stats = WeeklyStats::zeroed();
    stats.completed_tasks = tasks.len() as u64;
    stats.focus_sessions = sessions.len() as u64;
    stats.focus_minutes = sessions.iter().map(|s| s.duration_min as u64).sum();

    for task in &tasks {
        let label = WEEKDAY_LABELS[task.created_at.weekday().num_days_from_sunday() as usize];
        *stats.daily_completions.entry(label.to_string()).or_insert(0) += 1;
    }

    Ok(stats)
}

/// Injectable time source for the cache.
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

/// Wall-clock time.
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

#[derive(Debug, Clone)]
struct CacheEntry {
    stats: WeeklyStats,
    fetched_at: DateTime<Utc>,
}

/// Per-user memoization of `WeeklyStats` with a fixed freshness window.
pub struct StatsCache {
    freshness: Duration,
    clock: Box<dyn Clock>,
    entries: HashMap<Uuid, CacheEntry>,
}

impl StatsCache {
    /// Cache with the standard 5-minute window and the system clock.
    pub fn new() -> Self {
        Self::with_clock(Duration::seconds(FRESHNESS_WINDOW_SECS), Box::new(SystemClock))
    }

    pub fn with_clock(freshness: Duration, clock: Box<dyn Clock>) -> Self {
        Self {
            freshness,
            clock,
            entries: HashMap::new(),
        }
    }

    /// Cached stats if fresh, otherwise recompute and cache.
    pub fn fetch(
        &mut self,
        source: &dyn StatsSource,
        user: Uuid,
    ) -> Result<WeeklyStats, StoreError> {
        let now = self.clock.now();
        if let Some(entry) = self.entries.get(&user) {
            if now - entry.fetched_at < self.freshness {
                return Ok(entry.stats.clone());
            }
        }
        self.fetch_and_store(source, user, now)
    }

    /// Recompute regardless of freshness, re-priming the cache entry. Used
    /// after a mutation (e.g. a freshly recorded session) where serving the
    /// cached value would be visibly stale.
    pub fn refresh(
        &mut self,
        source: &dyn StatsSource,
        user: Uuid,
    ) -> Result<WeeklyStats, StoreError> {
        let now = self.clock.now();
        self.fetch_and_store(source, user, now)
    }

    fn fetch_and_store(
        &mut self,
        source: &dyn StatsSource,
        user: Uuid,
        now: DateTime<Utc>,
    ) -> Result<WeeklyStats, StoreError> {
        let stats = aggregate_weekly(source, user, now)?;
        self.entries.insert(
            user,
            CacheEntry {
                stats: stats.clone(),
                fetched_at: now,
            },
        );
        Ok(stats)
    }
}

impl Default for StatsCache {
    fn default() -> Self {
        Self::new()
    }
}
