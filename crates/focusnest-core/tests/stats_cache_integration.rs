//! Integration tests for the weekly-stats cache.
//!
//! Uses a hand-advanced clock and a query-counting source to pin down the
//! freshness behavior: a fresh entry is served without touching the store,
//! expiry triggers exactly one recompute, and `refresh` always bypasses
//! the window.

use std::cell::Cell;
use std::sync::{Arc, Mutex};

use chrono::{DateTime, Duration, Utc};
use focusnest_core::{
    Clock, FocusSession, StatsCache, StatsSource, StoreClient, StoreError, Task, WeeklyStats,
};
use uuid::Uuid;

/// Clock whose current time is set by the test.
#[derive(Clone)]
struct ManualClock {
    now: Arc<Mutex<DateTime<Utc>>>,
}

impl ManualClock {
    fn new(start: DateTime<Utc>) -> Self {
        Self {
            now: Arc::new(Mutex::new(start)),
        }
    }

    fn advance(&self, by: Duration) {
        let mut now = self.now.lock().unwrap();
        *now = *now + by;
    }
}

impl Clock for ManualClock {
    fn now(&self) -> DateTime<Utc> {
        *self.now.lock().unwrap()
    }
}

/// Wraps a real store and counts how often each query runs.
struct CountingSource {
    store: StoreClient,
    task_queries: Cell<u32>,
    session_queries: Cell<u32>,
}

impl CountingSource {
    fn new(store: StoreClient) -> Self {
        Self {
            store,
            task_queries: Cell::new(0),
            session_queries: Cell::new(0),
        }
    }

    fn queries(&self) -> (u32, u32) {
        (self.task_queries.get(), self.session_queries.get())
    }
}

impl StatsSource for CountingSource {
    fn completed_tasks_since(
        &self,
        user: Uuid,
        since: DateTime<Utc>,
    ) -> Result<Vec<Task>, StoreError> {
        self.task_queries.set(self.task_queries.get() + 1);
        self.store.completed_tasks_since(user, since)
    }

    fn sessions_since(
        &self,
        user: Uuid,
        since: DateTime<Utc>,
    ) -> Result<Vec<FocusSession>, StoreError> {
        self.session_queries.set(self.session_queries.get() + 1);
        self.store.sessions_since(user, since)
    }
}

fn populated_source() -> (CountingSource, Uuid) {
    let store = StoreClient::open_memory().unwrap();
    let profile = store.sign_in("cache@example.com").unwrap();
    let task = store.create_task("Ship it", vec![], None, None).unwrap();
    store.set_task_completed(task.id, true).unwrap();
    store.record_session(25).unwrap();
    (CountingSource::new(store), profile.id)
}

#[test]
fn fresh_entry_is_served_without_a_store_query() {
    let (source, user) = populated_source();
    let clock = ManualClock::new(Utc::now());
    let mut cache = StatsCache::with_clock(Duration::minutes(5), Box::new(clock.clone()));

    let first = cache.fetch(&source, user).unwrap();
    assert_eq!(source.queries(), (1, 1));

    // Just inside the window: same value, no new queries.
    clock.advance(Duration::minutes(4) + Duration::seconds(59));
    let second = cache.fetch(&source, user).unwrap();
    assert_eq!(second, first);
    assert_eq!(source.queries(), (1, 1));
}

#[test]
fn expired_entry_triggers_one_recompute() {
    let (source, user) = populated_source();
    let clock = ManualClock::new(Utc::now());
    let mut cache = StatsCache::with_clock(Duration::minutes(5), Box::new(clock.clone()));

    cache.fetch(&source, user).unwrap();
    clock.advance(Duration::minutes(5));
    cache.fetch(&source, user).unwrap();
    assert_eq!(source.queries(), (2, 2));

    // The recompute re-primed the entry.
    cache.fetch(&source, user).unwrap();
    assert_eq!(source.queries(), (2, 2));
}

#[test]
fn refresh_bypasses_freshness_and_reprimes() {
    let (source, user) = populated_source();
    let clock = ManualClock::new(Utc::now());
    let mut cache = StatsCache::with_clock(Duration::minutes(5), Box::new(clock.clone()));

    let before = cache.fetch(&source, user).unwrap();
    assert_eq!(before.focus_sessions, 1);
    assert_eq!(before.focus_minutes, 25);

    // A new session lands while the entry is still fresh.
    source.store.record_session(50).unwrap();
    clock.advance(Duration::seconds(30));

    let after = cache.refresh(&source, user).unwrap();
    assert_eq!(after.focus_sessions, 2);
    assert_eq!(after.focus_minutes, 75);
    assert_eq!(source.queries(), (2, 2));

    // A plain fetch right after serves the refreshed value from cache.
    let cached = cache.fetch(&source, user).unwrap();
    assert_eq!(cached, after);
    assert_eq!(source.queries(), (2, 2));
}

#[test]
fn entries_are_cached_per_user() {
    let store = StoreClient::open_memory().unwrap();
    let alice = store.sign_in("alice@example.com").unwrap().id;
    store.record_session(25).unwrap();
    let bob = store.sign_in("bob@example.com").unwrap().id;
    let source = CountingSource::new(store);

    let clock = ManualClock::new(Utc::now());
    let mut cache = StatsCache::with_clock(Duration::minutes(5), Box::new(clock));

    let alice_stats = cache.fetch(&source, alice).unwrap();
    let bob_stats = cache.fetch(&source, bob).unwrap();
    assert_eq!(alice_stats.focus_sessions, 1);
    assert_eq!(bob_stats.focus_sessions, 0);
    assert_eq!(source.queries(), (2, 2));

    // Both entries stay cached independently.
    cache.fetch(&source, alice).unwrap();
    cache.fetch(&source, bob).unwrap();
    assert_eq!(source.queries(), (2, 2));
}

#[test]
fn missing_schema_degrades_to_zeroed_stats() {
    let store = StoreClient::open_memory_bare().unwrap();
    let mut cache = StatsCache::new();
    let stats = cache.fetch(&store, Uuid::new_v4()).unwrap();
    assert_eq!(stats, WeeklyStats::zeroed());
    assert_eq!(stats.daily_completions.len(), 7);
}
