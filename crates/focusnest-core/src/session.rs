//! Session recording: bridges a completed work phase to the store.
//!
//! The recorder validates before touching the store and never retries. The
//! caller's refresh callback runs only after a successful record; its
//! failure is reported in the outcome rather than as an error, because the
//! session is already durable and must not look un-recorded.

use crate::error::{CoreError, StoreError, ValidationError};
use crate::store::{FocusSession, StoreClient};

/// Result of a successful record, including whether the dependent-view
/// refresh that followed it worked.
#[derive(Debug)]
pub struct RecordOutcome {
    pub session: FocusSession,
    /// Set when the post-record refresh callback failed. The record itself
    /// is durable either way.
    pub refresh_error: Option<String>,
}

pub struct SessionRecorder<'a> {
    store: &'a StoreClient,
}

impl<'a> SessionRecorder<'a> {
    pub fn new(store: &'a StoreClient) -> Self {
        Self { store }
    }

    /// Record one completed work session of `duration_min` whole minutes.
    ///
    /// Fails with `ValidationError` for a non-positive duration (no store
    /// call is made), `NotAuthenticated` without a signed-in user,
    /// `SchemaMissing` when the focus_sessions table is absent, and
    /// `StoreError::Write` for any other persistence failure.
    pub fn record(&self, duration_min: i64) -> Result<FocusSession, CoreError> {
        if duration_min <= 0 {
            return Err(ValidationError::InvalidDuration {
                minutes: duration_min,
            }
            .into());
        }
        let session = self.store.record_session(duration_min as u32)?;
        Ok(session)
    }

    /// Like [`record`](Self::record), then run the host-supplied refresh
    /// callback. The callback is invoked only on success and never retried.
    pub fn record_with_refresh<F>(
        &self,
        duration_min: i64,
        on_complete: F,
    ) -> Result<RecordOutcome, CoreError>
    where
        F: FnOnce() -> Result<(), StoreError>,
    {
        let session = self.record(duration_min)?;
        let refresh_error = on_complete().err().map(|e| e.to_string());
        Ok(RecordOutcome {
            session,
            refresh_error,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_non_positive_durations_before_the_store() {
        let store = StoreClient::open_memory_bare().unwrap();
        let recorder = SessionRecorder::new(&store);
        // A bare store would fail any query; validation short-circuits it.
        assert!(matches!(
            recorder.record(0),
            Err(CoreError::Validation(ValidationError::InvalidDuration { minutes: 0 }))
        ));
        assert!(matches!(recorder.record(-5), Err(CoreError::Validation(_))));
    }

    #[test]
    fn records_and_runs_refresh() {
        let store = StoreClient::open_memory().unwrap();
        store.sign_in("x@example.com").unwrap();
        let recorder = SessionRecorder::new(&store);

        let mut refreshed = false;
        let outcome = recorder
            .record_with_refresh(25, || {
                refreshed = true;
                Ok(())
            })
            .unwrap();
        assert!(refreshed);
        assert_eq!(outcome.session.duration_min, 25);
        assert!(outcome.refresh_error.is_none());
    }

    #[test]
    fn refresh_failure_is_reported_not_raised() {
        let store = StoreClient::open_memory().unwrap();
        store.sign_in("x@example.com").unwrap();
        let recorder = SessionRecorder::new(&store);

        let outcome = recorder
            .record_with_refresh(25, || Err(StoreError::Read("view refresh failed".into())))
            .unwrap();
        assert_eq!(outcome.session.duration_min, 25);
        assert!(outcome.refresh_error.is_some());
    }

    #[test]
    fn failed_record_never_runs_refresh() {
        let store = StoreClient::open_memory().unwrap(); // nobody signed in
        let recorder = SessionRecorder::new(&store);

        let mut refreshed = false;
        let result = recorder.record_with_refresh(25, || {
            refreshed = true;
            Ok(())
        });
        assert!(matches!(
            result,
            Err(CoreError::Store(StoreError::NotAuthenticated))
        ));
        assert!(!refreshed);
    }
}
