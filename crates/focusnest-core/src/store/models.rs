//! Row types for the persistent store.
//!
//! These mirror the hosted backend's tables one-to-one; the store owns the
//! rows and the client never mutates a `FocusSession` after insert.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    Low,
    Medium,
    High,
}

/// Card color a task is rendered with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TaskColor {
    Violet,
    Pink,
    Yellow,
    Red,
    Green,
    Black,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Task {
    pub id: Uuid,
    pub user_id: Uuid,
    pub title: String,
    pub completed: bool,
    pub tags: Vec<String>,
    pub priority: Option<Priority>,
    pub color: Option<TaskColor>,
    pub created_at: DateTime<Utc>,
}

/// One completed work-phase countdown. Created exactly once per completion;
/// break phases never produce one.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FocusSession {
    pub id: Uuid,
    pub user_id: Uuid,
    pub duration_min: u32,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Profile {
    pub id: Uuid,
    pub email: String,
    pub full_name: Option<String>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Achievement {
    pub id: Uuid,
    pub user_id: Uuid,
    pub name: String,
    pub description: String,
    pub icon: String,
    pub progress: u32,
    pub target: u32,
    pub completed: bool,
    pub completed_at: Option<DateTime<Utc>>,
}

// === Column helpers ===

/// Parse priority from its database string.
pub(crate) fn parse_priority(s: Option<&str>) -> Option<Priority> {
    match s {
        Some("low") => Some(Priority::Low),
        Some("medium") => Some(Priority::Medium),
        Some("high") => Some(Priority::High),
        _ => None,
    }
}

/// Format priority for database storage.
pub(crate) fn format_priority(priority: Option<Priority>) -> Option<&'static str> {
    priority.map(|p| match p {
        Priority::Low => "low",
        Priority::Medium => "medium",
        Priority::High => "high",
    })
}

/// Parse task color from its database string.
pub(crate) fn parse_color(s: Option<&str>) -> Option<TaskColor> {
    match s {
        Some("violet") => Some(TaskColor::Violet),
        Some("pink") => Some(TaskColor::Pink),
        Some("yellow") => Some(TaskColor::Yellow),
        Some("red") => Some(TaskColor::Red),
        Some("green") => Some(TaskColor::Green),
        Some("black") => Some(TaskColor::Black),
        _ => None,
    }
}

/// Format task color for database storage.
pub(crate) fn format_color(color: Option<TaskColor>) -> Option<&'static str> {
    color.map(|c| match c {
        TaskColor::Violet => "violet",
        TaskColor::Pink => "pink",
        TaskColor::Yellow => "yellow",
        TaskColor::Red => "red",
        TaskColor::Green => "green",
        TaskColor::Black => "black",
    })
}

/// Parse datetime from RFC3339 with fallback to the current time.
pub(crate) fn parse_datetime_fallback(dt_str: &str) -> DateTime<Utc> {
    DateTime::parse_from_rfc3339(dt_str)
        .map(|dt| dt.with_timezone(&Utc))
        .unwrap_or_else(|_| Utc::now())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn priority_roundtrip() {
        for p in [Priority::Low, Priority::Medium, Priority::High] {
            assert_eq!(parse_priority(format_priority(Some(p))), Some(p));
        }
        assert_eq!(parse_priority(None), None);
        assert_eq!(parse_priority(Some("urgent")), None);
    }

    #[test]
    fn color_roundtrip() {
        for c in [
            TaskColor::Violet,
            TaskColor::Pink,
            TaskColor::Yellow,
            TaskColor::Red,
            TaskColor::Green,
            TaskColor::Black,
        ] {
            assert_eq!(parse_color(format_color(Some(c))), Some(c));
        }
    }

    #[test]
    fn datetime_fallback_on_garbage() {
        let parsed = parse_datetime_fallback("not-a-date");
        assert!((Utc::now() - parsed).num_seconds() < 5);
    }
}
