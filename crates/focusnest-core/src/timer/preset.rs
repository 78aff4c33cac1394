use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

/// Work minutes allowed for a preset.
pub const WORK_MIN: u32 = 1;
pub const WORK_MAX: u32 = 120;
/// Break minutes allowed for a preset.
pub const BREAK_MIN: u32 = 1;
pub const BREAK_MAX: u32 = 30;

/// Preset id used when none is configured.
pub const DEFAULT_PRESET_ID: &str = "25-5";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Phase {
    Work,
    Break,
}

impl Phase {
    pub fn flipped(self) -> Self {
        match self {
            Phase::Work => Phase::Break,
            Phase::Break => Phase::Work,
        }
    }
}

/// Named (work, break) duration pair. The `custom` slot is user-editable;
/// the rest are fixed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Preset {
    pub id: String,
    pub work_min: u32,
    pub break_min: u32,
}

/// Centralized duration validation: work minutes in [1,120], break minutes
/// in [1,30]. Applied wherever custom durations enter the system.
pub fn validate_durations(work_min: u32, break_min: u32) -> Result<(), ValidationError> {
    if !(WORK_MIN..=WORK_MAX).contains(&work_min) {
        return Err(ValidationError::OutOfRange {
            field: "work_min",
            value: work_min,
            min: WORK_MIN,
            max: WORK_MAX,
        });
    }
    if !(BREAK_MIN..=BREAK_MAX).contains(&break_min) {
        return Err(ValidationError::OutOfRange {
            field: "break_min",
            value: break_min,
            min: BREAK_MIN,
            max: BREAK_MAX,
        });
    }
    Ok(())
}

impl Preset {
    /// The fixed built-in presets, in display order.
    pub fn builtin() -> Vec<Preset> {
        vec![
            Preset {
                id: "15-2".into(),
                work_min: 15,
                break_min: 2,
            },
            Preset {
                id: "25-5".into(),
                work_min: 25,
                break_min: 5,
            },
            Preset {
                id: "50-10".into(),
                work_min: 50,
                break_min: 10,
            },
        ]
    }

    /// Build the user-editable custom preset after validating its durations.
    pub fn custom(work_min: u32, break_min: u32) -> Result<Preset, ValidationError> {
        validate_durations(work_min, break_min)?;
        Ok(Preset {
            id: "custom".into(),
            work_min,
            break_min,
        })
    }

    /// Resolve a preset id against the built-ins plus the given custom
    /// durations. Returns `None` for unknown ids.
    pub fn resolve(id: &str, custom_work: u32, custom_break: u32) -> Option<Preset> {
        if id == "custom" {
            return Preset::custom(custom_work, custom_break).ok();
        }
        Preset::builtin().into_iter().find(|p| p.id == id)
    }

    pub fn duration_min(&self, phase: Phase) -> u32 {
        match phase {
            Phase::Work => self.work_min,
            Phase::Break => self.break_min,
        }
    }

    pub fn duration_secs(&self, phase: Phase) -> u32 {
        self.duration_min(phase) * 60
    }
}

impl Default for Preset {
    fn default() -> Self {
        Preset {
            id: DEFAULT_PRESET_ID.into(),
            work_min: 25,
            break_min: 5,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtin_presets() {
        let presets = Preset::builtin();
        assert_eq!(presets.len(), 3);
        assert_eq!(presets[1].id, "25-5");
        assert_eq!(presets[1].work_min, 25);
        assert_eq!(presets[1].break_min, 5);
    }

    #[test]
    fn default_preset_is_25_5() {
        let p = Preset::default();
        assert_eq!(p.id, DEFAULT_PRESET_ID);
        assert_eq!(p.duration_secs(Phase::Work), 1500);
        assert_eq!(p.duration_secs(Phase::Break), 300);
    }

    #[test]
    fn custom_validates_ranges() {
        assert!(Preset::custom(1, 1).is_ok());
        assert!(Preset::custom(120, 30).is_ok());
        assert!(Preset::custom(0, 5).is_err());
        assert!(Preset::custom(121, 5).is_err());
        assert!(Preset::custom(25, 0).is_err());
        assert!(Preset::custom(25, 31).is_err());
    }

    #[test]
    fn resolve_unknown_id() {
        assert!(Preset::resolve("90-15", 25, 5).is_none());
        assert_eq!(Preset::resolve("custom", 40, 8).unwrap().work_min, 40);
    }

    #[test]
    fn phase_flip() {
        assert_eq!(Phase::Work.flipped(), Phase::Break);
        assert_eq!(Phase::Break.flipped(), Phase::Work);
    }
}
