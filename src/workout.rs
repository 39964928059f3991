//! Workout record submitted by clients.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Slot identifier to free-form value, e.g. `exercise_1a` -> `Bench Press`.
pub type SlotMap = BTreeMap<String, String>;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WorkoutRecord {
    pub workout_name: String,
    pub workout_date: String,
    /// Template file name; empty selects the configured default.
    #[serde(default)]
    pub template_name: String,
    #[serde(default)]
    pub exercises: SlotMap,
    #[serde(default)]
    pub sets: SlotMap,
    #[serde(default)]
    pub reps: SlotMap,
    #[serde(default)]
    pub rest: SlotMap,
    #[serde(default)]
    pub bonus_exercises: SlotMap,
    #[serde(default)]
    pub bonus_sets: SlotMap,
    #[serde(default)]
    pub bonus_reps: SlotMap,
    #[serde(default)]
    pub bonus_rest: SlotMap,
}

impl WorkoutRecord {
    /// All eight slot mappings, main section first, then bonus.
    pub fn slot_maps(&self) -> [&SlotMap; 8] {
        [
            &self.exercises,
            &self.sets,
            &self.reps,
            &self.rest,
            &self.bonus_exercises,
            &self.bonus_sets,
            &self.bonus_reps,
            &self.bonus_rest,
        ]
    }

    pub fn slots(&self) -> impl Iterator<Item = (&String, &String)> {
        self.slot_maps().into_iter().flat_map(|map| map.iter())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_minimal_record_deserializes() {
        let record: WorkoutRecord = serde_json::from_str(
            r#"{
                "workout_name": "Push Day",
                "workout_date": "2025-01-07",
                "exercises": {"exercise_1a": "Bench Press"},
                "bonus_rest": {"rest_bonus_1": "45s"}
            }"#,
        )
        .unwrap();

        assert_eq!(record.workout_name, "Push Day");
        assert!(record.template_name.is_empty());
        assert!(record.sets.is_empty());

        let slots: Vec<_> = record.slots().collect();
        assert_eq!(slots.len(), 2);
        assert_eq!(slots[0].0, "exercise_1a");
        assert_eq!(slots[1].1, "45s");
    }

    #[test]
    fn test_missing_name_is_rejected() {
        let result: Result<WorkoutRecord, _> =
            serde_json::from_str(r#"{"workout_date": "2025-01-07"}"#);
        assert!(result.is_err());
    }
}
