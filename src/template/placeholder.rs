//! Placeholder table construction.

use crate::workout::WorkoutRecord;

/// Label in the templates that the workout date is appended to.
pub const DATE_LABEL: &str = "today's date:";

/// Wrap a slot identifier in template delimiters: `exercise_1a` -> `{{ exercise_1a }}`.
pub fn token_for(key: &str) -> String {
    format!("{{{{ {key} }}}}")
}

/// Ordered token -> replacement mapping. Tokens are unique; inserting an
/// existing token replaces its value in place.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PlaceholderTable {
    entries: Vec<(String, String)>,
}

impl PlaceholderTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build the table for one generation request.
    pub fn from_record(record: &WorkoutRecord) -> Self {
        let mut table = Self::new();
        table.insert(token_for("workout_name"), record.workout_name.clone());
        table.insert(token_for("workout_date"), record.workout_date.clone());
        table.insert(
            DATE_LABEL.to_string(),
            format!("{DATE_LABEL} {}", record.workout_date),
        );

        for (key, value) in record.slots() {
            table.insert(token_for(key), value.clone());
        }
        table
    }

    pub fn insert(&mut self, token: String, value: String) {
        match self.entries.iter_mut().find(|(t, _)| *t == token) {
            Some(entry) => entry.1 = value,
            None => self.entries.push((token, value)),
        }
    }

    pub fn get(&self, token: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(t, _)| t == token)
            .map(|(_, v)| v.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(t, v)| (t.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether any token occurs literally in `text`.
    pub fn matches_any(&self, text: &str) -> bool {
        self.entries.iter().any(|(token, _)| text.contains(token.as_str()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::workout::SlotMap;

    fn slots(pairs: &[(&str, &str)]) -> SlotMap {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_token_padding() {
        assert_eq!(token_for("exercise_1a"), "{{ exercise_1a }}");
    }

    #[test]
    fn test_every_slot_yields_one_token() {
        let record = WorkoutRecord {
            workout_name: "Push Day".into(),
            workout_date: "2025-01-07".into(),
            exercises: slots(&[("exercise_1a", "Bench Press"), ("exercise_1b", "Flyes")]),
            sets: slots(&[("sets_1", "3")]),
            reps: slots(&[("reps_1", "8-12")]),
            rest: slots(&[("rest_1", "60s")]),
            bonus_exercises: slots(&[("exercise_bonus_1", "Planks")]),
            bonus_sets: slots(&[("sets_bonus_1", "2")]),
            bonus_reps: slots(&[("reps_bonus_1", "30s hold")]),
            bonus_rest: slots(&[("rest_bonus_1", "45s")]),
            ..Default::default()
        };

        let table = PlaceholderTable::from_record(&record);

        for (key, value) in record.slots() {
            let token = token_for(key);
            assert_eq!(table.get(&token), Some(value.as_str()));
            assert_eq!(table.iter().filter(|(t, _)| *t == token).count(), 1);
        }
        // 9 slots + name + date + date label
        assert_eq!(table.len(), 12);
    }

    #[test]
    fn test_date_label_entry_is_not_bracketed() {
        let record = WorkoutRecord {
            workout_name: "Legs".into(),
            workout_date: "2025-02-01".into(),
            ..Default::default()
        };

        let table = PlaceholderTable::from_record(&record);
        assert_eq!(table.get(DATE_LABEL), Some("today's date: 2025-02-01"));
        assert_eq!(table.get("{{ workout_name }}"), Some("Legs"));
    }

    #[test]
    fn test_duplicate_slot_keeps_last_value() {
        let record = WorkoutRecord {
            exercises: slots(&[("slot", "first")]),
            bonus_exercises: slots(&[("slot", "second")]),
            ..Default::default()
        };

        let table = PlaceholderTable::from_record(&record);
        assert_eq!(table.get("{{ slot }}"), Some("second"));
    }
}
