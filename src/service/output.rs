//! Names of generated artifacts.

use chrono::{DateTime, Local};
use sha2::{Digest, Sha256};

/// Prefix shared by every generated artifact; the cleanup sweep keys on it.
pub const ARTIFACT_PREFIX: &str = "gym_log_";

/// Extensions of every artifact the service writes.
pub const ARTIFACT_EXTENSIONS: &[&str] = &["docx", "html", "pdf"];

/// Longest workout-name component kept in a file name, in bytes.
const MAX_NAME_BYTES: usize = 100;

/// Separates a sanitized name from the digest of the raw name. Never
/// produced by the plain mapping, so tagged and untagged names cannot meet.
const DIGEST_MARKER: char = '~';
const DIGEST_BYTES: usize = 6;

/// Make a workout name safe to embed in a file name: whitespace and path
/// or shell-hostile characters become `_`.
pub fn safe_component(name: &str) -> String {
    name.chars()
        .map(|c| {
            if c.is_whitespace()
                || c.is_control()
                || matches!(c, '/' | '\\' | ':' | '*' | '?' | '"' | '<' | '>' | '|')
            {
                '_'
            } else {
                c
            }
        })
        .collect()
}

/// File-name form of a workout name, distinct for distinct names.
///
/// A name made only of letters, digits, `-`, `.` and spaces just has its
/// spaces turned into `_`. Anything else (an `_`, a replaced character, or
/// more than [`MAX_NAME_BYTES`]) is sanitized, cut to length and tagged
/// with a digest of the raw name.
pub fn name_component(workout_name: &str) -> String {
    let plain = workout_name
        .chars()
        .all(|c| c.is_alphanumeric() || matches!(c, '-' | '.' | ' '));
    let sanitized = safe_component(workout_name);

    if plain && sanitized.len() <= MAX_NAME_BYTES {
        return sanitized;
    }

    format!(
        "{}{DIGEST_MARKER}{}",
        truncate_on_char_boundary(&sanitized, MAX_NAME_BYTES),
        name_digest(workout_name)
    )
}

fn name_digest(workout_name: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(workout_name.as_bytes());
    let digest = format!("{:x}", hasher.finalize());
    digest[..DIGEST_BYTES * 2].to_string()
}

fn truncate_on_char_boundary(text: &str, max_bytes: usize) -> &str {
    let mut end = max_bytes.min(text.len());
    while !text.is_char_boundary(end) {
        end -= 1;
    }
    &text[..end]
}

/// `gym_log_<name>_<YYYYmmdd_HHMMSS>.<ext>`, with `-<attempt>` before the
/// extension for every attempt after the first.
pub fn output_file_name(
    workout_name: &str,
    at: DateTime<Local>,
    attempt: usize,
    extension: &str,
) -> String {
    let suffix = if attempt == 0 {
        String::new()
    } else {
        format!("-{attempt}")
    };
    format!(
        "{ARTIFACT_PREFIX}{}_{}{suffix}.{extension}",
        name_component(workout_name),
        at.format("%Y%m%d_%H%M%S")
    )
}

/// Name offered to the client: `gym_log_<name>_<workout date>.<ext>`
pub fn download_file_name(workout_name: &str, workout_date: &str, extension: &str) -> String {
    format!(
        "{ARTIFACT_PREFIX}{}_{}.{extension}",
        safe_component(workout_name),
        safe_component(workout_date)
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at() -> DateTime<Local> {
        Local.with_ymd_and_hms(2025, 1, 7, 18, 30, 5).unwrap()
    }

    #[test]
    fn test_output_name_embeds_name_and_timestamp() {
        assert_eq!(
            output_file_name("Push Day", at(), 0, "docx"),
            "gym_log_Push_Day_20250107_183005.docx"
        );
        assert_eq!(
            output_file_name("Push Day", at(), 2, "docx"),
            "gym_log_Push_Day_20250107_183005-2.docx"
        );
    }

    #[test]
    fn test_different_names_give_different_files_without_spaces() {
        let a = output_file_name("Push Day", at(), 0, "docx");
        let b = output_file_name("Pull  Day", at(), 0, "docx");
        assert_ne!(a, b);
        assert!(!a.contains(' ') && !b.contains(' '));
    }

    #[test]
    fn test_underscore_and_space_names_do_not_collide() {
        let spaced = output_file_name("Push Day", at(), 0, "docx");
        let underscored = output_file_name("Push_Day", at(), 0, "docx");
        assert_ne!(spaced, underscored);
        assert!(underscored.starts_with("gym_log_Push_Day~"));
    }

    #[test]
    fn test_replaced_characters_do_not_collide() {
        let names = ["A/B", "A:B", "A*B", "A B", "A_B", "A\tB"];
        let files: std::collections::HashSet<String> = names
            .iter()
            .map(|name| output_file_name(name, at(), 0, "pdf"))
            .collect();
        assert_eq!(files.len(), names.len());
    }

    #[test]
    fn test_path_separators_are_neutralized() {
        let name = output_file_name("../../etc/passwd", at(), 0, "pdf");
        assert!(!name.contains('/'));
        assert!(name.starts_with("gym_log_.._.._etc_passwd~"));
    }

    #[test]
    fn test_long_names_are_capped() {
        let long = "Leg Day ".repeat(40);
        let component = name_component(&long);
        assert!(component.len() <= MAX_NAME_BYTES + 1 + DIGEST_BYTES * 2);
        assert!(component.starts_with("Leg_Day_Leg_Day_"));
        assert_ne!(component, name_component(&"Leg Day ".repeat(41)));

        let wide = "é".repeat(200);
        let component = name_component(&wide);
        assert!(component.len() <= MAX_NAME_BYTES + 1 + DIGEST_BYTES * 2);
    }

    #[test]
    fn test_download_name_uses_workout_date() {
        assert_eq!(
            download_file_name("Leg Day", "2025-01-07", "html"),
            "gym_log_Leg_Day_2025-01-07.html"
        );
    }
}
