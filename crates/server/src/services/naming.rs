//! Artifact file naming: `YYYY.MM.DD_<job>_<type>_<initials>.pdf`.

use chrono::NaiveDate;

const MAX_JOB_LEN: usize = 30;
const MAX_TYPE_LEN: usize = 20;
const UNKNOWN_INITIALS: &str = "XX";

/// Keeps ASCII alphanumerics only, truncated to `max` characters.
pub fn sanitize(value: &str, max: usize) -> String {
    value
        .chars()
        .filter(char::is_ascii_alphanumeric)
        .take(max)
        .collect()
}

/// Initials from the first and last word of a name.
///
/// A single-word name yields its first two letters.
pub fn initials_from_name(name: &str) -> Option<String> {
    let words: Vec<&str> = name
        .split_whitespace()
        .map(|w| w.trim_matches(|c: char| !c.is_alphanumeric()))
        .filter(|w| w.chars().any(|c| c.is_ascii_alphabetic()))
        .collect();

    let first_letter = |w: &str| w.chars().find(char::is_ascii_alphabetic);

    let initials: String = match words.as_slice() {
        [] => return None,
        [only] => only
            .chars()
            .filter(char::is_ascii_alphabetic)
            .take(2)
            .collect(),
        [first, .., last] => first_letter(*first)
            .into_iter()
            .chain(first_letter(*last))
            .collect(),
    };

    Some(initials.to_ascii_uppercase())
}

/// Inspector name wins, then the free-text author, then `XX`.
pub fn inspector_initials(inspector_name: Option<&str>, author: &str) -> String {
    inspector_name
        .and_then(initials_from_name)
        .or_else(|| initials_from_name(author))
        .unwrap_or_else(|| UNKNOWN_INITIALS.to_string())
}

pub fn report_file_name(
    date: NaiveDate,
    job_name: &str,
    inspection_type: &str,
    inspector_name: Option<&str>,
    author: &str,
) -> String {
    let mut job = sanitize(job_name, MAX_JOB_LEN);
    if job.is_empty() {
        job = "Job".to_string();
    }
    let mut kind = sanitize(inspection_type, MAX_TYPE_LEN);
    if kind.is_empty() {
        kind = "Report".to_string();
    }

    format!(
        "{}_{job}_{kind}_{}.pdf",
        date.format("%Y.%m.%d"),
        inspector_initials(inspector_name, author)
    )
}
