//! Completeness checklist over a [`CaseRecord`].
//!
//! A dossier can only be submitted to the prefill API once every required
//! field is present. The labels returned here feed both the submit gate and
//! the per-field status display; `name` is shown but never required.

use std::sync::OnceLock;

use regex::Regex;

use crate::types::CaseRecord;

// Permissive local@domain.tld shape; the TLD needs at least two letters.
fn re_email() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^[a-zA-Z0-9._%+-]+@[a-zA-Z0-9.-]+\.[a-zA-Z]{2,}$").unwrap())
}

/// Syntactic email check: `local@domain.tld`, TLD of two letters or more.
pub fn is_valid_email(email: &str) -> bool {
    re_email().is_match(email)
}

/// Lenient amount parsing: missing or unparsable values count as zero.
/// Never panics; fractional values are truncated.
pub fn parse_amount(raw: &str) -> i64 {
    let trimmed = raw.trim();
    trimmed
        .parse::<i64>()
        .or_else(|_| trimmed.parse::<f64>().map(|f| f as i64))
        .unwrap_or(0)
}

/// Human-readable labels for every required field that is missing or invalid.
///
/// Order is fixed: Email, Titre du projet, Numéro de dossier, Montant DRAC,
/// Montant DRAAF. An amount of zero or less counts as missing. An empty
/// result means the record can be submitted.
pub fn missing_required_fields(record: &CaseRecord) -> Vec<String> {
    let mut missing = Vec::new();

    if record.email.is_empty() {
        missing.push("Email".to_string());
    } else if !is_valid_email(&record.email) {
        missing.push("Email (format invalide)".to_string());
    }

    if record.project_title.is_empty() {
        missing.push("Titre du projet".to_string());
    }

    if record.case_number.is_empty() {
        missing.push("Numéro de dossier".to_string());
    }

    if parse_amount(&record.drac_amount) <= 0 {
        missing.push("Montant DRAC".to_string());
    }

    if parse_amount(&record.draaf_amount) <= 0 {
        missing.push("Montant DRAAF".to_string());
    }

    missing
}
