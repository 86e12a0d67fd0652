//! Core library for the bilan DRAC/DRAAF prefill tool.
//!
//! Looks up an applicant's dossier in Grist by email, normalizes it into a
//! [`types::CaseRecord`], checks its completeness, and generates a pre-filled
//! dossier link on Démarches Simplifiées. The binary in `main.rs` is a thin
//! interactive front-end over these modules.
//!
//! Modules:
//! - config: immutable runtime configuration read from the environment
//! - grist: remote table access + dossier resolution
//! - demarches: field mapping + prefill API client
//! - checklist: required-field validation

pub mod checklist;
pub mod config;
pub mod demarches;
pub mod grist;
pub mod types;
