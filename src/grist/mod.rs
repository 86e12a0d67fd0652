//! Grist integration: remote table access and dossier resolution.
//!
//! Grist is the system of record. [`client`] is the raw read-only API
//! accessor; [`resolver`] turns its rows into a normalized
//! [`crate::types::CaseRecord`].

pub mod client;
pub mod resolver;

pub use client::{GristClient, TableInfo, TableRecord};
pub use resolver::{resolve_case, ResolveError};

/// Errors from the Grist API accessor. Display strings double as user-facing
/// text.
#[derive(Debug, thiserror::Error)]
pub enum GristError {
    #[error("L'ID du document est requis")]
    DocIdMissing,
    #[error("Erreur HTTP: {0}")]
    Http(#[from] reqwest::Error),
    #[error("Erreur {status}: {message}")]
    Api { status: u16, message: String },
    #[error("Format de données inattendu: {0}")]
    UnexpectedShape(String),
}
