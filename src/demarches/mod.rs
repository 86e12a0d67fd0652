//! Démarches Simplifiées integration: canonical-field mapping and the
//! prefill API client.

pub mod client;
pub mod mapping;

pub use client::{PrefillClient, PrefillError};
pub use mapping::{map_to_external, FIELD_MAPPING};
