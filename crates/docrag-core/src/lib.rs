//! docrag-core
//!
//! Data model, error taxonomy, collaborator traits, configuration and the
//! character-window chunker shared by every other docrag crate.

pub mod chunker;
pub mod config;
pub mod error;
pub mod traits;
pub mod types;

pub use error::{Error, Result};
