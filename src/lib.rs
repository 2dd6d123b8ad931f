//! Quest content server library
//!
//! Loads the quest graph from the world database, validates it against the
//! other content stores and keeps it available for reload.

pub mod config;
pub mod data;
pub mod db;
pub mod error;
pub mod quest;

pub use config::WorldConfig;
pub use error::ContentError;
