//! Quest Content Module
//!
//! Loads quest templates and their satellite tables into a validated, linked
//! quest graph, and publishes it for concurrent readers.

pub mod definition;
pub mod linker;
pub mod loader;
pub mod registry;
pub mod relations;
pub mod rows;
pub mod store;
pub mod validate;

pub use definition::{Objective, ObjectiveType, Quest, QuestFlags, QuestSpecialFlags};
pub use loader::{ContentCleanup, LoadReport, QuestLoad, QuestLoader};
pub use registry::{watch_reload_trigger, QuestRegistry, ReloadRequest};
pub use relations::{AllQuestsActive, QuestAvailability, QuestRelationResult, RelationKind};
pub use rows::QuestTables;
pub use store::QuestStore;
pub use validate::{check_objective, ObjectiveIssue};
