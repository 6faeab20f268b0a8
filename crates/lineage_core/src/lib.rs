//! Core domain logic for the lineage family-tree viewer.
//!
//! Kinship-term inference, forest layout, viewport fitting and node gestures
//! live here, together with the SQLite person store they operate on.

pub mod db;
pub mod graph;
pub mod interaction;
pub mod kinship;
pub mod layout;
pub mod logging;
pub mod model;
pub mod search;
pub mod service;
pub mod store;
pub mod viewport;

pub use db::{open_db, open_db_in_memory, DbError, DbTarget};
pub use graph::FamilyGraph;
pub use interaction::{DragConfig, GestureOutcome, NodeEvent, NodeInteraction, Propagation};
pub use kinship::{
    ancestry_path, label_by_id, lowest_common_ancestor, relationship, relationship_label,
    relationship_label_with, sibling_rank, Kinship, Vocabulary,
};
pub use layout::{layout, links, GraphNode, LayoutConfig, LayoutError, LinkPath, Point};
pub use logging::{
    default_log_level, flush_logging, init_logging, init_logging_with, logging_status,
    LoggingConfig, LoggingError, LOG_DIR_ENV, LOG_LEVEL_ENV,
};
pub use model::person::{
    active_people, generation_label, BirthDate, Gender, Person, PersonId, PersonValidationError,
};
pub use search::filter::{search, SearchFilters};
pub use service::family_service::{FamilyService, FamilyServiceError};
pub use store::person_repo::{PersonRepository, SqlitePersonRepository};
pub use store::snapshot::{export_snapshot, import_snapshot, parse_snapshot};
pub use store::{StoreError, StoreResult};
pub use viewport::{Transform, Transition, Viewport, ViewportConfig};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::core_version;

    #[test]
    fn version_is_not_empty() {
        assert!(!core_version().is_empty());
    }
}
