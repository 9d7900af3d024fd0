/*
 * This module consolidates the core, platform-agnostic logic of the application:
 * the outline data model, read/search operations over the node tree, the
 * mutation engine that owns the live editor state, the persistence codec with
 * its schema migration, and the import/export gateway. It also holds the
 * storage and configuration services (`StateStoreOperations`,
 * `ConfigManagerOperations`, `DocumentFileOperations`) behind traits so the
 * application logic can be tested with mocks.
 */
pub mod config;
pub mod import_export;
pub mod models;
pub mod mutation_engine;
pub mod node_tree;
pub mod path_utils;
pub mod persistence_codec;
pub mod state_store;

pub use models::{EditorState, NodeId, OutlineNode};

pub use mutation_engine::{EditError, MutationEngine, MutationOutcome};

pub use import_export::{CoreDocumentFiles, DocumentFileOperations};

pub use state_store::{CoreStateStore, StateStoreOperations};

pub use config::{ConfigError, ConfigManagerOperations, CoreConfigManager};
