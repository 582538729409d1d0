//! tc-connector - migrate third-party test cases into a test-case object model
//!
//! This library reads test-case descriptions authored for other test tools and
//! replays them as creation calls against a [`Builder`]: test cases, reusable
//! UI modules, test steps with their values, and data-driven test sheets.
//!
//! # Supported sources
//!
//! - UFT archives (extracted): keyword worksheets, object repository XML, data sheet
//! - Selenium keyword workbooks
//! - Manual test-case workbooks
//!
//! # Example
//!
//! ```no_run
//! use tc_connector::{Definition, FailurePolicy, ObjectModel, UftConnector};
//! use std::path::Path;
//!
//! let definition = Definition::default();
//! let mut model = ObjectModel::new(definition.engine.clone());
//! let summary = UftConnector::new(&definition, FailurePolicy::Abort)
//!     .migrate_archive(Path::new("extracted-archive"), &mut model)?;
//!
//! println!("Files: {}", summary.files_processed.len());
//! println!("Objects: {}", model.len());
//! model.write(Path::new("migration.yaml"))?;
//! # Ok::<(), tc_connector::ConnectorError>(())
//! ```

pub mod builder;
pub mod cli;
pub mod columns;
pub mod config;
pub mod connector;
pub mod error;
pub mod object_map;
pub mod repository;
pub mod sheet;
pub mod transform;
pub mod types;

// Re-export commonly used types
pub use builder::{Builder, ModelObject, ObjectModel, TableCell};
pub use config::Definition;
pub use connector::{
    FailurePolicy, ManualConnector, MigrationSummary, RowWarning, SeleniumConnector,
    UftConnector,
};
pub use error::{ConnectorError, ConnectorResult, ErrorKind};
pub use repository::{ObjectRepository, RepositoryIndex};
pub use types::{ActionMode, ObjectId, Properties, SourceFormat};
