//! RSR Up sync - Ingest project update feeds from the Akvo RSR API.
//!
//! This crate turns the API's XML update lists into local records in a single
//! streaming pass, without building a document tree.
//!
//! # Example
//!
//! ```
//! use rsr_sync::storage::MemoryStore;
//! use rsr_sync::ingest_str;
//!
//! let feed = r#"<response><objects type="list">
//!   <object>
//!     <id type="integer">2505</id>
//!     <title>Video screening improves farms productivity</title>
//!     <project>/api/v1/project/363/</project>
//!     <time>2013-02-04T10:54:12</time>
//!   </object>
//! </objects></response>"#;
//!
//! let mut store = MemoryStore::new();
//! let report = ingest_str(feed, &mut store, false).unwrap();
//!
//! assert_eq!(report.success_count(), 1);
//! assert!(!report.had_error());
//! assert_eq!(store.get("2505").unwrap().project_id.as_deref(), Some("363"));
//! ```
//!
//! # Architecture
//!
//! - [`config`]: Constants, date parsing and runtime configuration
//! - [`types`]: Core data types (Update, Project, FieldTag)
//! - [`error`]: Error types and Result alias
//! - [`xml`]: Streaming XML event source
//! - [`reference`]: Id extraction from API resource paths
//! - [`parser`]: Update list state machine
//! - [`storage`]: Storage contract and adapters
//! - [`service`]: Ingest and lookup entry points
//! - [`cli`]: Command-line interface

pub mod cli;
pub mod config;
pub mod error;
pub mod parser;
pub mod reference;
pub mod service;
pub mod storage;
pub mod types;
pub mod xml;

// Re-export main functions
pub use service::{ingest, ingest_file, ingest_str, lookup_update};

// Re-export commonly used items
pub use error::{Result, SyncError};
pub use parser::{CompletionMode, FieldWarning, ParseReport, UpdateListParser};
pub use storage::{MemoryStore, UpdateStore, YamlStore};
pub use types::{FieldTag, Project, Update};
