//! # Archmap Extractor
//!
//! Turns one parsed source file into a typed architectural entity, and a
//! checked-out repository into a full system model.
//!
//! ## Pipeline
//!
//! ```text
//! Source text
//!     │
//!     ├──> Tree-sitter parse (Java grammar) → per-file extraction context
//!     │
//!     ├──> Role classification (class-level annotation table, first match)
//!     │
//!     ├──> Extraction
//!     │    ├─> fields, methods, call sites
//!     │    ├─> endpoint promotion (routing annotations → verb + path)
//!     │    └─> rest-call promotion (HTTP-client receivers → verb + path)
//!     │
//!     └──> JavaClass  (or nothing: config files, unparsable sources,
//!                      classes with no recognized role)
//! ```
//!
//! Two roles rewrite instead of extracting directly: declarative remote
//! clients split each routed method into a plain method plus a synthesized
//! rest call, and declarative REST resources synthesize endpoints for every
//! exported data-access method.
//!
//! All parser state is per-file; extracting independent files in parallel
//! needs nothing more than one [`Extractor`] per worker.

mod analyzer;
mod builder;
mod classify;
mod error;
mod file_type;
mod routes;

pub use builder::{build_system, discover_service_roots};
pub use classify::{classify_role, Extractor};
pub use error::{ExtractError, Result};
pub use file_type::{
    classify_config_file, is_build_manifest, is_configuration_file, is_valid_file, manifest_root,
};
pub use routes::{
    simplify_url, RestResourceDefaults, ENDPOINT_ANNOTATIONS, PATH_VARIABLE, REST_CLIENT_METHODS,
    REST_CLIENT_TYPES,
};
