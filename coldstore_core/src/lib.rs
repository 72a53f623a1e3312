//! # coldstore_core - Cold-Storage Refrigeration Design Engine
//!
//! `coldstore_core` computes the refrigeration load of cold rooms and
//! selects air coolers and compressors to meet it, including two-stage
//! cascade systems for low-temperature rooms. All inputs and outputs are
//! JSON-serializable.
//!
//! ## Design Philosophy
//!
//! - **Stateless**: Pure functions over immutable catalogs
//! - **JSON-First**: All types implement Serialize/Deserialize
//! - **Rich Errors**: Structured error types collected into the result
//! - **Deterministic**: Same input, same catalog, same selection
//!
//! ## Quick Start
//!
//! ```rust
//! use coldstore_core::catalog::Catalogs;
//! use coldstore_core::design::DesignInput;
//!
//! let input = DesignInput::example();
//! let result = input.design(&Catalogs::standard());
//!
//! let json = serde_json::to_string_pretty(&result).unwrap();
//! assert!(json.contains("SingleStage"));
//! ```
//!
//! ## Modules
//!
//! - [`catalog`] - Thermal property and equipment catalogs
//! - [`loads`] - Heat load calculator
//! - [`selection`] - Single-stage and cascade equipment selection
//! - [`design`] - Design orchestrator and energy estimate
//! - [`config`] - Design configuration
//! - [`project`] - Multi-room projects
//! - [`units`] - Type-safe unit wrappers
//! - [`errors`] - Structured error types
//! - [`file_io`] - JSON files with atomic saves

pub mod catalog;
pub mod config;
pub mod design;
pub mod errors;
pub mod file_io;
pub mod loads;
pub mod project;
pub mod selection;
pub mod units;

// Re-export commonly used types at crate root for convenience
pub use catalog::{Catalogs, EquipmentCatalog, ThermalCatalog};
pub use config::DesignConfig;
pub use design::{design, DesignInput, DesignResult};
pub use errors::{CalcError, CalcResult};
pub use file_io::{load_project, save_project};
pub use loads::{compute_load, LoadBreakdown, ProductLoad, RequiredCapacity, RoomSpec};
pub use project::{design_project, Project, ProjectMetadata};
pub use selection::{SystemKind, SystemSelection};
