//! # Multi-Room Projects
//!
//! A project groups the rooms of one cold-storage facility under shared
//! metadata and a shared design configuration. Projects serialize to
//! human-readable JSON (see [`file_io`](crate::file_io)).
//!
//! ## Structure
//!
//! ```text
//! Project
//! ├── meta: ProjectMetadata (version, engineer, job info, timestamps)
//! ├── config: DesignConfig (shared by every room unless overridden)
//! └── rooms: HashMap<Uuid, RoomDesignInput>
//! ```
//!
//! ## Example
//!
//! ```rust
//! use coldstore_core::catalog::Catalogs;
//! use coldstore_core::config::DesignConfig;
//! use coldstore_core::design::DesignInput;
//! use coldstore_core::project::{design_project, Project, RoomDesignInput};
//!
//! let mut project = Project::new("Jane Engineer", "25-042", "Polar Foods", DesignConfig::new(0.1));
//! let example = DesignInput::example();
//! project.add_room(RoomDesignInput::new(example.room, example.product));
//!
//! let summary = design_project(&project, &Catalogs::standard());
//! assert_eq!(summary.valid_rooms, 1);
//! assert!(summary.total_required_kw > 0.0);
//! ```

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;

use crate::catalog::Catalogs;
use crate::config::DesignConfig;
use crate::design::{design, DesignResult};
use crate::loads::{ProductLoad, RoomSpec};

/// Current schema version for project files
pub const SCHEMA_VERSION: &str = "0.1.0";

/// One room of a project
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoomDesignInput {
    pub room: RoomSpec,
    pub product: ProductLoad,
    /// Replaces the project configuration for this room
    #[serde(default)]
    pub config: Option<DesignConfig>,
}

impl RoomDesignInput {
    pub fn new(room: RoomSpec, product: ProductLoad) -> Self {
        RoomDesignInput {
            room,
            product,
            config: None,
        }
    }

    pub fn with_config(mut self, config: DesignConfig) -> Self {
        self.config = Some(config);
        self
    }
}

/// Root project container
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Project {
    pub meta: ProjectMetadata,
    pub config: DesignConfig,
    pub rooms: HashMap<Uuid, RoomDesignInput>,
}

impl Project {
    /// Create a new empty project.
    ///
    /// # Example
    ///
    /// ```rust
    /// use coldstore_core::config::DesignConfig;
    /// use coldstore_core::project::Project;
    ///
    /// let project = Project::new("John Doe", "25-001", "Client Corp", DesignConfig::new(0.1));
    /// assert_eq!(project.meta.engineer, "John Doe");
    /// ```
    pub fn new(
        engineer: impl Into<String>,
        job_id: impl Into<String>,
        client: impl Into<String>,
        config: DesignConfig,
    ) -> Self {
        let now = Utc::now();
        Project {
            meta: ProjectMetadata {
                version: SCHEMA_VERSION.to_string(),
                engineer: engineer.into(),
                job_id: job_id.into(),
                client: client.into(),
                created: now,
                modified: now,
            },
            config,
            rooms: HashMap::new(),
        }
    }

    /// Add a room, returning its id
    pub fn add_room(&mut self, room: RoomDesignInput) -> Uuid {
        let id = Uuid::new_v4();
        self.rooms.insert(id, room);
        self.touch();
        id
    }

    pub fn remove_room(&mut self, id: &Uuid) -> Option<RoomDesignInput> {
        let room = self.rooms.remove(id);
        if room.is_some() {
            self.touch();
        }
        room
    }

    pub fn get_room(&self, id: &Uuid) -> Option<&RoomDesignInput> {
        self.rooms.get(id)
    }

    /// Mutable access marks the project as modified
    pub fn get_room_mut(&mut self, id: &Uuid) -> Option<&mut RoomDesignInput> {
        if self.rooms.contains_key(id) {
            self.meta.modified = Utc::now();
            self.rooms.get_mut(id)
        } else {
            None
        }
    }

    /// Update the modified timestamp.
    pub fn touch(&mut self) {
        self.meta.modified = Utc::now();
    }

    pub fn room_count(&self) -> usize {
        self.rooms.len()
    }

    /// Configuration that applies to a room
    pub fn config_for<'a>(&'a self, room: &'a RoomDesignInput) -> &'a DesignConfig {
        room.config.as_ref().unwrap_or(&self.config)
    }
}

/// Project metadata stored in the file header.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProjectMetadata {
    /// Schema version (for migration compatibility)
    pub version: String,
    pub engineer: String,
    pub job_id: String,
    pub client: String,
    pub created: DateTime<Utc>,
    pub modified: DateTime<Utc>,
}

/// Results for every room of a project
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectDesign {
    pub job_id: String,
    /// Room results ordered by label
    pub rooms: Vec<(Uuid, DesignResult)>,
    pub valid_rooms: usize,
    pub invalid_rooms: usize,
    /// Sum of required capacity over valid rooms (kW)
    pub total_required_kw: f64,
}

impl ProjectDesign {
    pub fn all_valid(&self) -> bool {
        self.invalid_rooms == 0
    }
}

/// Design every room of a project independently.
///
/// Rooms are processed in label order (then id) so the output does not
/// depend on map iteration order.
pub fn design_project(project: &Project, catalogs: &Catalogs) -> ProjectDesign {
    let mut ordered: Vec<(&Uuid, &RoomDesignInput)> = project.rooms.iter().collect();
    ordered.sort_by(|a, b| a.1.room.label.cmp(&b.1.room.label).then(a.0.cmp(b.0)));

    let mut rooms = Vec::with_capacity(ordered.len());
    let mut total_required_kw = 0.0;
    let mut valid_rooms = 0;

    for (id, input) in ordered {
        let result = design(&input.room, &input.product, project.config_for(input), catalogs);
        if result.valid {
            valid_rooms += 1;
            total_required_kw += result.required_kw().unwrap_or(0.0);
        }
        rooms.push((*id, result));
    }

    let invalid_rooms = rooms.len() - valid_rooms;
    info!(
        job_id = %project.meta.job_id,
        valid_rooms,
        invalid_rooms,
        total_required_kw,
        "project designed"
    );

    ProjectDesign {
        job_id: project.meta.job_id.clone(),
        rooms,
        valid_rooms,
        invalid_rooms,
        total_required_kw,
    }
}
