use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use sitebook_core::id::Uuid;
use sitebook_core::{Creatable, DomainResult, Editable, Record, Timestamps, input, record_id, validate};

record_id!(
    /// Project identifier.
    ProjectId
);

/// Project lifecycle status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ProjectStatus {
    #[default]
    Planning,
    #[serde(rename = "In Progress", alias = "in_progress")]
    InProgress,
    #[serde(rename = "On Hold", alias = "on_hold")]
    OnHold,
    Completed,
    Cancelled,
}

/// Construction phase, shared by projects, tasks and material requirements.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Phase {
    #[default]
    #[serde(rename = "Pre-Construction", alias = "pre_construction")]
    PreConstruction,
    Construction,
    #[serde(rename = "Post-Construction", alias = "post_construction")]
    PostConstruction,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Priority {
    Low,
    #[default]
    Medium,
    High,
}

/// Record: Project.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Project {
    pub id: ProjectId,
    pub name: String,
    pub client: Option<String>,
    pub manager: Option<String>,
    pub budget: f64,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub status: ProjectStatus,
    pub phase: Phase,
    pub priority: Priority,
    pub location: Option<String>,
    pub description: Option<String>,
    pub images: Vec<String>,
    #[serde(flatten)]
    pub timestamps: Timestamps,
}

/// Create/replace payload for a project.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct NewProject {
    pub name: String,
    #[serde(default, deserialize_with = "input::opt_text")]
    pub client: Option<String>,
    #[serde(default, deserialize_with = "input::opt_text")]
    pub manager: Option<String>,
    #[serde(default, deserialize_with = "input::opt_number")]
    pub budget: Option<f64>,
    #[serde(default, deserialize_with = "input::opt_date")]
    pub start_date: Option<NaiveDate>,
    #[serde(default, deserialize_with = "input::opt_date")]
    pub end_date: Option<NaiveDate>,
    #[serde(default)]
    pub status: ProjectStatus,
    #[serde(default)]
    pub phase: Phase,
    #[serde(default)]
    pub priority: Priority,
    #[serde(default, deserialize_with = "input::opt_text")]
    pub location: Option<String>,
    #[serde(default, deserialize_with = "input::opt_text")]
    pub description: Option<String>,
    #[serde(default)]
    pub images: Vec<String>,
}

/// Partial update; absent fields are left unchanged.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProjectPatch {
    pub name: Option<String>,
    #[serde(default, deserialize_with = "input::patch_text")]
    pub client: Option<Option<String>>,
    #[serde(default, deserialize_with = "input::patch_text")]
    pub manager: Option<Option<String>>,
    #[serde(default, deserialize_with = "input::patch_number")]
    pub budget: Option<Option<f64>>,
    #[serde(default, deserialize_with = "input::patch_date")]
    pub start_date: Option<Option<NaiveDate>>,
    #[serde(default, deserialize_with = "input::patch_date")]
    pub end_date: Option<Option<NaiveDate>>,
    pub status: Option<ProjectStatus>,
    pub phase: Option<Phase>,
    pub priority: Option<Priority>,
    #[serde(default, deserialize_with = "input::patch_text")]
    pub location: Option<Option<String>>,
    #[serde(default, deserialize_with = "input::patch_text")]
    pub description: Option<Option<String>>,
    pub images: Option<Vec<String>>,
}

impl Project {
    fn validate(&self) -> DomainResult<()> {
        validate::non_empty("name", &self.name)?;
        validate::non_negative("budget", self.budget)?;
        validate::date_order(self.start_date, self.end_date)?;
        for url in &self.images {
            validate::http_url("images", url)?;
        }
        Ok(())
    }

    fn fill(&mut self, draft: NewProject) {
        self.name = draft.name.trim().to_string();
        self.client = draft.client;
        self.manager = draft.manager;
        self.budget = draft.budget.unwrap_or(0.0);
        self.start_date = draft.start_date;
        self.end_date = draft.end_date;
        self.status = draft.status;
        self.phase = draft.phase;
        self.priority = draft.priority;
        self.location = draft.location;
        self.description = draft.description;
        self.images = clean_images(draft.images);
    }
}

fn clean_images(images: Vec<String>) -> Vec<String> {
    images
        .into_iter()
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}

impl Record for Project {
    const RESOURCE: &'static str = "projects";

    fn record_id(&self) -> Uuid {
        *self.id.as_uuid()
    }

    fn project_ref(&self) -> Option<Uuid> {
        Some(*self.id.as_uuid())
    }

    fn search_fields(&self) -> Vec<&str> {
        let mut fields = vec![self.name.as_str()];
        fields.extend(self.client.as_deref());
        fields.extend(self.manager.as_deref());
        fields.extend(self.location.as_deref());
        fields
    }
}

impl Creatable for Project {
    type Draft = NewProject;

    fn from_draft(id: Uuid, draft: NewProject, now: DateTime<Utc>) -> DomainResult<Self> {
        let mut project = Project {
            id: ProjectId::from_uuid(id),
            name: String::new(),
            client: None,
            manager: None,
            budget: 0.0,
            start_date: None,
            end_date: None,
            status: ProjectStatus::default(),
            phase: Phase::default(),
            priority: Priority::default(),
            location: None,
            description: None,
            images: Vec::new(),
            timestamps: Timestamps::new(now),
        };
        project.fill(draft);
        project.validate()?;
        Ok(project)
    }
}

impl Editable for Project {
    type Patch = ProjectPatch;

    fn replace(&mut self, draft: NewProject, now: DateTime<Utc>) -> DomainResult<()> {
        let mut next = self.clone();
        next.fill(draft);
        next.validate()?;
        next.timestamps.touch(now);
        *self = next;
        Ok(())
    }

    fn apply_patch(&mut self, patch: ProjectPatch, now: DateTime<Utc>) -> DomainResult<()> {
        let mut next = self.clone();
        if let Some(name) = patch.name {
            next.name = name.trim().to_string();
        }
        if let Some(client) = patch.client {
            next.client = client;
        }
        if let Some(manager) = patch.manager {
            next.manager = manager;
        }
        if let Some(budget) = patch.budget {
            next.budget = budget.unwrap_or(0.0);
        }
        if let Some(start) = patch.start_date {
            next.start_date = start;
        }
        if let Some(end) = patch.end_date {
            next.end_date = end;
        }
        if let Some(status) = patch.status {
            next.status = status;
        }
        if let Some(phase) = patch.phase {
            next.phase = phase;
        }
        if let Some(priority) = patch.priority {
            next.priority = priority;
        }
        if let Some(location) = patch.location {
            next.location = location;
        }
        if let Some(description) = patch.description {
            next.description = description;
        }
        if let Some(images) = patch.images {
            next.images = clean_images(images);
        }
        next.validate()?;
        next.timestamps.touch(now);
        *self = next;
        Ok(())
    }
}
