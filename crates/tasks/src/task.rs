use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use sitebook_core::id::Uuid;
use sitebook_core::{Creatable, DomainResult, Editable, Record, Timestamps, input, record_id, validate};
use sitebook_projects::{Phase, Priority, ProjectId};
use sitebook_resources::StaffId;

record_id!(
    /// Task identifier.
    TaskId
);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum TaskStatus {
    #[default]
    Pending,
    #[serde(rename = "In Progress", alias = "in_progress")]
    InProgress,
    Completed,
}

/// Record: Task.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Task {
    pub id: TaskId,
    pub name: String,
    pub description: Option<String>,
    pub project_id: ProjectId,
    pub assignee_id: Option<StaffId>,
    pub priority: Priority,
    pub status: TaskStatus,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub progress: f64,
    pub phase: Phase,
    #[serde(flatten)]
    pub timestamps: Timestamps,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewTask {
    pub name: String,
    #[serde(default, deserialize_with = "input::opt_text")]
    pub description: Option<String>,
    pub project_id: ProjectId,
    #[serde(default, deserialize_with = "input::opt_ref")]
    pub assignee_id: Option<StaffId>,
    #[serde(default)]
    pub priority: Priority,
    #[serde(default)]
    pub status: TaskStatus,
    #[serde(default, deserialize_with = "input::opt_date")]
    pub start_date: Option<NaiveDate>,
    #[serde(default, deserialize_with = "input::opt_date")]
    pub end_date: Option<NaiveDate>,
    #[serde(default, deserialize_with = "input::opt_number")]
    pub progress: Option<f64>,
    #[serde(default)]
    pub phase: Phase,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct TaskPatch {
    pub name: Option<String>,
    #[serde(default, deserialize_with = "input::patch_text")]
    pub description: Option<Option<String>>,
    pub project_id: Option<ProjectId>,
    #[serde(default, deserialize_with = "input::patch_ref")]
    pub assignee_id: Option<Option<StaffId>>,
    pub priority: Option<Priority>,
    pub status: Option<TaskStatus>,
    #[serde(default, deserialize_with = "input::patch_date")]
    pub start_date: Option<Option<NaiveDate>>,
    #[serde(default, deserialize_with = "input::patch_date")]
    pub end_date: Option<Option<NaiveDate>>,
    #[serde(default, deserialize_with = "input::patch_number")]
    pub progress: Option<Option<f64>>,
    pub phase: Option<Phase>,
}

impl Task {
    fn validate(&self) -> DomainResult<()> {
        validate::non_empty("name", &self.name)?;
        validate::percentage("progress", self.progress)?;
        validate::date_order(self.start_date, self.end_date)?;
        Ok(())
    }

    /// A completed task is always reported at 100%.
    fn normalise_progress(&mut self) {
        if self.status == TaskStatus::Completed && self.progress < 100.0 {
            self.progress = 100.0;
        }
    }

    fn fill(&mut self, draft: NewTask) {
        self.name = draft.name.trim().to_string();
        self.description = draft.description;
        self.project_id = draft.project_id;
        self.assignee_id = draft.assignee_id;
        self.priority = draft.priority;
        self.status = draft.status;
        self.start_date = draft.start_date;
        self.end_date = draft.end_date;
        self.progress = draft.progress.unwrap_or(0.0);
        self.phase = draft.phase;
        self.normalise_progress();
    }

    pub fn is_overdue(&self, today: NaiveDate) -> bool {
        self.status != TaskStatus::Completed && self.end_date.is_some_and(|end| end < today)
    }
}

impl Record for Task {
    const RESOURCE: &'static str = "tasks";

    fn record_id(&self) -> Uuid {
        *self.id.as_uuid()
    }

    fn project_ref(&self) -> Option<Uuid> {
        Some(*self.project_id.as_uuid())
    }

    fn search_fields(&self) -> Vec<&str> {
        let mut fields = vec![self.name.as_str()];
        fields.extend(self.description.as_deref());
        fields
    }
}

impl Creatable for Task {
    type Draft = NewTask;

    fn from_draft(id: Uuid, draft: NewTask, now: DateTime<Utc>) -> DomainResult<Self> {
        let mut task = Task {
            id: TaskId::from_uuid(id),
            name: String::new(),
            description: None,
            project_id: draft.project_id,
            assignee_id: None,
            priority: Priority::default(),
            status: TaskStatus::default(),
            start_date: None,
            end_date: None,
            progress: 0.0,
            phase: Phase::default(),
            timestamps: Timestamps::new(now),
        };
        task.fill(draft);
        task.validate()?;
        Ok(task)
    }
}

impl Editable for Task {
    type Patch = TaskPatch;

    fn replace(&mut self, draft: NewTask, now: DateTime<Utc>) -> DomainResult<()> {
        let mut next = self.clone();
        next.fill(draft);
        next.validate()?;
        next.timestamps.touch(now);
        *self = next;
        Ok(())
    }

    fn apply_patch(&mut self, patch: TaskPatch, now: DateTime<Utc>) -> DomainResult<()> {
        let mut next = self.clone();
        if let Some(name) = patch.name {
            next.name = name.trim().to_string();
        }
        if let Some(description) = patch.description {
            next.description = description;
        }
        if let Some(project_id) = patch.project_id {
            next.project_id = project_id;
        }
        if let Some(assignee) = patch.assignee_id {
            next.assignee_id = assignee;
        }
        if let Some(priority) = patch.priority {
            next.priority = priority;
        }
        if let Some(status) = patch.status {
            next.status = status;
        }
        if let Some(start) = patch.start_date {
            next.start_date = start;
        }
        if let Some(end) = patch.end_date {
            next.end_date = end;
        }
        if let Some(progress) = patch.progress {
            next.progress = progress.unwrap_or(0.0);
        }
        if let Some(phase) = patch.phase {
            next.phase = phase;
        }
        next.normalise_progress();
        next.validate()?;
        next.timestamps.touch(now);
        *self = next;
        Ok(())
    }
}
