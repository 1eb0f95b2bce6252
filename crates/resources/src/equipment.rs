use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use sitebook_core::id::Uuid;
use sitebook_core::{Creatable, DomainResult, Editable, Record, Timestamps, input, record_id, validate};
use sitebook_projects::ProjectId;

use crate::staff::StaffId;

record_id!(
    /// Equipment identifier.
    EquipmentId
);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum EquipmentStatus {
    #[default]
    Operational,
    Maintenance,
    Broken,
    Idle,
}

/// Record: a piece of site equipment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Equipment {
    pub id: EquipmentId,
    pub name: String,
    #[serde(rename = "type")]
    pub equipment_type: String,
    pub status: EquipmentStatus,
    pub maintenance_due: Option<NaiveDate>,
    pub hours_used: f64,
    pub operator_id: Option<StaffId>,
    pub project_id: Option<ProjectId>,
    #[serde(flatten)]
    pub timestamps: Timestamps,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewEquipment {
    pub name: String,
    #[serde(rename = "type")]
    pub equipment_type: String,
    #[serde(default)]
    pub status: EquipmentStatus,
    #[serde(default, deserialize_with = "input::opt_date")]
    pub maintenance_due: Option<NaiveDate>,
    #[serde(default, deserialize_with = "input::opt_number")]
    pub hours_used: Option<f64>,
    #[serde(default, deserialize_with = "input::opt_ref")]
    pub operator_id: Option<StaffId>,
    #[serde(default, deserialize_with = "input::opt_ref")]
    pub project_id: Option<ProjectId>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct EquipmentPatch {
    pub name: Option<String>,
    #[serde(rename = "type")]
    pub equipment_type: Option<String>,
    pub status: Option<EquipmentStatus>,
    #[serde(default, deserialize_with = "input::patch_date")]
    pub maintenance_due: Option<Option<NaiveDate>>,
    #[serde(default, deserialize_with = "input::patch_number")]
    pub hours_used: Option<Option<f64>>,
    #[serde(default, deserialize_with = "input::patch_ref")]
    pub operator_id: Option<Option<StaffId>>,
    #[serde(default, deserialize_with = "input::patch_ref")]
    pub project_id: Option<Option<ProjectId>>,
}

impl Equipment {
    /// Maintenance is overdue when the due date has passed and the unit is not
    /// already in maintenance.
    pub fn maintenance_overdue(&self, today: NaiveDate) -> bool {
        match self.maintenance_due {
            Some(due) => due < today && self.status != EquipmentStatus::Maintenance,
            None => false,
        }
    }

    fn validate(&self) -> DomainResult<()> {
        validate::non_empty("name", &self.name)?;
        validate::non_empty("type", &self.equipment_type)?;
        validate::non_negative("hours_used", self.hours_used)?;
        Ok(())
    }

    fn fill(&mut self, draft: NewEquipment) {
        self.name = draft.name.trim().to_string();
        self.equipment_type = draft.equipment_type.trim().to_string();
        self.status = draft.status;
        self.maintenance_due = draft.maintenance_due;
        self.hours_used = draft.hours_used.unwrap_or(0.0);
        self.operator_id = draft.operator_id;
        self.project_id = draft.project_id;
    }
}

impl Record for Equipment {
    const RESOURCE: &'static str = "equipment";

    fn record_id(&self) -> Uuid {
        *self.id.as_uuid()
    }

    fn project_ref(&self) -> Option<Uuid> {
        self.project_id.map(Uuid::from)
    }

    fn search_fields(&self) -> Vec<&str> {
        vec![self.name.as_str(), self.equipment_type.as_str()]
    }
}

impl Creatable for Equipment {
    type Draft = NewEquipment;

    fn from_draft(id: Uuid, draft: NewEquipment, now: DateTime<Utc>) -> DomainResult<Self> {
        let mut equipment = Equipment {
            id: EquipmentId::from_uuid(id),
            name: String::new(),
            equipment_type: String::new(),
            status: EquipmentStatus::default(),
            maintenance_due: None,
            hours_used: 0.0,
            operator_id: None,
            project_id: None,
            timestamps: Timestamps::new(now),
        };
        equipment.fill(draft);
        equipment.validate()?;
        Ok(equipment)
    }
}

impl Editable for Equipment {
    type Patch = EquipmentPatch;

    fn replace(&mut self, draft: NewEquipment, now: DateTime<Utc>) -> DomainResult<()> {
        let mut next = self.clone();
        next.fill(draft);
        next.validate()?;
        next.timestamps.touch(now);
        *self = next;
        Ok(())
    }

    fn apply_patch(&mut self, patch: EquipmentPatch, now: DateTime<Utc>) -> DomainResult<()> {
        let mut next = self.clone();
        if let Some(name) = patch.name {
            next.name = name.trim().to_string();
        }
        if let Some(kind) = patch.equipment_type {
            next.equipment_type = kind.trim().to_string();
        }
        if let Some(status) = patch.status {
            next.status = status;
        }
        if let Some(due) = patch.maintenance_due {
            next.maintenance_due = due;
        }
        if let Some(hours) = patch.hours_used {
            next.hours_used = hours.unwrap_or(0.0);
        }
        if let Some(operator) = patch.operator_id {
            next.operator_id = operator;
        }
        if let Some(project) = patch.project_id {
            next.project_id = project;
        }
        next.validate()?;
        next.timestamps.touch(now);
        *self = next;
        Ok(())
    }
}
