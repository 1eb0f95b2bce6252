use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use sitebook_core::id::Uuid;
use sitebook_core::{Creatable, DomainResult, Record, Timestamps, input, record_id, validate};
use sitebook_materials::MaterialId;
use sitebook_projects::ProjectId;
use sitebook_resources::{EquipmentId, StaffId};

record_id!(
    /// Material usage identifier.
    MaterialUsageId
);
record_id!(
    /// Manpower usage identifier.
    ManpowerUsageId
);
record_id!(
    /// Equipment usage identifier.
    EquipmentUsageId
);

/// Record: quantity of a material consumed on a project on one day.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MaterialUsage {
    pub id: MaterialUsageId,
    pub project_id: ProjectId,
    pub date: NaiveDate,
    pub material_id: MaterialId,
    pub quantity: f64,
    pub notes: Option<String>,
    #[serde(flatten)]
    pub timestamps: Timestamps,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct NewMaterialUsage {
    pub project_id: ProjectId,
    #[serde(deserialize_with = "input::date")]
    pub date: NaiveDate,
    pub material_id: MaterialId,
    #[serde(deserialize_with = "input::number")]
    pub quantity: f64,
    #[serde(default, deserialize_with = "input::opt_text")]
    pub notes: Option<String>,
}

/// Record: hours a staff member worked on a project on one day.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ManpowerUsage {
    pub id: ManpowerUsageId,
    pub project_id: ProjectId,
    pub date: NaiveDate,
    pub staff_id: StaffId,
    pub hours: f64,
    pub notes: Option<String>,
    #[serde(flatten)]
    pub timestamps: Timestamps,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct NewManpowerUsage {
    pub project_id: ProjectId,
    #[serde(deserialize_with = "input::date")]
    pub date: NaiveDate,
    pub staff_id: StaffId,
    #[serde(deserialize_with = "input::number")]
    pub hours: f64,
    #[serde(default, deserialize_with = "input::opt_text")]
    pub notes: Option<String>,
}

/// Record: hours a piece of equipment ran on a project on one day.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EquipmentUsage {
    pub id: EquipmentUsageId,
    pub project_id: ProjectId,
    pub date: NaiveDate,
    pub equipment_id: EquipmentId,
    pub hours: f64,
    pub notes: Option<String>,
    #[serde(flatten)]
    pub timestamps: Timestamps,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct NewEquipmentUsage {
    pub project_id: ProjectId,
    #[serde(deserialize_with = "input::date")]
    pub date: NaiveDate,
    pub equipment_id: EquipmentId,
    #[serde(deserialize_with = "input::number")]
    pub hours: f64,
    #[serde(default, deserialize_with = "input::opt_text")]
    pub notes: Option<String>,
}

impl Record for MaterialUsage {
    const RESOURCE: &'static str = "usage_materials";

    fn record_id(&self) -> Uuid {
        *self.id.as_uuid()
    }

    fn project_ref(&self) -> Option<Uuid> {
        Some(*self.project_id.as_uuid())
    }

    fn search_fields(&self) -> Vec<&str> {
        self.notes.as_deref().into_iter().collect()
    }
}

impl Creatable for MaterialUsage {
    type Draft = NewMaterialUsage;

    fn from_draft(id: Uuid, draft: NewMaterialUsage, now: DateTime<Utc>) -> DomainResult<Self> {
        validate::positive("quantity", draft.quantity)?;
        Ok(MaterialUsage {
            id: MaterialUsageId::from_uuid(id),
            project_id: draft.project_id,
            date: draft.date,
            material_id: draft.material_id,
            quantity: draft.quantity,
            notes: draft.notes,
            timestamps: Timestamps::new(now),
        })
    }
}

impl Record for ManpowerUsage {
    const RESOURCE: &'static str = "usage_manpower";

    fn record_id(&self) -> Uuid {
        *self.id.as_uuid()
    }

    fn project_ref(&self) -> Option<Uuid> {
        Some(*self.project_id.as_uuid())
    }

    fn search_fields(&self) -> Vec<&str> {
        self.notes.as_deref().into_iter().collect()
    }
}

impl Creatable for ManpowerUsage {
    type Draft = NewManpowerUsage;

    fn from_draft(id: Uuid, draft: NewManpowerUsage, now: DateTime<Utc>) -> DomainResult<Self> {
        validate::positive("hours", draft.hours)?;
        Ok(ManpowerUsage {
            id: ManpowerUsageId::from_uuid(id),
            project_id: draft.project_id,
            date: draft.date,
            staff_id: draft.staff_id,
            hours: draft.hours,
            notes: draft.notes,
            timestamps: Timestamps::new(now),
        })
    }
}

impl Record for EquipmentUsage {
    const RESOURCE: &'static str = "usage_equipment";

    fn record_id(&self) -> Uuid {
        *self.id.as_uuid()
    }

    fn project_ref(&self) -> Option<Uuid> {
        Some(*self.project_id.as_uuid())
    }

    fn search_fields(&self) -> Vec<&str> {
        self.notes.as_deref().into_iter().collect()
    }
}

impl Creatable for EquipmentUsage {
    type Draft = NewEquipmentUsage;

    fn from_draft(id: Uuid, draft: NewEquipmentUsage, now: DateTime<Utc>) -> DomainResult<Self> {
        validate::positive("hours", draft.hours)?;
        Ok(EquipmentUsage {
            id: EquipmentUsageId::from_uuid(id),
            project_id: draft.project_id,
            date: draft.date,
            equipment_id: draft.equipment_id,
            hours: draft.hours,
            notes: draft.notes,
            timestamps: Timestamps::new(now),
        })
    }
}
