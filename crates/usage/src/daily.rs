//! Daily usage submissions.
//!
//! A submission is one project and date with three line lists. Planning is
//! pure: it drops lines without a reference id or with a non-positive amount
//! and turns each remaining line into exactly one category write, in list
//! order (materials, manpower, equipment). Issuing the writes is the caller's
//! job; they are independent of each other.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use sitebook_core::input;
use sitebook_materials::MaterialId;
use sitebook_projects::ProjectId;
use sitebook_resources::{EquipmentId, StaffId};

use crate::record::{NewEquipmentUsage, NewManpowerUsage, NewMaterialUsage};

#[derive(Debug, Clone, Default, Deserialize)]
pub struct MaterialLine {
    #[serde(default, deserialize_with = "input::opt_ref")]
    pub material_id: Option<MaterialId>,
    #[serde(default, deserialize_with = "input::opt_number")]
    pub quantity: Option<f64>,
    #[serde(default, deserialize_with = "input::opt_text")]
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ManpowerLine {
    #[serde(default, deserialize_with = "input::opt_ref")]
    pub staff_id: Option<StaffId>,
    #[serde(default, deserialize_with = "input::opt_number")]
    pub hours: Option<f64>,
    #[serde(default, deserialize_with = "input::opt_text")]
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct EquipmentLine {
    #[serde(default, deserialize_with = "input::opt_ref")]
    pub equipment_id: Option<EquipmentId>,
    #[serde(default, deserialize_with = "input::opt_number")]
    pub hours: Option<f64>,
    #[serde(default, deserialize_with = "input::opt_text")]
    pub notes: Option<String>,
}

/// `POST /api/daily-usage` body.
#[derive(Debug, Clone, Deserialize)]
pub struct DailyUsageSubmission {
    pub project_id: ProjectId,
    #[serde(deserialize_with = "input::date")]
    pub date: NaiveDate,
    #[serde(default)]
    pub materials: Vec<MaterialLine>,
    #[serde(default)]
    pub manpower: Vec<ManpowerLine>,
    #[serde(default)]
    pub equipment: Vec<EquipmentLine>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum UsageCategory {
    Materials,
    Manpower,
    Equipment,
}

/// One planned write to a category store.
#[derive(Debug, Clone, PartialEq)]
pub enum UsageWrite {
    Material(NewMaterialUsage),
    Manpower(NewManpowerUsage),
    Equipment(NewEquipmentUsage),
}

impl UsageWrite {
    pub fn category(&self) -> UsageCategory {
        match self {
            UsageWrite::Material(_) => UsageCategory::Materials,
            UsageWrite::Manpower(_) => UsageCategory::Manpower,
            UsageWrite::Equipment(_) => UsageCategory::Equipment,
        }
    }
}

/// Per-category line counts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct CategoryCounts {
    pub materials: usize,
    pub manpower: usize,
    pub equipment: usize,
}

impl CategoryCounts {
    pub fn bump(&mut self, category: UsageCategory) {
        match category {
            UsageCategory::Materials => self.materials += 1,
            UsageCategory::Manpower => self.manpower += 1,
            UsageCategory::Equipment => self.equipment += 1,
        }
    }

    pub fn total(&self) -> usize {
        self.materials + self.manpower + self.equipment
    }
}

/// The writes a submission expands to, plus the lines that were dropped.
#[derive(Debug, Clone, PartialEq)]
pub struct DailyUsagePlan {
    pub writes: Vec<UsageWrite>,
    pub skipped: CategoryCounts,
}

fn usable(amount: Option<f64>) -> Option<f64> {
    amount.filter(|a| *a > 0.0)
}

impl DailyUsageSubmission {
    pub fn plan(self) -> DailyUsagePlan {
        let DailyUsageSubmission {
            project_id,
            date,
            materials,
            manpower,
            equipment,
        } = self;

        let mut writes = Vec::new();
        let mut skipped = CategoryCounts::default();

        for line in materials {
            match (line.material_id, usable(line.quantity)) {
                (Some(material_id), Some(quantity)) => {
                    writes.push(UsageWrite::Material(NewMaterialUsage {
                        project_id,
                        date,
                        material_id,
                        quantity,
                        notes: line.notes,
                    }))
                }
                _ => skipped.bump(UsageCategory::Materials),
            }
        }
        for line in manpower {
            match (line.staff_id, usable(line.hours)) {
                (Some(staff_id), Some(hours)) => writes.push(UsageWrite::Manpower(NewManpowerUsage {
                    project_id,
                    date,
                    staff_id,
                    hours,
                    notes: line.notes,
                })),
                _ => skipped.bump(UsageCategory::Manpower),
            }
        }
        for line in equipment {
            match (line.equipment_id, usable(line.hours)) {
                (Some(equipment_id), Some(hours)) => {
                    writes.push(UsageWrite::Equipment(NewEquipmentUsage {
                        project_id,
                        date,
                        equipment_id,
                        hours,
                        notes: line.notes,
                    }))
                }
                _ => skipped.bump(UsageCategory::Equipment),
            }
        }

        DailyUsagePlan { writes, skipped }
    }
}
