use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use sitebook_core::id::Uuid;
use sitebook_core::{Creatable, DomainResult, Editable, Record, Timestamps, input, record_id, validate};
use sitebook_projects::{Phase, ProjectId};

use crate::cost::line_total;
use crate::material::MaterialId;

record_id!(
    /// Material requirement identifier.
    RequirementId
);

/// Record: planned (not yet ordered) quantity of a material for a project phase.
///
/// `total_cost` is derived and always equals `quantity * unit_cost`; clients
/// cannot set it directly.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MaterialRequirement {
    pub id: RequirementId,
    pub material_id: MaterialId,
    pub project_id: ProjectId,
    pub phase: Phase,
    pub quantity: f64,
    pub unit_cost: f64,
    pub total_cost: f64,
    pub notes: Option<String>,
    #[serde(flatten)]
    pub timestamps: Timestamps,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewRequirement {
    pub material_id: MaterialId,
    pub project_id: ProjectId,
    #[serde(default)]
    pub phase: Phase,
    #[serde(deserialize_with = "input::number")]
    pub quantity: f64,
    #[serde(default, deserialize_with = "input::opt_number")]
    pub unit_cost: Option<f64>,
    #[serde(default, deserialize_with = "input::opt_text")]
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RequirementPatch {
    pub material_id: Option<MaterialId>,
    pub project_id: Option<ProjectId>,
    pub phase: Option<Phase>,
    #[serde(default, deserialize_with = "input::opt_number")]
    pub quantity: Option<f64>,
    #[serde(default, deserialize_with = "input::opt_number")]
    pub unit_cost: Option<f64>,
    #[serde(default, deserialize_with = "input::patch_text")]
    pub notes: Option<Option<String>>,
}

impl MaterialRequirement {
    fn validate(&self) -> DomainResult<()> {
        validate::positive("quantity", self.quantity)?;
        validate::non_negative("unit_cost", self.unit_cost)
    }

    fn recompute_total(&mut self) {
        self.total_cost = line_total(self.quantity, self.unit_cost);
    }

    fn fill(&mut self, draft: NewRequirement) {
        self.material_id = draft.material_id;
        self.project_id = draft.project_id;
        self.phase = draft.phase;
        self.quantity = draft.quantity;
        self.unit_cost = draft.unit_cost.unwrap_or(0.0);
        self.notes = draft.notes;
        self.recompute_total();
    }
}

impl Record for MaterialRequirement {
    const RESOURCE: &'static str = "requirements";

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

impl Creatable for MaterialRequirement {
    type Draft = NewRequirement;

    fn from_draft(id: Uuid, draft: NewRequirement, now: DateTime<Utc>) -> DomainResult<Self> {
        let mut req = MaterialRequirement {
            id: RequirementId::from_uuid(id),
            material_id: draft.material_id,
            project_id: draft.project_id,
            phase: Phase::default(),
            quantity: 0.0,
            unit_cost: 0.0,
            total_cost: 0.0,
            notes: None,
            timestamps: Timestamps::new(now),
        };
        req.fill(draft);
        req.validate()?;
        Ok(req)
    }
}

impl Editable for MaterialRequirement {
    type Patch = RequirementPatch;

    fn replace(&mut self, draft: NewRequirement, now: DateTime<Utc>) -> DomainResult<()> {
        let mut next = self.clone();
        next.fill(draft);
        next.validate()?;
        next.timestamps.touch(now);
        *self = next;
        Ok(())
    }

    fn apply_patch(&mut self, patch: RequirementPatch, now: DateTime<Utc>) -> DomainResult<()> {
        let mut next = self.clone();
        if let Some(material_id) = patch.material_id {
            next.material_id = material_id;
        }
        if let Some(project_id) = patch.project_id {
            next.project_id = project_id;
        }
        if let Some(phase) = patch.phase {
            next.phase = phase;
        }
        if let Some(quantity) = patch.quantity {
            next.quantity = quantity;
        }
        if let Some(unit_cost) = patch.unit_cost {
            next.unit_cost = unit_cost;
        }
        if let Some(notes) = patch.notes {
            next.notes = notes;
        }
        next.recompute_total();
        next.validate()?;
        next.timestamps.touch(now);
        *self = next;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use serde_json::json;

    fn requirement(quantity: f64, unit_cost: f64) -> MaterialRequirement {
        let draft: NewRequirement = serde_json::from_value(json!({
            "material_id": MaterialId::new(),
            "project_id": ProjectId::new(),
            "phase": "Construction",
            "quantity": quantity,
            "unit_cost": unit_cost,
        }))
        .unwrap();
        MaterialRequirement::from_draft(Uuid::now_v7(), draft, Utc::now()).unwrap()
    }

    #[test]
    fn total_cost_is_derived_on_create() {
        let draft: NewRequirement = serde_json::from_value(json!({
            "material_id": MaterialId::new(),
            "project_id": ProjectId::new(),
            "quantity": "10",
            "unit_cost": "5",
            "total_cost": 999,
        }))
        .unwrap();
        let req = MaterialRequirement::from_draft(Uuid::now_v7(), draft, Utc::now()).unwrap();
        assert_eq!(req.total_cost, 50.0);
    }

    #[test]
    fn updating_quantity_and_unit_cost_recomputes_total() {
        let mut req = requirement(1.0, 1.0);
        let patch: RequirementPatch =
            serde_json::from_value(json!({ "quantity": 10, "unit_cost": 5 })).unwrap();
        req.apply_patch(patch, Utc::now()).unwrap();
        assert_eq!(req.total_cost, 50.0);
    }

    #[test]
    fn non_positive_quantity_is_rejected() {
        let mut req = requirement(4.0, 2.5);
        let patch: RequirementPatch = serde_json::from_value(json!({ "quantity": 0 })).unwrap();
        assert!(req.apply_patch(patch, Utc::now()).is_err());
        assert_eq!(req.total_cost, 10.0);
    }

    proptest! {
        #![proptest_config(ProptestConfig {
            cases: 256,
            ..ProptestConfig::default()
        })]

        /// Property: whichever operands a patch touches, the stored total is
        /// the product of the resulting quantity and unit cost.
        #[test]
        fn total_cost_tracks_operands(
            q0 in 0.01f64..10_000.0,
            u0 in 0.0f64..1_000.0,
            q1 in proptest::option::of(0.01f64..10_000.0),
            u1 in proptest::option::of(0.0f64..1_000.0),
        ) {
            let mut req = requirement(q0, u0);
            let patch = RequirementPatch { quantity: q1, unit_cost: u1, ..RequirementPatch::default() };
            req.apply_patch(patch, Utc::now()).unwrap();

            prop_assert_eq!(req.quantity, q1.unwrap_or(q0));
            prop_assert_eq!(req.unit_cost, u1.unwrap_or(u0));
            prop_assert_eq!(req.total_cost, req.quantity * req.unit_cost);
        }
    }
}
