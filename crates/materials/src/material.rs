use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use sitebook_core::id::Uuid;
use sitebook_core::{Creatable, DomainResult, Editable, Record, Timestamps, input, record_id, validate};

record_id!(
    /// Material master identifier.
    MaterialId
);

/// Record: catalog entry for a material (cement, rebar, ...).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Material {
    pub id: MaterialId,
    pub name: String,
    /// Unit of measure (`bags`, `m3`, `tons`).
    pub unit: String,
    pub category: Option<String>,
    /// Standard unit cost, used as the default for requirements and orders.
    pub unit_cost: f64,
    pub description: Option<String>,
    #[serde(flatten)]
    pub timestamps: Timestamps,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewMaterial {
    pub name: String,
    pub unit: String,
    #[serde(default, deserialize_with = "input::opt_text")]
    pub category: Option<String>,
    #[serde(default, deserialize_with = "input::opt_number")]
    pub unit_cost: Option<f64>,
    #[serde(default, deserialize_with = "input::opt_text")]
    pub description: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct MaterialPatch {
    pub name: Option<String>,
    pub unit: Option<String>,
    #[serde(default, deserialize_with = "input::patch_text")]
    pub category: Option<Option<String>>,
    #[serde(default, deserialize_with = "input::patch_number")]
    pub unit_cost: Option<Option<f64>>,
    #[serde(default, deserialize_with = "input::patch_text")]
    pub description: Option<Option<String>>,
}

impl Material {
    fn validate(&self) -> DomainResult<()> {
        validate::non_empty("name", &self.name)?;
        validate::non_empty("unit", &self.unit)?;
        validate::non_negative("unit_cost", self.unit_cost)
    }

    fn fill(&mut self, draft: NewMaterial) {
        self.name = draft.name.trim().to_string();
        self.unit = draft.unit.trim().to_string();
        self.category = draft.category;
        self.unit_cost = draft.unit_cost.unwrap_or(0.0);
        self.description = draft.description;
    }
}

impl Record for Material {
    const RESOURCE: &'static str = "materials";

    fn record_id(&self) -> Uuid {
        *self.id.as_uuid()
    }

    fn search_fields(&self) -> Vec<&str> {
        let mut fields = vec![self.name.as_str(), self.unit.as_str()];
        fields.extend(self.category.as_deref());
        fields
    }
}

impl Creatable for Material {
    type Draft = NewMaterial;

    fn from_draft(id: Uuid, draft: NewMaterial, now: DateTime<Utc>) -> DomainResult<Self> {
        let mut material = Material {
            id: MaterialId::from_uuid(id),
            name: String::new(),
            unit: String::new(),
            category: None,
            unit_cost: 0.0,
            description: None,
            timestamps: Timestamps::new(now),
        };
        material.fill(draft);
        material.validate()?;
        Ok(material)
    }
}

impl Editable for Material {
    type Patch = MaterialPatch;

    fn replace(&mut self, draft: NewMaterial, now: DateTime<Utc>) -> DomainResult<()> {
        let mut next = self.clone();
        next.fill(draft);
        next.validate()?;
        next.timestamps.touch(now);
        *self = next;
        Ok(())
    }

    fn apply_patch(&mut self, patch: MaterialPatch, now: DateTime<Utc>) -> DomainResult<()> {
        let mut next = self.clone();
        if let Some(name) = patch.name {
            next.name = name.trim().to_string();
        }
        if let Some(unit) = patch.unit {
            next.unit = unit.trim().to_string();
        }
        if let Some(category) = patch.category {
            next.category = category;
        }
        if let Some(cost) = patch.unit_cost {
            next.unit_cost = cost.unwrap_or(0.0);
        }
        if let Some(description) = patch.description {
            next.description = description;
        }
        next.validate()?;
        next.timestamps.touch(now);
        *self = next;
        Ok(())
    }
}
