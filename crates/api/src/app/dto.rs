use chrono::NaiveDate;
use serde::Deserialize;
use serde_json::Value;

use sitebook_core::Record;
use sitebook_materials::{Material, MaterialRequirement, MaterialTransaction};
use sitebook_procurement::ProcurementOrder;
use sitebook_projects::Project;
use sitebook_resources::{Equipment, Staff};
use sitebook_tasks::Task;
use sitebook_usage::{EquipmentUsage, ManpowerUsage, MaterialUsage};

use crate::app::errors::ApiError;
use crate::app::routes::common::parse_uuid;

// -------------------------
// Request DTOs
// -------------------------

/// `GET /api/<resource>` filters.
#[derive(Debug, Default, Deserialize)]
pub struct ListQuery {
    pub q: Option<String>,
    pub project_id: Option<String>,
}

impl ListQuery {
    /// Blank `project_id` means no filter.
    pub fn project_filter(&self) -> Result<Option<sitebook_core::id::Uuid>, ApiError> {
        match self.project_id.as_deref().map(str::trim) {
            None | Some("") => Ok(None),
            Some(raw) => parse_uuid(raw).map(Some),
        }
    }

    pub fn matches<V: Record>(&self, record: &V, project: Option<sitebook_core::id::Uuid>) -> bool {
        let text_ok = self.q.as_deref().is_none_or(|q| record.matches_text(q));
        let project_ok = project.is_none_or(|pid| record.project_ref() == Some(pid));
        text_ok && project_ok
    }
}

// -------------------------
// Response mapping
// -------------------------

/// JSON representation of a record as served to clients.
///
/// The stored fields plus any values derived at read time.
pub trait RecordView: Record {
    fn view(&self, _today: NaiveDate) -> Result<Value, serde_json::Error> {
        serde_json::to_value(self)
    }
}

fn with_field(mut value: Value, key: &str, extra: Value) -> Value {
    if let Value::Object(map) = &mut value {
        map.insert(key.to_string(), extra);
    }
    value
}

impl RecordView for Project {}
impl RecordView for Staff {}
impl RecordView for Material {}
impl RecordView for MaterialRequirement {}
impl RecordView for MaterialTransaction {}
impl RecordView for MaterialUsage {}
impl RecordView for ManpowerUsage {}
impl RecordView for EquipmentUsage {}

impl RecordView for Equipment {
    fn view(&self, today: NaiveDate) -> Result<Value, serde_json::Error> {
        let overdue = self.maintenance_overdue(today);
        Ok(with_field(serde_json::to_value(self)?, "maintenance_overdue", overdue.into()))
    }
}

impl RecordView for Task {
    fn view(&self, today: NaiveDate) -> Result<Value, serde_json::Error> {
        let overdue = self.is_overdue(today);
        Ok(with_field(serde_json::to_value(self)?, "overdue", overdue.into()))
    }
}

impl RecordView for ProcurementOrder {
    fn view(&self, _today: NaiveDate) -> Result<Value, serde_json::Error> {
        let actions = serde_json::to_value(self.actions())?;
        Ok(with_field(serde_json::to_value(self)?, "actions", actions))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use serde_json::json;
    use sitebook_core::Creatable;
    use sitebook_core::id::Uuid;

    #[test]
    fn order_view_lists_available_actions() {
        let draft = serde_json::from_value(json!({
            "material_id": Uuid::now_v7(),
            "supplier": "Acme",
            "quantity": 4,
            "unit_cost": 2.5,
        }))
        .unwrap();
        let order = ProcurementOrder::from_draft(Uuid::now_v7(), draft, Utc::now()).unwrap();

        let view = order.view(Utc::now().date_naive()).unwrap();
        assert_eq!(view["actions"], json!({ "receive": true, "edit": true }));
        assert_eq!(view["total_cost"], json!(10.0));
    }

    #[test]
    fn blank_project_filter_is_ignored() {
        let query = ListQuery {
            q: None,
            project_id: Some("  ".into()),
        };
        assert_eq!(query.project_filter().unwrap(), None);

        let bad = ListQuery {
            q: None,
            project_id: Some("nope".into()),
        };
        assert!(matches!(bad.project_filter(), Err(ApiError::InvalidId(_))));
    }
}
