use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

use sitebook_core::id::Uuid;
use sitebook_core::{Creatable, DomainResult, Editable, Record, Timestamps, input, record_id, validate};
use sitebook_projects::ProjectId;

record_id!(
    /// Staff (manpower) identifier.
    StaffId
);

/// Closed set of site job titles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum StaffRole {
    #[serde(rename = "Project Manager")]
    ProjectManager,
    #[serde(rename = "Site Engineer")]
    SiteEngineer,
    #[serde(rename = "Civil Engineer")]
    CivilEngineer,
    Architect,
    #[serde(rename = "Site Supervisor")]
    SiteSupervisor,
    Foreman,
    Electrician,
    Plumber,
    Carpenter,
    Mason,
    Welder,
    #[serde(rename = "Equipment Operator")]
    EquipmentOperator,
    Laborer,
}

impl StaffRole {
    pub const ALL: [StaffRole; 13] = [
        StaffRole::ProjectManager,
        StaffRole::SiteEngineer,
        StaffRole::CivilEngineer,
        StaffRole::Architect,
        StaffRole::SiteSupervisor,
        StaffRole::Foreman,
        StaffRole::Electrician,
        StaffRole::Plumber,
        StaffRole::Carpenter,
        StaffRole::Mason,
        StaffRole::Welder,
        StaffRole::EquipmentOperator,
        StaffRole::Laborer,
    ];

    pub fn label(self) -> &'static str {
        match self {
            StaffRole::ProjectManager => "Project Manager",
            StaffRole::SiteEngineer => "Site Engineer",
            StaffRole::CivilEngineer => "Civil Engineer",
            StaffRole::Architect => "Architect",
            StaffRole::SiteSupervisor => "Site Supervisor",
            StaffRole::Foreman => "Foreman",
            StaffRole::Electrician => "Electrician",
            StaffRole::Plumber => "Plumber",
            StaffRole::Carpenter => "Carpenter",
            StaffRole::Mason => "Mason",
            StaffRole::Welder => "Welder",
            StaffRole::EquipmentOperator => "Equipment Operator",
            StaffRole::Laborer => "Laborer",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StaffStatus {
    #[default]
    Active,
    Inactive,
    OnLeave,
}

/// Record: Staff member.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Staff {
    pub id: StaffId,
    pub name: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub role: StaffRole,
    pub specialization: Option<String>,
    pub hourly_rate: f64,
    pub status: StaffStatus,
    pub skills: BTreeSet<String>,
    pub project_id: Option<ProjectId>,
    #[serde(flatten)]
    pub timestamps: Timestamps,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewStaff {
    pub name: String,
    #[serde(default, deserialize_with = "input::opt_text")]
    pub email: Option<String>,
    #[serde(default, deserialize_with = "input::opt_text")]
    pub phone: Option<String>,
    pub role: StaffRole,
    #[serde(default, deserialize_with = "input::opt_text")]
    pub specialization: Option<String>,
    #[serde(default, deserialize_with = "input::opt_number")]
    pub hourly_rate: Option<f64>,
    #[serde(default)]
    pub status: StaffStatus,
    #[serde(default, deserialize_with = "skill_set")]
    pub skills: BTreeSet<String>,
    #[serde(default, deserialize_with = "input::opt_ref")]
    pub project_id: Option<ProjectId>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct StaffPatch {
    pub name: Option<String>,
    #[serde(default, deserialize_with = "input::patch_text")]
    pub email: Option<Option<String>>,
    #[serde(default, deserialize_with = "input::patch_text")]
    pub phone: Option<Option<String>>,
    pub role: Option<StaffRole>,
    #[serde(default, deserialize_with = "input::patch_text")]
    pub specialization: Option<Option<String>>,
    #[serde(default, deserialize_with = "input::patch_number")]
    pub hourly_rate: Option<Option<f64>>,
    pub status: Option<StaffStatus>,
    #[serde(default, deserialize_with = "patch_skill_set")]
    pub skills: Option<BTreeSet<String>>,
    #[serde(default, deserialize_with = "input::patch_ref")]
    pub project_id: Option<Option<ProjectId>>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum SkillsInput {
    List(Vec<String>),
    Text(String),
}

/// Skills arrive as a list or a comma separated string; entries are trimmed,
/// blanks dropped and duplicates collapsed.
fn skill_set<'de, D: Deserializer<'de>>(d: D) -> Result<BTreeSet<String>, D::Error> {
    let raw = Option::<SkillsInput>::deserialize(d)?;
    let items: Vec<String> = match raw {
        Some(SkillsInput::List(list)) => list,
        Some(SkillsInput::Text(text)) => text.split(',').map(str::to_string).collect(),
        None => Vec::new(),
    };
    Ok(items
        .into_iter()
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect())
}

fn patch_skill_set<'de, D: Deserializer<'de>>(d: D) -> Result<Option<BTreeSet<String>>, D::Error> {
    skill_set(d).map(Some)
}

impl Staff {
    fn validate(&self) -> DomainResult<()> {
        validate::non_empty("name", &self.name)?;
        validate::non_negative("hourly_rate", self.hourly_rate)?;
        if let Some(email) = &self.email {
            if !email.contains('@') {
                return Err(sitebook_core::DomainError::validation(
                    "email",
                    "must be an email address",
                ));
            }
        }
        Ok(())
    }

    fn fill(&mut self, draft: NewStaff) {
        self.name = draft.name.trim().to_string();
        self.email = draft.email;
        self.phone = draft.phone;
        self.role = draft.role;
        self.specialization = draft.specialization;
        self.hourly_rate = draft.hourly_rate.unwrap_or(0.0);
        self.status = draft.status;
        self.skills = draft.skills;
        self.project_id = draft.project_id;
    }
}

impl Record for Staff {
    const RESOURCE: &'static str = "staff";

    fn record_id(&self) -> Uuid {
        *self.id.as_uuid()
    }

    fn project_ref(&self) -> Option<Uuid> {
        self.project_id.map(Uuid::from)
    }

    fn search_fields(&self) -> Vec<&str> {
        let mut fields = vec![self.name.as_str(), self.role.label()];
        fields.extend(self.specialization.as_deref());
        fields.extend(self.email.as_deref());
        fields.extend(self.skills.iter().map(String::as_str));
        fields
    }
}

impl Creatable for Staff {
    type Draft = NewStaff;

    fn from_draft(id: Uuid, draft: NewStaff, now: DateTime<Utc>) -> DomainResult<Self> {
        let mut staff = Staff {
            id: StaffId::from_uuid(id),
            name: String::new(),
            email: None,
            phone: None,
            role: draft.role,
            specialization: None,
            hourly_rate: 0.0,
            status: StaffStatus::default(),
            skills: BTreeSet::new(),
            project_id: None,
            timestamps: Timestamps::new(now),
        };
        staff.fill(draft);
        staff.validate()?;
        Ok(staff)
    }
}

impl Editable for Staff {
    type Patch = StaffPatch;

    fn replace(&mut self, draft: NewStaff, now: DateTime<Utc>) -> DomainResult<()> {
        let mut next = self.clone();
        next.fill(draft);
        next.validate()?;
        next.timestamps.touch(now);
        *self = next;
        Ok(())
    }

    fn apply_patch(&mut self, patch: StaffPatch, now: DateTime<Utc>) -> DomainResult<()> {
        let mut next = self.clone();
        if let Some(name) = patch.name {
            next.name = name.trim().to_string();
        }
        if let Some(email) = patch.email {
            next.email = email;
        }
        if let Some(phone) = patch.phone {
            next.phone = phone;
        }
        if let Some(role) = patch.role {
            next.role = role;
        }
        if let Some(specialization) = patch.specialization {
            next.specialization = specialization;
        }
        if let Some(rate) = patch.hourly_rate {
            next.hourly_rate = rate.unwrap_or(0.0);
        }
        if let Some(status) = patch.status {
            next.status = status;
        }
        if let Some(skills) = patch.skills {
            next.skills = skills;
        }
        if let Some(project_id) = patch.project_id {
            next.project_id = project_id;
        }
        next.validate()?;
        next.timestamps.touch(now);
        *self = next;
        Ok(())
    }
}
