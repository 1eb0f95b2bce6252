//! Daily usage domain module.
//!
//! - `record`: the per-category usage records (material quantity, labour
//!   hours, equipment hours logged against a project and date)
//! - `daily`: a one-day batch submission and its expansion into one write per
//!   valid line

pub mod daily;
pub mod record;

pub use daily::{
    CategoryCounts, DailyUsagePlan, DailyUsageSubmission, EquipmentLine, ManpowerLine,
    MaterialLine, UsageCategory, UsageWrite,
};
pub use record::{
    EquipmentUsage, EquipmentUsageId, ManpowerUsage, ManpowerUsageId, MaterialUsage,
    MaterialUsageId, NewEquipmentUsage, NewManpowerUsage, NewMaterialUsage,
};
