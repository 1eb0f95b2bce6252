//! Site resources: manpower (staff) and equipment master records.

pub mod equipment;
pub mod staff;

pub use equipment::{Equipment, EquipmentId, EquipmentPatch, EquipmentStatus, NewEquipment};
pub use staff::{NewStaff, Staff, StaffId, StaffPatch, StaffRole, StaffStatus};
