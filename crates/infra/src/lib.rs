//! Infrastructure layer: configuration, record storage and the multi-write
//! workflows that span more than one store.

pub mod config;
pub mod db;
pub mod receiving;
pub mod store;
pub mod usage_recorder;
