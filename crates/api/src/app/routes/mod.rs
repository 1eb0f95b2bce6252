use axum::{
    Router,
    routing::{get, post},
};

use sitebook_materials::{MaterialRequirement, MaterialTransaction};
use sitebook_projects::Project;
use sitebook_resources::{Equipment, Staff};
use sitebook_tasks::Task;

pub mod common;
pub mod crud;
pub mod materials;
pub mod procurement;
pub mod system;
pub mod usage;

/// Router for all authenticated (tenant-scoped) endpoints, mounted at `/api`.
pub fn router() -> Router {
    Router::new()
        .route("/whoami", get(system::whoami))
        .route("/stream", get(system::stream))
        .nest("/projects", crud::editable::<Project>())
        .nest("/staff", crud::editable::<Staff>())
        .nest("/equipment", crud::editable::<Equipment>())
        .nest("/materials", materials::router())
        .nest("/requirements", crud::editable::<MaterialRequirement>())
        .nest("/procurement", procurement::router())
        .nest("/tasks", crud::editable::<Task>())
        .nest("/transactions", crud::append_only::<MaterialTransaction>())
        .nest("/usage", usage::router())
        .route("/daily-usage", post(usage::record_daily))
}
