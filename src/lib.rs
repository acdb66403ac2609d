//! da-story-edit - Idempotent first/prev/next/last navigation for
//! DeviantArt literature galleries
//!
//! - `navigation`: target calculation and managed-block editing
//! - `sync`: per-document batch orchestration over collaborator traits
//! - `deviantart`: REST API collaborator, OAuth, gallery resolution
//! - `config`: `.env` registry and loader
//! - `observability`: structured JSON logs
//! - `cli`: command-line surface

pub mod cli;
pub mod config;
pub mod deviantart;
pub mod navigation;
pub mod observability;
pub mod sync;
