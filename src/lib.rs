//! Plant identification pipeline
//!
//! Takes a photo, compresses it, asks a remote vision-language model what
//! plant it shows and parses the answer into a typed [`PlantIdentification`].
//! Storage, favorites and watering schedules belong to the host application.

pub mod ai;
pub mod error;
pub mod image;
pub mod models;
pub mod parser;
pub mod pipeline;
pub mod prompts;

pub use error::{Error, FailureKind, IdentificationFailure, Result, Stage};
pub use models::PlantIdentification;
pub use pipeline::{IdentificationOrchestrator, Orchestration};
