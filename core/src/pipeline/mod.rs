// atelier/src/pipeline/mod.rs

//! A small async workflow engine: an ordered list of named steps, each with
//! `on` handlers operating on a shared [`ContextData`].
//!
//! The order submission flow is expressed as one of these pipelines so every
//! stage (validation, pricing, image storage, persistence) runs in its own
//! traced step and can stop the run early.

pub mod context_data;
pub mod control;
pub mod definition;
pub mod execution;
pub mod step;

pub use context_data::ContextData;
pub use control::{PipelineControl, PipelineResult};
pub use definition::{Handler, Pipeline};
pub use step::{SkipCondition, StepDef};
