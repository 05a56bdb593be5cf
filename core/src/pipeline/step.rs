// atelier/src/pipeline/step.rs

//! Definition of a single pipeline step.

use super::ContextData;
use std::sync::Arc;

/// Evaluated before a step runs; returning `true` skips the step.
pub type SkipCondition<TData> = Arc<dyn Fn(&ContextData<TData>) -> bool + Send + Sync + 'static>;

/// A named step, whether it may run without handlers, and its skip condition.
#[derive(Clone)]
pub struct StepDef<T: 'static + Send + Sync> {
  pub name: String,
  pub optional: bool,
  pub skip_if: Option<SkipCondition<T>>,
}

impl<T: 'static + Send + Sync> std::fmt::Debug for StepDef<T> {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.debug_struct("StepDef")
      .field("name", &self.name)
      .field("optional", &self.optional)
      .field("skip_if_present", &self.skip_if.is_some())
      .finish()
  }
}
