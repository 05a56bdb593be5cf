// atelier/src/pipeline/definition.rs

//! The `Pipeline<TData, Err>` struct and the methods used to build it.

use super::context_data::ContextData;
use super::control::PipelineControl;
use super::step::{SkipCondition, StepDef};
use crate::error::PipelineError;
use std::collections::HashMap;
use std::future::Future;
use std::pin::Pin;

/// An asynchronous step handler.
///
/// Handlers receive a clone of the shared context, take locks briefly to read
/// or update it, and must drop every guard before awaiting.
pub type Handler<TData, Err> = Box<
  dyn Fn(ContextData<TData>) -> Pin<Box<dyn Future<Output = Result<PipelineControl, Err>> + Send>>
    + Send
    + Sync,
>;

/// Ordered named steps over a root data type `TData`.
///
/// `Err` is what handlers return; it must absorb [`PipelineError`] so that
/// misconfiguration detected at run time (a required step with no handler)
/// surfaces through the same channel.
pub struct Pipeline<TData, Err>
where
  TData: 'static + Send + Sync,
  Err: std::error::Error + From<PipelineError> + Send + Sync + 'static,
{
  pub(crate) steps: Vec<StepDef<TData>>,
  pub(crate) on: HashMap<String, Vec<Handler<TData, Err>>>,
}

impl<TData, Err> Pipeline<TData, Err>
where
  TData: 'static + Send + Sync,
  Err: std::error::Error + From<PipelineError> + Send + Sync + 'static,
{
  /// Creates a pipeline from `(name, optional, skip_if)` tuples.
  pub fn new(step_defs: &[(&str, bool, Option<SkipCondition<TData>>)]) -> Self {
    let steps = step_defs
      .iter()
      .map(|(name, optional, skip_if)| StepDef {
        name: (*name).to_string(),
        optional: *optional,
        skip_if: skip_if.clone(),
      })
      .collect();

    Self {
      steps,
      on: HashMap::new(),
    }
  }

  /// Step names in execution order.
  pub fn step_names(&self) -> Vec<&str> {
    self.steps.iter().map(|s| s.name.as_str()).collect()
  }

  fn ensure_step_exists(&self, step_name: &str) -> Result<(), PipelineError> {
    if self.steps.iter().any(|s| s.name == step_name) {
      Ok(())
    } else {
      Err(PipelineError::StepNotFound {
        step_name: step_name.to_string(),
      })
    }
  }

  /// Registers an `on` handler for `step_name`.
  ///
  /// The handler's own error type only needs to convert into the pipeline's `Err`.
  pub fn on_root<F, UserErr>(
    &mut self,
    step_name: &str,
    handler_fn: impl Fn(ContextData<TData>) -> F + Send + Sync + 'static,
  ) -> Result<(), PipelineError>
  where
    F: Future<Output = Result<PipelineControl, UserErr>> + Send + 'static,
    UserErr: Into<Err> + Send + Sync + 'static,
  {
    self.ensure_step_exists(step_name)?;
    let handler: Handler<TData, Err> = Box::new(move |ctx_data| {
      let user_fut = handler_fn(ctx_data);
      Box::pin(async move { user_fut.await.map_err(Into::into) })
    });
    self.on.entry(step_name.to_string()).or_default().push(handler);
    Ok(())
  }

  /// Replaces the skip condition of an existing step.
  pub fn set_skip_condition(
    &mut self,
    step_name: &str,
    skip_if: Option<SkipCondition<TData>>,
  ) -> Result<(), PipelineError> {
    self.ensure_step_exists(step_name)?;
    if let Some(step) = self.steps.iter_mut().find(|s| s.name == step_name) {
      step.skip_if = skip_if;
    }
    Ok(())
  }
}
