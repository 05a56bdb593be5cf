// atelier/src/pipeline/execution.rs

//! `Pipeline::run()`: walks the steps in order and executes their handlers.

use super::context_data::ContextData;
use super::control::{PipelineControl, PipelineResult};
use super::definition::Pipeline;
use crate::error::PipelineError;
use tracing::{event, instrument, span, Instrument, Level};

impl<TData, Err> Pipeline<TData, Err>
where
  TData: 'static + Send + Sync,
  Err: std::error::Error + From<PipelineError> + Send + Sync + 'static,
{
  /// Executes the pipeline against `ctx_data`.
  ///
  /// Returns `Stopped` as soon as a handler asks to stop, the first handler
  /// error as-is, and `PipelineError::HandlerMissing` (converted into `Err`)
  /// for a required step without handlers.
  #[instrument(
    name = "Pipeline::run",
    skip_all,
    fields(
      pipeline_context_data_type = %std::any::type_name::<TData>(),
      num_steps = self.steps.len(),
    ),
    err(Display)
  )]
  pub async fn run(&self, ctx_data: ContextData<TData>) -> Result<PipelineResult, Err> {
    event!(Level::DEBUG, "Pipeline execution starting.");

    for (step_idx, step_def) in self.steps.iter().enumerate() {
      let step_name = step_def.name.as_str();
      let step_span = span!(
        Level::INFO,
        "pipeline_step_execution",
        step_name = step_name,
        step_index = step_idx,
        optional = step_def.optional
      );

      if let Some(skip_if) = &step_def.skip_if {
        if skip_if(&ctx_data) {
          step_span.in_scope(|| event!(Level::DEBUG, "Step skipped due to 'skip_if' condition."));
          continue;
        }
      }

      let handlers = match self.on.get(step_name) {
        Some(handlers) if !handlers.is_empty() => handlers,
        _ if step_def.optional => {
          step_span.in_scope(|| event!(Level::DEBUG, "Optional step has no handlers, skipping."));
          continue;
        }
        _ => {
          step_span.in_scope(|| event!(Level::ERROR, "Non-optional step has no handlers."));
          return Err(Err::from(PipelineError::HandlerMissing {
            step_name: step_def.name.clone(),
          }));
        }
      };

      for (handler_idx, handler_fn) in handlers.iter().enumerate() {
        let handler_span = span!(parent: &step_span, Level::DEBUG, "on_handler", handler_index = handler_idx);
        match handler_fn(ctx_data.clone()).instrument(handler_span).await {
          Ok(PipelineControl::Continue) => {}
          Ok(PipelineControl::Stop) => {
            step_span.in_scope(|| event!(Level::INFO, "Pipeline stopped by an 'on' handler."));
            return Ok(PipelineResult::Stopped);
          }
          Err(e) => {
            step_span.in_scope(|| event!(Level::WARN, error = %e, "'on' handler failed."));
            return Err(e);
          }
        }
      }
      step_span.in_scope(|| event!(Level::DEBUG, "Step processing finished successfully."));
    }

    event!(Level::DEBUG, "Pipeline execution completed successfully.");
    Ok(PipelineResult::Completed)
  }
}
