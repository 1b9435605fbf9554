// core/src/workflow/flow.rs

//! `Flow<TData, Err>`: an ordered list of named steps over a shared `ContextData<TData>`.

use crate::error::FlowError;
use crate::workflow::context_data::ContextData;
use crate::workflow::control::{FlowOutcome, StepControl};
use std::collections::HashMap;
use std::future::Future;
use std::pin::Pin;
use tracing::{event, instrument, span, Instrument, Level};

/// A boxed asynchronous step handler.
///
/// Handlers receive a clone of the flow's `ContextData` and must drop any
/// lock guard before awaiting.
pub type StepHandler<TData, Err> = Box<
  dyn Fn(ContextData<TData>) -> Pin<Box<dyn Future<Output = Result<StepControl, Err>> + Send>> + Send + Sync,
>;

#[derive(Debug, Clone)]
pub struct StepDef {
  pub name: String,
  /// Failures of an optional step are logged and the flow continues.
  pub optional: bool,
}

pub struct Flow<TData, Err>
where
  TData: 'static + Send + Sync,
  Err: std::error::Error + From<FlowError> + Send + Sync + 'static,
{
  name: String,
  steps: Vec<StepDef>,
  handlers: HashMap<String, Vec<StepHandler<TData, Err>>>,
}

impl<TData, Err> Flow<TData, Err>
where
  TData: 'static + Send + Sync,
  Err: std::error::Error + From<FlowError> + Send + Sync + 'static,
{
  pub fn new(name: &str, step_defs: &[(&str, bool)]) -> Self {
    let steps = step_defs
      .iter()
      .map(|(step_name, optional)| StepDef {
        name: (*step_name).to_string(),
        optional: *optional,
      })
      .collect();

    Self {
      name: name.to_string(),
      steps,
      handlers: HashMap::new(),
    }
  }

  pub fn name(&self) -> &str {
    &self.name
  }

  pub fn steps(&self) -> &[StepDef] {
    &self.steps
  }

  /// Registers a handler for `step_name`. Panics if the step was not declared,
  /// which is a wiring bug rather than a runtime condition.
  pub fn on<F, HandlerErr>(&mut self, step_name: &str, handler_fn: impl Fn(ContextData<TData>) -> F + Send + Sync + 'static)
  where
    F: Future<Output = Result<StepControl, HandlerErr>> + Send + 'static,
    HandlerErr: Into<Err> + Send + Sync + 'static,
  {
    if !self.steps.iter().any(|s| s.name == step_name) {
      panic!("Flow '{}' has no step named '{}'.", self.name, step_name);
    }
    let handler: StepHandler<TData, Err> = Box::new(move |ctx_data| {
      let fut = handler_fn(ctx_data);
      Box::pin(async move { fut.await.map_err(Into::into) })
    });
    self.handlers.entry(step_name.to_string()).or_default().push(handler);
  }

  #[instrument(
    name = "Flow::run",
    skip_all,
    fields(flow = %self.name, num_steps = self.steps.len()),
    err(Display)
  )]
  pub async fn run(&self, ctx_data: ContextData<TData>) -> Result<FlowOutcome, Err> {
    event!(Level::DEBUG, "Flow execution starting.");

    for (step_idx, step_def) in self.steps.iter().enumerate() {
      let handlers = match self.handlers.get(&step_def.name) {
        Some(handlers) if !handlers.is_empty() => handlers,
        _ if step_def.optional => {
          event!(Level::DEBUG, step = %step_def.name, "Optional step has no handlers, skipping.");
          continue;
        }
        _ => {
          event!(Level::ERROR, step = %step_def.name, "Required step has no handlers.");
          return Err(Err::from(FlowError::HandlerMissing {
            flow: self.name.clone(),
            step_name: step_def.name.clone(),
          }));
        }
      };

      let step_span = span!(
        Level::DEBUG,
        "flow_step",
        step_name = %step_def.name,
        step_index = step_idx,
        optional = step_def.optional
      );

      for handler_fn in handlers {
        match handler_fn(ctx_data.clone()).instrument(step_span.clone()).await {
          Ok(StepControl::Continue) => {}
          Ok(StepControl::Stop) => {
            event!(Level::INFO, step = %step_def.name, "Flow stopped by step handler.");
            return Ok(FlowOutcome::Stopped {
              at_step: step_def.name.clone(),
            });
          }
          Err(e) if step_def.optional => {
            event!(Level::WARN, step = %step_def.name, error = %e, "Optional step failed; continuing.");
          }
          Err(e) => {
            event!(Level::DEBUG, step = %step_def.name, error = %e, "Step failed; aborting flow.");
            return Err(e);
          }
        }
      }
    }

    event!(Level::DEBUG, "Flow execution completed.");
    Ok(FlowOutcome::Completed)
  }
}
