// core/src/workflow/control.rs

/// Returned by a step handler: keep going, or halt the flow cleanly.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepControl {
  Continue,
  Stop,
}

/// Outcome of a full flow run that did not fail.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FlowOutcome {
  Completed,
  Stopped { at_step: String },
}
