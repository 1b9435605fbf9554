//! Named-step orchestration for multi-step cart and checkout operations.

pub mod context_data;
pub mod control;
pub mod flow;

pub use context_data::ContextData;
pub use control::{FlowOutcome, StepControl};
pub use flow::{Flow, StepDef, StepHandler};
