pub mod builder;
pub mod dispatch;
pub mod orchestrator;
pub mod readiness;
pub mod router_process;
pub mod trigger;

pub use builder::{build_transaction, BuildOutcome};
pub use dispatch::{Dispatch, DirectDispatcher, RouterDispatcher};
pub use orchestrator::{Orchestrator, RunSummary};
pub use readiness::{ReadinessGate, ReadinessTimeouts};
pub use router_process::RouterProcess;
pub use trigger::trigger_router;
