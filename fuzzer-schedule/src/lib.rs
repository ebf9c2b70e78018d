//! The Case Manager (spec §4.1): prioritized scenario/operation-case
//! queues, request population via the Value Strategy, energy update, and
//! scenario extension — the scheduling core of the trace-guided fuzzer.

mod case_manager;
mod energy;
mod error;
mod extension;
#[cfg(feature = "legacy-mutation")]
mod legacy_mutation;
mod op_case;
mod queue;
mod scenario;

pub use case_manager::{CaseManager, CaseManagerConfig, MAX_OP_EXEC, MAX_SCEN_EXEC};
pub use energy::EnergyConfig;
pub use error::ScheduleError;
pub use extension::{ExtensionConfig, MAX_OPS_PER_SCEN};
#[cfg(feature = "legacy-mutation")]
pub use legacy_mutation::mutate_case;
pub use op_case::{OperationCase, MAX_OP_ENERGY, MIN_OP_ENERGY};
pub use queue::{PerOperationQueue, ScenarioQueue, MAX_OPS_PER_METHOD, MAX_SCENARIOS};
pub use scenario::TestScenario;
