pub mod document;
pub mod loaders;
pub mod output;
pub mod page_result;
pub mod plan;
pub mod prompt;

pub use document::{BootstrapParams, BootstrapResult, DocumentReference};
pub use loaders::{load_run_request, parse_run_request, RunRequest};
pub use output::{Deliverable, DeliverableLocator, OutputConfig, RunOutcome};
pub use page_result::{FinalizationHints, PageResult};
pub use plan::{PlanEntry, RunMode, WorkPlan};
pub use prompt::{PromptConfig, PromptDefaults, PromptInput};
