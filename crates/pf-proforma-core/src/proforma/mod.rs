pub mod amortization;
pub mod cash_flow;
pub mod inputs;
pub mod metrics;
pub mod model;

pub use amortization::{loan_schedule, LoanScheduleEntry};
pub use cash_flow::{build_cash_flows, CashFlowYear, ProjectCashFlows};
pub use inputs::{validate_inputs, FinancingInputs, ModelConfig, ProjectInputs};
pub use metrics::{compute_metrics, ProformaResult};
pub use model::{evaluate_project, run_proforma, ProformaRun};
