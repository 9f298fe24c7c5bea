// Pure policy
pub mod lineage;
pub mod resolution;

// Order lifecycle
pub mod approvals;
pub mod procurement;

pub use approvals::{parse_approval, ApprovalTracker};
pub use procurement::ProcurementService;
