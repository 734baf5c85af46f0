mod engine;
mod transaction_ids;

pub use engine::ResolutionEngine;
pub use transaction_ids::{TransactionGuard, TransactionIds};
