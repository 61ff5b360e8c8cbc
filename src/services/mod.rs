pub mod reconciliation;
pub mod wallet;

pub use reconciliation::{ReconciliationOutcome, ReconciliationService};
pub use wallet::WalletService;
