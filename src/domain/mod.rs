pub mod ledger;
pub mod transaction;
pub mod utr;

pub use ledger::{ActivityLogEntry, LedgerDirection, LedgerEntry, MerchantProfile};
pub use transaction::{TimelineEntry, TimelineStage, Transaction, TransactionStatus};
pub use utr::{UtrLog, UtrProcessingStatus};
