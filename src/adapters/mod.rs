pub mod memory;
pub mod postgres_ledger_repository;
pub mod postgres_transaction_repository;
pub mod postgres_utr_log_repository;

pub use memory::{
    InMemoryLedgerRepository, InMemoryMerchantRepository, InMemoryTransactionRepository,
    InMemoryUtrLogRepository,
};
pub use postgres_ledger_repository::{PostgresLedgerRepository, PostgresMerchantRepository};
pub use postgres_transaction_repository::PostgresTransactionRepository;
pub use postgres_utr_log_repository::PostgresUtrLogRepository;
