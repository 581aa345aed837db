//! Transaction record persistence interface and error types

#![warn(missing_docs, missing_debug_implementations)]

use common_utils::errors::CustomResult;
use domain_types::transaction::Transaction;

/// Trait defining the interface for transaction record storage
#[async_trait::async_trait]
pub trait TransactionRecordStore: Sync + Send + dyn_clone::DynClone {
    /// Persist a newly created transaction record
    async fn insert_transaction(
        &self,
        transaction: Transaction,
    ) -> CustomResult<(), RecordStoreError>;

    /// Fetch a transaction record by its identifier
    async fn find_transaction(
        &self,
        transaction_id: &str,
    ) -> CustomResult<Transaction, RecordStoreError>;

    /// Replace the stored record for an existing transaction
    async fn update_transaction(
        &self,
        transaction: Transaction,
    ) -> CustomResult<(), RecordStoreError>;
}

dyn_clone::clone_trait_object!(TransactionRecordStore);

/// Errors that may occur while persisting transaction records
#[derive(Debug, thiserror::Error)]
pub enum RecordStoreError {
    /// No record exists for the requested transaction id.
    #[error("Transaction record not found")]
    NotFound,
    /// A record with the same transaction id already exists.
    #[error("Transaction record already exists")]
    DuplicateTransactionId,
}
