//! In memory transaction record store.

use std::{collections::HashMap, sync::Arc};

use common_utils::errors::CustomResult;
use domain_types::transaction::Transaction;
use interfaces::records::{RecordStoreError, TransactionRecordStore};
use tokio::sync::RwLock;

/// Keeps transaction records in process memory. Every clone shares the same
/// underlying map, so handles can be passed around freely.
#[derive(Debug, Clone, Default)]
pub struct InMemoryTransactionStore {
    records: Arc<RwLock<HashMap<String, Transaction>>>,
}

impl InMemoryTransactionStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait::async_trait]
impl TransactionRecordStore for InMemoryTransactionStore {
    async fn insert_transaction(
        &self,
        transaction: Transaction,
    ) -> CustomResult<(), RecordStoreError> {
        let mut records = self.records.write().await;
        if records.contains_key(&transaction.transaction_id) {
            return Err(RecordStoreError::DuplicateTransactionId.into());
        }
        records.insert(transaction.transaction_id.clone(), transaction);
        Ok(())
    }

    async fn find_transaction(
        &self,
        transaction_id: &str,
    ) -> CustomResult<Transaction, RecordStoreError> {
        self.records
            .read()
            .await
            .get(transaction_id)
            .cloned()
            .ok_or_else(|| RecordStoreError::NotFound.into())
    }

    async fn update_transaction(
        &self,
        transaction: Transaction,
    ) -> CustomResult<(), RecordStoreError> {
        let mut records = self.records.write().await;
        match records.get_mut(&transaction.transaction_id) {
            Some(slot) => {
                *slot = transaction;
                Ok(())
            }
            None => Err(RecordStoreError::NotFound.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use common_utils::MinorUnit;
    use domain_types::transaction::{PaymentOrder, TransactionState};

    use super::*;

    fn transaction() -> Transaction {
        Transaction::new(
            MinorUnit::new(100_000),
            PaymentOrder {
                items: vec![],
                discount_amount: MinorUnit::zero(),
                external_source_amount: MinorUnit::zero(),
                customer_mobile: "09123456789".to_string(),
            },
            "https://shop.example/callback".to_string(),
        )
    }

    #[tokio::test]
    async fn insert_then_find_round_trips() {
        let store = InMemoryTransactionStore::new();
        let txn = transaction();
        let id = txn.transaction_id.clone();

        store.insert_transaction(txn).await.unwrap();
        let found = store.find_transaction(&id).await.unwrap();
        assert_eq!(found.transaction_id, id);
        assert_eq!(found.state, TransactionState::Initiated);
    }

    #[tokio::test]
    async fn duplicate_insert_is_rejected() {
        let store = InMemoryTransactionStore::new();
        let txn = transaction();

        store.insert_transaction(txn.clone()).await.unwrap();
        let err = store.insert_transaction(txn).await.unwrap_err();
        assert!(matches!(
            err.current_context(),
            RecordStoreError::DuplicateTransactionId
        ));
    }

    #[tokio::test]
    async fn update_requires_an_existing_record() {
        let store = InMemoryTransactionStore::new();
        let mut txn = transaction();

        let err = store.update_transaction(txn.clone()).await.unwrap_err();
        assert!(matches!(err.current_context(), RecordStoreError::NotFound));

        store.insert_transaction(txn.clone()).await.unwrap();
        txn.set_state(TransactionState::TokenCreated);
        store.update_transaction(txn.clone()).await.unwrap();

        let found = store.find_transaction(&txn.transaction_id).await.unwrap();
        assert_eq!(found.state, TransactionState::TokenCreated);
    }

    #[tokio::test]
    async fn clones_share_the_same_records() {
        let store = InMemoryTransactionStore::new();
        let handle = store.clone();
        let txn = transaction();
        let id = txn.transaction_id.clone();

        store.insert_transaction(txn).await.unwrap();
        assert!(handle.find_transaction(&id).await.is_ok());
    }
}
