//! Balance engine: balance mutation and ledger append as one atomic unit.
//!
//! Every mutation (single-account update or two-leg transfer) runs inside
//! one database transaction that also appends the ledger record. Either the
//! balance change(s) and the record all commit, or none of them persist;
//! the ledger and the balances cannot diverge across a partial failure.

use sea_orm::{DatabaseConnection, DbErr, TransactionTrait};
use tracing::{error, info};
use uuid::Uuid;

use tally_core::balance::DeltaError;
use tally_core::ledger::{RecordDraft, RecordError};

use crate::entities::transactions;
use crate::repositories::deposit::{DepositError, DepositRepository};
use crate::repositories::transaction::TransactionRepository;

/// Error types for balance mutations.
#[derive(Debug, thiserror::Error)]
pub enum BalanceError {
    /// The delta would drive a balance below zero. Not retried; surfaced
    /// to the caller with no state change.
    #[error("insufficient funds to perform operation")]
    InsufficientFunds,

    /// The requested mutation cannot be expressed as a ledger record.
    #[error(transparent)]
    InvalidRecord(#[from] RecordError),

    /// Underlying store failure, surfaced as-is. Retry policy belongs to
    /// the caller.
    #[error("database error: {0}")]
    Database(#[from] DbErr),
}

impl From<DepositError> for BalanceError {
    fn from(err: DepositError) -> Self {
        match err {
            DepositError::Delta(DeltaError::InsufficientFunds) => Self::InsufficientFunds,
            DepositError::Delta(DeltaError::OutOfRange) => {
                Self::InvalidRecord(RecordError::OutOfRange)
            }
            DepositError::Database(e) => Self::Database(e),
        }
    }
}

/// Balance engine.
#[derive(Debug, Clone)]
pub struct BalanceEngine {
    db: DatabaseConnection,
}

impl BalanceEngine {
    /// Creates a new balance engine.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Applies a signed delta to one account and appends the matching
    /// record (withdrawal for a debit, top-up for a credit).
    ///
    /// On success the stored balance is the pre-call balance plus `amount`
    /// and exactly one new record exists. On failure nothing persists, not
    /// even the first-touch row.
    ///
    /// # Errors
    ///
    /// Returns [`BalanceError::InsufficientFunds`] when the delta would
    /// drive the balance negative, [`BalanceError::InvalidRecord`] for a
    /// zero amount, [`BalanceError::Database`] on store failure.
    pub async fn update_balance(
        &self,
        owner_id: Uuid,
        amount: i64,
        description: Option<String>,
    ) -> Result<transactions::Model, BalanceError> {
        let draft = RecordDraft::from_delta(owner_id, amount, description)?;

        let txn = self.db.begin().await?;
        DepositRepository::apply_delta(&txn, owner_id, amount).await?;
        let record = TransactionRepository::insert(&txn, draft).await?;
        txn.commit().await?;

        info!(owner_id = %owner_id, amount, record_id = record.id, "balance updated");
        Ok(record)
    }

    /// Moves `amount` from `sender_id` to `recipient_id` and appends the
    /// single record describing the transfer as a whole.
    ///
    /// Both legs and the record share one database transaction: either the
    /// sender's balance drops by `amount`, the recipient's rises by
    /// `amount` and one record exists, or the pre-call state is restored.
    ///
    /// Self-transfer is permitted; it nets to zero but still records.
    ///
    /// # Errors
    ///
    /// Returns [`BalanceError::InsufficientFunds`] when the sender cannot
    /// cover `amount`, [`BalanceError::InvalidRecord`] unless
    /// `amount > 0`, [`BalanceError::Database`] on store failure.
    pub async fn transfer(
        &self,
        sender_id: Uuid,
        recipient_id: Uuid,
        amount: i64,
        description: Option<String>,
    ) -> Result<transactions::Model, BalanceError> {
        let draft = RecordDraft::transfer(sender_id, recipient_id, amount, description)?;

        let txn = self.db.begin().await?;

        DepositRepository::apply_delta(&txn, sender_id, -amount).await?;

        if let Err(err) = DepositRepository::apply_delta(&txn, recipient_id, amount).await {
            // The sender is already debited inside this transaction; a
            // committed half-transfer would mean ledger/balance divergence.
            error!(
                sender_id = %sender_id,
                recipient_id = %recipient_id,
                amount,
                error = %err,
                "credit leg failed after debit; rolling back both legs"
            );
            txn.rollback().await?;
            return Err(err.into());
        }

        let record = TransactionRepository::insert(&txn, draft).await?;
        txn.commit().await?;

        info!(
            sender_id = %sender_id,
            recipient_id = %recipient_id,
            amount,
            record_id = record.id,
            "transfer completed"
        );
        Ok(record)
    }
}
