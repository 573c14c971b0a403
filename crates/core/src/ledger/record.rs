//! Derivation of ledger records from balance changes.

use chrono::{DateTime, Utc};
use thiserror::Error;
use uuid::Uuid;

/// Errors from record derivation.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum RecordError {
    /// A zero amount has no direction and records nothing.
    #[error("amount must not be zero")]
    ZeroAmount,

    /// Transfers move money one way; the amount must be positive.
    #[error("amount must be positive")]
    NonPositiveAmount,

    /// The amount magnitude does not fit in the record type.
    #[error("amount out of range")]
    OutOfRange,
}

/// Classification of a record by which sides are populated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Kind {
    /// Credit with no sender: external money in.
    TopUp,
    /// Debit with no recipient: money out of the system.
    Withdrawal,
    /// Paired debit and credit between two accounts.
    Transfer,
}

/// A ledger record before the store assigns its id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordDraft {
    /// Account debited, absent for top-ups.
    pub sender_id: Option<Uuid>,
    /// Account credited, absent for withdrawals.
    pub recipient_id: Option<Uuid>,
    /// Magnitude moved, minor units. Always positive.
    pub amount: i64,
    /// Free-text annotation.
    pub description: Option<String>,
    /// When the record was created (UTC). Immutable.
    pub transaction_date: DateTime<Utc>,
}

impl RecordDraft {
    /// Derives a record from a single-account balance change.
    ///
    /// A negative `amount` becomes a withdrawal of its magnitude, a
    /// positive one a top-up. Zero is rejected: boundary validation should
    /// have caught it, and a zero-amount ledger entry is meaningless.
    ///
    /// # Errors
    ///
    /// Returns [`RecordError::ZeroAmount`] for zero and
    /// [`RecordError::OutOfRange`] when the magnitude does not fit.
    pub fn from_delta(
        owner_id: Uuid,
        amount: i64,
        description: Option<String>,
    ) -> Result<Self, RecordError> {
        if amount == 0 {
            return Err(RecordError::ZeroAmount);
        }

        let (sender_id, recipient_id, amount) = if amount < 0 {
            let magnitude = amount.checked_neg().ok_or(RecordError::OutOfRange)?;
            (Some(owner_id), None, magnitude)
        } else {
            (None, Some(owner_id), amount)
        };

        Ok(Self {
            sender_id,
            recipient_id,
            amount,
            description,
            transaction_date: Utc::now(),
        })
    }

    /// Derives the single record describing a transfer as a whole.
    ///
    /// # Errors
    ///
    /// Returns [`RecordError::NonPositiveAmount`] unless `amount > 0`.
    pub fn transfer(
        sender_id: Uuid,
        recipient_id: Uuid,
        amount: i64,
        description: Option<String>,
    ) -> Result<Self, RecordError> {
        if amount <= 0 {
            return Err(RecordError::NonPositiveAmount);
        }

        Ok(Self {
            sender_id: Some(sender_id),
            recipient_id: Some(recipient_id),
            amount,
            description,
            transaction_date: Utc::now(),
        })
    }

    /// Classifies the record by its populated sides.
    #[must_use]
    pub const fn kind(&self) -> Kind {
        match (self.sender_id.is_some(), self.recipient_id.is_some()) {
            (true, true) => Kind::Transfer,
            (true, false) => Kind::Withdrawal,
            _ => Kind::TopUp,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn owner() -> Uuid {
        Uuid::new_v4()
    }

    #[test]
    fn test_negative_delta_becomes_withdrawal() {
        let id = owner();
        let draft = RecordDraft::from_delta(id, -500, Some("rent".to_string())).expect("draft");

        assert_eq!(draft.sender_id, Some(id));
        assert_eq!(draft.recipient_id, None);
        assert_eq!(draft.amount, 500);
        assert_eq!(draft.kind(), Kind::Withdrawal);
    }

    #[test]
    fn test_positive_delta_becomes_top_up() {
        let id = owner();
        let draft = RecordDraft::from_delta(id, 2000, None).expect("draft");

        assert_eq!(draft.sender_id, None);
        assert_eq!(draft.recipient_id, Some(id));
        assert_eq!(draft.amount, 2000);
        assert_eq!(draft.kind(), Kind::TopUp);
    }

    #[test]
    fn test_zero_delta_is_rejected() {
        assert_eq!(
            RecordDraft::from_delta(owner(), 0, None),
            Err(RecordError::ZeroAmount)
        );
    }

    #[test]
    fn test_minimum_delta_is_out_of_range() {
        assert_eq!(
            RecordDraft::from_delta(owner(), i64::MIN, None),
            Err(RecordError::OutOfRange)
        );
    }

    #[test]
    fn test_transfer_populates_both_sides() {
        let sender = owner();
        let recipient = owner();
        let draft = RecordDraft::transfer(sender, recipient, 300, Some("dinner".to_string()))
            .expect("draft");

        assert_eq!(draft.sender_id, Some(sender));
        assert_eq!(draft.recipient_id, Some(recipient));
        assert_eq!(draft.amount, 300);
        assert_eq!(draft.kind(), Kind::Transfer);
    }

    #[test]
    fn test_transfer_rejects_non_positive_amounts() {
        let (a, b) = (owner(), owner());
        assert_eq!(
            RecordDraft::transfer(a, b, 0, None),
            Err(RecordError::NonPositiveAmount)
        );
        assert_eq!(
            RecordDraft::transfer(a, b, -300, None),
            Err(RecordError::NonPositiveAmount)
        );
    }

    #[test]
    fn test_self_transfer_is_permitted() {
        // Net no-op on the balance, but still a recordable event.
        let id = owner();
        let draft = RecordDraft::transfer(id, id, 100, None).expect("draft");
        assert_eq!(draft.kind(), Kind::Transfer);
    }
}
