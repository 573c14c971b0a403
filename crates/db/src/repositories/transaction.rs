//! Transaction repository: the append-only ledger store.

use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, ConnectionTrait, DatabaseConnection, DbErr,
    EntityTrait, Order, PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, Set,
};
use uuid::Uuid;

use tally_core::ledger::{Direction, HistoryQuery, OrderBy, RecordDraft};

use crate::entities::transactions;

/// Transaction repository.
#[derive(Debug, Clone)]
pub struct TransactionRepository {
    db: DatabaseConnection,
}

impl TransactionRepository {
    /// Creates a new transaction repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Appends a record to the ledger; the store assigns the id.
    ///
    /// Takes any connection so the append can share the balance engine's
    /// database transaction.
    ///
    /// # Errors
    ///
    /// Returns an error if the insert fails.
    pub(crate) async fn insert<C: ConnectionTrait>(
        conn: &C,
        draft: RecordDraft,
    ) -> Result<transactions::Model, DbErr> {
        let record = transactions::ActiveModel {
            sender_id: Set(draft.sender_id),
            recipient_id: Set(draft.recipient_id),
            amount: Set(draft.amount),
            description: Set(draft.description),
            transaction_date: Set(draft.transaction_date.into()),
            ..Default::default()
        };

        record.insert(conn).await
    }

    /// Returns every record where the account is sender OR recipient, and
    /// only those.
    ///
    /// With no `order_by`, results come back in insertion order
    /// (transaction date ascending, id as tie-break). `limit: None` means
    /// no limit.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn history(
        &self,
        owner_id: Uuid,
        query: HistoryQuery,
    ) -> Result<Vec<transactions::Model>, DbErr> {
        let mut select = transactions::Entity::find().filter(
            Condition::any()
                .add(transactions::Column::SenderId.eq(owner_id))
                .add(transactions::Column::RecipientId.eq(owner_id)),
        );

        let direction = match query.direction {
            Some(Direction::Desc) => Order::Desc,
            _ => Order::Asc,
        };

        select = match query.order_by {
            Some(OrderBy::TransactionDate) => {
                select.order_by(transactions::Column::TransactionDate, direction)
            }
            Some(OrderBy::Amount) => select.order_by(transactions::Column::Amount, direction),
            None => select
                .order_by_asc(transactions::Column::TransactionDate)
                .order_by_asc(transactions::Column::Id),
        };

        select = select.offset(query.offset);
        if let Some(limit) = query.limit {
            select = select.limit(limit);
        }

        select.all(&self.db).await
    }

    /// Returns the number of ledger records. Diagnostic only.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn count(&self) -> Result<u64, DbErr> {
        transactions::Entity::find().count(&self.db).await
    }
}
