//! Deposit repository: the account store.
//!
//! Reads are plain queries with no side effects. Writes go through
//! [`DepositRepository::apply_delta`], a single conditional UPDATE so that
//! concurrent mutations of one account serialize on the row instead of
//! racing through separate read and write statements.

use sea_orm::sea_query::{Expr, OnConflict};
use sea_orm::{
    ColumnTrait, ConnectionTrait, DatabaseConnection, DbErr, EntityTrait, PaginatorTrait,
    QueryFilter, Set,
};
use uuid::Uuid;

use tally_core::balance::{self, DeltaError};

use crate::entities::deposits;

/// Error types for deposit operations.
#[derive(Debug, thiserror::Error)]
pub enum DepositError {
    /// The delta violates a balance rule (insufficient funds, overflow).
    #[error(transparent)]
    Delta(#[from] DeltaError),

    /// Database error.
    #[error("database error: {0}")]
    Database(#[from] DbErr),
}

/// Deposit repository.
#[derive(Debug, Clone)]
pub struct DepositRepository {
    db: DatabaseConnection,
}

impl DepositRepository {
    /// Creates a new deposit repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Returns the deposit row for `owner_id`, if the account has ever
    /// been touched.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn get(&self, owner_id: Uuid) -> Result<Option<deposits::Model>, DbErr> {
        deposits::Entity::find_by_id(owner_id).one(&self.db).await
    }

    /// Returns the balance for `owner_id`.
    ///
    /// An account that has never been touched reads as 0; pure balance
    /// queries must not create rows.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn get_balance(&self, owner_id: Uuid) -> Result<i64, DbErr> {
        Ok(self.get(owner_id).await?.map_or(0, |deposit| deposit.balance))
    }

    /// Returns the number of deposit rows. Diagnostic only.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn count(&self) -> Result<u64, DbErr> {
        deposits::Entity::find().count(&self.db).await
    }

    /// Ensures a deposit row exists for `owner_id` (first-touch creation
    /// with balance 0). A no-op for accounts that already exist.
    async fn ensure_row<C: ConnectionTrait>(conn: &C, owner_id: Uuid) -> Result<(), DbErr> {
        deposits::Entity::insert(deposits::ActiveModel {
            owner_id: Set(owner_id),
            balance: Set(0),
        })
        .on_conflict(
            OnConflict::column(deposits::Column::OwnerId)
                .do_nothing()
                .to_owned(),
        )
        .exec_without_returning(conn)
        .await?;

        Ok(())
    }

    /// Applies a signed delta to one account's balance.
    ///
    /// The row is created on first touch, the delta is checked against the
    /// read balance, and the mutation is a single conditional UPDATE
    /// guarded by `balance + delta >= 0`. The guard re-checks atomically
    /// what the read validated: concurrent writers serialize on the row
    /// lock instead of racing through separate read and write statements,
    /// so a stale read cannot turn into a lost update or a negative
    /// balance.
    ///
    /// Must run inside an open database transaction: on failure the
    /// caller's rollback is what discards the first-touch insert.
    ///
    /// # Errors
    ///
    /// Returns [`DepositError::Delta`] when the balance rules reject the
    /// delta, [`DepositError::Database`] on store failure.
    pub(crate) async fn apply_delta<C: ConnectionTrait>(
        conn: &C,
        owner_id: Uuid,
        delta: i64,
    ) -> Result<(), DepositError> {
        Self::ensure_row(conn, owner_id).await?;

        let deposit = deposits::Entity::find_by_id(owner_id)
            .one(conn)
            .await?
            .ok_or_else(|| DbErr::RecordNotFound(format!("deposit {owner_id}")))?;
        balance::apply_delta(deposit.balance, delta)?;

        let result = deposits::Entity::update_many()
            .col_expr(
                deposits::Column::Balance,
                Expr::col(deposits::Column::Balance).add(delta),
            )
            .filter(deposits::Column::OwnerId.eq(owner_id))
            .filter(Expr::expr(Expr::col(deposits::Column::Balance).add(delta)).gte(0))
            .exec(conn)
            .await?;

        if result.rows_affected == 0 {
            // A concurrent writer consumed the funds between read and write.
            return Err(DepositError::Delta(DeltaError::InsufficientFunds));
        }

        Ok(())
    }
}
