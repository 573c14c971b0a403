//! Initial schema: deposits and the transaction ledger.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let db = manager.get_connection();
        db.execute_unprepared(INITIAL_SQL).await?;
        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let db = manager.get_connection();
        db.execute_unprepared(
            r#"
DROP TABLE IF EXISTS "transaction" CASCADE;
DROP TABLE IF EXISTS deposit CASCADE;
"#,
        )
        .await?;
        Ok(())
    }
}

const INITIAL_SQL: &str = r#"
-- Deposits: one row per account, balance in minor currency units.
-- The CHECK is the enforcement point for the non-negative invariant:
-- the store rejects, it does not clamp.
CREATE TABLE deposit (
    owner_id UUID PRIMARY KEY,
    balance BIGINT NOT NULL DEFAULT 0,
    CONSTRAINT chk_deposit_balance_non_negative CHECK (balance >= 0)
);

-- Transactions: append-only ledger of balance-changing events.
-- Direction is positional; at least one participant must be present.
CREATE TABLE "transaction" (
    id BIGSERIAL PRIMARY KEY,
    sender_id UUID,
    recipient_id UUID,
    amount BIGINT NOT NULL,
    description VARCHAR(100),
    transaction_date TIMESTAMPTZ NOT NULL DEFAULT now(),
    CONSTRAINT chk_transaction_amount_positive CHECK (amount > 0),
    CONSTRAINT chk_transaction_participant CHECK (sender_id IS NOT NULL OR recipient_id IS NOT NULL)
);

-- Lookup indexes for per-account history queries
CREATE INDEX idx_transaction_sender ON "transaction"(sender_id);
CREATE INDEX idx_transaction_recipient ON "transaction"(recipient_id);
"#;
