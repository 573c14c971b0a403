//! `SeaORM` Entity for the transaction table.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// One balance-changing event in the append-only ledger.
///
/// Direction is positional: `amount` is always positive, subtracted from
/// the sender and added to the recipient. A record with no recipient is a
/// withdrawal, one with no sender a top-up, and one with both a transfer.
/// Records are immutable and never deleted; they are the audit trail
/// independent of current balances.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "transaction")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sender_id: Option<Uuid>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub recipient_id: Option<Uuid>,
    pub amount: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub transaction_date: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
