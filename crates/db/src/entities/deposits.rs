//! `SeaORM` Entity for the deposit table.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// One account's balance, in minor currency units.
///
/// Rows are created implicitly on first mutation and never deleted. The
/// table carries a `balance >= 0` CHECK, so the store itself rejects any
/// write that would persist a negative balance.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "deposit")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub owner_id: Uuid,
    pub balance: i64,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
