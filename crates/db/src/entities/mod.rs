//! `SeaORM` entity definitions.

pub mod deposits;
pub mod transactions;
