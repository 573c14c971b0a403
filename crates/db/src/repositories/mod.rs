//! Repository abstractions for data access.
//!
//! Repositories provide a clean interface for database operations,
//! hiding the `SeaORM` implementation details from the rest of the
//! application. `BalanceEngine` sits on top of them and owns the
//! database transaction around every balance mutation.

pub mod balance;
pub mod deposit;
pub mod transaction;

pub use balance::{BalanceEngine, BalanceError};
pub use deposit::{DepositError, DepositRepository};
pub use transaction::TransactionRepository;
