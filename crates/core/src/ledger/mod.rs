//! Ledger record derivation and history query types.
//!
//! A ledger record is the immutable, append-only description of one
//! balance-changing event. Direction is positional: the amount is always
//! positive, subtracted from the sender and added to the recipient; a
//! missing sender means a top-up, a missing recipient a withdrawal.

pub mod history;
pub mod record;

pub use history::{Direction, HistoryQuery, OrderBy};
pub use record::{Kind, RecordDraft, RecordError};
