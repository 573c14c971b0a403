//! History query types with the ordering allow-list.

use serde::{Deserialize, Serialize};

/// Columns history results may be ordered by.
///
/// An allow-list: anything else fails deserialization at the boundary
/// instead of being silently ignored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrderBy {
    /// Order by the record's creation timestamp.
    TransactionDate,
    /// Order by the moved amount.
    Amount,
}

/// Sort direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    /// Ascending.
    Asc,
    /// Descending.
    Desc,
}

/// Parameters for a ledger history query.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct HistoryQuery {
    /// Column to order by. When unset, results come back in insertion
    /// order: transaction date ascending, id as tie-break.
    pub order_by: Option<OrderBy>,
    /// Sort direction; ascending when unset.
    pub direction: Option<Direction>,
    /// Rows to skip.
    pub offset: u64,
    /// Maximum rows to return; `None` means no limit.
    pub limit: Option<u64>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_order_by_allow_list() {
        let ok: OrderBy = serde_json::from_str(r#""transaction_date""#).expect("allowed");
        assert_eq!(ok, OrderBy::TransactionDate);
        let ok: OrderBy = serde_json::from_str(r#""amount""#).expect("allowed");
        assert_eq!(ok, OrderBy::Amount);

        assert!(serde_json::from_str::<OrderBy>(r#""id""#).is_err());
        assert!(serde_json::from_str::<OrderBy>(r#""description; DROP TABLE""#).is_err());
    }

    #[test]
    fn test_direction_values() {
        let asc: Direction = serde_json::from_str(r#""asc""#).expect("allowed");
        assert_eq!(asc, Direction::Asc);
        let desc: Direction = serde_json::from_str(r#""desc""#).expect("allowed");
        assert_eq!(desc, Direction::Desc);
        assert!(serde_json::from_str::<Direction>(r#""sideways""#).is_err());
    }

    #[test]
    fn test_query_defaults() {
        let query = HistoryQuery::default();
        assert_eq!(query.order_by, None);
        assert_eq!(query.direction, None);
        assert_eq!(query.offset, 0);
        assert_eq!(query.limit, None);
    }
}
