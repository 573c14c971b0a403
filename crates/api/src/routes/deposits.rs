//! Deposit routes: balance queries, balance updates, transfers, history.

use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::post,
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::error;
use uuid::Uuid;
use validator::{Validate, ValidationError, ValidationErrors};

use tally_core::balance::convert;
use tally_core::ledger::{Direction, HistoryQuery, OrderBy};
use tally_db::{BalanceEngine, BalanceError, DepositRepository, TransactionRepository};

use crate::AppState;

/// Creates the deposit routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/deposits/balance", post(get_balance))
        .route("/deposits/update", post(update_balance))
        .route("/deposits/transfer", post(transfer))
        .route("/deposits/history", post(get_history))
}

fn not_nil_uuid(id: &Uuid) -> Result<(), ValidationError> {
    if id.is_nil() {
        let mut err = ValidationError::new("nil_uuid");
        err.message = Some("value cannot be the nil UUID".into());
        return Err(err);
    }
    Ok(())
}

fn non_zero_amount(amount: i64) -> Result<(), ValidationError> {
    if amount == 0 {
        let mut err = ValidationError::new("zero_amount");
        err.message = Some("amount must not be zero".into());
        return Err(err);
    }
    Ok(())
}

/// Request to read one account's balance.
#[derive(Debug, Deserialize, Validate)]
pub struct GetBalanceRequest {
    /// Account identifier.
    #[validate(custom(function = not_nil_uuid))]
    pub owner_id: Uuid,
    /// Optional ISO 4217 code for display conversion.
    #[validate(length(min = 3, max = 3))]
    pub currency: Option<String>,
}

/// Request to apply a signed amount to one account.
#[derive(Debug, Deserialize, Validate)]
pub struct UpdateBalanceRequest {
    /// Account identifier.
    #[validate(custom(function = not_nil_uuid))]
    pub owner_id: Uuid,
    /// Signed amount in minor units; positive credits, negative debits.
    #[validate(custom(function = non_zero_amount))]
    pub amount: i64,
    /// Optional annotation for the ledger record.
    #[validate(length(max = 100))]
    pub description: Option<String>,
}

/// Request to move money from one account to another.
#[derive(Debug, Deserialize, Validate)]
pub struct TransferRequest {
    /// Account debited.
    #[validate(custom(function = not_nil_uuid))]
    pub sender_id: Uuid,
    /// Account credited.
    #[validate(custom(function = not_nil_uuid))]
    pub recipient_id: Uuid,
    /// Amount in minor units; must be positive.
    #[validate(range(min = 1))]
    pub amount: i64,
    /// Optional annotation for the ledger record.
    #[validate(length(max = 100))]
    pub description: Option<String>,
}

/// Request for an account's ledger history.
#[derive(Debug, Deserialize, Validate)]
pub struct GetHistoryRequest {
    /// Account identifier.
    #[validate(custom(function = not_nil_uuid))]
    pub owner_id: Uuid,
    /// Column to order by; unrecognized values are rejected, not ignored.
    pub order_by: Option<OrderBy>,
    /// Sort direction.
    pub order_direction: Option<Direction>,
    /// Rows to skip. Defaults to 0.
    pub offset: Option<u64>,
    /// Maximum rows to return; absent or zero means no limit.
    pub limit: Option<u64>,
}

/// Response for a balance query.
#[derive(Debug, Serialize)]
pub struct BalanceResponse {
    /// The balance: minor units, or the converted decimal amount when a
    /// currency was requested.
    pub balance: String,
    /// Currency of the converted amount, echoed from the request.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub currency: Option<String>,
}

fn validation_response(errors: &ValidationErrors) -> Response {
    (
        StatusCode::BAD_REQUEST,
        Json(json!({
            "error": "validation_error",
            "message": errors.to_string()
        })),
    )
        .into_response()
}

fn internal_response() -> Response {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(json!({
            "error": "internal_error",
            "message": "An error occurred"
        })),
    )
        .into_response()
}

fn balance_error_response(err: &BalanceError) -> Response {
    match err {
        BalanceError::InsufficientFunds => (
            StatusCode::UNPROCESSABLE_ENTITY,
            Json(json!({
                "error": "insufficient_funds",
                "message": "Insufficient funds to perform operation."
            })),
        )
            .into_response(),
        BalanceError::InvalidRecord(record_err) => (
            StatusCode::BAD_REQUEST,
            Json(json!({
                "error": "invalid_amount",
                "message": record_err.to_string()
            })),
        )
            .into_response(),
        BalanceError::Database(_) => internal_response(),
    }
}

/// POST `/deposits/balance` - Read a balance, optionally display-converted.
///
/// Unknown accounts read as 0 and are not created.
async fn get_balance(
    State(state): State<AppState>,
    Json(payload): Json<GetBalanceRequest>,
) -> impl IntoResponse {
    if let Err(errors) = payload.validate() {
        return validation_response(&errors);
    }

    let deposits = DepositRepository::new((*state.db).clone());
    let balance = match deposits.get_balance(payload.owner_id).await {
        Ok(balance) => balance,
        Err(e) => {
            error!(error = %e, "failed to read balance");
            return internal_response();
        }
    };

    let Some(code) = payload.currency else {
        return (
            StatusCode::OK,
            Json(json!(BalanceResponse {
                balance: balance.to_string(),
                currency: None,
            })),
        )
            .into_response();
    };

    match state.rates.rate(&code).await {
        Ok(rate) => (
            StatusCode::OK,
            Json(json!(BalanceResponse {
                balance: convert(balance, rate).to_string(),
                currency: Some(code),
            })),
        )
            .into_response(),
        Err(e) => {
            error!(error = %e, currency = %code, "currency rate unavailable");
            (
                StatusCode::BAD_GATEWAY,
                Json(json!({
                    "error": "currency_unavailable",
                    "message": "Requested currency is not available at the moment."
                })),
            )
                .into_response()
        }
    }
}

/// POST `/deposits/update` - Apply a signed amount to one account.
///
/// Returns the ledger record reflecting the change; fails without side
/// effects on insufficient funds.
async fn update_balance(
    State(state): State<AppState>,
    Json(payload): Json<UpdateBalanceRequest>,
) -> impl IntoResponse {
    if let Err(errors) = payload.validate() {
        return validation_response(&errors);
    }

    let engine = BalanceEngine::new((*state.db).clone());
    match engine
        .update_balance(payload.owner_id, payload.amount, payload.description)
        .await
    {
        Ok(record) => (StatusCode::CREATED, Json(record)).into_response(),
        Err(e) => {
            if matches!(e, BalanceError::Database(_)) {
                error!(error = %e, "balance update failed");
            }
            balance_error_response(&e)
        }
    }
}

/// POST `/deposits/transfer` - Move money between two accounts.
///
/// Returns the single ledger record describing the transfer as a whole.
async fn transfer(
    State(state): State<AppState>,
    Json(payload): Json<TransferRequest>,
) -> impl IntoResponse {
    if let Err(errors) = payload.validate() {
        return validation_response(&errors);
    }

    let engine = BalanceEngine::new((*state.db).clone());
    match engine
        .transfer(
            payload.sender_id,
            payload.recipient_id,
            payload.amount,
            payload.description,
        )
        .await
    {
        Ok(record) => (StatusCode::CREATED, Json(record)).into_response(),
        Err(e) => {
            if matches!(e, BalanceError::Database(_)) {
                error!(error = %e, "transfer failed");
            }
            balance_error_response(&e)
        }
    }
}

/// POST `/deposits/history` - List every record touching an account.
async fn get_history(
    State(state): State<AppState>,
    Json(payload): Json<GetHistoryRequest>,
) -> impl IntoResponse {
    if let Err(errors) = payload.validate() {
        return validation_response(&errors);
    }

    let query = HistoryQuery {
        order_by: payload.order_by,
        direction: payload.order_direction,
        offset: payload.offset.unwrap_or(0),
        limit: match payload.limit {
            None | Some(0) => None,
            limit => limit,
        },
    };

    let ledger = TransactionRepository::new((*state.db).clone());
    match ledger.history(payload.owner_id, query).await {
        Ok(records) => (StatusCode::OK, Json(records)).into_response(),
        Err(e) => {
            error!(error = %e, "failed to read history");
            internal_response()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[test]
    fn test_nil_owner_id_is_rejected() {
        let request = GetBalanceRequest {
            owner_id: Uuid::nil(),
            currency: None,
        };
        assert!(request.validate().is_err());
    }

    #[rstest]
    #[case("US", false)]
    #[case("USD", true)]
    #[case("DOLLARS", false)]
    fn test_currency_code_length(#[case] code: &str, #[case] ok: bool) {
        let request = GetBalanceRequest {
            owner_id: Uuid::new_v4(),
            currency: Some(code.to_string()),
        };
        assert_eq!(request.validate().is_ok(), ok);
    }

    #[rstest]
    #[case(-500, true)]
    #[case(2000, true)]
    #[case(0, false)]
    fn test_update_amount_must_be_non_zero(#[case] amount: i64, #[case] ok: bool) {
        let request = UpdateBalanceRequest {
            owner_id: Uuid::new_v4(),
            amount,
            description: None,
        };
        assert_eq!(request.validate().is_ok(), ok);
    }

    #[test]
    fn test_description_is_bounded() {
        let request = UpdateBalanceRequest {
            owner_id: Uuid::new_v4(),
            amount: 100,
            description: Some("x".repeat(101)),
        };
        assert!(request.validate().is_err());

        let request = UpdateBalanceRequest {
            owner_id: Uuid::new_v4(),
            amount: 100,
            description: Some("x".repeat(100)),
        };
        assert!(request.validate().is_ok());
    }

    #[rstest]
    #[case(300, true)]
    #[case(0, false)]
    #[case(-300, false)]
    fn test_transfer_amount_must_be_positive(#[case] amount: i64, #[case] ok: bool) {
        let request = TransferRequest {
            sender_id: Uuid::new_v4(),
            recipient_id: Uuid::new_v4(),
            amount,
            description: None,
        };
        assert_eq!(request.validate().is_ok(), ok);
    }

    #[test]
    fn test_history_order_by_allow_list() {
        let ok = serde_json::from_value::<GetHistoryRequest>(json!({
            "owner_id": Uuid::new_v4(),
            "order_by": "amount",
            "order_direction": "desc"
        }));
        assert!(ok.is_ok());

        let rejected = serde_json::from_value::<GetHistoryRequest>(json!({
            "owner_id": Uuid::new_v4(),
            "order_by": "description"
        }));
        assert!(rejected.is_err());
    }
}
