use axum::body::Bytes;
use axum::extract::State;
use axum::http::HeaderMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::instrument;
use uuid::Uuid;

use crate::core::error::Error;
use crate::core::paystack::SIGNATURE_HEADER;
use crate::core::state::AppState;
use crate::types::response::ApiResponse;
use crate::types::wallet::{Direction, Posting};
use crate::utils::de::to_number;

const FUNDING_EVENTS: [&str; 2] = ["charge.success", "transfer.success"];

#[derive(Debug, Deserialize)]
struct WebhookEvent {
    event: String,
    #[serde(default)]
    data: Value,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct Funded {
    user_id: Uuid,
    amount: f64,
    new_balance: f64,
}

/// The receiving account, wherever Paystack put it for this event.
fn account_number(data: &Value) -> Option<&str> {
    ["dedicated_account", "authorization", "metadata"]
        .iter()
        .filter_map(|key| data[*key]["account_number"].as_str())
        .map(str::trim)
        .find(|number| !number.is_empty())
}

/// Paystack amounts are in the minor unit.
fn major_amount(data: &Value) -> f64 {
    (to_number(data.get("amount")) / 100.0).abs()
}

fn reference(data: &Value) -> Option<String> {
    match &data["reference"] {
        Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_owned()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

#[instrument(skip_all)]
pub(crate) async fn paystack(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<ApiResponse<Funded>, Error> {
    let signature = headers
        .get(SIGNATURE_HEADER)
        .and_then(|value| value.to_str().ok())
        .ok_or(Error::Unauthorized("Invalid webhook signature"))?;

    if !state.paystack.verify_signature(&body, signature) {
        tracing::warn!("Rejected Paystack webhook with a bad signature");
        return Err(Error::Unauthorized("Invalid webhook signature"));
    }

    let event: WebhookEvent = serde_json::from_slice(&body)
        .map_err(|_| Error::bad_request("Invalid JSON payload"))?;

    tracing::info!("Paystack webhook event received: {}", event.event);

    if !FUNDING_EVENTS.contains(&event.event.as_str()) {
        return Ok(ApiResponse::message("Webhook received and processed"));
    }

    let data = &event.data;

    let account_number = account_number(data)
        .ok_or_else(|| Error::bad_request("No account number found in webhook"))?;

    let user_id = state
        .wallet_controller
        .account_owner(account_number)
        .await?
        .ok_or_else(|| Error::not_found("Account not found"))?;

    let amount = major_amount(data);
    if amount <= 0.0 {
        return Err(Error::bad_request("Invalid amount"));
    }

    let reference = reference(data).ok_or_else(|| Error::bad_request("Missing transaction reference"))?;

    let posting = Posting {
        user_id,
        amount,
        direction: Direction::Credit,
        transaction_type: "wallet_funding",
        reference,
        description: format!("Wallet funding via Paystack - {account_number}"),
    };

    let Some(new_balance) = state
        .wallet_controller
        .post(&posting)
        .await
        .map_err(|e| Error::upstream("Failed to credit wallet", e))?
    else {
        tracing::info!("Transaction already processed: {}", posting.reference);
        return Ok(ApiResponse::message("Transaction already processed"));
    };

    tracing::info!(
        "Wallet funded for user {}: amount {}, new balance {}",
        user_id,
        amount,
        new_balance
    );

    Ok(ApiResponse::ok(
        Funded {
            user_id,
            amount,
            new_balance,
        },
        "Wallet funded successfully",
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::config::test_args;
    use crate::core::paystack::sign;
    use crate::core::state::{seed_user, wallet_balance};
    use crate::types::wallet::DedicatedAccount;
    use sqlx::PgPool;
    use serde_json::json;

    #[test]
    fn account_number_is_found_in_any_known_place() {
        let data = json!({"dedicated_account": {"account_number": "111"}});
        assert_eq!(account_number(&data), Some("111"));

        let data = json!({"authorization": {"account_number": ""}, "metadata": {"account_number": "333"}});
        assert_eq!(account_number(&data), Some("333"));

        assert_eq!(account_number(&json!({"amount": 100})), None);
    }

    #[test]
    fn amounts_are_converted_from_minor_units() {
        assert_eq!(major_amount(&json!({"amount": 250000})), 2500.0);
        assert_eq!(major_amount(&json!({"amount": "-5000"})), 50.0);
        assert_eq!(major_amount(&json!({})), 0.0);
    }

    #[test]
    fn references_may_be_numbers() {
        assert_eq!(reference(&json!({"reference": "T123"})), Some("T123".to_owned()));
        assert_eq!(reference(&json!({"reference": 42})), Some("42".to_owned()));
        assert_eq!(reference(&json!({"reference": " "})), None);
    }

    fn signed(body: &[u8]) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(
            SIGNATURE_HEADER,
            sign("sk_test_secret", body).parse().unwrap(),
        );
        headers
    }

    #[sqlx::test(migrations = "./migrations")]
    async fn repeated_events_credit_once(pool: PgPool) {
        let state = AppState::new(pool.clone(), &test_args()).unwrap();
        let user_id = seed_user(&pool, "ada").await;
        state
            .wallet_controller
            .store_account(
                user_id,
                &DedicatedAccount {
                    account_number: "9930000001".into(),
                    bank_name: "Wema Bank".into(),
                    account_name: "Ada Lovelace".into(),
                    paystack_customer_code: None,
                    paystack_customer_id: None,
                },
            )
            .await
            .unwrap();

        let body = Bytes::from(
            json!({
                "event": "charge.success",
                "data": {
                    "reference": "PSK_REF_1",
                    "amount": 250000,
                    "dedicated_account": {"account_number": "9930000001"},
                },
            })
            .to_string(),
        );

        let first = paystack(State(state.clone()), signed(&body), body.clone())
            .await
            .unwrap();
        assert_eq!(first.message, "Wallet funded successfully");
        assert_eq!(first.data.unwrap().new_balance, 2500.0);

        let second = paystack(State(state), signed(&body), body).await.unwrap();
        assert!(second.success);
        assert_eq!(second.message, "Transaction already processed");
        assert!(second.data.is_none());

        assert_eq!(wallet_balance(&pool, user_id).await, 2500.0);
    }

    #[sqlx::test(migrations = "./migrations")]
    async fn unknown_accounts_are_not_credited(pool: PgPool) {
        let state = AppState::new(pool, &test_args()).unwrap();
        let body = Bytes::from_static(
            br#"{"event":"transfer.success","data":{"reference":"R1","amount":100,"metadata":{"account_number":"000"}}}"#,
        );

        let result = paystack(State(state), signed(&body), body.clone()).await;
        assert!(matches!(result, Err(Error::NotFound(m)) if m == "Account not found"));
    }
}
