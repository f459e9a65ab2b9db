use axum::Extension;
use axum::extract::State;
use chrono::Utc;
use rand::Rng;
use rand::distributions::Alphanumeric;
use serde::Serialize;
use tracing::instrument;

use crate::core::airtime::{AirtimeReceipt, Reply};
use crate::core::error::Error;
use crate::core::state::AppState;
use crate::types::request::{Airtime, BillPayment};
use crate::types::response::ApiResponse;
use crate::types::user::AuthorizedUser;
use crate::types::wallet::{BillStatus, Direction, Posting};
use crate::utils::extract::JsonBody;
use crate::utils::params::non_blank;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct AirtimePurchase {
    transaction_id: String,
    mobile_number: String,
    network_provider: String,
    amount: f64,
    status: &'static str,
    africastalking_response: AirtimeReceipt,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct BillReceipt {
    transaction_id: String,
    amount: f64,
    bill_type: String,
    account_number: String,
    status: &'static str,
    wallet_balance: f64,
}

/// `<prefix>_<unix millis>_<9 random lowercase alphanumerics>`.
fn transaction_id(prefix: &str) -> String {
    let suffix: String = rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(9)
        .map(|c| char::from(c).to_ascii_lowercase())
        .collect();

    format!("{}_{}_{}", prefix, Utc::now().timestamp_millis(), suffix)
}

/// Zero counts as missing. Negative amounts are present and rejected once
/// every required field is known to be there.
fn present_amount(amount: Option<f64>) -> Option<f64> {
    amount.filter(|amount| *amount != 0.0 && amount.is_finite())
}

fn positive(amount: f64) -> Result<f64, Error> {
    if amount < 0.0 {
        return Err(Error::bad_request("Amount must be greater than 0"));
    }

    Ok(amount)
}

/// Mobile number, network provider and amount of an airtime order.
fn airtime_order(body: &Airtime) -> Result<(&str, &str, f64), Error> {
    let (Some(mobile_number), Some(network_provider), Some(amount)) = (
        non_blank(body.mobile_number.as_deref()),
        non_blank(body.network_provider.as_deref()),
        present_amount(body.amount),
    ) else {
        return Err(Error::bad_request(
            "Missing required fields: mobileNumber, networkProvider, amount",
        ));
    };
    let amount = positive(amount)?;

    if !mobile_number.starts_with('+') {
        return Err(Error::bad_request(
            "Mobile number must include country code (e.g., +254...)",
        ));
    }

    Ok((mobile_number, network_provider, amount))
}

/// Amount, bill type and account number of a bill payment.
fn bill_order(body: &BillPayment) -> Result<(f64, &str, &str), Error> {
    let (Some(amount), Some(bill_type), Some(account_number)) = (
        present_amount(body.amount),
        non_blank(body.bill_type.as_deref()),
        non_blank(body.account_number.as_deref()),
    ) else {
        return Err(Error::bad_request(
            "Missing required fields: amount, billType, accountNumber",
        ));
    };

    Ok((positive(amount)?, bill_type, account_number))
}

#[instrument(skip_all, fields(user_id = %user.id))]
pub(crate) async fn purchase_airtime(
    State(state): State<AppState>,
    Extension(user): Extension<AuthorizedUser>,
    JsonBody(body): JsonBody<Airtime>,
) -> Result<ApiResponse<AirtimePurchase>, Error> {
    let (mobile_number, network_provider, amount) = airtime_order(&body)?;

    let transaction_id = transaction_id("AT");

    let receipt = match state.airtime.send(mobile_number, amount).await? {
        Reply::Receipt(receipt) => receipt,
        Reply::Unparsable(text) => {
            return Err(Error::upstream(
                "Invalid response from Africa's Talking",
                text,
            ));
        }
    };

    if let Some(failure) = receipt.failure() {
        return Err(Error::declined("Airtime purchase failed", failure));
    }

    tracing::info!("Airtime {} sent to {}", transaction_id, mobile_number);

    Ok(ApiResponse::ok(
        AirtimePurchase {
            transaction_id,
            mobile_number: mobile_number.to_owned(),
            network_provider: network_provider.to_owned(),
            amount,
            status: "completed",
            africastalking_response: receipt,
        },
        "Airtime purchase successful",
    ))
}

/// Records the bill, debits the wallet and settles the bill's status from
/// the outcome of the debit.
#[instrument(skip_all, fields(user_id = %user.id))]
pub(crate) async fn bill_payment(
    State(state): State<AppState>,
    Extension(user): Extension<AuthorizedUser>,
    JsonBody(body): JsonBody<BillPayment>,
) -> Result<ApiResponse<BillReceipt>, Error> {
    let (amount, bill_type, account_number) = bill_order(&body)?;
    let description = non_blank(body.description.as_deref()).unwrap_or_default();

    let transaction_id = transaction_id("TXN");

    state
        .wallet_controller
        .create_bill_payment(
            user.id,
            &transaction_id,
            amount,
            bill_type,
            account_number,
            description,
        )
        .await
        .map_err(|e| Error::upstream("Failed to process payment", e))?;

    let posting = Posting {
        user_id: user.id,
        amount,
        direction: Direction::Debit,
        transaction_type: "bill_payment",
        reference: transaction_id.clone(),
        description: if description.is_empty() {
            format!("{bill_type} payment for {account_number}")
        } else {
            description.to_owned()
        },
    };

    let outcome = state.wallet_controller.post(&posting).await;

    let status = match &outcome {
        Ok(Some(_)) => BillStatus::Completed,
        _ => BillStatus::Failed,
    };
    if let Err(e) = state
        .wallet_controller
        .set_bill_status(&transaction_id, status)
        .await
    {
        tracing::error!("Failed to update bill payment {}: {}", transaction_id, e);
    }

    let wallet_balance = outcome?
        .ok_or_else(|| Error::bad_request("Transaction already processed"))?;

    tracing::info!("Bill payment {} completed", transaction_id);

    Ok(ApiResponse::ok(
        BillReceipt {
            transaction_id,
            amount,
            bill_type: bill_type.to_owned(),
            account_number: account_number.to_owned(),
            status: status.as_str(),
            wallet_balance,
        },
        "Payment processed successfully",
    ))
}
