use axum::Extension;
use axum::body::Bytes;
use axum::extract::State;
use serde::Serialize;
use serde_json::Value;
use tracing::instrument;

use crate::core::error::Error;
use crate::core::paystack::{Customer, Identification, NewCustomer};
use crate::core::state::AppState;
use crate::types::request::Identity;
use crate::types::response::ApiResponse;
use crate::types::user::{AuthorizedUser, UserProfile};
use crate::types::wallet::{CustomerList, CustomerSummary, DedicatedAccount, FundingAccount};
use crate::utils::params::non_blank;

const CUSTOMER_PAGE_SIZE: u32 = 20;
const DEFAULT_COUNTRY: &str = "NG";

#[derive(Debug, Serialize)]
pub(crate) struct CustomerValidation {
    customer_code: String,
    customer_id: Value,
    validation_response: Value,
    validation_success: bool,
    message: String,
}

/// Bodies are optional here; anything that is not an identity object is
/// treated as empty.
fn identity_from(body: &Bytes) -> Identity {
    serde_json::from_slice(body).unwrap_or_default()
}

fn identification<'a>(identity: &'a Identity, profile: &'a UserProfile) -> Option<Identification<'a>> {
    Some(Identification {
        country: non_blank(identity.country.as_deref()).unwrap_or(DEFAULT_COUNTRY),
        kind: "bank_account",
        account_number: non_blank(identity.account_number.as_deref())?,
        bvn: non_blank(identity.bvn.as_deref())?,
        bank_code: non_blank(identity.bank_code.as_deref())?,
        first_name: profile.first_name.as_deref(),
        last_name: profile.last_name.as_deref(),
    })
}

async fn user_profile(state: &AppState, user: &AuthorizedUser) -> Result<UserProfile, Error> {
    state
        .user_controller
        .profile(user.id)
        .await?
        .ok_or_else(|| Error::not_found("User profile not found"))
}

async fn paystack_customer(state: &AppState, profile: &UserProfile) -> Result<Customer, Error> {
    state
        .paystack
        .create_customer(&NewCustomer {
            email: &profile.email,
            first_name: profile.first_name.as_deref(),
            last_name: profile.last_name.as_deref(),
        })
        .await?
        .into_data("Failed to create Paystack customer")
}

#[instrument(skip_all, fields(user_id = %user.id))]
pub(crate) async fn generate_funding_account(
    State(state): State<AppState>,
    Extension(user): Extension<AuthorizedUser>,
    body: Bytes,
) -> Result<ApiResponse<FundingAccount>, Error> {
    let profile = user_profile(&state, &user).await?;

    if let Some(existing) = state.wallet_controller.active_account(user.id).await? {
        return Ok(ApiResponse::ok(
            FundingAccount {
                account_number: existing.account_number,
                bank_name: existing.bank_name,
                account_name: existing.account_name,
                message: "Existing funding account retrieved",
                customer_id: None,
                customer_code: None,
            },
            "Funding account retrieved successfully",
        ));
    }

    let customer = paystack_customer(&state, &profile).await?;
    let customer_id = customer.numeric_id().ok_or_else(|| {
        Error::upstream("Invalid customer ID format", customer.id_string())
    })?;

    let identity = identity_from(&body);
    if let Some(identification) = identification(&identity, &profile) {
        match state
            .paystack
            .validate_customer(&customer.customer_code, &identification)
            .await
        {
            Ok(response) if response["status"].as_bool() == Some(true) => {
                tracing::info!("Paystack customer {} validated", customer.customer_code);
            }
            Ok(response) => {
                tracing::warn!(
                    "Customer validation failed, continuing: {}",
                    response["message"]
                );
            }
            Err(e) => tracing::warn!("Customer validation failed, continuing: {}", e),
        }
    }

    let created = state
        .paystack
        .create_dedicated_account(customer_id)
        .await?
        .into_data("Failed to create dedicated account")?;

    let account_customer = created.customer.as_ref().unwrap_or(&customer);
    let account = DedicatedAccount {
        account_number: created.account_number,
        bank_name: created.bank.name,
        account_name: created.account_name,
        paystack_customer_code: Some(account_customer.customer_code.clone()),
        paystack_customer_id: Some(account_customer.id_string()),
    };

    state
        .wallet_controller
        .store_account(user.id, &account)
        .await
        .map_err(|e| Error::upstream("Failed to store account details", e))?;

    tracing::info!("Created dedicated account {}", account.account_number);

    Ok(ApiResponse::ok(
        FundingAccount {
            account_number: account.account_number,
            bank_name: account.bank_name,
            account_name: account.account_name,
            message: "Transfer money to this account to fund your wallet",
            customer_id: account.paystack_customer_id,
            customer_code: account.paystack_customer_code,
        },
        "Funding account created successfully",
    ))
}

#[instrument(skip_all)]
pub(crate) async fn check_customers(
    State(state): State<AppState>,
) -> Result<ApiResponse<CustomerList>, Error> {
    let customers = state
        .paystack
        .list_customers(CUSTOMER_PAGE_SIZE)
        .await?
        .into_data("Failed to fetch customers from Paystack")?;

    let summaries = customers
        .iter()
        .map(|customer| serde_json::from_value(customer.clone()).unwrap_or_default())
        .collect::<Vec<CustomerSummary>>();

    Ok(ApiResponse::ok(
        CustomerList {
            total: customers.len(),
            customers: summaries,
            raw_response: customers,
        },
        "Customers retrieved successfully",
    ))
}

#[instrument(skip_all, fields(user_id = %user.id))]
pub(crate) async fn validate_customer(
    State(state): State<AppState>,
    Extension(user): Extension<AuthorizedUser>,
    body: Bytes,
) -> Result<ApiResponse<CustomerValidation>, Error> {
    let profile = user_profile(&state, &user).await?;

    let identity = identity_from(&body);
    let identification = identification(&identity, &profile).ok_or_else(|| {
        Error::bad_request("Missing required fields: account_number, bvn, bank_code")
    })?;

    let customer = paystack_customer(&state, &profile).await?;

    let response = state
        .paystack
        .validate_customer(&customer.customer_code, &identification)
        .await?;

    let validation_success = response["status"].as_bool().unwrap_or(false);
    let message = response["message"]
        .as_str()
        .unwrap_or("Validation completed")
        .to_owned();

    Ok(ApiResponse::ok(
        CustomerValidation {
            customer_code: customer.customer_code,
            customer_id: customer.id,
            validation_response: response,
            validation_success,
            message,
        },
        "Customer validation completed",
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    fn profile() -> UserProfile {
        UserProfile {
            id: Uuid::new_v4(),
            first_name: Some("Ada".into()),
            last_name: Some("Obi".into()),
            username: Some("ada".into()),
            email: "ada@example.com".into(),
            phone: None,
            wallet_balance: 0.0,
        }
    }

    #[test]
    fn identification_needs_account_bvn_and_bank() {
        let profile = profile();

        let identity = identity_from(&Bytes::from_static(
            br#"{"account_number": "0123456789", "bvn": "22222222222", "bank_code": "007"}"#,
        ));
        let submitted = identification(&identity, &profile).unwrap();
        assert_eq!(submitted.country, "NG");
        assert_eq!(submitted.first_name, Some("Ada"));

        let identity = identity_from(&Bytes::from_static(br#"{"account_number": "0123456789"}"#));
        assert!(identification(&identity, &profile).is_none());
    }

    #[test]
    fn unreadable_bodies_are_empty_identities() {
        let identity = identity_from(&Bytes::new());
        assert!(identity.account_number.is_none());

        let identity = identity_from(&Bytes::from_static(b"[1, 2]"));
        assert!(identity.bvn.is_none());
    }
}
