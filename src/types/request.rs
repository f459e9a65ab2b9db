//! Request bodies. Fields are optional so that missing values surface as
//! "Missing required fields" instead of a deserialisation rejection.

use serde::Deserialize;

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct Register {
    pub(crate) first_name: Option<String>,
    pub(crate) last_name: Option<String>,
    pub(crate) username: Option<String>,
    pub(crate) email: Option<String>,
    pub(crate) phone: Option<String>,
    pub(crate) password: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct Login {
    pub(crate) email: Option<String>,
    pub(crate) password: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct ChangePassword {
    pub(crate) old_password: Option<String>,
    pub(crate) new_password: Option<String>,
    pub(crate) confirm_password: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct ForgotPassword {
    pub(crate) email: Option<String>,
    pub(crate) old_password: Option<String>,
    pub(crate) new_password: Option<String>,
    pub(crate) confirm_password: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct CustomerStatus {
    pub(crate) status: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct Airtime {
    pub(crate) mobile_number: Option<String>,
    pub(crate) network_provider: Option<String>,
    pub(crate) amount: Option<f64>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct BillPayment {
    pub(crate) amount: Option<f64>,
    pub(crate) bill_type: Option<String>,
    pub(crate) account_number: Option<String>,
    pub(crate) description: Option<String>,
}

/// Bank identity used for Paystack customer validation.
#[derive(Debug, Default, Deserialize)]
pub(crate) struct Identity {
    pub(crate) country: Option<String>,
    pub(crate) account_number: Option<String>,
    pub(crate) bvn: Option<String>,
    pub(crate) bank_code: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct ZegoToken {
    /// Seconds, as a JSON number or a numeric string.
    pub(crate) expiration: Option<serde_json::Value>,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct InitiateCall {
    pub(crate) ride_id: Option<String>,
    pub(crate) courier_order_id: Option<String>,
    pub(crate) room_id: Option<String>,
}

/// Query string shared by the admin list and report endpoints.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct AdminQuery {
    pub(crate) page: Option<String>,
    pub(crate) limit: Option<String>,
    pub(crate) search: Option<String>,
    pub(crate) status: Option<String>,
    #[serde(rename = "type")]
    pub(crate) kind: Option<String>,
    pub(crate) user_id: Option<String>,
    pub(crate) start_date: Option<String>,
    pub(crate) end_date: Option<String>,
    pub(crate) sort: Option<String>,
    pub(crate) interval: Option<String>,
}
