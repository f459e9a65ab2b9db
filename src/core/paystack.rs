use hmac::{Hmac, Mac};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sha2::Sha512;
use tracing::instrument;

use crate::core::error::{ConfigError, Error};

type HmacSha512 = Hmac<Sha512>;

pub(crate) const SIGNATURE_HEADER: &str = "x-paystack-signature";

/// Paystack wraps every payload in `{status, message, data}`.
#[derive(Debug, Deserialize)]
pub(crate) struct Envelope<T> {
    #[serde(default)]
    pub(crate) status: bool,
    #[serde(default)]
    pub(crate) message: Option<String>,
    pub(crate) data: Option<T>,
}

impl<T> Envelope<T> {
    /// The payload, or an upstream error carrying Paystack's message.
    pub(crate) fn into_data(self, context: &str) -> Result<T, Error> {
        if !self.status {
            return Err(Error::upstream(
                context,
                self.message.unwrap_or_else(|| "Unknown error".to_owned()),
            ));
        }

        self.data
            .ok_or_else(|| Error::upstream(context, "No data returned"))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub(crate) struct Customer {
    pub(crate) id: Value,
    pub(crate) customer_code: String,
    #[serde(default)]
    pub(crate) email: Option<String>,
}

impl Customer {
    /// Paystack ids are numeric but have been seen as strings.
    pub(crate) fn numeric_id(&self) -> Option<u64> {
        match &self.id {
            Value::Number(n) => n.as_u64(),
            Value::String(s) => s.trim().parse().ok(),
            _ => None,
        }
    }

    pub(crate) fn id_string(&self) -> String {
        match &self.id {
            Value::String(s) => s.clone(),
            other => other.to_string(),
        }
    }
}

#[derive(Debug, Serialize)]
pub(crate) struct NewCustomer<'a> {
    pub(crate) email: &'a str,
    pub(crate) first_name: Option<&'a str>,
    pub(crate) last_name: Option<&'a str>,
}

#[derive(Debug, Clone, Serialize)]
pub(crate) struct Identification<'a> {
    pub(crate) country: &'a str,
    #[serde(rename = "type")]
    pub(crate) kind: &'static str,
    pub(crate) account_number: &'a str,
    pub(crate) bvn: &'a str,
    pub(crate) bank_code: &'a str,
    pub(crate) first_name: Option<&'a str>,
    pub(crate) last_name: Option<&'a str>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct Bank {
    pub(crate) name: String,
}

#[derive(Debug, Deserialize)]
pub(crate) struct DedicatedAccountData {
    pub(crate) account_number: String,
    pub(crate) account_name: String,
    pub(crate) bank: Bank,
    #[serde(default)]
    pub(crate) customer: Option<Customer>,
}

#[derive(Clone)]
pub(crate) struct Paystack {
    client: reqwest::Client,
    base_url: String,
    secret_key: String,
    preferred_bank: String,
}

impl std::fmt::Debug for Paystack {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Paystack")
            .field("base_url", &self.base_url)
            .field("preferred_bank", &self.preferred_bank)
            .finish()
    }
}

impl Paystack {
    pub(crate) fn new(
        user_agent: &str,
        base_url: &str,
        secret_key: &str,
        preferred_bank: &str,
    ) -> Result<Self, ConfigError> {
        let client = reqwest::ClientBuilder::new().user_agent(user_agent).build()?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_owned(),
            secret_key: secret_key.to_owned(),
            preferred_bank: preferred_bank.to_owned(),
        })
    }

    /// Creates the customer, or returns the existing one for the same email.
    #[instrument(skip_all)]
    pub(crate) async fn create_customer(
        &self,
        customer: &NewCustomer<'_>,
    ) -> Result<Envelope<Customer>, Error> {
        Ok(self
            .client
            .post(format!("{}/customer", self.base_url))
            .bearer_auth(&self.secret_key)
            .json(customer)
            .send()
            .await?
            .json()
            .await?)
    }

    #[instrument(skip_all)]
    pub(crate) async fn list_customers(&self, per_page: u32) -> Result<Envelope<Vec<Value>>, Error> {
        Ok(self
            .client
            .get(format!("{}/customer", self.base_url))
            .bearer_auth(&self.secret_key)
            .query(&[("perPage", per_page)])
            .send()
            .await?
            .json()
            .await?)
    }

    /// Submits identity details and returns Paystack's raw response.
    #[instrument(skip_all, fields(customer_code = %customer_code))]
    pub(crate) async fn validate_customer(
        &self,
        customer_code: &str,
        identification: &Identification<'_>,
    ) -> Result<Value, Error> {
        Ok(self
            .client
            .post(format!(
                "{}/customer/{}/identification",
                self.base_url, customer_code
            ))
            .bearer_auth(&self.secret_key)
            .json(identification)
            .send()
            .await?
            .json()
            .await?)
    }

    #[instrument(skip_all)]
    pub(crate) async fn create_dedicated_account(
        &self,
        customer_id: u64,
    ) -> Result<Envelope<DedicatedAccountData>, Error> {
        Ok(self
            .client
            .post(format!("{}/dedicated_account", self.base_url))
            .bearer_auth(&self.secret_key)
            .json(&serde_json::json!({
                "customer": customer_id,
                "preferred_bank": self.preferred_bank,
            }))
            .send()
            .await?
            .json()
            .await?)
    }

    /// Checks `x-paystack-signature`: hex HMAC-SHA512 of the raw body keyed
    /// with the secret key.
    pub(crate) fn verify_signature(&self, body: &[u8], signature: &str) -> bool {
        let Ok(expected) = hex::decode(signature.trim()) else {
            return false;
        };

        let Ok(mut mac) = HmacSha512::new_from_slice(self.secret_key.as_bytes()) else {
            return false;
        };
        mac.update(body);

        mac.verify_slice(&expected).is_ok()
    }
}

/// Hex HMAC-SHA512 of `body`, as Paystack sends it.
#[cfg(test)]
pub(crate) fn sign(secret: &str, body: &[u8]) -> String {
    let mut mac = HmacSha512::new_from_slice(secret.as_bytes()).unwrap();
    mac.update(body);
    hex::encode(mac.finalize().into_bytes())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn paystack() -> Paystack {
        Paystack::new("billpay-test", "https://api.paystack.co/", "sk_test_secret", "wema-bank")
            .unwrap()
    }

    #[test]
    fn signatures_match_the_raw_body() {
        let paystack = paystack();
        let body = br#"{"event":"charge.success"}"#;

        assert!(paystack.verify_signature(body, &sign("sk_test_secret", body)));
        assert!(!paystack.verify_signature(body, &sign("another", body)));
        assert!(!paystack.verify_signature(b"{}", &sign("sk_test_secret", body)));
        assert!(!paystack.verify_signature(body, "not-hex"));
    }

    #[test]
    fn base_url_loses_trailing_slash() {
        assert_eq!(paystack().base_url, "https://api.paystack.co");
    }

    #[test]
    fn failed_envelopes_surface_paystack_message() {
        let envelope: Envelope<Customer> =
            serde_json::from_value(json!({"status": false, "message": "Invalid key"})).unwrap();

        match envelope.into_data("Failed to create Paystack customer") {
            Err(Error::Upstream { message, detail }) => {
                assert_eq!(message, "Failed to create Paystack customer");
                assert_eq!(detail, "Invalid key");
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn customer_ids_may_be_strings() {
        let customer: Customer =
            serde_json::from_value(json!({"id": "1234", "customer_code": "CUS_x"})).unwrap();
        assert_eq!(customer.numeric_id(), Some(1234));
        assert_eq!(customer.id_string(), "1234");

        let customer: Customer =
            serde_json::from_value(json!({"id": 99, "customer_code": "CUS_y"})).unwrap();
        assert_eq!(customer.numeric_id(), Some(99));
        assert_eq!(customer.id_string(), "99");
    }

    #[test]
    fn dedicated_account_reads_nested_bank() {
        let envelope: Envelope<DedicatedAccountData> = serde_json::from_value(json!({
            "status": true,
            "message": "NUBAN successfully created",
            "data": {
                "account_number": "9930000737",
                "account_name": "KAROKART/ADA",
                "bank": {"name": "Wema Bank", "id": 20, "slug": "wema-bank"},
                "customer": {"id": 100110, "customer_code": "CUS_abc", "email": "ada@example.com"}
            }
        }))
        .unwrap();

        let account = envelope.into_data("Failed to create dedicated account").unwrap();
        assert_eq!(account.bank.name, "Wema Bank");
        assert_eq!(account.customer.unwrap().customer_code, "CUS_abc");
    }
}
