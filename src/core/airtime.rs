use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::instrument;

use crate::core::error::{ConfigError, Error};

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct Recipient<'a> {
    phone_number: &'a str,
    amount: String,
}

#[derive(Debug, Serialize)]
struct SendForm<'a> {
    username: &'a str,
    recipients: String,
}

/// Africa's Talking airtime response. `errorMessage` is `"None"` on success.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct AirtimeReceipt {
    #[serde(default)]
    pub(crate) error_message: Option<String>,
    #[serde(default)]
    pub(crate) responses: Option<Value>,
    #[serde(flatten)]
    pub(crate) rest: serde_json::Map<String, Value>,
}

impl AirtimeReceipt {
    /// The provider's error, if the send did not go through.
    pub(crate) fn failure(&self) -> Option<String> {
        match self.error_message.as_deref().map(str::trim) {
            Some(message) if !message.is_empty() && message != "None" => {
                Some(message.to_owned())
            }
            _ if self.responses.is_none() => {
                Some("Unknown error from Africa's Talking".to_owned())
            }
            _ => None,
        }
    }
}

#[derive(Debug)]
pub(crate) enum Reply {
    Receipt(AirtimeReceipt),
    Unparsable(String),
}

#[derive(Clone)]
pub(crate) struct Airtime {
    client: reqwest::Client,
    base_url: String,
    username: String,
    api_key: String,
    currency: String,
}

impl std::fmt::Debug for Airtime {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Airtime")
            .field("base_url", &self.base_url)
            .field("username", &self.username)
            .field("currency", &self.currency)
            .finish()
    }
}

impl Airtime {
    pub(crate) fn new(
        user_agent: &str,
        base_url: &str,
        username: &str,
        api_key: &str,
        currency: &str,
    ) -> Result<Self, ConfigError> {
        let client = reqwest::ClientBuilder::new().user_agent(user_agent).build()?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_owned(),
            username: username.to_owned(),
            api_key: api_key.to_owned(),
            currency: currency.to_owned(),
        })
    }

    /// Form body for a single-recipient send.
    fn form(&self, phone_number: &str, amount: f64) -> Result<String, Error> {
        let recipients = serde_json::to_string(&[Recipient {
            phone_number,
            amount: format!("{} {}", self.currency, amount),
        }])?;

        Ok(serde_urlencoded::to_string(SendForm {
            username: &self.username,
            recipients,
        })?)
    }

    /// Sends airtime. Replies that are not JSON come back verbatim.
    #[instrument(skip(self))]
    pub(crate) async fn send(&self, phone_number: &str, amount: f64) -> Result<Reply, Error> {
        let text = self
            .client
            .post(format!("{}/version1/airtime/send", self.base_url))
            .header("apiKey", &self.api_key)
            .header(reqwest::header::ACCEPT, "application/json")
            .header(
                reqwest::header::CONTENT_TYPE,
                "application/x-www-form-urlencoded",
            )
            .body(self.form(phone_number, amount)?)
            .send()
            .await?
            .text()
            .await?;

        tracing::debug!("Africa's Talking response: {}", text);

        Ok(match serde_json::from_str::<AirtimeReceipt>(&text) {
            Ok(receipt) => Reply::Receipt(receipt),
            Err(_) => Reply::Unparsable(text),
        })
    }
}
