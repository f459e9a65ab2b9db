use std::collections::BTreeMap;

use chrono::Utc;
use jsonwebtoken::{Algorithm, EncodingKey, Header};
use serde::{Deserialize, Serialize};
use tracing::instrument;

use crate::core::config::Args;
use crate::core::error::{ConfigError, Error};

const TOKEN_URL: &str = "https://oauth2.googleapis.com/token";
const MESSAGING_SCOPE: &str = "https://www.googleapis.com/auth/firebase.messaging";
const FCM_URL: &str = "https://fcm.googleapis.com/v1/projects";
const ASSERTION_LIFETIME_SECS: i64 = 3600;

#[derive(Debug, Serialize)]
struct AssertionClaims<'a> {
    iss: &'a str,
    scope: &'static str,
    aud: &'static str,
    iat: i64,
    exp: i64,
}

#[derive(Debug, Deserialize)]
struct AccessToken {
    access_token: String,
}

#[derive(Debug, Clone, Serialize)]
pub(crate) struct Notification {
    pub(crate) title: String,
    pub(crate) body: String,
}

#[derive(Debug, Serialize)]
struct Message<'a> {
    token: &'a str,
    notification: &'a Notification,
    data: &'a BTreeMap<String, String>,
}

#[derive(Debug, Serialize)]
struct SendRequest<'a> {
    message: Message<'a>,
}

/// Firebase Cloud Messaging HTTP v1 client authenticated as a service
/// account.
#[derive(Clone)]
pub(crate) struct Push {
    client: reqwest::Client,
    project_id: String,
    client_email: String,
    signing_key: EncodingKey,
}

impl std::fmt::Debug for Push {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Push")
            .field("project_id", &self.project_id)
            .field("client_email", &self.client_email)
            .finish()
    }
}

impl Push {
    /// `None` when the service account is not configured.
    pub(crate) fn from_args(args: &Args) -> Result<Option<Self>, ConfigError> {
        let (Some(project_id), Some(client_email), Some(private_key)) = (
            args.fcm_project_id.as_deref(),
            args.fcm_client_email.as_deref(),
            args.fcm_private_key_pem(),
        ) else {
            return Ok(None);
        };

        let client = reqwest::ClientBuilder::new()
            .user_agent(&args.user_agent)
            .build()?;

        Ok(Some(Self {
            client,
            project_id: project_id.to_owned(),
            client_email: client_email.to_owned(),
            signing_key: EncodingKey::from_rsa_pem(private_key.as_bytes())?,
        }))
    }

    fn assertion(&self) -> Result<String, Error> {
        let iat = Utc::now().timestamp();

        let claims = AssertionClaims {
            iss: &self.client_email,
            scope: MESSAGING_SCOPE,
            aud: TOKEN_URL,
            iat,
            exp: iat + ASSERTION_LIFETIME_SECS,
        };

        Ok(jsonwebtoken::encode(
            &Header::new(Algorithm::RS256),
            &claims,
            &self.signing_key,
        )?)
    }

    #[instrument(skip_all)]
    async fn access_token(&self) -> Result<String, Error> {
        let assertion = self.assertion()?;

        let token = self
            .client
            .post(TOKEN_URL)
            .form(&[
                ("grant_type", "urn:ietf:params:oauth:grant-type:jwt-bearer"),
                ("assertion", assertion.as_str()),
            ])
            .send()
            .await?
            .error_for_status()?
            .json::<AccessToken>()
            .await?;

        Ok(token.access_token)
    }

    /// Sends one message per device token and returns how many were
    /// accepted. Per-token failures are logged and skipped.
    #[instrument(skip_all, fields(tokens = device_tokens.len()))]
    pub(crate) async fn send_to_tokens(
        &self,
        device_tokens: &[String],
        notification: &Notification,
        data: &BTreeMap<String, String>,
    ) -> Result<usize, Error> {
        if device_tokens.is_empty() {
            return Ok(0);
        }

        let access_token = self.access_token().await?;
        let url = format!("{}/{}/messages:send", FCM_URL, self.project_id);

        let mut delivered = 0;
        for token in device_tokens {
            let request = SendRequest {
                message: Message {
                    token,
                    notification,
                    data,
                },
            };

            let result = self
                .client
                .post(&url)
                .bearer_auth(&access_token)
                .json(&request)
                .send()
                .await
                .and_then(|response| response.error_for_status());

            match result {
                Ok(_) => delivered += 1,
                Err(e) => tracing::warn!("FCM send failed: {}", e),
            }
        }

        Ok(delivered)
    }
}
