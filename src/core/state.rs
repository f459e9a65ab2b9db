use sqlx::postgres::PgPool;

use crate::controllers::admin::AdminController;
use crate::controllers::call::CallController;
use crate::controllers::reports::ReportsController;
use crate::controllers::session::SessionController;
use crate::controllers::user::UserController;
use crate::controllers::wallet::WalletController;
use crate::core::airtime::Airtime;
use crate::core::config::Args;
use crate::core::error::{ConfigError, Error};
use crate::core::paystack::Paystack;
use crate::core::push::Push;
use crate::token::ZegoCredentials;

#[derive(Clone, Debug)]
pub(crate) struct AppState {
    pub(crate) session_controller: SessionController,
    pub(crate) user_controller: UserController,
    pub(crate) wallet_controller: WalletController,
    pub(crate) admin_controller: AdminController,
    pub(crate) reports_controller: ReportsController,
    pub(crate) call_controller: CallController,
    pub(crate) paystack: Paystack,
    pub(crate) airtime: Airtime,
    pub(crate) push: Option<Push>,
    zego: Option<ZegoCredentials>,
    pub(crate) allow_unverified_password_reset: bool,
}

impl AppState {
    pub(crate) fn new(pool: PgPool, args: &Args) -> Result<Self, ConfigError> {
        let zego = ZegoCredentials::from_args(args);
        if zego.is_none() {
            tracing::warn!("Zego credentials missing or invalid, call endpoints are disabled");
        }

        let push = Push::from_args(args)?;
        if push.is_none() {
            tracing::warn!("FCM service account not configured, call notifications are disabled");
        }

        Ok(AppState {
            session_controller: SessionController::new(
                pool.clone(),
                &args.session_secret,
                &args.jwt_secret,
                args.user_session_days,
                args.admin_session_minutes,
            )?,
            user_controller: UserController::new(pool.clone())?,
            wallet_controller: WalletController::new(pool.clone()),
            admin_controller: AdminController::new(pool.clone()),
            reports_controller: ReportsController::new(pool.clone()),
            call_controller: CallController::new(pool),
            paystack: Paystack::new(
                &args.user_agent,
                &args.paystack_base_url,
                &args.paystack_secret_key,
                &args.paystack_preferred_bank,
            )?,
            airtime: Airtime::new(
                &args.user_agent,
                &args.africastalking_base_url,
                &args.africastalking_username,
                &args.africastalking_api_key,
                &args.airtime_currency,
            )?,
            push,
            zego,
            allow_unverified_password_reset: args.allow_unverified_password_reset,
        })
    }

    pub(crate) fn zego(&self) -> Result<&ZegoCredentials, Error> {
        self.zego.as_ref().ok_or_else(|| {
            Error::Configuration(
                "Zego configuration error. Please set ZEGO_APP_ID and ZEGO_SERVER_SECRET environment variables."
                    .to_owned(),
            )
        })
    }
}

#[cfg(test)]
pub(crate) fn test_state() -> AppState {
    use sqlx::postgres::PgPoolOptions;

    let args = crate::core::config::test_args();
    let pool = PgPoolOptions::new()
        .connect_lazy(&args.database_url())
        .unwrap();

    AppState::new(pool, &args).unwrap()
}

/// Inserts a user with a profile and no wallet history.
#[cfg(test)]
pub(crate) async fn seed_user(pool: &PgPool, username: &str) -> uuid::Uuid {
    let id: uuid::Uuid = sqlx::query_scalar(
        "INSERT INTO users (email, password_hash) VALUES ($1, 'not-a-hash') RETURNING id;",
    )
    .bind(format!("{username}@example.com"))
    .fetch_one(pool)
    .await
    .unwrap();

    sqlx::query("INSERT INTO profiles (id, username, user_type) VALUES ($1, $2, 'rider');")
        .bind(id)
        .bind(username)
        .execute(pool)
        .await
        .unwrap();

    id
}

/// Current balance from the ledger.
#[cfg(test)]
pub(crate) async fn wallet_balance(pool: &PgPool, user_id: uuid::Uuid) -> f64 {
    sqlx::query_scalar("SELECT get_user_wallet_balance($1)::float8;")
        .bind(user_id)
        .fetch_one(pool)
        .await
        .unwrap()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn missing_zego_credentials_are_a_configuration_error() {
        let mut state = test_state();
        assert_eq!(state.zego().unwrap().app_id, 1000);

        state.zego = None;
        assert!(matches!(state.zego(), Err(Error::Configuration(_))));
    }
}
