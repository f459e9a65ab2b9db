use sqlx::PgPool;
use tracing::instrument;
use uuid::Uuid;

use crate::core::error::Error;
use crate::types::report::{CustomerDetail, StatusChange};
use crate::types::user::AdminCredentials;

#[derive(Clone, Debug)]
pub(crate) struct AdminController {
    pool: PgPool,
}

impl AdminController {
    pub(crate) fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    #[instrument(skip(self))]
    pub(crate) async fn credentials(&self, email: &str) -> Result<Option<AdminCredentials>, Error> {
        let admin = sqlx::query_as::<_, AdminCredentials>(
            "SELECT id, email, password_hash, full_name FROM admin_users WHERE email = $1;",
        )
        .bind(email.to_lowercase())
        .fetch_optional(&self.pool)
        .await?;

        Ok(admin)
    }

    #[instrument(skip(self))]
    pub(crate) async fn customer(&self, id: Uuid) -> Result<Option<CustomerDetail>, Error> {
        let customer = sqlx::query_as::<_, CustomerDetail>(
            "SELECT
                profiles.id,
                profiles.id AS customer_id,
                profiles.first_name,
                profiles.last_name,
                profiles.username,
                users.email,
                profiles.phone,
                COALESCE(profiles.status, 'active') AS status,
                profiles.created_at AS registration_date,
                COALESCE(get_user_wallet_balance(profiles.id), 0)::float8 AS wallet_balance
            FROM
                profiles
            LEFT JOIN
                users ON users.id = profiles.id
            WHERE
                profiles.id = $1;",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(customer)
    }

    #[instrument(skip(self))]
    pub(crate) async fn set_customer_status(
        &self,
        id: Uuid,
        status: &str,
    ) -> Result<Option<StatusChange>, Error> {
        let change = sqlx::query_as::<_, StatusChange>(
            "UPDATE profiles SET status = $1, updated_at = now() WHERE id = $2
            RETURNING id, status, updated_at;",
        )
        .bind(status)
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(change)
    }
}
