use regex::Regex;
use sqlx::postgres::PgRow;
use sqlx::{PgPool, Row};
use tracing::instrument;
use uuid::Uuid;

use crate::core::error::{ConfigError, Error};
use crate::types::user::{Credentials, UserProfile};

pub(crate) const MIN_PASSWORD_LENGTH: usize = 6;

const BCRYPT_COST: u32 = 12;

#[derive(Debug)]
pub(crate) struct NewUser<'a> {
    pub(crate) first_name: &'a str,
    pub(crate) last_name: &'a str,
    pub(crate) username: &'a str,
    pub(crate) email: &'a str,
    pub(crate) phone: Option<&'a str>,
    pub(crate) password: &'a str,
}

#[derive(Clone)]
pub(crate) struct UserController {
    pool: PgPool,
    email_pattern: Regex,
    phone_pattern: Regex,
}

impl std::fmt::Debug for UserController {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UserController")
            .field("email_pattern", &self.email_pattern.as_str())
            .field("phone_pattern", &self.phone_pattern.as_str())
            .finish()
    }
}

impl UserController {
    pub(crate) fn new(pool: PgPool) -> Result<Self, ConfigError> {
        Ok(Self {
            pool,
            email_pattern: Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$")?,
            phone_pattern: Regex::new(r"^\+?[\d\s\-\(\)]{10,}$")?,
        })
    }

    pub(crate) fn validate_email(&self, email: &str) -> Result<(), Error> {
        if self.email_pattern.is_match(email) {
            Ok(())
        } else {
            Err(Error::bad_request("Invalid email format"))
        }
    }

    pub(crate) fn validate_phone(&self, phone: &str) -> Result<(), Error> {
        if self.phone_pattern.is_match(phone) {
            Ok(())
        } else {
            Err(Error::bad_request("Invalid phone format"))
        }
    }

    pub(crate) fn validate_password(&self, password: &str) -> Result<(), Error> {
        if password.chars().count() < MIN_PASSWORD_LENGTH {
            return Err(Error::bad_request(format!(
                "Password must be at least {MIN_PASSWORD_LENGTH} characters long"
            )));
        }

        Ok(())
    }

    /// Creates the credentials row, the profile and the zero opening balance
    /// in a single transaction.
    #[instrument(skip_all)]
    pub(crate) async fn register(&self, user: NewUser<'_>) -> Result<UserProfile, Error> {
        self.validate_email(user.email)?;
        self.validate_password(user.password)?;
        if let Some(phone) = user.phone {
            self.validate_phone(phone)?;
        }

        let email = user.email.to_lowercase();

        if self.username_exists(user.username).await? {
            return Err(Error::bad_request("Username already exists"));
        }

        if self.email_exists(&email).await? {
            return Err(Error::bad_request("Email already exists"));
        }

        let password_hash = hash(user.password)?;

        let mut tx = self.pool.begin().await?;

        let id: Uuid = match sqlx::query(
            "INSERT INTO users (email, password_hash) VALUES ($1, $2) RETURNING id;",
        )
        .bind(&email)
        .bind(&password_hash)
        .map(|row: PgRow| row.get("id"))
        .fetch_one(&mut *tx)
        .await
        {
            Ok(id) => id,
            Err(sqlx::Error::Database(db_err)) if db_err.is_unique_violation() => {
                return Err(Error::bad_request("Email already exists"));
            }
            Err(e) => return Err(Error::Sql(e)),
        };

        match sqlx::query(
            "INSERT INTO profiles (id, first_name, last_name, username, phone)
            VALUES ($1, $2, $3, $4, $5);",
        )
        .bind(id)
        .bind(user.first_name)
        .bind(user.last_name)
        .bind(user.username)
        .bind(user.phone)
        .execute(&mut *tx)
        .await
        {
            Ok(_) => {}
            Err(sqlx::Error::Database(db_err)) if db_err.is_unique_violation() => {
                return Err(Error::bad_request("Username already exists"));
            }
            Err(e) => return Err(Error::Sql(e)),
        }

        sqlx::query(
            "INSERT INTO wallet_transactions
                (user_id, amount, type, transaction_type, balance_after, reference_id, description)
            VALUES ($1, 0, 'credit', 'initial_balance', 0, $2, 'Initial wallet balance');",
        )
        .bind(id)
        .bind(format!("INIT_{id}"))
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;

        Ok(UserProfile {
            id,
            first_name: Some(user.first_name.to_owned()),
            last_name: Some(user.last_name.to_owned()),
            username: Some(user.username.to_owned()),
            email,
            phone: user.phone.map(str::to_owned),
            wallet_balance: 0.0,
        })
    }

    async fn username_exists(&self, username: &str) -> Result<bool, Error> {
        let exists = sqlx::query("SELECT EXISTS (SELECT 1 FROM profiles WHERE username = $1);")
            .bind(username)
            .map(|row: PgRow| row.get::<bool, _>(0))
            .fetch_one(&self.pool)
            .await?;

        Ok(exists)
    }

    async fn email_exists(&self, email: &str) -> Result<bool, Error> {
        let exists = sqlx::query("SELECT EXISTS (SELECT 1 FROM users WHERE email = $1);")
            .bind(email)
            .map(|row: PgRow| row.get::<bool, _>(0))
            .fetch_one(&self.pool)
            .await?;

        Ok(exists)
    }

    #[instrument(skip(self))]
    pub(crate) async fn credentials_by_email(
        &self,
        email: &str,
    ) -> Result<Option<Credentials>, Error> {
        let credentials = sqlx::query_as::<_, Credentials>(
            "SELECT id, password_hash FROM users WHERE email = $1;",
        )
        .bind(email.to_lowercase())
        .fetch_optional(&self.pool)
        .await?;

        Ok(credentials)
    }

    #[instrument(skip(self))]
    pub(crate) async fn credentials_by_id(&self, id: Uuid) -> Result<Option<Credentials>, Error> {
        let credentials = sqlx::query_as::<_, Credentials>(
            "SELECT id, password_hash FROM users WHERE id = $1;",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(credentials)
    }

    /// Credentials for `email` when `password` matches, `None` otherwise.
    #[instrument(skip_all)]
    pub(crate) async fn login(
        &self,
        email: &str,
        password: &str,
    ) -> Result<Option<Credentials>, Error> {
        let credentials = match self.credentials_by_email(email).await? {
            Some(credentials) => credentials,
            None => return Ok(None),
        };

        if !verify_password(password, &credentials.password_hash)? {
            return Ok(None);
        }

        Ok(Some(credentials))
    }

    #[instrument(skip(self))]
    pub(crate) async fn profile(&self, id: Uuid) -> Result<Option<UserProfile>, Error> {
        let profile = sqlx::query_as::<_, UserProfile>(
            "SELECT
                users.id,
                profiles.first_name,
                profiles.last_name,
                profiles.username,
                users.email,
                profiles.phone,
                COALESCE(get_user_wallet_balance(users.id), 0)::float8 AS wallet_balance
            FROM
                users
            JOIN
                profiles ON profiles.id = users.id
            WHERE
                users.id = $1;",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(profile)
    }

    #[instrument(skip_all)]
    pub(crate) async fn update_password(&self, id: Uuid, new_password: &str) -> Result<(), Error> {
        let password_hash = hash(new_password)?;

        let result = sqlx::query("UPDATE users SET password_hash = $1 WHERE id = $2;")
            .bind(password_hash)
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(Error::not_found("User not found"));
        }

        Ok(())
    }

    /// Removes sessions, wallet history, profile and credentials together.
    #[instrument(skip(self))]
    pub(crate) async fn delete(&self, id: Uuid) -> Result<(), Error> {
        let mut tx = self.pool.begin().await?;

        for statement in [
            "DELETE FROM active_sessions WHERE user_id = $1;",
            "DELETE FROM wallet_transactions WHERE user_id = $1;",
            "DELETE FROM profiles WHERE id = $1;",
            "DELETE FROM users WHERE id = $1;",
        ] {
            sqlx::query(statement).bind(id).execute(&mut *tx).await?;
        }

        tx.commit().await?;

        Ok(())
    }
}

pub(crate) fn verify_password(password: &str, password_hash: &str) -> Result<bool, Error> {
    Ok(bcrypt::verify(password, password_hash)?)
}

fn hash(value: &str) -> Result<String, Error> {
    bcrypt::hash(value, BCRYPT_COST).map_err(Error::Bcrypt)
}
