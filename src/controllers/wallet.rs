use sqlx::postgres::PgRow;
use sqlx::{PgPool, Row};
use tracing::instrument;
use uuid::Uuid;

use crate::core::error::Error;
use crate::types::wallet::{BillStatus, DedicatedAccount, Direction, Posting};

#[derive(Clone, Debug)]
pub(crate) struct WalletController {
    pool: PgPool,
}

impl WalletController {
    pub(crate) fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    #[instrument(skip(self), fields(user_id = %posting.user_id, reference = %posting.reference))]
    pub(crate) async fn post(&self, posting: &Posting) -> Result<Option<f64>, Error> {
        let mut tx = self.pool.begin().await?;

        sqlx::query("SELECT id FROM profiles WHERE id = $1 FOR UPDATE;")
            .bind(posting.user_id)
            .fetch_optional(&mut *tx)
            .await?
            .ok_or_else(|| Error::not_found("User profile not found"))?;

        let balance: f64 =
            sqlx::query("SELECT COALESCE(get_user_wallet_balance($1), 0)::float8 AS balance;")
                .bind(posting.user_id)
                .map(|row: PgRow| row.get("balance"))
                .fetch_one(&mut *tx)
                .await?;

        if posting.direction == Direction::Debit && balance < posting.amount.abs() {
            return Err(Error::bad_request("Insufficient wallet balance"));
        }

        let balance_after = posting.apply(balance);

        match sqlx::query(
            "INSERT INTO wallet_transactions
                (user_id, amount, type, transaction_type, balance_after, reference_id, description)
            VALUES ($1, $2::float8, $3, $4, $5::float8, $6, $7);",
        )
        .bind(posting.user_id)
        .bind(posting.amount.abs())
        .bind(posting.direction.as_str())
        .bind(posting.transaction_type)
        .bind(balance_after)
        .bind(&posting.reference)
        .bind(&posting.description)
        .execute(&mut *tx)
        .await
        {
            Ok(_) => {}
            Err(sqlx::Error::Database(db_err)) if db_err.is_unique_violation() => {
                tracing::info!("Wallet reference {} already posted", posting.reference);
                return Ok(None);
            }
            Err(e) => return Err(Error::Sql(e)),
        }

        tx.commit().await?;

        Ok(Some(balance_after))
    }

    #[instrument(skip(self))]
    pub(crate) async fn active_account(
        &self,
        user_id: Uuid,
    ) -> Result<Option<DedicatedAccount>, Error> {
        let account = sqlx::query_as::<_, DedicatedAccount>(
            "SELECT
                account_number,
                bank_name,
                account_name,
                paystack_customer_code,
                paystack_customer_id
            FROM
                paystack_dedicated_accounts
            WHERE
                user_id = $1 AND is_active
            ORDER BY created_at DESC
            LIMIT 1;",
        )
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(account)
    }

    #[instrument(skip(self, account), fields(account_number = %account.account_number))]
    pub(crate) async fn store_account(
        &self,
        user_id: Uuid,
        account: &DedicatedAccount,
    ) -> Result<(), Error> {
        sqlx::query(
            "INSERT INTO paystack_dedicated_accounts
                (user_id, account_number, bank_name, account_name, paystack_customer_code, paystack_customer_id, is_active)
            VALUES ($1, $2, $3, $4, $5, $6, true);",
        )
        .bind(user_id)
        .bind(&account.account_number)
        .bind(&account.bank_name)
        .bind(&account.account_name)
        .bind(&account.paystack_customer_code)
        .bind(&account.paystack_customer_id)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Owner of an active dedicated account.
    #[instrument(skip(self))]
    pub(crate) async fn account_owner(&self, account_number: &str) -> Result<Option<Uuid>, Error> {
        let owner = sqlx::query(
            "SELECT user_id FROM paystack_dedicated_accounts WHERE account_number = $1 AND is_active;",
        )
        .bind(account_number)
        .map(|row: PgRow| row.get("user_id"))
        .fetch_optional(&self.pool)
        .await?;

        Ok(owner)
    }

    #[instrument(skip(self, description))]
    pub(crate) async fn create_bill_payment(
        &self,
        user_id: Uuid,
        transaction_id: &str,
        amount: f64,
        bill_type: &str,
        account_number: &str,
        description: &str,
    ) -> Result<(), Error> {
        sqlx::query(
            "INSERT INTO bill_payments
                (transaction_id, user_id, amount, bill_type, account_number, description, status)
            VALUES ($1, $2, $3::float8, $4, $5, $6, $7);",
        )
        .bind(transaction_id)
        .bind(user_id)
        .bind(amount)
        .bind(bill_type)
        .bind(account_number)
        .bind(description)
        .bind(BillStatus::Pending.as_str())
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    #[instrument(skip(self))]
    pub(crate) async fn set_bill_status(
        &self,
        transaction_id: &str,
        status: BillStatus,
    ) -> Result<(), Error> {
        sqlx::query(
            "UPDATE bill_payments SET status = $1, updated_at = now() WHERE transaction_id = $2;",
        )
        .bind(status.as_str())
        .bind(transaction_id)
        .execute(&self.pool)
        .await?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::state::{seed_user, wallet_balance};

    fn posting(user_id: Uuid, direction: Direction, amount: f64, reference: &str) -> Posting {
        Posting {
            user_id,
            amount,
            direction,
            transaction_type: "wallet_funding",
            reference: reference.to_owned(),
            description: format!("test posting {reference}"),
        }
    }

    #[sqlx::test(migrations = "./migrations")]
    async fn duplicate_references_are_posted_once(pool: PgPool) {
        let user = seed_user(&pool, "ada").await;
        let wallet = WalletController::new(pool.clone());

        let first = posting(user, Direction::Credit, 500.0, "PSK_1");
        assert_eq!(wallet.post(&first).await.unwrap(), Some(500.0));
        assert_eq!(wallet.post(&first).await.unwrap(), None);

        assert_eq!(wallet_balance(&pool, user).await, 500.0);
    }

    #[sqlx::test(migrations = "./migrations")]
    async fn debits_cannot_overdraw(pool: PgPool) {
        let user = seed_user(&pool, "ada").await;
        let wallet = WalletController::new(pool.clone());

        wallet
            .post(&posting(user, Direction::Credit, 100.0, "PSK_1"))
            .await
            .unwrap();

        let overdraw = wallet
            .post(&posting(user, Direction::Debit, 150.0, "TXN_1"))
            .await;
        assert!(matches!(
            overdraw,
            Err(Error::BadRequest(message)) if message == "Insufficient wallet balance"
        ));

        assert_eq!(
            wallet
                .post(&posting(user, Direction::Debit, 40.0, "TXN_2"))
                .await
                .unwrap(),
            Some(60.0)
        );
        assert_eq!(wallet_balance(&pool, user).await, 60.0);
    }

    #[sqlx::test(migrations = "./migrations")]
    async fn postings_need_a_profile(pool: PgPool) {
        let wallet = WalletController::new(pool);

        let missing = wallet
            .post(&posting(Uuid::new_v4(), Direction::Credit, 10.0, "PSK_1"))
            .await;
        assert!(matches!(missing, Err(Error::NotFound(_))));
    }

    #[sqlx::test(migrations = "./migrations")]
    async fn concurrent_postings_see_each_other(pool: PgPool) {
        let user = seed_user(&pool, "ada").await;
        let wallet = WalletController::new(pool.clone());

        let a = posting(user, Direction::Credit, 100.0, "PSK_A");
        let b = posting(user, Direction::Credit, 200.0, "PSK_B");
        let (a, b) = tokio::join!(wallet.post(&a), wallet.post(&b));
        let (a, b) = (a.unwrap().unwrap(), b.unwrap().unwrap());

        assert!((a, b) == (100.0, 300.0) || (a, b) == (300.0, 200.0), "{a} {b}");

        let balances: Vec<f64> = sqlx::query_scalar(
            "SELECT balance_after::float8 FROM wallet_transactions WHERE user_id = $1 ORDER BY balance_after;",
        )
        .bind(user)
        .fetch_all(&pool)
        .await
        .unwrap();
        assert_eq!(balances, vec![a.min(b), 300.0]);
        assert_eq!(wallet_balance(&pool, user).await, 300.0);
    }

    #[sqlx::test(migrations = "./migrations")]
    async fn bill_status_follows_the_debit(pool: PgPool) {
        let user = seed_user(&pool, "ada").await;
        let wallet = WalletController::new(pool.clone());

        wallet
            .create_bill_payment(user, "TXN_1", 25.0, "electricity", "12345", "")
            .await
            .unwrap();
        wallet
            .set_bill_status("TXN_1", BillStatus::Completed)
            .await
            .unwrap();

        let status: String =
            sqlx::query_scalar("SELECT status FROM bill_payments WHERE transaction_id = 'TXN_1';")
                .fetch_one(&pool)
                .await
                .unwrap();
        assert_eq!(status, "completed");
    }
}
