use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Direction {
    Credit,
    Debit,
}

impl Direction {
    pub(crate) fn as_str(&self) -> &'static str {
        match self {
            Direction::Credit => "credit",
            Direction::Debit => "debit",
        }
    }
}

/// A single wallet ledger entry before its running balance is known.
#[derive(Clone, Debug)]
pub(crate) struct Posting {
    pub(crate) user_id: Uuid,
    pub(crate) amount: f64,
    pub(crate) direction: Direction,
    pub(crate) transaction_type: &'static str,
    pub(crate) reference: String,
    pub(crate) description: String,
}

impl Posting {
    /// Balance after applying this posting to `balance`.
    pub(crate) fn apply(&self, balance: f64) -> f64 {
        match self.direction {
            Direction::Credit => balance + self.amount.abs(),
            Direction::Debit => balance - self.amount.abs(),
        }
    }
}

#[derive(Clone, Debug, Serialize, sqlx::FromRow)]
pub(crate) struct DedicatedAccount {
    pub(crate) account_number: String,
    pub(crate) bank_name: String,
    pub(crate) account_name: String,
    pub(crate) paystack_customer_code: Option<String>,
    pub(crate) paystack_customer_id: Option<String>,
}

#[derive(Debug, Serialize)]
pub(crate) struct FundingAccount {
    pub(crate) account_number: String,
    pub(crate) bank_name: String,
    pub(crate) account_name: String,
    pub(crate) message: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) customer_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) customer_code: Option<String>,
}

/// The subset of a Paystack customer record shown by `check-customers`.
#[derive(Debug, Default, Deserialize, Serialize)]
pub(crate) struct CustomerSummary {
    #[serde(default)]
    pub(crate) id: Value,
    #[serde(default)]
    pub(crate) customer_code: Option<String>,
    #[serde(default)]
    pub(crate) email: Option<String>,
    #[serde(default)]
    pub(crate) first_name: Option<String>,
    #[serde(default)]
    pub(crate) last_name: Option<String>,
    #[serde(default)]
    pub(crate) phone: Option<String>,
    #[serde(default)]
    pub(crate) risk_action: Option<String>,
    #[serde(default)]
    pub(crate) international_format_phone: Option<String>,
    #[serde(default)]
    pub(crate) metadata: Value,
    #[serde(default, rename(deserialize = "createdAt"))]
    pub(crate) created: Option<String>,
}

#[derive(Debug, Serialize)]
pub(crate) struct CustomerList {
    pub(crate) total: usize,
    pub(crate) customers: Vec<CustomerSummary>,
    pub(crate) raw_response: Vec<Value>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum BillStatus {
    Pending,
    Completed,
    Failed,
}

impl BillStatus {
    pub(crate) fn as_str(&self) -> &'static str {
        match self {
            BillStatus::Pending => "pending",
            BillStatus::Completed => "completed",
            BillStatus::Failed => "failed",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn posting(direction: Direction, amount: f64) -> Posting {
        Posting {
            user_id: Uuid::nil(),
            amount,
            direction,
            transaction_type: "wallet_funding",
            reference: "ref".into(),
            description: String::new(),
        }
    }

    #[test]
    fn credits_and_debits_move_the_balance() {
        assert_eq!(posting(Direction::Credit, 250.0).apply(100.0), 350.0);
        assert_eq!(posting(Direction::Debit, 40.0).apply(100.0), 60.0);
    }

    #[test]
    fn customer_summary_renames_created_at() {
        let summary: CustomerSummary = serde_json::from_value(serde_json::json!({
            "id": 7,
            "customer_code": "CUS_x",
            "email": "ada@example.com",
            "createdAt": "2024-03-01T00:00:00.000Z",
            "integration": 1
        }))
        .unwrap();

        let rendered = serde_json::to_value(&summary).unwrap();
        assert_eq!(rendered["created"], "2024-03-01T00:00:00.000Z");
        assert_eq!(rendered["id"], 7);
        assert!(rendered.get("integration").is_none());
    }

    #[test]
    fn amounts_are_taken_as_magnitudes() {
        assert_eq!(posting(Direction::Credit, -25.0).apply(0.0), 25.0);
        assert_eq!(posting(Direction::Debit, -25.0).apply(100.0), 75.0);
    }
}
