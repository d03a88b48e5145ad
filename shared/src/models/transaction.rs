//! Ledger Transaction Model

use serde::{Deserialize, Serialize};

use super::member::Subscription;
use super::plan::PlanId;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
#[cfg_attr(feature = "db", derive(sqlx::Type))]
#[cfg_attr(feature = "db", sqlx(rename_all = "lowercase"))]
pub enum TransactionType {
    Purchase,
    Refund,
    Adjustment,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[cfg_attr(feature = "db", derive(sqlx::Type))]
#[cfg_attr(feature = "db", sqlx(rename_all = "snake_case"))]
pub enum PaymentMethod {
    CreditCard,
    DebitCard,
    Paypal,
    Mock,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
#[cfg_attr(feature = "db", derive(sqlx::Type))]
#[cfg_attr(feature = "db", sqlx(rename_all = "lowercase"))]
pub enum PaymentStatus {
    Pending,
    Completed,
    Failed,
    Refunded,
}

/// Immutable ledger entry
///
/// `tokens` is signed: positive for grants, negative for deductions.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct LedgerEntry {
    pub id: i64,
    pub member_id: i64,
    #[serde(rename = "type")]
    pub kind: TransactionType,
    pub plan: Option<PlanId>,
    /// Stored in cents, serialized as a two-place decimal
    #[serde(rename = "amount", with = "super::money")]
    pub amount_cents: i64,
    pub tokens: i64,
    pub payment_method: PaymentMethod,
    pub payment_status: PaymentStatus,
    /// UUIDv4, unique
    pub transaction_id: String,
    pub description: String,
    pub balance_after: i64,
    pub created_at: i64,
}

/// Result of a successful plan purchase
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PurchaseReceipt {
    pub transaction: LedgerEntry,
    pub tokens: i64,
    pub subscription: Subscription,
}

/// Admin balance adjustment request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenAdjustment {
    pub delta: i64,
    /// `balance_version` the caller last observed
    pub expected_version: i64,
    pub reason: String,
}

/// Ledger vs. balance cross-check for one member
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerReconciliation {
    pub member_id: i64,
    /// Sum of completed ledger token deltas
    pub ledger_tokens: i64,
    /// Tokens consumed by visits
    pub visit_tokens: i64,
    pub expected_balance: i64,
    pub actual_balance: i64,
    pub consistent: bool,
}

impl LedgerReconciliation {
    pub fn new(member_id: i64, ledger_tokens: i64, visit_tokens: i64, actual_balance: i64) -> Self {
        let expected_balance = ledger_tokens - visit_tokens;
        Self {
            member_id,
            ledger_tokens,
            visit_tokens,
            expected_balance,
            actual_balance,
            consistent: expected_balance == actual_balance,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ledger_entry_wire_shape() {
        let entry = LedgerEntry {
            id: 1,
            member_id: 2,
            kind: TransactionType::Purchase,
            plan: Some(PlanId::Monthly),
            amount_cents: 9999,
            tokens: 30,
            payment_method: PaymentMethod::Mock,
            payment_status: PaymentStatus::Completed,
            transaction_id: "tx".into(),
            description: "Monthly Pass subscription purchase".into(),
            balance_after: 30,
            created_at: 0,
        };
        let json = serde_json::to_value(&entry).unwrap();
        assert_eq!(json["type"], "purchase");
        assert_eq!(json["amount"], serde_json::json!(99.99));
        assert_eq!(json["payment_method"], "mock");
        assert_eq!(json["plan"], "monthly");

        let back: LedgerEntry = serde_json::from_value(json).unwrap();
        assert_eq!(back.amount_cents, 9999);
    }

    #[test]
    fn reconciliation_flags_drift() {
        assert!(LedgerReconciliation::new(1, 30, 2, 28).consistent);
        let drift = LedgerReconciliation::new(1, 30, 2, 29);
        assert!(!drift.consistent);
        assert_eq!(drift.expected_balance, 28);
    }
}
