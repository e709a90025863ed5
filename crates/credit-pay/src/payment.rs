use serde::{Deserialize, Serialize};

use crate::constants::MAX_DESCRIPTION_CHARS;
use crate::error::CreditPayError;
use crate::params::SignParams;

/// A merchant's request to charge a payer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentRequest {
    /// Whole credit units. The gateway truncates anything fractional.
    pub amount: i64,
    pub description: String,
    /// Merchant-side order reference. The gateway is idempotent on it.
    pub order_id: String,
}

impl PaymentRequest {
    pub fn new(amount: i64, description: impl Into<String>, order_id: impl Into<String>) -> Self {
        Self {
            amount,
            description: description.into(),
            order_id: order_id.into(),
        }
    }

    /// Cap the description at its stored length and check the same
    /// preconditions the gateway enforces, in the gateway's order, so the
    /// signature covers exactly what the gateway will verify.
    pub fn normalized(&self) -> Result<Self, CreditPayError> {
        let description: String = self.description.chars().take(MAX_DESCRIPTION_CHARS).collect();

        if self.amount <= 0 {
            return Err(CreditPayError::InvalidRequest(format!(
                "amount must be positive, got {}",
                self.amount
            )));
        }
        if self.order_id.trim().is_empty() {
            return Err(CreditPayError::InvalidRequest(
                "order_id is required".to_string(),
            ));
        }
        if description.trim().is_empty() {
            return Err(CreditPayError::InvalidRequest(
                "description is required".to_string(),
            ));
        }

        Ok(Self {
            amount: self.amount,
            description,
            order_id: self.order_id.clone(),
        })
    }

    /// The signed field set: `amount`, `description`, `order_id`.
    pub fn sign_params(&self) -> SignParams {
        SignParams::new()
            .with("amount", self.amount)
            .with("description", self.description.as_str())
            .with("order_id", self.order_id.as_str())
    }
}

/// The signed field set of a status query: `transaction_id` only.
pub fn query_params(transaction_id: &str) -> SignParams {
    SignParams::new().with("transaction_id", transaction_id)
}
