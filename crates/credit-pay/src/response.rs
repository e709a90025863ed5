use std::fmt;

use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value;

/// Lifecycle state of a gateway transaction.
///
/// Serialized as the gateway's lowercase string. States this client does not
/// know are kept verbatim in [`TransactionState::Unknown`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransactionState {
    Pending,
    Processing,
    Completed,
    Failed,
    Cancelled,
    Refunded,
    Expired,
    Unknown(String),
}

impl TransactionState {
    pub fn as_str(&self) -> &str {
        match self {
            Self::Pending => "pending",
            Self::Processing => "processing",
            Self::Completed => "completed",
            Self::Failed => "failed",
            Self::Cancelled => "cancelled",
            Self::Refunded => "refunded",
            Self::Expired => "expired",
            Self::Unknown(raw) => raw,
        }
    }

    /// No further transitions are expected.
    pub fn is_final(&self) -> bool {
        matches!(
            self,
            Self::Completed | Self::Failed | Self::Cancelled | Self::Refunded | Self::Expired
        )
    }
}

impl From<&str> for TransactionState {
    fn from(s: &str) -> Self {
        match s {
            "pending" => Self::Pending,
            "processing" => Self::Processing,
            "completed" => Self::Completed,
            "failed" => Self::Failed,
            "cancelled" => Self::Cancelled,
            "refunded" => Self::Refunded,
            "expired" => Self::Expired,
            other => Self::Unknown(other.to_string()),
        }
    }
}

impl fmt::Display for TransactionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for TransactionState {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for TransactionState {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Ok(Self::from(raw.as_str()))
    }
}

/// A decoded gateway response together with the JSON body it came from.
#[derive(Debug, Clone, PartialEq)]
pub struct GatewayReply<T> {
    pub data: T,
    /// The body exactly as the gateway sent it, for display and auditing.
    pub body: Value,
}

/// Response from the payment initiation endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentInitiated {
    pub transaction_id: String,
    /// Where the payer completes the payment. Absent when the gateway did not
    /// open a redirect flow.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payment_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<TransactionState>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub amount: Option<i64>,
}

/// Response from the transaction query endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionStatus {
    pub transaction_id: String,
    pub status: TransactionState,
    #[serde(default)]
    pub amount: Option<i64>,
    #[serde(default)]
    pub platform_fee: Option<i64>,
    #[serde(default)]
    pub merchant_points: Option<i64>,
    #[serde(default)]
    pub description: Option<String>,
    /// The merchant's `order_id`.
    #[serde(default)]
    pub external_reference: Option<String>,
    #[serde(default)]
    pub created_at: Option<DateTime<FixedOffset>>,
    #[serde(default)]
    pub updated_at: Option<DateTime<FixedOffset>>,
    #[serde(default)]
    pub paid_at: Option<DateTime<FixedOffset>>,
    #[serde(default)]
    pub expires_at: Option<DateTime<FixedOffset>>,
    /// The gateway's own expiry flag; `None` when the body omitted it.
    #[serde(default)]
    pub expired: Option<bool>,
    #[serde(default)]
    pub error_message: Option<String>,
}

impl TransactionStatus {
    pub fn is_paid(&self) -> bool {
        self.status == TransactionState::Completed
    }
}

/// Error body the gateway returns with non-2xx statuses.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GatewayErrorBody {
    pub error: String,
}
