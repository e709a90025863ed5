//! Merchant client for the credit payment gateway.
//!
//! Every merchant request is authenticated with an HMAC-SHA256 signature:
//! the key is `hex(SHA256(token))`, the message is the request parameters
//! sorted by key and joined as `k1=v1&k2=v2`. The signature travels as one
//! more form field, `signature`.
//!
//! # Flow
//!
//! - [`GatewayClient::initiate`] — start a payment, get a `transaction_id`
//!   and the `payment_url` for the payer
//! - (the payer completes the payment out of band)
//! - [`GatewayClient::query`] — read the transaction status
//!
//! [`run_checkout`] strings these together with a caller-supplied
//! [`CompletionTrigger`] for the middle step. [`Callback`] verifies the
//! signed redirect the gateway sends to the merchant afterwards.
//!
//! # Quick example
//!
//! ```no_run
//! use credit_pay::{GatewayClient, GatewayConfig, PaymentRequest};
//!
//! # #[tokio::main]
//! # async fn main() -> Result<(), credit_pay::CreditPayError> {
//! let client = GatewayClient::new(GatewayConfig::from_env()?)?;
//!
//! let initiated = client
//!     .initiate(&PaymentRequest::new(10, "测试支付", "test_order_001"))
//!     .await?;
//! if let Some(url) = &initiated.payment_url {
//!     println!("pay at {url}");
//! }
//!
//! let status = client.query(&initiated.transaction_id).await?;
//! println!("{:?}", status.status);
//! # Ok(())
//! # }
//! ```

pub mod callback;
pub mod config;
pub mod constants;
pub mod error;
pub mod flow;
pub mod hmac;
pub mod params;
pub mod payment;
pub mod response;
pub mod signer;

pub mod http_client;

// Re-exports
pub use callback::Callback;
pub use config::GatewayConfig;
pub use constants::*;
pub use error::CreditPayError;
pub use flow::{run_checkout, CheckoutOutcome, CompletionTrigger};
pub use http_client::GatewayClient;
pub use params::{ParamValue, SignParams};
pub use payment::{query_params, PaymentRequest};
pub use response::*;
pub use signer::{sign, Signer};

pub use secrecy::SecretString;
