//! Two-phase checkout: initiate, wait for the payer, query.
//!
//! The wait is an external signal supplied by the caller through
//! [`CompletionTrigger`], so the library never blocks on a terminal or any
//! other I/O of its own.

use std::future::Future;

use crate::error::CreditPayError;
use crate::http_client::GatewayClient;
use crate::payment::PaymentRequest;
use crate::response::{GatewayReply, PaymentInitiated, TransactionStatus};

/// Resolves once the payer has finished (or abandoned) the payment page.
pub trait CompletionTrigger: Send + Sync {
    /// Wait for the out-of-band completion of `initiated`.
    ///
    /// Called as soon as the gateway accepts the payment, before any query.
    /// Returning an error aborts the checkout.
    fn wait_for_completion(
        &self,
        initiated: &GatewayReply<PaymentInitiated>,
    ) -> impl Future<Output = Result<(), CreditPayError>> + Send;
}

/// How a checkout ended. Both replies keep the gateway's raw JSON body.
#[derive(Debug, Clone, PartialEq)]
pub enum CheckoutOutcome {
    /// The gateway returned no `payment_url`; nothing to wait for or query.
    NoPaymentUrl(GatewayReply<PaymentInitiated>),
    /// The payer was sent to the payment page and the transaction was queried.
    Queried {
        initiated: GatewayReply<PaymentInitiated>,
        status: GatewayReply<TransactionStatus>,
    },
}

impl CheckoutOutcome {
    pub fn initiated(&self) -> &PaymentInitiated {
        match self {
            Self::NoPaymentUrl(initiated) | Self::Queried { initiated, .. } => &initiated.data,
        }
    }

    pub fn status(&self) -> Option<&TransactionStatus> {
        match self {
            Self::NoPaymentUrl(_) => None,
            Self::Queried { status, .. } => Some(&status.data),
        }
    }
}

/// Run the full merchant checkout sequence.
pub async fn run_checkout<T: CompletionTrigger>(
    client: &GatewayClient,
    request: &PaymentRequest,
    trigger: &T,
) -> Result<CheckoutOutcome, CreditPayError> {
    let initiated = client.initiate_reply(request).await?;

    if initiated.data.payment_url.is_none() {
        tracing::warn!(
            transaction_id = %initiated.data.transaction_id,
            "gateway returned no payment_url, skipping status query"
        );
        return Ok(CheckoutOutcome::NoPaymentUrl(initiated));
    }

    trigger.wait_for_completion(&initiated).await?;

    let status = client.query_reply(&initiated.data.transaction_id).await?;
    Ok(CheckoutOutcome::Queried { initiated, status })
}
