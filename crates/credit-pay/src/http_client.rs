use serde::de::DeserializeOwned;

use crate::config::GatewayConfig;
use crate::constants::{process_path, query_path};
use crate::error::CreditPayError;
use crate::params::SignParams;
use crate::payment::{query_params, PaymentRequest};
use crate::response::{GatewayErrorBody, GatewayReply, PaymentInitiated, TransactionStatus};
use crate::signer::Signer;

/// Merchant client for the gateway's payment API.
///
/// Wraps `reqwest::Client`. Every request body is the signed form produced
/// by [`Signer::signed_form`]; responses are decoded into typed structs and
/// gateway rejections surface as [`CreditPayError::Gateway`].
pub struct GatewayClient {
    http: reqwest::Client,
    config: GatewayConfig,
    signer: Signer,
}

impl GatewayClient {
    pub fn new(config: GatewayConfig) -> Result<Self, CreditPayError> {
        let http = reqwest::Client::builder()
            .timeout(config.timeout)
            .redirect(reqwest::redirect::Policy::none())
            .build()
            .map_err(|e| CreditPayError::Config(format!("failed to build HTTP client: {e}")))?;
        Ok(Self::with_http_client(config, http))
    }

    /// Create a client with a custom reqwest::Client.
    pub fn with_http_client(config: GatewayConfig, http: reqwest::Client) -> Self {
        let signer = Signer::new(&config.token);
        Self {
            http,
            config,
            signer,
        }
    }

    pub fn config(&self) -> &GatewayConfig {
        &self.config
    }

    pub fn signer(&self) -> &Signer {
        &self.signer
    }

    /// Start a payment. The response carries the `transaction_id` to query
    /// later and, for redirect flows, the `payment_url` to hand to the payer.
    pub async fn initiate(
        &self,
        request: &PaymentRequest,
    ) -> Result<PaymentInitiated, CreditPayError> {
        self.initiate_reply(request).await.map(|reply| reply.data)
    }

    /// Like [`GatewayClient::initiate`], keeping the raw JSON body.
    pub async fn initiate_reply(
        &self,
        request: &PaymentRequest,
    ) -> Result<GatewayReply<PaymentInitiated>, CreditPayError> {
        let request = request.normalized()?;
        let url = self.config.endpoint(&process_path(&self.config.payment_id));

        let reply: GatewayReply<PaymentInitiated> =
            self.post_signed(&url, &request.sign_params()).await?;
        tracing::info!(
            order_id = %request.order_id,
            transaction_id = %reply.data.transaction_id,
            has_payment_url = reply.data.payment_url.is_some(),
            "payment initiated"
        );
        Ok(reply)
    }

    /// Fetch the current state of a transaction.
    pub async fn query(&self, transaction_id: &str) -> Result<TransactionStatus, CreditPayError> {
        self.query_reply(transaction_id).await.map(|reply| reply.data)
    }

    /// Like [`GatewayClient::query`], keeping the raw JSON body.
    pub async fn query_reply(
        &self,
        transaction_id: &str,
    ) -> Result<GatewayReply<TransactionStatus>, CreditPayError> {
        if transaction_id.trim().is_empty() {
            return Err(CreditPayError::InvalidRequest(
                "transaction_id is required".to_string(),
            ));
        }
        let url = self.config.endpoint(&query_path(&self.config.payment_id));

        let reply: GatewayReply<TransactionStatus> =
            self.post_signed(&url, &query_params(transaction_id)).await?;
        tracing::info!(
            transaction_id = %reply.data.transaction_id,
            status = %reply.data.status,
            "transaction queried"
        );
        Ok(reply)
    }

    async fn post_signed<T: DeserializeOwned>(
        &self,
        url: &str,
        params: &SignParams,
    ) -> Result<GatewayReply<T>, CreditPayError> {
        params.check_unambiguous()?;
        let form = self.signer.signed_form(params);

        tracing::debug!(%url, fields = params.len(), "posting signed form");
        let resp = self
            .http
            .post(url)
            .form(&form)
            .send()
            .await
            .map_err(|e| CreditPayError::Http(format!("request to {url} failed: {e}")))?;

        let status = resp.status();
        let body = resp
            .text()
            .await
            .map_err(|e| CreditPayError::Http(format!("failed to read response body: {e}")))?;

        if !status.is_success() {
            let message = serde_json::from_str::<GatewayErrorBody>(&body)
                .map(|b| b.error)
                .unwrap_or(body);
            tracing::warn!(status = status.as_u16(), %message, "gateway rejected request");
            return Err(CreditPayError::Gateway {
                status: status.as_u16(),
                message,
            });
        }

        let decode_err = |e: serde_json::Error| CreditPayError::Decode(format!("{e} (body: {body})"));
        let value: serde_json::Value = serde_json::from_str(&body).map_err(decode_err)?;
        let data: T = serde_json::from_value(value.clone()).map_err(decode_err)?;
        Ok(GatewayReply { data, body: value })
    }
}
