use std::time::Duration;

use secrecy::SecretString;
use url::Url;

use crate::constants::{
    DEFAULT_BASE_URL, DEFAULT_TIMEOUT_SECS, ENV_BASE_URL, ENV_PAYMENT_ID, ENV_TIMEOUT_SECS,
    ENV_TOKEN,
};
use crate::error::CreditPayError;

/// Connection settings for one merchant app on the gateway.
#[derive(Debug, Clone)]
pub struct GatewayConfig {
    pub base_url: Url,
    /// Merchant token copied from the app page. Only its SHA-256 is used as key.
    pub token: SecretString,
    /// The app's `client_id`, used in both endpoint paths.
    pub payment_id: String,
    pub timeout: Duration,
}

impl GatewayConfig {
    pub fn new(
        base_url: &str,
        token: SecretString,
        payment_id: impl Into<String>,
    ) -> Result<Self, CreditPayError> {
        let base_url = Url::parse(base_url)
            .map_err(|e| CreditPayError::Config(format!("invalid base url `{base_url}`: {e}")))?;
        if !matches!(base_url.scheme(), "http" | "https") {
            return Err(CreditPayError::Config(format!(
                "base url must be http(s), got `{base_url}`"
            )));
        }

        let payment_id = payment_id.into();
        if payment_id.trim().is_empty() {
            return Err(CreditPayError::Config("payment id is empty".to_string()));
        }
        if payment_id.contains(['/', '?', '#']) {
            return Err(CreditPayError::Config(format!(
                "payment id `{payment_id}` contains URL delimiters"
            )));
        }

        Ok(Self {
            base_url,
            token,
            payment_id,
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        })
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Load from `CREDIT_PAY_*` environment variables.
    pub fn from_env() -> Result<Self, CreditPayError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Load using an arbitrary variable lookup. Empty values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, CreditPayError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        let base_url = get(ENV_BASE_URL).unwrap_or_else(|| DEFAULT_BASE_URL.to_string());
        let token = get(ENV_TOKEN)
            .ok_or_else(|| CreditPayError::Config(format!("{ENV_TOKEN} is required")))?;
        let payment_id = get(ENV_PAYMENT_ID)
            .ok_or_else(|| CreditPayError::Config(format!("{ENV_PAYMENT_ID} is required")))?;

        let mut config = Self::new(&base_url, SecretString::from(token), payment_id)?;

        if let Some(raw) = get(ENV_TIMEOUT_SECS) {
            let secs: u64 = raw.trim().parse().map_err(|e| {
                CreditPayError::Config(format!("invalid {ENV_TIMEOUT_SECS} `{raw}`: {e}"))
            })?;
            config = config.with_timeout(Duration::from_secs(secs));
        }

        Ok(config)
    }

    /// Join an endpoint path onto the base URL, keeping any base path prefix.
    pub fn endpoint(&self, path: &str) -> String {
        format!(
            "{}{}",
            self.base_url.as_str().trim_end_matches('/'),
            path
        )
    }
}
