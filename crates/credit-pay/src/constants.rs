/// Default gateway base URL.
pub const DEFAULT_BASE_URL: &str = "https://sparkloc.com";

/// Form field carrying the request signature. Never part of the signed params.
pub const SIGNATURE_FIELD: &str = "signature";

/// Default HTTP request timeout, in seconds.
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// The gateway keeps at most this many characters of a payment description.
pub const MAX_DESCRIPTION_CHARS: usize = 500;

/// Environment variable names read by [`crate::GatewayConfig::from_env`].
pub const ENV_BASE_URL: &str = "CREDIT_PAY_BASE_URL";
pub const ENV_TOKEN: &str = "CREDIT_PAY_TOKEN";
pub const ENV_PAYMENT_ID: &str = "CREDIT_PAY_PAYMENT_ID";
pub const ENV_TIMEOUT_SECS: &str = "CREDIT_PAY_TIMEOUT_SECS";

/// Path of the payment initiation endpoint for a merchant app.
pub fn process_path(payment_id: &str) -> String {
    format!("/credit/payment/pay/{payment_id}/process.json")
}

/// Path of the transaction status endpoint for a merchant app.
pub fn query_path(payment_id: &str) -> String {
    format!("/credit/payment/query/{payment_id}.json")
}
