use std::time::Duration;

use clap::{Parser, Subcommand};
use credit_pay::{
    run_checkout, Callback, CheckoutOutcome, CompletionTrigger, CreditPayError, GatewayClient,
    GatewayConfig, GatewayReply, PaymentInitiated, PaymentRequest, SecretString, Signer,
    DEFAULT_BASE_URL, DEFAULT_TIMEOUT_SECS,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

const DEFAULT_AMOUNT: i64 = 10;
const DEFAULT_DESCRIPTION: &str = "测试支付";
const DEFAULT_ORDER_ID: &str = "test_order_001";

#[derive(Parser, Debug)]
#[command(name = "credit-pay-client")]
#[command(about = "Initiate a credit gateway payment and query its status")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,

    /// Merchant token from the app page
    #[arg(long, env = "CREDIT_PAY_TOKEN", hide_env_values = true)]
    token: String,

    /// Gateway base URL
    #[arg(long, env = "CREDIT_PAY_BASE_URL", default_value = DEFAULT_BASE_URL)]
    base_url: String,

    /// Merchant app id (`client_id`); required for checkout
    #[arg(long, env = "CREDIT_PAY_PAYMENT_ID")]
    payment_id: Option<String>,

    /// HTTP request timeout in seconds
    #[arg(long, env = "CREDIT_PAY_TIMEOUT_SECS", default_value_t = DEFAULT_TIMEOUT_SECS)]
    timeout_secs: u64,

    /// Amount to charge, in whole credits
    #[arg(long, env = "CREDIT_PAY_AMOUNT", default_value_t = DEFAULT_AMOUNT)]
    amount: i64,

    /// Payment description shown to the payer
    #[arg(long, env = "CREDIT_PAY_DESCRIPTION", default_value = DEFAULT_DESCRIPTION)]
    description: String,

    /// Merchant order reference
    #[arg(long, env = "CREDIT_PAY_ORDER_ID", default_value = DEFAULT_ORDER_ID)]
    order_id: String,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Verify the signed redirect the gateway sends after payment
    VerifyCallback {
        /// Full callback URL, including its query string
        url: String,
    },
}

impl Cli {
    fn token(&self) -> SecretString {
        SecretString::from(self.token.clone())
    }

    fn gateway_config(&self) -> Result<GatewayConfig, CreditPayError> {
        let payment_id = self.payment_id.clone().ok_or_else(|| {
            CreditPayError::Config(
                "--payment-id or CREDIT_PAY_PAYMENT_ID is required for checkout".to_string(),
            )
        })?;
        Ok(GatewayConfig::new(&self.base_url, self.token(), payment_id)?
            .with_timeout(Duration::from_secs(self.timeout_secs)))
    }

    fn payment_request(&self) -> PaymentRequest {
        PaymentRequest::new(self.amount, self.description.as_str(), self.order_id.as_str())
    }
}

/// Shows the initiate reply, then waits for the operator to press Enter
/// after paying in the browser.
struct StdinTrigger;

impl CompletionTrigger for StdinTrigger {
    async fn wait_for_completion(
        &self,
        initiated: &GatewayReply<PaymentInitiated>,
    ) -> Result<(), CreditPayError> {
        print_json("initiate", &initiated.body)?;
        if let Some(url) = &initiated.data.payment_url {
            println!("Open the payment link in a browser and complete the payment:");
            println!("  {url}");
            println!();
        }
        println!("Press Enter once the payment is done to query its status...");

        tokio::task::spawn_blocking(|| {
            let mut line = String::new();
            std::io::stdin().read_line(&mut line).map(|_| ())
        })
        .await
        .map_err(|e| CreditPayError::Trigger(format!("stdin task failed: {e}")))??;

        println!();
        Ok(())
    }
}

fn render_json(value: &serde_json::Value) -> Result<String, CreditPayError> {
    Ok(serde_json::to_string_pretty(value)?)
}

fn print_json(label: &str, value: &serde_json::Value) -> Result<(), CreditPayError> {
    let rendered = render_json(value)?;
    println!("[{label}]");
    println!("{rendered}");
    println!();
    Ok(())
}

async fn checkout(cli: &Cli) -> Result<(), CreditPayError> {
    let client = GatewayClient::new(cli.gateway_config()?)?;
    let request = cli.payment_request();

    println!("{}", "=".repeat(50));
    println!("Merchant payment test against {}", client.config().base_url);
    println!("{}", "=".repeat(50));
    println!();

    match run_checkout(&client, &request, &StdinTrigger).await? {
        CheckoutOutcome::NoPaymentUrl(initiated) => {
            print_json("initiate", &initiated.body)?;
            println!("Payment was not initiated, check the token and payment id");
        }
        CheckoutOutcome::Queried { status, .. } => {
            print_json("query", &status.body)?;
        }
    }
    Ok(())
}

fn verify_callback(token: &SecretString, raw_url: &str) -> Result<Callback, CreditPayError> {
    let callback = Callback::parse(raw_url)?;
    callback.verify(&Signer::new(token))?;
    Ok(callback)
}

async fn run(cli: Cli) -> Result<(), CreditPayError> {
    match &cli.command {
        None => checkout(&cli).await,
        Some(Command::VerifyCallback { url }) => {
            let callback = verify_callback(&cli.token(), url)?;
            println!(
                "Callback OK: transaction {} for order {} is {} (amount {})",
                callback.transaction_id,
                callback.external_reference,
                callback.status,
                callback.amount
            );
            Ok(())
        }
    }
}

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();

    if let Err(e) = run(cli).await {
        tracing::error!("{e}");
        std::process::exit(1);
    }
}

#[cfg(test)]
mod tests {
    use clap::CommandFactory;
    use serde_json::json;

    use super::*;

    const CALLBACK_URL: &str = "https://shop.example.com/paid?transaction_id=txn_abc123\
        &external_reference=test_order_001&amount=10&platform_fee=0\
        &merchant_points=10&status=completed\
        &paid_at=2025-02-27T10%3A00%3A00%2B08%3A00\
        &signature=855fa2b5aae9a2df64ce2a7b63c031dff1eddf3bb14cb35a826207b40a38ccfb";

    fn cli(payment_id: Option<&str>) -> Cli {
        Cli {
            command: None,
            token: "tk_xxx".to_string(),
            base_url: DEFAULT_BASE_URL.to_string(),
            payment_id: payment_id.map(str::to_string),
            timeout_secs: 5,
            amount: DEFAULT_AMOUNT,
            description: DEFAULT_DESCRIPTION.to_string(),
            order_id: DEFAULT_ORDER_ID.to_string(),
        }
    }

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_verify_callback_parses_with_token_only() {
        let parsed = Cli::try_parse_from([
            "credit-pay-client",
            "--token",
            "tk_xxx",
            "verify-callback",
            CALLBACK_URL,
        ])
        .unwrap();
        assert!(matches!(
            parsed.command,
            Some(Command::VerifyCallback { ref url }) if url == CALLBACK_URL
        ));

        let callback = verify_callback(&parsed.token(), CALLBACK_URL).unwrap();
        assert_eq!(callback.transaction_id, "txn_abc123");
        assert_eq!(callback.status, "completed");
    }

    #[test]
    fn test_verify_callback_requires_url() {
        let result = Cli::try_parse_from(["credit-pay-client", "--token", "tk_xxx", "verify-callback"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_verify_callback_rejects_wrong_token() {
        let err = verify_callback(&SecretString::from("tk_other".to_string()), CALLBACK_URL)
            .unwrap_err();
        assert!(matches!(err, CreditPayError::SignatureMismatch));
    }

    #[test]
    fn test_payment_flags_override_defaults() {
        let parsed = Cli::try_parse_from([
            "credit-pay-client",
            "--token",
            "tk_xxx",
            "--payment-id",
            "pay_xxx",
            "--amount",
            "25",
            "--order-id",
            "order_42",
        ])
        .unwrap();
        assert!(parsed.command.is_none());
        let request = parsed.payment_request();
        assert_eq!(request.amount, 25);
        assert_eq!(request.order_id, "order_42");

        let config = parsed.gateway_config().unwrap();
        assert_eq!(config.payment_id, "pay_xxx");
    }

    #[test]
    fn test_non_numeric_amount_is_rejected() {
        let result =
            Cli::try_parse_from(["credit-pay-client", "--token", "tk_xxx", "--amount", "ten"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_checkout_config_requires_payment_id() {
        let err = cli(None).gateway_config().unwrap_err();
        assert!(matches!(err, CreditPayError::Config(ref m) if m.contains("payment-id")));
        assert_eq!(
            cli(Some("pay_xxx")).gateway_config().unwrap().timeout,
            Duration::from_secs(5)
        );
    }

    #[test]
    fn test_render_json_keeps_gateway_fields() {
        let body = json!({
            "transaction_id": "txn_abc123",
            "status": "on_hold",
            "risk_flag": true
        });
        let rendered = render_json(&body).unwrap();
        assert!(rendered.contains("\"on_hold\""));
        assert!(rendered.contains("\"risk_flag\": true"));
        assert!(!rendered.contains("expired"));
    }
}
