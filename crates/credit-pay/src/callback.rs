//! Verification of the gateway's completion redirect.
//!
//! After a payer confirms, the gateway sends them to the merchant's
//! `callback_url` with the transaction fields and a `signature` in the query
//! string. The signature uses the same scheme as requests, so a merchant
//! checks it with the same [`Signer`].

use url::Url;

use crate::constants::SIGNATURE_FIELD;
use crate::error::CreditPayError;
use crate::params::SignParams;
use crate::signer::Signer;

const CALLBACK_FIELDS: [&str; 7] = [
    "transaction_id",
    "external_reference",
    "amount",
    "platform_fee",
    "merchant_points",
    "status",
    "paid_at",
];

/// Fields carried by a completion callback, kept as the exact strings that
/// were signed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Callback {
    pub transaction_id: String,
    /// The merchant's `order_id`.
    pub external_reference: String,
    pub amount: String,
    pub platform_fee: String,
    pub merchant_points: String,
    pub status: String,
    pub paid_at: String,
    pub signature: String,
}

impl Callback {
    pub fn from_url(url: &Url) -> Result<Self, CreditPayError> {
        let pairs: Vec<(String, String)> = url.query_pairs().into_owned().collect();
        let field = |name: &str| -> Result<String, CreditPayError> {
            pairs
                .iter()
                .find(|(k, _)| k == name)
                .map(|(_, v)| v.clone())
                .ok_or_else(|| CreditPayError::InvalidCallback(format!("missing `{name}`")))
        };

        Ok(Self {
            transaction_id: field("transaction_id")?,
            external_reference: field("external_reference")?,
            amount: field("amount")?,
            platform_fee: field("platform_fee")?,
            merchant_points: field("merchant_points")?,
            status: field("status")?,
            paid_at: field("paid_at")?,
            signature: field(SIGNATURE_FIELD)?,
        })
    }

    pub fn parse(raw: &str) -> Result<Self, CreditPayError> {
        let url = Url::parse(raw)
            .map_err(|e| CreditPayError::InvalidCallback(format!("invalid url: {e}")))?;
        Self::from_url(&url)
    }

    /// The signed field set, in canonical form.
    pub fn sign_params(&self) -> SignParams {
        let values = [
            &self.transaction_id,
            &self.external_reference,
            &self.amount,
            &self.platform_fee,
            &self.merchant_points,
            &self.status,
            &self.paid_at,
        ];
        CALLBACK_FIELDS
            .into_iter()
            .zip(values)
            .map(|(k, v)| (k, v.as_str()))
            .collect()
    }

    pub fn verify(&self, signer: &Signer) -> Result<(), CreditPayError> {
        if signer.verify(&self.sign_params(), &self.signature) {
            Ok(())
        } else {
            tracing::warn!(
                transaction_id = %self.transaction_id,
                "callback signature mismatch"
            );
            Err(CreditPayError::SignatureMismatch)
        }
    }

    /// Amount as an integer, if the field is numeric.
    pub fn amount_value(&self) -> Option<i64> {
        self.amount.parse().ok()
    }
}

#[cfg(test)]
mod tests {
    use secrecy::SecretString;

    use super::*;

    const CALLBACK_SIGNATURE: &str =
        "855fa2b5aae9a2df64ce2a7b63c031dff1eddf3bb14cb35a826207b40a38ccfb";

    fn signer() -> Signer {
        Signer::new(&SecretString::from("tk_xxx".to_string()))
    }

    fn callback_url(amount: &str, signature: &str) -> String {
        format!(
            "https://shop.example.com/paid?transaction_id=txn_abc123\
             &external_reference=test_order_001&amount={amount}&platform_fee=0\
             &merchant_points=10&status=completed\
             &paid_at=2025-02-27T10%3A00%3A00%2B08%3A00&signature={signature}"
        )
    }

    #[test]
    fn test_parse_and_verify() {
        let cb = Callback::parse(&callback_url("10", CALLBACK_SIGNATURE)).unwrap();
        assert_eq!(cb.paid_at, "2025-02-27T10:00:00+08:00");
        assert_eq!(cb.amount_value(), Some(10));
        assert!(cb.verify(&signer()).is_ok());
    }

    #[test]
    fn test_sign_params_canonical_string() {
        let cb = Callback::parse(&callback_url("10", CALLBACK_SIGNATURE)).unwrap();
        assert_eq!(
            cb.sign_params().canonical_string(),
            "amount=10&external_reference=test_order_001&merchant_points=10\
             &paid_at=2025-02-27T10:00:00+08:00&platform_fee=0&status=completed\
             &transaction_id=txn_abc123"
        );
    }

    #[test]
    fn test_tampered_amount_fails() {
        let cb = Callback::parse(&callback_url("1000", CALLBACK_SIGNATURE)).unwrap();
        assert!(matches!(
            cb.verify(&signer()),
            Err(CreditPayError::SignatureMismatch)
        ));
    }

    #[test]
    fn test_wrong_token_fails() {
        let cb = Callback::parse(&callback_url("10", CALLBACK_SIGNATURE)).unwrap();
        let other = Signer::new(&SecretString::from("tk_other".to_string()));
        assert!(cb.verify(&other).is_err());
    }

    #[test]
    fn test_missing_field() {
        let err = Callback::parse("https://shop.example.com/paid?transaction_id=txn_1").unwrap_err();
        assert!(matches!(err, CreditPayError::InvalidCallback(ref m) if m.contains("external_reference")));
    }

    #[test]
    fn test_invalid_url() {
        assert!(matches!(
            Callback::parse("not a url"),
            Err(CreditPayError::InvalidCallback(_))
        ));
    }
}
