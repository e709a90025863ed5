//! Merchant-side request signer.
//!
//! The signing key is derived once from the merchant token
//! (`hex(SHA256(token))`) and then used to HMAC the canonical parameter
//! string of every request.

use secrecy::{ExposeSecret, SecretString};

use crate::constants::SIGNATURE_FIELD;
use crate::hmac::{compute_hmac, derive_secret_key, verify_hmac};
use crate::params::SignParams;

/// Sign `params` with the key derived from `token`.
///
/// Pure and deterministic. Does not validate the params; see
/// [`SignParams::check_unambiguous`].
pub fn sign(token: &str, params: &SignParams) -> String {
    let key = derive_secret_key(token);
    compute_hmac(key.as_bytes(), params.canonical_string().as_bytes())
}

/// Holds the derived signing key for one merchant token.
#[derive(Clone)]
pub struct Signer {
    key: SecretString,
}

impl Signer {
    pub fn new(token: &SecretString) -> Self {
        Self {
            key: SecretString::from(derive_secret_key(token.expose_secret())),
        }
    }

    /// Hex HMAC-SHA256 of the params' canonical string.
    pub fn sign(&self, params: &SignParams) -> String {
        compute_hmac(
            self.key.expose_secret().as_bytes(),
            params.canonical_string().as_bytes(),
        )
    }

    /// Constant-time check of a hex signature against `params`.
    pub fn verify(&self, params: &SignParams, signature: &str) -> bool {
        verify_hmac(
            self.key.expose_secret().as_bytes(),
            params.canonical_string().as_bytes(),
            signature,
        )
    }

    /// Canonical `(key, value)` pairs with `signature` appended, ready to be
    /// form-encoded.
    pub fn signed_form(&self, params: &SignParams) -> Vec<(String, String)> {
        let signature = self.sign(params);
        params
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .chain(std::iter::once((SIGNATURE_FIELD.to_string(), signature)))
            .collect()
    }
}

impl std::fmt::Debug for Signer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Signer").field("key", &"[REDACTED]").finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PAY_SIGNATURE: &str = "00e795da7410446b6be0968377518d2524d10e6859b7721b86751fb5a8d5b9cb";

    fn pay_params() -> SignParams {
        SignParams::new()
            .with("amount", 10)
            .with("description", "测试支付")
            .with("order_id", "test_order_001")
    }

    fn signer() -> Signer {
        Signer::new(&SecretString::from("tk_xxx".to_string()))
    }

    #[test]
    fn test_sign_regression_vector() {
        assert_eq!(sign("tk_xxx", &pay_params()), PAY_SIGNATURE);
        assert_eq!(signer().sign(&pay_params()), PAY_SIGNATURE);
    }

    #[test]
    fn test_query_regression_vector() {
        let params = SignParams::new().with("transaction_id", "txn_abc123");
        assert_eq!(
            sign("tk_xxx", &params),
            "82a2927901d313dec3efe926aad7a6cd3f02ab0e10e89501073738bcacc86ee6"
        );
    }

    #[test]
    fn test_sign_is_deterministic() {
        let s = signer();
        assert_eq!(s.sign(&pay_params()), s.sign(&pay_params()));
    }

    #[test]
    fn test_sign_order_independent() {
        let reordered = SignParams::new()
            .with("order_id", "test_order_001")
            .with("description", "测试支付")
            .with("amount", 10);
        assert_eq!(signer().sign(&reordered), PAY_SIGNATURE);
    }

    #[test]
    fn test_sign_changes_with_value() {
        let changed = pay_params().with("amount", 11);
        assert_eq!(
            signer().sign(&changed),
            "be96e2e8c8277f318e066b28d5a2c0799a5db1235555f35ee615db25f2878453"
        );
        let changed = pay_params().with("order_id", "test_order_002");
        assert_ne!(signer().sign(&changed), PAY_SIGNATURE);
    }

    #[test]
    fn test_sign_changes_with_token() {
        assert_ne!(sign("tk_yyy", &pay_params()), PAY_SIGNATURE);
    }

    #[test]
    fn test_verify() {
        let s = signer();
        assert!(s.verify(&pay_params(), PAY_SIGNATURE));
        assert!(s.verify(&pay_params(), &PAY_SIGNATURE.to_uppercase()));
        assert!(!s.verify(&pay_params().with("amount", 11), PAY_SIGNATURE));
        assert!(!s.verify(&pay_params(), "zz"));
    }

    #[test]
    fn test_signed_form_appends_signature_last() {
        let form = signer().signed_form(&pay_params());
        let keys: Vec<&str> = form.iter().map(|(k, _)| k.as_str()).collect();
        assert_eq!(keys, ["amount", "description", "order_id", "signature"]);
        assert_eq!(form[0].1, "10");
        assert_eq!(form[3].1, PAY_SIGNATURE);
    }

    #[test]
    fn test_debug_redacts_key() {
        let out = format!("{:?}", signer());
        assert!(!out.contains("1e4ff430"));
        assert!(out.contains("REDACTED"));
    }
}
