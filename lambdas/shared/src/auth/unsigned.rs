use async_trait::async_trait;
use jsonwebtoken::{decode, DecodingKey, Validation};

use super::{Claims, TokenVerifier};
use crate::errors::{Error, Result};

/// Reads token claims without verifying the signature or expiry
#[derive(Debug, Clone, Copy, Default)]
pub struct UnsignedDecode;

impl UnsignedDecode {
    fn validation() -> Validation {
        let mut validation = Validation::default();
        validation.insecure_disable_signature_validation();
        validation.validate_exp = false;
        validation.validate_aud = false;
        validation.required_spec_claims.clear();
        validation
    }
}

#[async_trait]
impl TokenVerifier for UnsignedDecode {
    async fn verify(&self, token: &str) -> Result<Claims> {
        decode::<Claims>(token, &DecodingKey::from_secret(&[]), &Self::validation())
            .map(|data| data.claims)
            .map_err(|e| Error::InvalidSignature(e.to_string()))
    }
}
