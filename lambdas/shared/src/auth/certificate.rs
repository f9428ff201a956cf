use async_trait::async_trait;
use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};
use x509_cert::der::DecodePem;
use x509_cert::spki::ObjectIdentifier;
use x509_cert::Certificate;

use super::{Claims, TokenVerifier};
use crate::errors::{Error, Result};

/// rsaEncryption (PKCS #1)
const RSA_ENCRYPTION: ObjectIdentifier = ObjectIdentifier::new_unwrap("1.2.840.113549.1.1.1");

/// Verifies RS256 tokens against the public key of an X.509 certificate
pub struct CertificateVerifier {
    key: DecodingKey,
    validation: Validation,
}

impl CertificateVerifier {
    /// Load the verifier from a PEM-encoded certificate
    pub fn from_pem(pem: &str) -> Result<Self> {
        let cert = Certificate::from_pem(pem.trim().as_bytes())
            .map_err(|e| Error::Config(format!("Invalid certificate: {}", e)))?;

        let spki = &cert.tbs_certificate.subject_public_key_info;
        if spki.algorithm.oid != RSA_ENCRYPTION {
            return Err(Error::Config(format!(
                "Certificate key is not RSA: {}",
                spki.algorithm.oid
            )));
        }

        // The BIT STRING holds a PKCS #1 RSAPublicKey
        let public_key = spki
            .subject_public_key
            .as_bytes()
            .ok_or_else(|| Error::Config("Certificate public key is not byte aligned".to_string()))?;

        let mut validation = Validation::new(Algorithm::RS256);
        validation.validate_aud = false;
        validation.required_spec_claims.clear();

        Ok(Self {
            key: DecodingKey::from_rsa_der(public_key),
            validation,
        })
    }
}

#[async_trait]
impl TokenVerifier for CertificateVerifier {
    async fn verify(&self, token: &str) -> Result<Claims> {
        decode::<Claims>(token, &self.key, &self.validation)
            .map(|data| data.claims)
            .map_err(|e| Error::InvalidSignature(e.to_string()))
    }
}
