//! Private-key payload normalization.
//!
//! The container representation for keys is plaintext PKCS#8 DER. The
//! three armored key kinds are funneled into that form here: plain PKCS#8
//! passes through (after a structural check), encrypted PKCS#8 is
//! decrypted with the supplied password, and legacy PKCS#1 RSA keys are
//! re-encoded as PKCS#8.

use pem::{Label, Pem};
use pkcs8::{EncryptedPrivateKeyInfo, PrivateKeyInfo};
use rsa::{
    RsaPrivateKey,
    pkcs1::DecodeRsaPrivateKey,
    pkcs8::EncodePrivateKey,
};

use crate::error::{Error, Result};

/// Normalizes a key-category block to plaintext PKCS#8 DER.
pub(crate) fn to_pkcs8_der(block: &Pem, password: Option<&str>) -> Result<Vec<u8>> {
    match block.label() {
        Label::Pkcs8Key => {
            PrivateKeyInfo::try_from(block.der())
                .map_err(|e| Error::PrivateKey(e.to_string()))?;
            Ok(block.der().to_vec())
        }
        Label::Pkcs8EncryptedKey => {
            let password = password.ok_or(Error::MissingPassword)?;
            let info = EncryptedPrivateKeyInfo::try_from(block.der())
                .map_err(|e| Error::PrivateKey(e.to_string()))?;
            let document = info
                .decrypt(password)
                .map_err(|e| Error::PrivateKey(e.to_string()))?;
            Ok(document.as_bytes().to_vec())
        }
        Label::RsaKey => {
            let key = RsaPrivateKey::from_pkcs1_der(block.der())
                .map_err(|e| Error::PrivateKey(e.to_string()))?;
            let document = key
                .to_pkcs8_der()
                .map_err(|e| Error::PrivateKey(e.to_string()))?;
            Ok(document.as_bytes().to_vec())
        }
        Label::Certificate | Label::TrustedCertificate => Err(Error::NotAKey),
    }
}
