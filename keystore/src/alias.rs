//! Alias derivation.
//!
//! Import names every certificate entry after its subject distinguished
//! name, rendered in RFC 2253 ordering: most-specific RDN first, RDNs
//! joined with `,`, attributes of a multi-valued RDN joined with `+`.
//! Recognized attribute types use their short names; anything else falls
//! back to the dotted OID.

use x509_parser::prelude::*;

use crate::error::{Error, Result};

/// Derives the subject DN of a DER certificate.
///
/// Returns `Ok(None)` when the certificate has no printable subject
/// attributes, i.e. no usable identity to name an entry after.
pub(crate) fn subject_dn(der: &[u8]) -> Result<Option<String>> {
    let (_, cert) =
        X509Certificate::from_der(der).map_err(|e| Error::Certificate(e.to_string()))?;
    Ok(distinguished_name(cert.subject()))
}

fn distinguished_name(name: &X509Name<'_>) -> Option<String> {
    let mut rdns: Vec<String> = Vec::new();
    for rdn in name.iter_rdn() {
        let mut attrs: Vec<String> = Vec::new();
        for attr in rdn.iter() {
            // non-string values (rare) are left out of the name
            if let Ok(value) = attr.as_str() {
                let key = short_name(&attr.attr_type().to_id_string());
                attrs.push(format!("{}={}", key, value));
            }
        }
        if !attrs.is_empty() {
            rdns.push(attrs.join("+"));
        }
    }
    if rdns.is_empty() {
        None
    } else {
        // RFC 2253 prints RDNs in reverse of their DER encoding order
        rdns.reverse();
        Some(rdns.join(","))
    }
}

fn short_name(oid: &str) -> String {
    match oid {
        "2.5.4.3" => "CN".to_string(),
        "2.5.4.6" => "C".to_string(),
        "2.5.4.7" => "L".to_string(),
        "2.5.4.8" => "ST".to_string(),
        "2.5.4.9" => "STREET".to_string(),
        "2.5.4.10" => "O".to_string(),
        "2.5.4.11" => "OU".to_string(),
        "0.9.2342.19200300.100.1.1" => "UID".to_string(),
        "0.9.2342.19200300.100.1.25" => "DC".to_string(),
        _ => oid.to_string(),
    }
}
