//! PKCS#12 persistence.
//!
//! Binds the [`Provider`] capability to the PKCS#12 container format. The
//! format details (encryption schemes, MAC, safe bags) belong entirely to
//! the `p12-keystore` crate; this module only maps between its entry types
//! and the bridge's [`Container`] model.

use std::io::{Read, Write};

use p12_keystore::{Certificate, KeyStore, KeyStoreEntry, LocalKeyId, PrivateKeyChain};
use sha2::{Digest, Sha256};

use crate::{
    bridge::Provider,
    container::{Container, Entry},
    error::{Error, Result},
};

/// Loads and stores containers as PKCS#12 files.
#[derive(Debug, Clone, Copy, Default)]
pub struct Pkcs12Provider;

impl Provider for Pkcs12Provider {
    fn load(&self, source: &mut dyn Read, password: &str) -> Result<Container> {
        let mut data = Vec::new();
        source.read_to_end(&mut data)?;
        let store = KeyStore::from_pkcs12(&data, password)
            .map_err(|e| Error::ContainerAccess(e.to_string()))?;

        let mut container = Container::new();
        for (alias, entry) in store.entries() {
            match entry {
                KeyStoreEntry::Certificate(cert) => {
                    container.set_entry(alias.clone(), Entry::Certificate(cert.as_der().to_vec()));
                }
                KeyStoreEntry::PrivateKeyChain(key_chain) => {
                    container.set_entry(
                        alias.clone(),
                        Entry::PrivateKey {
                            key: key_chain.key().to_vec(),
                            chain: key_chain
                                .chain()
                                .iter()
                                .map(|cert| cert.as_der().to_vec())
                                .collect(),
                        },
                    );
                }
                _ => return Err(Error::UnsupportedEntry(alias.clone())),
            }
        }
        Ok(container)
    }

    fn store(&self, container: &Container, sink: &mut dyn Write, password: &str) -> Result<()> {
        let mut store = KeyStore::new();
        for (alias, entry) in container.iter() {
            match entry {
                Entry::Certificate(der) => {
                    let cert = decode_certificate(der)?;
                    store.add_entry(alias, KeyStoreEntry::Certificate(cert));
                }
                Entry::PrivateKey { key, chain } => {
                    let certs = chain
                        .iter()
                        .map(|der| decode_certificate(der))
                        .collect::<Result<Vec<Certificate>>>()?;
                    let key_chain =
                        PrivateKeyChain::new(key.clone(), local_key_id(key), certs);
                    store.add_entry(alias, KeyStoreEntry::PrivateKeyChain(key_chain));
                }
            }
        }

        let data = store
            .writer(password)
            .write()
            .map_err(|e| Error::ContainerAccess(e.to_string()))?;
        sink.write_all(&data)?;
        Ok(())
    }
}

fn decode_certificate(der: &[u8]) -> Result<Certificate> {
    Certificate::from_der(der).map_err(|e| Error::ContainerAccess(e.to_string()))
}

// PKCS#12 keys carry a local key id; derive a stable one from the key
// material itself.
fn local_key_id(key: &[u8]) -> LocalKeyId {
    LocalKeyId::from(Sha256::digest(key).to_vec())
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use super::*;
    use crate::testdata::{CA_CERT, LEAF_CERT, LEAF_KEY};

    fn der_of(pem_text: &str) -> Vec<u8> {
        pem::Pem::from_str(pem_text).unwrap().into_der()
    }

    #[test]
    fn test_store_load_roundtrip() {
        let mut container = Container::new();
        container.set_entry("ca", Entry::Certificate(der_of(CA_CERT)));
        container.set_entry(
            "k1",
            Entry::PrivateKey {
                key: der_of(LEAF_KEY),
                chain: vec![der_of(LEAF_CERT), der_of(CA_CERT)],
            },
        );

        let provider = Pkcs12Provider;
        let mut data = Vec::new();
        provider.store(&container, &mut data, "changeit").unwrap();
        assert!(!data.is_empty());

        let loaded = provider.load(&mut data.as_slice(), "changeit").unwrap();
        assert_eq!(container, loaded);
    }

    #[test]
    fn test_load_rejects_wrong_password() {
        let mut container = Container::new();
        container.set_entry("ca", Entry::Certificate(der_of(CA_CERT)));

        let provider = Pkcs12Provider;
        let mut data = Vec::new();
        provider.store(&container, &mut data, "changeit").unwrap();

        assert!(matches!(
            provider.load(&mut data.as_slice(), "wrong"),
            Err(Error::ContainerAccess(_))
        ));
    }

    #[test]
    fn test_load_rejects_garbage() {
        let provider = Pkcs12Provider;
        assert!(matches!(
            provider.load(&mut [0u8; 32].as_slice(), "changeit"),
            Err(Error::ContainerAccess(_))
        ));
    }
}
