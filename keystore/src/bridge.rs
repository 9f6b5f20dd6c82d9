//! Container bridge: merging parsed PEM objects into a container and
//! walking a container back out to a bundle.
//!
//! Warnings are part of the merge contract. Every merge returns a
//! [`MergeReport`] whose `warnings` list records skipped objects; nothing
//! is logged from here. A single undecodable certificate never fails a
//! merge, only I/O and container-capability failures do.

use std::{
    fmt::{Display, Formatter},
    fs::File,
    io::{Read, Write},
    path::PathBuf,
};

use pem::{Label, Pem, bundle::Bundle};

use crate::{
    alias,
    container::{Container, Entry},
    error::{Error, Result},
    key,
};

/// The persistence capability: moves a container between its in-memory
/// and persisted forms. The persisted format is opaque to the bridge.
pub trait Provider {
    fn load(&self, source: &mut dyn Read, password: &str) -> Result<Container>;

    fn store(&self, container: &Container, sink: &mut dyn Write, password: &str) -> Result<()>;
}

/// A non-fatal condition recorded while merging.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Warning {
    /// No usable identity could be derived from a certificate.
    AliasUnderivable { detail: String },
    /// The derived alias already names an entry; the existing entry wins.
    AliasCollision { alias: String },
    /// A key-category block appeared in a certificate import.
    KeySkipped,
    /// A source entry kind the certificate import cannot carry over.
    UnsupportedEntry { alias: String },
}

impl Display for Warning {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Warning::AliasUnderivable { detail } => {
                write!(f, "no suitable alias for certificate: {}", detail)
            }
            Warning::AliasCollision { alias } => {
                write!(f, "alias '{}' already exists, entry skipped", alias)
            }
            Warning::KeySkipped => {
                write!(f, "private key block skipped; import it with an explicit alias")
            }
            Warning::UnsupportedEntry { alias } => {
                write!(f, "alias '{}' is not a certificate entry", alias)
            }
        }
    }
}

/// Outcome of one merge call: the aliases inserted and the warnings
/// accumulated along the way.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MergeReport {
    pub added: Vec<String>,
    pub warnings: Vec<Warning>,
}

/// Owns a container together with the path, password and [`Provider`]
/// used to persist it.
///
/// Outside a batch every merge call persists immediately. `begin_batch`
/// returns a [`Batch`] that suppresses persistence until `end_batch`.
pub struct Bridge<P> {
    provider: P,
    path: PathBuf,
    password: String,
    container: Container,
}

impl<P: Provider> Bridge<P> {
    /// A bridge over a new, empty container. Nothing is written until the
    /// first merge or an explicit `save`.
    pub fn create(provider: P, path: impl Into<PathBuf>, password: impl Into<String>) -> Self {
        Bridge {
            provider,
            path: path.into(),
            password: password.into(),
            container: Container::new(),
        }
    }

    /// A bridge over a container loaded from an existing file.
    pub fn open(
        provider: P,
        path: impl Into<PathBuf>,
        password: impl Into<String>,
    ) -> Result<Self> {
        let path = path.into();
        let password = password.into();
        let mut file = File::open(&path)?;
        let container = provider.load(&mut file, &password)?;
        Ok(Bridge {
            provider,
            path,
            password,
            container,
        })
    }

    pub fn container(&self) -> &Container {
        &self.container
    }

    /// Persists the container through the provider.
    pub fn save(&self) -> Result<()> {
        let mut file = File::create(&self.path)?;
        self.provider
            .store(&self.container, &mut file, &self.password)
    }

    /// Merges certificate blocks into the container and persists.
    ///
    /// Key-category blocks are skipped with a warning; so are certificates
    /// without a derivable alias and certificates whose derived alias is
    /// already taken. Existing entries are never overwritten.
    pub fn merge_certificates(&mut self, blocks: &[Pem]) -> Result<MergeReport> {
        let report = self.merge_certificates_unsaved(blocks)?;
        self.save()?;
        Ok(report)
    }

    /// Merges the certificate entries of another container and persists.
    pub fn merge_container(&mut self, source: &Container) -> Result<MergeReport> {
        let report = self.merge_container_unsaved(source)?;
        self.save()?;
        Ok(report)
    }

    /// Stores a private key under an explicit alias, paired with its
    /// certificate, and persists. The key payload is normalized to
    /// plaintext PKCS#8; `key_password` decrypts an encrypted payload.
    pub fn merge_key(
        &mut self,
        key_block: &Pem,
        cert_block: &Pem,
        alias: &str,
        key_password: Option<&str>,
    ) -> Result<()> {
        self.merge_key_unsaved(key_block, cert_block, alias, key_password)?;
        self.save()
    }

    /// Starts a batch: merge calls on the returned value leave persistence
    /// to a single `store` at `end_batch`.
    pub fn begin_batch(&mut self) -> Batch<'_, P> {
        Batch {
            bridge: self,
            dirty: false,
        }
    }

    /// Reconstructs a bundle from the container: one certificate object
    /// per certificate entry; for key entries the key object followed by
    /// its chain certificates in chain order.
    pub fn to_bundle(&self) -> Bundle {
        let mut bundle = Bundle::new();
        for (_, entry) in self.container.iter() {
            match entry {
                Entry::Certificate(der) => {
                    bundle.push(Pem::new(Label::Certificate, der.clone()));
                }
                Entry::PrivateKey { key, chain } => {
                    bundle.push(Pem::new(Label::Pkcs8Key, key.clone()));
                    for cert in chain {
                        bundle.push(Pem::new(Label::Certificate, cert.clone()));
                    }
                }
            }
        }
        bundle
    }

    /// `(alias, subject DN)` pairs for display. Key entries show the DN of
    /// their first chain certificate; underivable names show `-`.
    pub fn list(&self) -> Vec<(String, String)> {
        self.container
            .iter()
            .map(|(alias, entry)| {
                let der = match entry {
                    Entry::Certificate(der) => Some(der),
                    Entry::PrivateKey { chain, .. } => chain.first(),
                };
                let dn = der
                    .and_then(|der| alias::subject_dn(der).ok().flatten())
                    .unwrap_or_else(|| "-".to_string());
                (alias.to_string(), dn)
            })
            .collect()
    }

    fn merge_certificates_unsaved(&mut self, blocks: &[Pem]) -> Result<MergeReport> {
        let mut report = MergeReport::default();
        for block in blocks {
            if block.is_key() {
                report.warnings.push(Warning::KeySkipped);
                continue;
            }
            self.insert_certificate(block.der(), &mut report)?;
        }
        Ok(report)
    }

    fn merge_container_unsaved(&mut self, source: &Container) -> Result<MergeReport> {
        let mut report = MergeReport::default();
        for (source_alias, entry) in source.iter() {
            match entry {
                Entry::Certificate(der) => self.insert_certificate(der, &mut report)?,
                Entry::PrivateKey { .. } => report.warnings.push(Warning::UnsupportedEntry {
                    alias: source_alias.to_string(),
                }),
            }
        }
        Ok(report)
    }

    fn merge_key_unsaved(
        &mut self,
        key_block: &Pem,
        cert_block: &Pem,
        alias: &str,
        key_password: Option<&str>,
    ) -> Result<()> {
        if !key_block.is_key() {
            return Err(Error::NotAKey);
        }
        if !cert_block.is_cert() {
            return Err(Error::NotACertificate);
        }
        let key = key::to_pkcs8_der(key_block, key_password)?;
        self.container.set_entry(
            alias,
            Entry::PrivateKey {
                key,
                chain: vec![cert_block.der().to_vec()],
            },
        );
        Ok(())
    }

    /// Alias derivation and collision policy for one certificate.
    fn insert_certificate(&mut self, der: &[u8], report: &mut MergeReport) -> Result<()> {
        let alias = match alias::subject_dn(der) {
            Ok(Some(alias)) => alias,
            Ok(None) => {
                report.warnings.push(Warning::AliasUnderivable {
                    detail: "certificate has an empty subject".to_string(),
                });
                return Ok(());
            }
            Err(Error::Certificate(detail)) => {
                report.warnings.push(Warning::AliasUnderivable { detail });
                return Ok(());
            }
            Err(e) => return Err(e),
        };
        if self.container.contains_alias(&alias) {
            report.warnings.push(Warning::AliasCollision { alias });
            return Ok(());
        }
        self.container
            .set_entry(alias.clone(), Entry::Certificate(der.to_vec()));
        report.added.push(alias);
        Ok(())
    }
}

/// A borrow of the bridge with persistence suppressed.
///
/// `end_batch` fires a single `store` if any merge ran. Dropping the batch
/// without ending it persists nothing; the in-memory container keeps any
/// mutations either way, there is no rollback.
pub struct Batch<'a, P> {
    bridge: &'a mut Bridge<P>,
    dirty: bool,
}

impl<P: Provider> Batch<'_, P> {
    pub fn merge_certificates(&mut self, blocks: &[Pem]) -> Result<MergeReport> {
        let report = self.bridge.merge_certificates_unsaved(blocks)?;
        self.dirty = true;
        Ok(report)
    }

    pub fn merge_container(&mut self, source: &Container) -> Result<MergeReport> {
        let report = self.bridge.merge_container_unsaved(source)?;
        self.dirty = true;
        Ok(report)
    }

    pub fn merge_key(
        &mut self,
        key_block: &Pem,
        cert_block: &Pem,
        alias: &str,
        key_password: Option<&str>,
    ) -> Result<()> {
        self.bridge
            .merge_key_unsaved(key_block, cert_block, alias, key_password)?;
        self.dirty = true;
        Ok(())
    }

    /// Ends the batch, persisting at most once.
    pub fn end_batch(self) -> Result<()> {
        if self.dirty {
            self.bridge.save()?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::{cell::Cell, rc::Rc, str::FromStr};

    use tempfile::TempDir;

    use super::*;
    use crate::testdata::{CA_CERT, LEAF_CERT, LEAF_KEY};

    const LEAF_DN: &str = "CN=test,O=Example";
    const CA_DN: &str = "CN=Example Root CA,O=Example Trust Services,C=GB";

    #[derive(Clone, Default)]
    struct CountingProvider {
        stores: Rc<Cell<usize>>,
    }

    impl Provider for CountingProvider {
        fn load(&self, _source: &mut dyn Read, _password: &str) -> Result<Container> {
            Ok(Container::new())
        }

        fn store(
            &self,
            _container: &Container,
            _sink: &mut dyn Write,
            _password: &str,
        ) -> Result<()> {
            self.stores.set(self.stores.get() + 1);
            Ok(())
        }
    }

    fn bridge_in(dir: &TempDir, provider: CountingProvider) -> Bridge<CountingProvider> {
        Bridge::create(provider, dir.path().join("store.p12"), "changeit")
    }

    fn block(pem_text: &str) -> Pem {
        Pem::from_str(pem_text).unwrap()
    }

    #[test]
    fn test_merge_derives_alias_from_subject() {
        let dir = TempDir::new().unwrap();
        let provider = CountingProvider::default();
        let mut bridge = bridge_in(&dir, provider);

        // one unrelated comment line ahead of the block
        let bundle = format!("# comment\n{}", LEAF_CERT);
        let blocks = pem::bundle::scan_str(&bundle).unwrap();
        assert_eq!(1, blocks.len());

        let report = bridge.merge_certificates(&blocks).unwrap();
        assert_eq!(vec![LEAF_DN.to_string()], report.added);
        assert!(report.warnings.is_empty());
        assert!(bridge.container().contains_alias(LEAF_DN));
    }

    #[test]
    fn test_merge_skips_colliding_alias() {
        let dir = TempDir::new().unwrap();
        let mut bridge = bridge_in(&dir, CountingProvider::default());

        let blocks = vec![block(LEAF_CERT), block(LEAF_CERT)];
        let report = bridge.merge_certificates(&blocks).unwrap();

        assert_eq!(1, bridge.container().len());
        assert_eq!(vec![LEAF_DN.to_string()], report.added);
        assert_eq!(
            vec![Warning::AliasCollision {
                alias: LEAF_DN.to_string()
            }],
            report.warnings
        );
    }

    #[test]
    fn test_merge_skips_keys_with_warning() {
        let dir = TempDir::new().unwrap();
        let mut bridge = bridge_in(&dir, CountingProvider::default());

        let report = bridge.merge_certificates(&[block(LEAF_KEY)]).unwrap();
        assert!(bridge.container().is_empty());
        assert_eq!(vec![Warning::KeySkipped], report.warnings);
    }

    #[test]
    fn test_merge_skips_undecodable_certificate() {
        let dir = TempDir::new().unwrap();
        let mut bridge = bridge_in(&dir, CountingProvider::default());

        let garbage = Pem::new(Label::Certificate, vec![0u8; 8]);
        let report = bridge.merge_certificates(&[garbage]).unwrap();
        assert!(bridge.container().is_empty());
        assert!(matches!(
            report.warnings.as_slice(),
            [Warning::AliasUnderivable { .. }]
        ));
    }

    #[test]
    fn test_each_merge_outside_batch_persists() {
        let dir = TempDir::new().unwrap();
        let provider = CountingProvider::default();
        let stores = provider.stores.clone();
        let mut bridge = bridge_in(&dir, provider);

        bridge.merge_certificates(&[block(LEAF_CERT)]).unwrap();
        bridge.merge_certificates(&[block(CA_CERT)]).unwrap();
        bridge.merge_certificates(&[]).unwrap();
        assert_eq!(3, stores.get());
    }

    #[test]
    fn test_batch_persists_once() {
        let dir = TempDir::new().unwrap();
        let provider = CountingProvider::default();
        let stores = provider.stores.clone();
        let mut bridge = bridge_in(&dir, provider);

        let mut batch = bridge.begin_batch();
        batch.merge_certificates(&[block(LEAF_CERT)]).unwrap();
        batch.merge_certificates(&[block(CA_CERT)]).unwrap();
        batch.merge_certificates(&[]).unwrap();
        assert_eq!(0, stores.get());
        batch.end_batch().unwrap();

        assert_eq!(1, stores.get());
        assert_eq!(2, bridge.container().len());
    }

    #[test]
    fn test_dropped_batch_persists_nothing() {
        let dir = TempDir::new().unwrap();
        let provider = CountingProvider::default();
        let stores = provider.stores.clone();
        let mut bridge = bridge_in(&dir, provider);

        {
            let mut batch = bridge.begin_batch();
            batch.merge_certificates(&[block(LEAF_CERT)]).unwrap();
        }
        assert_eq!(0, stores.get());
        // the in-memory mutation survives; only persistence was skipped
        assert!(bridge.container().contains_alias(LEAF_DN));
    }

    #[test]
    fn test_empty_batch_persists_nothing() {
        let dir = TempDir::new().unwrap();
        let provider = CountingProvider::default();
        let stores = provider.stores.clone();
        let mut bridge = bridge_in(&dir, provider);

        bridge.begin_batch().end_batch().unwrap();
        assert_eq!(0, stores.get());
    }

    #[test]
    fn test_merge_key_stores_chain() {
        let dir = TempDir::new().unwrap();
        let provider = CountingProvider::default();
        let stores = provider.stores.clone();
        let mut bridge = bridge_in(&dir, provider);

        bridge
            .merge_key(&block(LEAF_KEY), &block(LEAF_CERT), "k1", None)
            .unwrap();
        assert_eq!(1, stores.get());

        match bridge.container().entry("k1") {
            Some(Entry::PrivateKey { chain, .. }) => assert_eq!(1, chain.len()),
            other => panic!("unexpected entry: {:?}", other),
        }
    }

    #[test]
    fn test_merge_key_rejects_mismatched_blocks() {
        let dir = TempDir::new().unwrap();
        let mut bridge = bridge_in(&dir, CountingProvider::default());

        assert!(matches!(
            bridge.merge_key(&block(LEAF_CERT), &block(LEAF_CERT), "k1", None),
            Err(Error::NotAKey)
        ));
        assert!(matches!(
            bridge.merge_key(&block(LEAF_KEY), &block(LEAF_KEY), "k1", None),
            Err(Error::NotACertificate)
        ));
    }

    #[test]
    fn test_merge_container_follows_collision_policy() {
        let dir = TempDir::new().unwrap();
        let mut bridge = bridge_in(&dir, CountingProvider::default());
        bridge.merge_certificates(&[block(LEAF_CERT)]).unwrap();

        let mut source = Container::new();
        source.set_entry("x", Entry::Certificate(block(LEAF_CERT).into_der()));
        source.set_entry("y", Entry::Certificate(block(CA_CERT).into_der()));
        source.set_entry(
            "z",
            Entry::PrivateKey {
                key: vec![1],
                chain: vec![],
            },
        );

        let report = bridge.merge_container(&source).unwrap();
        assert_eq!(vec![CA_DN.to_string()], report.added);
        assert!(report.warnings.contains(&Warning::AliasCollision {
            alias: LEAF_DN.to_string()
        }));
        assert!(report.warnings.contains(&Warning::UnsupportedEntry {
            alias: "z".to_string()
        }));
        assert_eq!(2, bridge.container().len());
    }

    #[test]
    fn test_export_orders_key_then_chain() {
        let dir = TempDir::new().unwrap();
        let mut bridge = bridge_in(&dir, CountingProvider::default());

        let key = block(LEAF_KEY).into_der();
        let leaf = block(LEAF_CERT).into_der();
        let ca = block(CA_CERT).into_der();
        bridge.container.set_entry(
            "k1",
            Entry::PrivateKey {
                key: key.clone(),
                chain: vec![leaf.clone(), ca.clone()],
            },
        );

        let blocks = bridge.to_bundle().blocks().unwrap();
        assert_eq!(3, blocks.len());
        assert_eq!(Pem::new(Label::Pkcs8Key, key), blocks[0]);
        assert_eq!(Pem::new(Label::Certificate, leaf), blocks[1]);
        assert_eq!(Pem::new(Label::Certificate, ca), blocks[2]);
    }

    #[test]
    fn test_export_certificate_entry() {
        let dir = TempDir::new().unwrap();
        let mut bridge = bridge_in(&dir, CountingProvider::default());
        bridge.merge_certificates(&[block(LEAF_CERT)]).unwrap();

        let blocks = bridge.to_bundle().blocks().unwrap();
        assert_eq!(1, blocks.len());
        assert_eq!(Label::Certificate, blocks[0].label());
    }

    #[test]
    fn test_list_shows_subject_dn() {
        let dir = TempDir::new().unwrap();
        let mut bridge = bridge_in(&dir, CountingProvider::default());
        bridge.merge_certificates(&[block(LEAF_CERT)]).unwrap();
        bridge
            .merge_key(&block(LEAF_KEY), &block(CA_CERT), "k1", None)
            .unwrap();

        let listing = bridge.list();
        assert_eq!(2, listing.len());
        assert!(listing.contains(&(LEAF_DN.to_string(), LEAF_DN.to_string())));
        assert!(listing.contains(&("k1".to_string(), CA_DN.to_string())));
    }

    #[test]
    fn test_open_loads_through_provider() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("store.p12");
        std::fs::write(&path, b"opaque").unwrap();

        let bridge = Bridge::open(CountingProvider::default(), &path, "changeit").unwrap();
        assert!(bridge.container().is_empty());
    }
}
