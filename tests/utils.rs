//! Shared fixtures for status list integration tests: a deterministic
//! Ed25519 signer and an in-memory list store.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Once;

use ed25519_dalek::{Signer as _, SigningKey};
use tracing_subscriber::FmtSubscriber;
use vc_status::provider::{Algorithm, ListStore, Signer};

/// Issuer identity every test list is created under.
pub const ISSUER: &str = "did:example:issuer";

static INIT: Once = Once::new();

/// Initialise tracing once for all tests.
pub fn init_tracer() {
    INIT.call_once(|| {
        let subscriber = FmtSubscriber::builder().with_max_level(tracing::Level::ERROR).finish();
        tracing::subscriber::set_global_default(subscriber).expect("subscriber set");
    });
}

/// A signer over a fixed Ed25519 key, so test envelopes are reproducible.
pub struct TestSigner {
    signing_key: SigningKey,
}

impl TestSigner {
    /// A signer over the fixed test key.
    #[must_use]
    pub fn new() -> Self {
        Self {
            signing_key: SigningKey::from_bytes(&[7u8; 32]),
        }
    }
}

impl Default for TestSigner {
    fn default() -> Self {
        Self::new()
    }
}

impl Signer for TestSigner {
    async fn try_sign(&self, msg: &[u8]) -> anyhow::Result<Vec<u8>> {
        Ok(self.signing_key.sign(msg).to_bytes().to_vec())
    }

    async fn public_key(&self) -> anyhow::Result<Vec<u8>> {
        Ok(self.signing_key.verifying_key().to_bytes().to_vec())
    }

    fn algorithm(&self) -> Algorithm {
        Algorithm::EdDSA
    }

    fn verification_method(&self) -> String {
        format!("{ISSUER}#key-1")
    }
}

/// An in-memory store handing out sequential indices on a single list.
pub struct MemoryStore {
    next_index: AtomicUsize,
}

impl MemoryStore {
    /// An empty store with no indices handed out.
    #[must_use]
    pub fn new() -> Self {
        Self {
            next_index: AtomicUsize::new(0),
        }
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl ListStore for MemoryStore {
    async fn default_list(&self) -> anyhow::Result<String> {
        Ok("https://example.com/status/default".into())
    }

    async fn allocate_index(&self, _list_id: &str) -> anyhow::Result<usize> {
        Ok(self.next_index.fetch_add(1, Ordering::SeqCst))
    }
}
