//! [`EmbeddingProvider`] — the capability interface replacing the "ad-hoc
//! embed function seam" the spec's design notes call out (§9). Real
//! implementations talk HTTP to a local endpoint; tests use a deterministic
//! fake.

use crate::error::Result;
use async_trait::async_trait;

/// A source of dense embedding vectors for arbitrary text.
#[async_trait]
pub trait EmbeddingProvider: Send + Sync {
    /// Embed a single piece of text.
    async fn embed(&self, text: &str) -> Result<Vec<f32>>;

    /// Embed a batch of texts. Implementations may pipeline requests;
    /// callers must not assume ordering survives failures — a failing
    /// provider returns `Err` for the whole batch (per-item partial
    /// failure is reported by the indexing pipeline at the file level,
    /// not here).
    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        let mut out = Vec::with_capacity(texts.len());
        for text in texts {
            out.push(self.embed(text).await?);
        }
        Ok(out)
    }

    /// Fixed dimensionality of vectors this provider returns.
    fn dimension(&self) -> usize;

    /// Issue a pre-warm call to absorb a cold-start penalty before the
    /// first real request. Default no-op; HTTP-backed providers override
    /// this to hit the endpoint once during process/session init.
    async fn prewarm(&self) -> Result<()> {
        Ok(())
    }
}
