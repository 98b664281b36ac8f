//! # contract: the seam between push orchestration and the network
//!
//! The orchestrator only ever talks to an indexing service through [`Pusher`]. The real
//! reqwest client lives in the `site-push` crate; tests use the generated `MockPusher`.
//!
//! ## Mocking & Testing
//! - The trait is annotated for `mockall`, exported under the `test-export-mocks` feature so
//!   integration tests in other crates can use it too.

use async_trait::async_trait;

use mockall::automock;

pub use crate::response::PushResponse;
use crate::error::SitePushError;

/// Submits a batch of URLs for one site to a search-engine index.
///
/// Implementors send the whole batch in a single request and return the raw status and body
/// without interpreting them. Anything that prevents the request from completing is a
/// [`SitePushError::Transport`].
#[cfg_attr(any(test, feature = "test-export-mocks"), automock)]
#[async_trait]
pub trait Pusher: Send + Sync {
    async fn push(&self, site_url: &str, urls: &[String]) -> Result<PushResponse, SitePushError>;
}
