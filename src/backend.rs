//! Provider seam for the generative model.
//!
//! `ContentService` talks to a `GenerativeBackend` only, so the OpenAI client can be
//! swapped for a scripted one in tests.

use async_trait::async_trait;

use crate::error::ContentResult;
use crate::requests::ModelRequest;

#[async_trait]
pub trait GenerativeBackend: Send + Sync {
  /// Run one completion and return the raw text of the first choice.
  ///
  /// When `req.schema` is set the text is expected to be JSON following it;
  /// decoding is left to the caller.
  async fn complete(&self, req: &ModelRequest) -> ContentResult<String>;

  /// Used in logs to identify the provider.
  fn name(&self) -> &str;
}
