use super::types::CompletionRequest;
use std::future::Future;
use std::pin::Pin;

/// A remote chat-completion service.
///
/// Both the draft generator and the primary auditor talk to the service
/// through this trait; any transport, auth or quota problem surfaces as an
/// ordinary error.
pub trait CompletionClient: Send + Sync {
    /// Client identifier used in logs (e.g. "azure-inference").
    fn name(&self) -> &str;

    /// Send the request and return the single text payload of the reply.
    fn complete<'a>(
        &'a self,
        request: &'a CompletionRequest,
    ) -> Pin<Box<dyn Future<Output = anyhow::Result<String>> + Send + 'a>>;
}
