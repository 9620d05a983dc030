use dcommon::BoxFuture;

use crate::{BoxedEventStream, ModelRequest, ProviderError, ProviderId};

pub type ProviderFuture<'a, T> = BoxFuture<'a, T>;

/// A language-model backend that answers a request with a stream of events.
pub trait ModelProvider: Send + Sync {
    fn id(&self) -> ProviderId;

    fn stream<'a>(
        &'a self,
        request: ModelRequest,
    ) -> ProviderFuture<'a, Result<BoxedEventStream<'a>, ProviderError>>;
}
