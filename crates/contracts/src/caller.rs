//! RemoteCaller trait - the dispatcher's unit of work
//!
//! One invocation per `QueryBlob`. Implementations own their timeout and
//! classify every failure into an `ErrorDetail`; they never panic on a bad
//! response.

use std::future::Future;

use crate::{ErrorDetail, QueryBlob, SearchResult};

/// Remote search call
#[trait_variant::make(RemoteCaller: Send)]
pub trait LocalRemoteCaller {
    /// Caller name (used for logging)
    fn name(&self) -> &str;

    /// Execute one query
    async fn call(&self, blob: &QueryBlob) -> Result<SearchResult, ErrorDetail>;
}

/// Adapts an async closure into a [`RemoteCaller`]
pub struct FnCaller<F> {
    name: String,
    f: F,
}

impl<F> FnCaller<F> {
    pub fn new(name: impl Into<String>, f: F) -> Self {
        Self {
            name: name.into(),
            f,
        }
    }
}

impl<F, Fut> RemoteCaller for FnCaller<F>
where
    F: Fn(QueryBlob) -> Fut + Send + Sync,
    Fut: Future<Output = Result<SearchResult, ErrorDetail>> + Send,
{
    fn name(&self) -> &str {
        &self.name
    }

    async fn call(&self, blob: &QueryBlob) -> Result<SearchResult, ErrorDetail> {
        (self.f)(blob.clone()).await
    }
}

/// Build a [`RemoteCaller`] from an async closure
pub fn caller_fn<F, Fut>(name: impl Into<String>, f: F) -> FnCaller<F>
where
    F: Fn(QueryBlob) -> Fut + Send + Sync,
    Fut: Future<Output = Result<SearchResult, ErrorDetail>> + Send,
{
    FnCaller::new(name, f)
}
