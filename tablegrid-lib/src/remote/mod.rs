//! Remote bridge
//!
//! The engine does not talk to servers. It defines the [`RemoteSource`]
//! contract a caller implements over its own transport, and shapes what the
//! source returns into a view.

mod pending;

pub use pending::*;

use std::future::Future;

use async_trait::async_trait;
use futures::FutureExt;
use futures::future::BoxFuture;
use serde::Deserialize;
use serde::Serialize;

use crate::error::FetchError;
use crate::model::Row;
use crate::query::QueryDescriptor;

/// One page of results as answered by a remote source.
///
/// Wire shape: `{"rows": [...], "totalMatched": n}`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RemotePage {
    /// Rows of the requested page, already searched, filtered and sorted.
    pub rows: Vec<Row>,
    /// Matches across all pages.
    pub total_matched: usize,
}

impl RemotePage {
    /// Creates a page.
    pub fn new(rows: Vec<Row>, total_matched: usize) -> Self {
        Self {
            rows,
            total_matched,
        }
    }
}

/// A server-backed data source.
///
/// Implementations translate the descriptor (search text, filter rules, sort,
/// page) into their own query language and answer with one page. The engine
/// imposes no timeout and never aborts a fetch; it only ignores results that
/// arrive for a descriptor that is no longer current.
///
/// # Example
///
/// ```ignore
/// use tablegrid_lib::remote::{RemotePage, RemoteSource};
///
/// struct ProductsApi { http: reqwest::Client }
///
/// #[async_trait]
/// impl RemoteSource for ProductsApi {
///     async fn fetch(&self, descriptor: &QueryDescriptor) -> Result<RemotePage, FetchError> {
///         self.http
///             .post("https://shop.example/products/query")
///             .json(descriptor)
///             .send()
///             .await
///             .map_err(|e| FetchError::transport(e.to_string()))?
///             .json()
///             .await
///             .map_err(|e| FetchError::invalid_response(e.to_string()))
///     }
/// }
/// ```
#[async_trait]
pub trait RemoteSource: Send + Sync {
    /// Fetches the page described by `descriptor`.
    async fn fetch(&self, descriptor: &QueryDescriptor) -> Result<RemotePage, FetchError>;
}

/// Adapts an async closure into a [`RemoteSource`].
///
/// # Example
///
/// ```
/// use tablegrid_lib::remote::{RemotePage, source_fn};
///
/// let source = source_fn(|descriptor| async move {
///     let _ = descriptor.page();
///     Ok(RemotePage::default())
/// });
/// ```
pub struct FnSource {
    f: Box<dyn Fn(QueryDescriptor) -> BoxFuture<'static, Result<RemotePage, FetchError>> + Send + Sync>,
}

/// Wraps `f` as a remote source. `f` receives an owned copy of the descriptor.
pub fn source_fn<F, Fut>(f: F) -> FnSource
where
    F: Fn(QueryDescriptor) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<RemotePage, FetchError>> + Send + 'static,
{
    FnSource {
        f: Box::new(move |descriptor| f(descriptor).boxed()),
    }
}

#[async_trait]
impl RemoteSource for FnSource {
    async fn fetch(&self, descriptor: &QueryDescriptor) -> Result<RemotePage, FetchError> {
        (self.f)(descriptor.clone()).await
    }
}
