//! Generation-tagged fetches and result shaping.

use std::sync::Arc;

use super::RemotePage;
use super::RemoteSource;
use crate::error::FetchError;
use crate::model::Dataset;
use crate::query::QueryDescriptor;

/// A remote fetch that has been issued but not yet run.
///
/// Returned by the mode controller so the controller is never borrowed across
/// an await. Drive it on the caller's task queue and hand the
/// [`FetchCompletion`] back to the controller.
///
/// # Example
///
/// ```ignore
/// if let Dispatch::Remote(pending) = table.set_search("laptop") {
///     let completion = pending.run().await;
///     table.complete_fetch(completion)?;
/// }
/// ```
pub struct PendingFetch {
    generation: u64,
    descriptor: QueryDescriptor,
    id_field: String,
    source: Arc<dyn RemoteSource>,
}

impl PendingFetch {
    pub(crate) fn new(
        generation: u64,
        descriptor: QueryDescriptor,
        id_field: impl Into<String>,
        source: Arc<dyn RemoteSource>,
    ) -> Self {
        Self {
            generation,
            descriptor,
            id_field: id_field.into(),
            source,
        }
    }

    /// Position of this fetch in request-start order.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// The descriptor this fetch was issued for.
    pub fn descriptor(&self) -> &QueryDescriptor {
        &self.descriptor
    }

    /// Runs the fetch and shapes the response.
    pub async fn run(self) -> FetchCompletion {
        let result = match self.source.fetch(&self.descriptor).await {
            Ok(page) => shape(page, &self.descriptor, &self.id_field),
            Err(e) => Err(e),
        };
        FetchCompletion {
            generation: self.generation,
            descriptor: self.descriptor,
            result,
        }
    }
}

impl std::fmt::Debug for PendingFetch {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PendingFetch")
            .field("generation", &self.generation)
            .field("descriptor", &self.descriptor)
            .finish_non_exhaustive()
    }
}

/// The outcome of a [`PendingFetch`], tagged with its generation.
#[derive(Debug, Clone)]
pub struct FetchCompletion {
    generation: u64,
    descriptor: QueryDescriptor,
    result: Result<RemoteRows, FetchError>,
}

impl FetchCompletion {
    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn descriptor(&self) -> &QueryDescriptor {
        &self.descriptor
    }

    pub fn is_ok(&self) -> bool {
        self.result.is_ok()
    }

    pub(crate) fn into_parts(self) -> (u64, Result<RemoteRows, FetchError>) {
        (self.generation, self.result)
    }
}

/// A validated remote page.
#[derive(Debug, Clone)]
pub struct RemoteRows {
    pub rows: Dataset,
    pub total_matched: usize,
}

/// Validates a page against the descriptor it answers.
///
/// Overlong pages are truncated to the page size; rows without a unique id
/// reject the whole page.
fn shape(
    mut page: RemotePage,
    descriptor: &QueryDescriptor,
    id_field: &str,
) -> Result<RemoteRows, FetchError> {
    if page.rows.len() > descriptor.page_size() {
        log::warn!(
            "[remote] source returned {} rows for page size {}, truncating",
            page.rows.len(),
            descriptor.page_size()
        );
        page.rows.truncate(descriptor.page_size());
    }
    let total_matched = page.total_matched.max(descriptor.offset().saturating_add(page.rows.len()));
    let rows = Dataset::new(id_field, page.rows)
        .map_err(|e| FetchError::invalid_response(e.to_string()))?;
    Ok(RemoteRows {
        rows,
        total_matched,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Row;
    use crate::remote::source_fn;

    fn rows(ids: &[&str]) -> Vec<Row> {
        ids.iter().map(|id| Row::new().set("id", *id)).collect()
    }

    #[test]
    fn test_shape_truncates_overlong_page() {
        let q = QueryDescriptor::new(2);
        let shaped = shape(RemotePage::new(rows(&["a", "b", "c"]), 3), &q, "id").unwrap();
        assert_eq!(shaped.rows.len(), 2);
        assert_eq!(shaped.total_matched, 3);
    }

    #[test]
    fn test_shape_rejects_duplicate_ids() {
        let q = QueryDescriptor::new(5);
        let err = shape(RemotePage::new(rows(&["a", "a"]), 2), &q, "id").unwrap_err();
        assert!(matches!(err, FetchError::InvalidResponse { .. }));
    }

    #[test]
    fn test_shape_never_reports_fewer_matches_than_seen() {
        let q = QueryDescriptor::new(2).with_page(3);
        let shaped = shape(RemotePage::new(rows(&["e", "f"]), 0), &q, "id").unwrap();
        assert_eq!(shaped.total_matched, 6);
    }

    #[test]
    fn test_shape_saturates_on_huge_page_number() {
        let q = QueryDescriptor::new(2).with_page(usize::MAX);
        let shaped = shape(RemotePage::new(rows(&["y", "z"]), 10), &q, "id").unwrap();
        assert_eq!(shaped.total_matched, usize::MAX);
    }

    #[tokio::test]
    async fn test_run_tags_generation_and_descriptor() {
        let source = source_fn(|q: QueryDescriptor| async move {
            Ok(RemotePage::new(rows(&["x"]), q.page_size()))
        });
        let q = QueryDescriptor::new(4).with_search("x");
        let completion = PendingFetch::new(7, q.clone(), "id", Arc::new(source)).run().await;
        assert_eq!(completion.generation(), 7);
        assert_eq!(completion.descriptor(), &q);
        let (_, result) = completion.into_parts();
        assert_eq!(result.unwrap().total_matched, 4);
    }

    #[tokio::test]
    async fn test_run_passes_through_transport_error() {
        let source = source_fn(|_| async { Err(FetchError::transport("offline")) });
        let completion = PendingFetch::new(1, QueryDescriptor::default(), "id", Arc::new(source))
            .run()
            .await;
        assert!(!completion.is_ok());
    }
}
