use std::sync::Arc;

use tracing::debug;

use super::{extract_identity, MediaKind, RawIdentity};
use crate::parser::FilenameParser;
use crate::scatter::{scatter_gather, Ordering, ScatterOptions};

/// Run identity extraction over `files`, one task per file.
///
/// Rejected files are dropped. With [`Ordering::Preserving`] the surviving
/// identities keep the order of `files`.
pub async fn infer_identities(
    parser: Arc<dyn FilenameParser>,
    files: Vec<String>,
    series: Option<String>,
    ordering: Ordering,
) -> Vec<RawIdentity> {
    let total = files.len();
    let series = series.map(Arc::<str>::from);
    let options = ScatterOptions {
        ordering,
        max_concurrency: None,
    };

    let extractions = scatter_gather(files, options, |file_name| {
        let parser = Arc::clone(&parser);
        let series = series.clone();
        async move { extract_identity(parser.as_ref(), &file_name, series.as_deref()) }
    })
    .await;

    let identities: Vec<RawIdentity> = extractions
        .into_iter()
        .filter_map(|extraction| extraction.into_valid())
        .collect();

    let subtitles = identities
        .iter()
        .filter(|identity| identity.kind == MediaKind::Subtitle)
        .count();

    debug!(
        total,
        videos = identities.len() - subtitles,
        subtitles,
        rejected = total - identities.len(),
        "Inferred identities"
    );

    identities
}
