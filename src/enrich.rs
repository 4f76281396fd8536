//! Metadata enrichment: resolve a local identity guess against the provider.

use fuzzy_matcher::skim::SkimMatcherV2;
use fuzzy_matcher::FuzzyMatcher;
use thiserror::Error;
use tracing::{debug, trace};

use crate::api::{ApiError, Credentials, MetadataProvider, SeriesRecord};
use crate::identity::RawIdentity;

/// Identity confirmed by the metadata provider
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnrichedIdentity {
    pub file_name: String,
    pub container: String,
    pub season: u32,
    pub episode: u32,
    pub episode_title: String,
    /// Series name with the provider's casing
    pub series: String,
}

#[derive(Error, Debug)]
pub enum EnrichError {
    #[error("Authentication failed: {source}")]
    AuthFailed {
        #[source]
        source: ApiError,
    },

    #[error("No series matching '{series}' ({detail})")]
    SeriesNotFound { series: String, detail: String },

    #[error("Cannot fetch episodes of '{series}': {source}")]
    EpisodeListFailed {
        series: String,
        #[source]
        source: ApiError,
    },

    #[error("'{series}' has no episode S{season:02}E{episode:02}")]
    EpisodeNotFound {
        series: String,
        season: u32,
        episode: u32,
    },
}

/// Pick the search result closest to `query`.
///
/// Falls back to the first result when nothing scores, since the provider
/// already orders results by its own relevance.
pub fn best_series_match<'a>(
    query: &str,
    candidates: &'a [SeriesRecord],
) -> Option<&'a SeriesRecord> {
    let query = query.trim();
    let query_lower = query.to_lowercase();
    let matcher = SkimMatcherV2::default().ignore_case();

    let best = candidates
        .iter()
        .filter_map(|candidate| {
            let base = matcher.fuzzy_match(&candidate.name, query)?;
            let score = score_candidate(base, &candidate.name, &query_lower);
            trace!(name = %candidate.name, score, "Scored series candidate");
            Some((score, candidate))
        })
        // Equal scores prefer the earlier (provider-ranked) candidate
        .fold(None::<(i64, &SeriesRecord)>, |best, (score, candidate)| match best {
            Some((top, _)) if top >= score => best,
            _ => Some((score, candidate)),
        })
        .map(|(_, candidate)| candidate);

    best.or_else(|| candidates.first())
}

fn score_candidate(base: i64, name: &str, query_lower: &str) -> i64 {
    let name_lower = name.to_lowercase();

    if name_lower == query_lower {
        return base.saturating_add(100_000);
    }

    let mut score = base;

    if name_lower.starts_with(query_lower) {
        score = score.saturating_add(25_000);
    }

    if let Some(position) = name_lower.find(query_lower) {
        score = score.saturating_add(10_000);
        score = score.saturating_add(2_000_i64.saturating_sub(position as i64));
    }

    for token in query_lower.split_whitespace() {
        if name_lower.split_whitespace().any(|word| word == token) {
            score = score.saturating_add(1_000);
        }
    }

    // Shorter names win ties ("The Office" over "The Office Christmas Special")
    score.saturating_sub(name.len().min(200) as i64)
}

/// Resolve canonical series name and episode title for one identity.
///
/// Logs in on every call; no session is shared between concurrent items.
pub async fn enrich(
    provider: &dyn MetadataProvider,
    credentials: &Credentials,
    raw: &RawIdentity,
) -> Result<EnrichedIdentity, EnrichError> {
    let session = provider
        .login(credentials)
        .await
        .map_err(|source| EnrichError::AuthFailed { source })?;

    let candidates = provider
        .search_series(&session, &raw.series)
        .await
        .map_err(|e| EnrichError::SeriesNotFound {
            series: raw.series.clone(),
            detail: e.to_string(),
        })?;

    let series = best_series_match(&raw.series, &candidates).ok_or_else(|| {
        EnrichError::SeriesNotFound {
            series: raw.series.clone(),
            detail: "no search results".to_string(),
        }
    })?;
    debug!(query = %raw.series, matched = %series.name, id = series.id, "Matched series");

    let episodes = provider
        .series_episodes(&session, series.id)
        .await
        .map_err(|source| EnrichError::EpisodeListFailed {
            series: series.name.clone(),
            source,
        })?;

    let episode = episodes
        .into_iter()
        .find(|e| e.season == raw.season && e.episode == raw.episode)
        .ok_or_else(|| EnrichError::EpisodeNotFound {
            series: series.name.clone(),
            season: raw.season,
            episode: raw.episode,
        })?;

    Ok(EnrichedIdentity {
        file_name: raw.file_name.clone(),
        container: raw.container.clone(),
        season: episode.season,
        episode: episode.episode,
        episode_title: episode.title,
        series: series.name.clone(),
    })
}
