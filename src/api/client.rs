use super::types::{ApiConfig, ApiError, Credentials, EpisodeRecord, SeriesRecord, Session};
use super::MetadataProvider;
use async_trait::async_trait;
use reqwest::header::ACCEPT_LANGUAGE;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use std::future::Future;
use std::time::Duration;
use tracing::{debug, info, warn};

#[derive(Serialize)]
struct LoginRequest<'a> {
    apikey: &'a str,
    userkey: &'a str,
    username: &'a str,
}

#[derive(Deserialize)]
struct TokenResponse {
    token: String,
}

#[derive(Deserialize)]
struct SearchResponse {
    #[serde(default)]
    data: Vec<SearchHit>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct SearchHit {
    id: u64,
    #[serde(default)]
    series_name: Option<String>,
}

#[derive(Deserialize)]
struct EpisodesPage {
    #[serde(default)]
    data: Vec<EpisodeHit>,
    #[serde(default)]
    links: PageLinks,
}

#[derive(Deserialize, Default)]
struct PageLinks {
    next: Option<u32>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct EpisodeHit {
    aired_season: Option<u32>,
    aired_episode_number: Option<u32>,
    #[serde(default)]
    episode_name: Option<String>,
}

/// TheTVDB v2 JSON API client
pub struct TvdbClient {
    client: Client,
    config: ApiConfig,
}

impl TvdbClient {
    /// Create a new client with the given configuration
    pub fn new(config: ApiConfig) -> Result<Self, ApiError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .gzip(true)
            .user_agent(concat!("telenamer/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| ApiError::NetworkError(e.to_string()))?;

        Ok(Self { client, config })
    }

    /// Run `request` until it succeeds, fails permanently, or runs out of attempts
    async fn with_retry<T, F, Fut>(&self, what: &str, mut request: F) -> Result<T, ApiError>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, ApiError>>,
    {
        let attempts = self.config.max_retries.max(1);
        let mut last_error = None;
        let mut delay = Duration::from_secs(1);

        for attempt in 1..=attempts {
            debug!("{} (attempt {}/{})", what, attempt, attempts);

            match request().await {
                Ok(value) => return Ok(value),
                Err(e) => {
                    warn!("{} attempt {} failed: {}", what, attempt, e);

                    if !e.is_transient() {
                        return Err(e);
                    }

                    last_error = Some(e);

                    if attempt < attempts {
                        debug!("Waiting {:?} before retry", delay);
                        tokio::time::sleep(delay).await;
                        delay *= 2;
                    }
                }
            }
        }

        Err(last_error.unwrap_or(ApiError::MaxRetriesExceeded { attempts }))
    }
}

#[async_trait]
impl MetadataProvider for TvdbClient {
    async fn login(&self, credentials: &Credentials) -> Result<Session, ApiError> {
        let url = format!("{}/login", self.config.base_url);
        let body = LoginRequest {
            apikey: &credentials.api_key,
            userkey: &credentials.user_key,
            username: &credentials.user_name,
        };
        let (client, url, body) = (&self.client, &url, &body);

        let text = self
            .with_retry("Login", move || async move {
                let response = client.post(url).json(body).send().await?;
                check_status(response.status(), "login")?;
                Ok(response.text().await?)
            })
            .await?;

        let token = parse_token(&text)?;
        info!("Authenticated with TheTVDB");

        Ok(Session {
            token,
            language: credentials.language.clone(),
        })
    }

    async fn search_series(
        &self,
        session: &Session,
        name: &str,
    ) -> Result<Vec<SeriesRecord>, ApiError> {
        let url = format!("{}/search/series", self.config.base_url);
        let (client, url) = (&self.client, &url);

        let result = self
            .with_retry("Series search", move || async move {
                let response = client
                    .get(url)
                    .query(&[("name", name)])
                    .bearer_auth(&session.token)
                    .header(ACCEPT_LANGUAGE, session.language.as_str())
                    .send()
                    .await?;
                check_status(response.status(), name)?;
                Ok(response.text().await?)
            })
            .await;

        match result {
            Ok(text) => parse_search_response(&text),
            // TheTVDB answers 404 when a search has no hits
            Err(ApiError::NotFound(_)) => Ok(Vec::new()),
            Err(e) => Err(e),
        }
    }

    async fn series_episodes(
        &self,
        session: &Session,
        series_id: u64,
    ) -> Result<Vec<EpisodeRecord>, ApiError> {
        let url = format!("{}/series/{}/episodes", self.config.base_url, series_id);
        let (client, url) = (&self.client, &url);
        let mut episodes = Vec::new();
        let mut page = Some(1u32);

        while let Some(current) = page {
            let text = self
                .with_retry("Episode list", move || async move {
                    let response = client
                        .get(url)
                        .query(&[("page", current)])
                        .bearer_auth(&session.token)
                        .header(ACCEPT_LANGUAGE, session.language.as_str())
                        .send()
                        .await?;
                    check_status(response.status(), url)?;
                    Ok(response.text().await?)
                })
                .await?;

            let (records, next) = parse_episodes_page(&text)?;
            debug!(series_id, page = current, count = records.len(), "Fetched episode page");
            episodes.extend(records);

            page = next.filter(|next| *next > current);
        }

        Ok(episodes)
    }
}

fn check_status(status: StatusCode, context: &str) -> Result<(), ApiError> {
    if status.is_success() {
        return Ok(());
    }

    let detail = format!("{} ({})", context, status);

    Err(match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => ApiError::Unauthorized(detail),
        StatusCode::NOT_FOUND => ApiError::NotFound(detail),
        StatusCode::TOO_MANY_REQUESTS => ApiError::RateLimited,
        s if s.is_server_error() => ApiError::ServerError(detail),
        _ => ApiError::BadRequest(detail),
    })
}

fn parse_token(body: &str) -> Result<String, ApiError> {
    let response: TokenResponse =
        serde_json::from_str(body).map_err(|e| ApiError::ParseError(e.to_string()))?;

    if response.token.is_empty() {
        return Err(ApiError::Unauthorized("empty token".to_string()));
    }

    Ok(response.token)
}

fn parse_search_response(body: &str) -> Result<Vec<SeriesRecord>, ApiError> {
    let response: SearchResponse =
        serde_json::from_str(body).map_err(|e| ApiError::ParseError(e.to_string()))?;

    Ok(response
        .data
        .into_iter()
        .filter_map(|hit| {
            let name = hit.series_name.filter(|n| !n.trim().is_empty())?;
            Some(SeriesRecord { id: hit.id, name })
        })
        .collect())
}

fn parse_episodes_page(body: &str) -> Result<(Vec<EpisodeRecord>, Option<u32>), ApiError> {
    let page: EpisodesPage =
        serde_json::from_str(body).map_err(|e| ApiError::ParseError(e.to_string()))?;

    let records = page
        .data
        .into_iter()
        .filter_map(|hit| {
            Some(EpisodeRecord {
                season: hit.aired_season?,
                episode: hit.aired_episode_number?,
                title: hit.episode_name.unwrap_or_default(),
            })
        })
        .collect();

    Ok((records, page.links.next))
}
