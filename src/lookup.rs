use std::time::Duration;

use serde::Deserialize;

use crate::models::Movie;
use crate::storage::LookupConfig;

/// Errors raised by the remote movie lookup.
#[derive(Debug, thiserror::Error)]
pub enum LookupError {
    /// No API key configured; the endpoint rejects keyless requests.
    #[error("No lookup API key configured (set lookup.api_key in the config file)")]
    MissingApiKey,

    /// The endpoint answered but knows no movie under that name.
    #[error("No match for movie {title:?}: {detail}")]
    NotFound { title: String, detail: String },

    /// Connection, timeout, HTTP status or body-decoding failure.
    #[error("Lookup request failed: {0}")]
    Network(#[from] reqwest::Error),

    /// A well-formed answer that lacks the fields a catalog entry needs,
    /// e.g. an unrated movie reported as `"imdbRating": "N/A"`.
    #[error("Lookup response for {title:?} is unusable: {detail}")]
    Incomplete { title: String, detail: String },
}

/// The subset of the OMDb `?t=` answer the catalog cares about.
///
/// OMDb signals misses in-band: `"Response": "False"` plus an `Error`
/// message, still with HTTP status 200.
#[derive(Debug, Deserialize)]
struct OmdbPayload {
    #[serde(rename = "Response")]
    response: String,
    #[serde(rename = "Error")]
    error: Option<String>,
    #[serde(rename = "Title")]
    title: Option<String>,
    #[serde(rename = "Year")]
    year: Option<String>,
    #[serde(rename = "imdbRating")]
    rating: Option<String>,
    #[serde(rename = "Poster")]
    poster: Option<String>,
}

/// Blocking client for an OMDb-compatible endpoint. Endpoint, key and
/// timeout come from the app configuration; nothing is hardcoded here.
pub struct OmdbClient {
    config: LookupConfig,
    http: reqwest::blocking::Client,
}

impl OmdbClient {
    pub fn new(config: LookupConfig) -> Result<Self, LookupError> {
        let http = reqwest::blocking::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;
        Ok(OmdbClient { config, http })
    }

    /// Look up a movie by name. One timeout-bounded attempt, no retries.
    /// Returns the canonical title reported by the source together with
    /// the catalog entry built from the answer.
    pub fn lookup(&self, title: &str) -> Result<(String, Movie), LookupError> {
        if self.config.api_key.is_empty() {
            return Err(LookupError::MissingApiKey);
        }

        log::debug!("Looking up {:?} at {}", title, self.config.base_url);

        let payload: OmdbPayload = self
            .http
            .get(&self.config.base_url)
            .query(&[("t", title), ("apikey", self.config.api_key.as_str())])
            .send()?
            .error_for_status()?
            .json()?;

        payload_into_entry(title, payload)
    }
}

/// Turn a decoded payload into a catalog entry, or a typed failure when
/// the answer is a miss or lacks required fields.
fn payload_into_entry(
    requested: &str,
    payload: OmdbPayload,
) -> Result<(String, Movie), LookupError> {
    if payload.response != "True" {
        return Err(LookupError::NotFound {
            title: requested.to_string(),
            detail: payload
                .error
                .unwrap_or_else(|| "no details given".to_string()),
        });
    }

    let incomplete = |detail: &str| LookupError::Incomplete {
        title: requested.to_string(),
        detail: detail.to_string(),
    };

    let title = payload.title.ok_or_else(|| incomplete("missing Title"))?;
    let year = payload.year.ok_or_else(|| incomplete("missing Year"))?;
    let rating_raw = payload
        .rating
        .ok_or_else(|| incomplete("missing imdbRating"))?;
    let rating: f64 = rating_raw
        .trim()
        .parse()
        .map_err(|_| incomplete(&format!("non-numeric rating {rating_raw:?}")))?;

    Ok((title, Movie::new(year, rating, payload.poster)))
}
