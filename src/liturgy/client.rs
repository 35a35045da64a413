//! HTTP client for the liturgical calendar API.
//!
//! Requests `GET {base}/api/v0/{lang}/calendars/{calendar}/{y}/{m}/{d}` and
//! maps the `{season, celebrations: [{title, rank, quotes?}]}` response to a
//! [`LiturgicalContext`]. The whole lookup, including the HTTPS retry, runs
//! under one deadline so quote selection never waits longer than
//! [`LiturgyConfig::timeout`].

use crate::config::LiturgyConfig;
use crate::error::{JaculatoriaError, Result};
use crate::liturgy::context::{LiturgicalContext, LiturgicalSeason, Rank, slugify};
use chrono::{Datelike, NaiveDate};
use serde::Deserialize;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};
use url::Url;

/// Calendar host that also serves HTTPS. Plain-HTTP failures against it
/// are retried once over HTTPS.
pub const KNOWN_CALENDAR_HOST: &str = "calapi.inadiutorium.cz";

#[derive(Debug, Deserialize)]
struct DayResponse {
    #[serde(default)]
    season: String,
    #[serde(default)]
    celebrations: Vec<Celebration>,
}

#[derive(Debug, Deserialize)]
struct Celebration {
    #[serde(default)]
    title: String,
    #[serde(default)]
    rank: String,
    #[serde(default)]
    quotes: Vec<String>,
}

/// Calendar API client.
pub struct CalendarClient {
    config: LiturgyConfig,
    client: reqwest::Client,
}

impl CalendarClient {
    /// # Errors
    ///
    /// Returns [`JaculatoriaError::Liturgy`] when the HTTP client cannot be
    /// built (for example when TLS initialisation fails).
    pub fn new(config: LiturgyConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout())
            .build()
            .map_err(|e| JaculatoriaError::Liturgy(format!("cannot build HTTP client: {e}")))?;
        Ok(Self { config, client })
    }

    /// URL of the calendar day `date`.
    ///
    /// # Errors
    ///
    /// Returns [`JaculatoriaError::Config`] when the base URL is malformed.
    pub fn day_url(&self, date: NaiveDate) -> Result<Url> {
        let raw = format!(
            "{}/api/v0/{}/calendars/{}/{}/{}/{}",
            self.config.base_url.trim_end_matches('/'),
            self.config.language,
            self.config.calendar,
            date.year(),
            date.month(),
            date.day()
        );
        Url::parse(&raw).map_err(|e| {
            JaculatoriaError::Config(format!("invalid calendar URL {raw:?}: {e}"))
        })
    }

    /// Fetch the context of `date`.
    ///
    /// # Errors
    ///
    /// Returns [`JaculatoriaError::Liturgy`] on timeout, cancellation,
    /// transport failure, non-success status or an unparsable body.
    pub async fn fetch_day(
        &self,
        date: NaiveDate,
        cancel: &CancellationToken,
    ) -> Result<LiturgicalContext> {
        let deadline = self.config.timeout();
        tokio::select! {
            biased;
            () = cancel.cancelled() => {
                Err(JaculatoriaError::Liturgy("calendar lookup cancelled".to_owned()))
            }
            () = tokio::time::sleep(deadline) => Err(JaculatoriaError::Liturgy(format!(
                "calendar lookup timed out after {}ms",
                deadline.as_millis()
            ))),
            result = self.fetch_with_fallback(date) => result,
        }
    }

    async fn fetch_with_fallback(&self, date: NaiveDate) -> Result<LiturgicalContext> {
        let url = self.day_url(date)?;
        match self.fetch_url(&url).await {
            Ok(context) => Ok(context),
            Err(e) => match self.https_fallback_url(&url) {
                Some(secure) => {
                    debug!("calendar request failed ({e}), retrying over HTTPS");
                    self.fetch_url(&secure).await
                }
                None => Err(e),
            },
        }
    }

    fn https_fallback_url(&self, url: &Url) -> Option<Url> {
        if !self.config.https_fallback
            || url.scheme() != "http"
            || url.host_str() != Some(KNOWN_CALENDAR_HOST)
        {
            return None;
        }
        let mut secure = url.clone();
        secure.set_scheme("https").ok()?;
        Some(secure)
    }

    async fn fetch_url(&self, url: &Url) -> Result<LiturgicalContext> {
        let response = self
            .client
            .get(url.clone())
            .send()
            .await
            .map_err(|e| JaculatoriaError::Liturgy(format!("request to {url} failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            return Err(JaculatoriaError::Liturgy(format!(
                "calendar returned HTTP {} for {url}",
                status.as_u16()
            )));
        }

        let body = response
            .text()
            .await
            .map_err(|e| JaculatoriaError::Liturgy(format!("cannot read calendar body: {e}")))?;
        parse_day(&body)
    }
}

/// Parse a calendar day response body.
///
/// # Errors
///
/// Returns [`JaculatoriaError::Liturgy`] when the body is not valid JSON.
pub fn parse_day(body: &str) -> Result<LiturgicalContext> {
    let day: DayResponse = serde_json::from_str(body)
        .map_err(|e| JaculatoriaError::Liturgy(format!("unparsable calendar response: {e}")))?;

    let season = LiturgicalSeason::parse(&day.season).unwrap_or_else(|| {
        warn!(season = %day.season, "unknown liturgical season, using ordinary");
        LiturgicalSeason::Ordinary
    });
    let mut context = LiturgicalContext::in_season(season);

    let Some(principal) = day.celebrations.into_iter().next() else {
        return Ok(context);
    };
    let rank = Rank::from_api(&principal.rank);
    context.rank = rank;

    let slug = slugify(&principal.title);
    if rank != Rank::Weekday && !slug.is_empty() {
        context.feast = Some(slug);
        context.feast_name = Some(principal.title.trim().to_owned());
        context.api_quotes = principal.quotes;
    }
    Ok(context)
}
