//! Cached liturgical season lookup.

use crate::config::LiturgyConfig;
use crate::error::Result;
use crate::liturgy::client::CalendarClient;
use crate::liturgy::context::LiturgicalContext;
use async_trait::async_trait;
use chrono::NaiveDate;
use std::collections::HashMap;
use std::sync::{Mutex, PoisonError};
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

/// Source of the liturgical context of a day.
///
/// Never fails: an unreachable calendar yields
/// [`LiturgicalContext::ordinary`].
#[async_trait]
pub trait LiturgicalCalendar: Send + Sync {
    async fn current_context(&self, date: NaiveDate) -> LiturgicalContext;
}

/// [`LiturgicalCalendar`] backed by the HTTP calendar API.
///
/// Successful lookups are cached per date for the life of the process.
/// Fallback answers are not cached, so the next request for the same date
/// tries the network again.
pub struct SeasonService {
    client: CalendarClient,
    cache: Mutex<HashMap<NaiveDate, LiturgicalContext>>,
    cancel: CancellationToken,
}

impl SeasonService {
    /// `cancel` aborts in-flight lookups on shutdown.
    ///
    /// # Errors
    ///
    /// Returns [`crate::error::JaculatoriaError::Liturgy`] when the HTTP
    /// client cannot be built.
    pub fn new(config: LiturgyConfig, cancel: CancellationToken) -> Result<Self> {
        Ok(Self {
            client: CalendarClient::new(config)?,
            cache: Mutex::new(HashMap::new()),
            cancel,
        })
    }

    /// Cached context for `date`, if a lookup already succeeded.
    #[must_use]
    pub fn cached(&self, date: NaiveDate) -> Option<LiturgicalContext> {
        self.cache
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&date)
            .cloned()
    }
}

#[async_trait]
impl LiturgicalCalendar for SeasonService {
    async fn current_context(&self, date: NaiveDate) -> LiturgicalContext {
        if let Some(context) = self.cached(date) {
            return context;
        }

        match self.client.fetch_day(date, &self.cancel).await {
            Ok(context) => {
                debug!(%date, season = %context.season, feast = ?context.feast, "resolved");
                self.cache
                    .lock()
                    .unwrap_or_else(PoisonError::into_inner)
                    .insert(date, context.clone());
                context
            }
            Err(e) => {
                warn!(%date, "liturgical calendar unavailable, using ordinary time: {e}");
                LiturgicalContext::ordinary()
            }
        }
    }
}

/// [`LiturgicalCalendar`] that always answers with the same context.
/// Used when the calendar lookup is disabled.
#[derive(Debug, Clone, Default)]
pub struct FixedCalendar {
    context: LiturgicalContext,
}

impl FixedCalendar {
    #[must_use]
    pub fn new(context: LiturgicalContext) -> Self {
        Self { context }
    }
}

#[async_trait]
impl LiturgicalCalendar for FixedCalendar {
    async fn current_context(&self, _date: NaiveDate) -> LiturgicalContext {
        self.context.clone()
    }
}
