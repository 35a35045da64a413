//! Pick the next quote for a popup.

use crate::assets::AssetSource;
use crate::day::DayOfWeek;
use crate::error::{JaculatoriaError, Result};
use crate::liturgy::{LiturgicalCalendar, LiturgicalContext};
use crate::quotes::selector::{next_image_index, next_quote_index, select_quote};
use crate::quotes::{QuoteIndices, QuotesCollection, merge_feast_quotes};
use crate::scheduler::PrayerSchedule;
use crate::settings::Settings;
use crate::store::{IndicesStore, SettingsStore};
use crate::usecase::dto::{QuoteDto, path_string};
use std::sync::Arc;
use tracing::{debug, warn};

/// Selects the next quote and image in the day's rotation and persists the
/// advanced cursors.
///
/// Two overlapping calls read the same cursor snapshot and the last save
/// wins; a quote may repeat but nothing is corrupted.
pub struct GetNextQuoteUseCase {
    settings: SettingsStore,
    indices: IndicesStore,
    assets: Arc<dyn AssetSource>,
    calendar: Arc<dyn LiturgicalCalendar>,
    schedule: Arc<dyn PrayerSchedule>,
}

/// Quote pool for one request.
struct Pool {
    collection: QuotesCollection,
    /// `(slug, display name)` when the feast pool replaced the day's quotes.
    feast: Option<(String, Option<String>)>,
}

impl GetNextQuoteUseCase {
    #[must_use]
    pub fn new(
        settings: SettingsStore,
        indices: IndicesStore,
        assets: Arc<dyn AssetSource>,
        calendar: Arc<dyn LiturgicalCalendar>,
        schedule: Arc<dyn PrayerSchedule>,
    ) -> Self {
        Self {
            settings,
            indices,
            assets,
            calendar,
            schedule,
        }
    }

    /// Select the next quote.
    ///
    /// # Errors
    ///
    /// Returns [`JaculatoriaError::QuotesNotFound`] when the resolved pool
    /// for the day is missing or empty, and [`JaculatoriaError::Asset`] when
    /// the quote files cannot be read. Calendar and cursor problems are
    /// healed, never reported.
    pub async fn execute(&self) -> Result<QuoteDto> {
        let settings = self.settings.load();
        let day = self.schedule.day_of_week();
        let mut indices = self.indices.load(day);
        let context = self.calendar.current_context(self.schedule.today()).await;

        let pool = self.resolve_pool(&settings, day, &context)?;
        let not_found = || JaculatoriaError::QuotesNotFound { day };

        let total = pool.collection.quotes_for(day).map_or(0, <[String]>::len);
        let advance =
            next_quote_index(day, total, indices.quote_index(day)).ok_or_else(not_found)?;
        let text = select_quote(&pool.collection, day, advance.current_index)
            .ok_or_else(not_found)?
            .to_owned();
        let theme = pool
            .collection
            .day(day)
            .map(|entry| entry.theme.clone())
            .unwrap_or_default();
        indices.set_quote_index(day, advance.next_index);

        let image = self.resolve_image(day, &context, &mut indices);

        indices.last_day = day;
        if let Err(e) = self.indices.save(&indices) {
            warn!("rotation cursors not saved: {e}");
        }

        debug!(%day, season = %context.season, feast = pool.feast.is_some(), "quote selected");
        let (feast, feast_name) = match pool.feast {
            Some((slug, name)) => (Some(slug), name),
            None => (None, None),
        };
        Ok(QuoteDto {
            text,
            image,
            day,
            theme,
            season: context.season,
            feast,
            feast_name,
        })
    }

    /// Feast pool when non-empty, otherwise the seasonal collection.
    fn resolve_pool(
        &self,
        settings: &Settings,
        day: DayOfWeek,
        context: &LiturgicalContext,
    ) -> Result<Pool> {
        if let Some(slug) = context.feast() {
            let curated = self.assets.load_feast_quotes(slug);
            let merged = merge_feast_quotes(&curated, &context.api_quotes);
            if !merged.is_empty() {
                let theme = context.feast_name.clone().unwrap_or_else(|| slug.to_owned());
                return Ok(Pool {
                    collection: QuotesCollection::single_day(day, theme, merged),
                    feast: Some((slug.to_owned(), context.feast_name.clone())),
                });
            }
            debug!(slug, "feast has no quotes, using the seasonal pool");
        }

        Ok(Pool {
            collection: self.assets.load_quotes(settings.language(), context.season)?,
            feast: None,
        })
    }

    /// Feast image when the feast has one, otherwise the next day image.
    /// Only the cursor that was drawn from advances.
    fn resolve_image(
        &self,
        day: DayOfWeek,
        context: &LiturgicalContext,
        indices: &mut QuoteIndices,
    ) -> Option<String> {
        if let Some(slug) = context.feast()
            && let Some(image) = self
                .assets
                .feast_image_path(slug, indices.feast_image_index(slug))
        {
            indices.set_feast_image_index(slug, image.next_index);
            return Some(path_string(&image.path));
        }

        let images = self.assets.list_day_images(day, context.season);
        let advance = next_image_index(day, images.len(), indices.image_index(day))?;
        indices.set_image_index(day, advance.next_index);
        images
            .get(advance.current_index)
            .map(|path| path_string(path))
    }
}
