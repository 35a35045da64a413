//! Pick the Marian antiphon or canonical-hour prayer.

use crate::assets::AssetSource;
use crate::error::{JaculatoriaError, Result};
use crate::liturgy::{LiturgicalCalendar, LiturgicalSeason};
use crate::scheduler::PrayerSchedule;
use crate::settings::CanonicalHour;
use crate::store::SettingsStore;
use crate::usecase::dto::{PrayerDto, PrayerKind, path_string};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Parameters of `get-prayer`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct PrayerRequest {
    /// Overrides the Easter-time decision when present.
    pub force_easter_time: Option<bool>,
    /// Return this hour's prayer instead of the noon antiphon.
    pub hour: Option<CanonicalHour>,
}

/// Returns the Angelus, or the Regina Caeli during Easter time, or the
/// prayer of a canonical hour.
pub struct GetPrayerUseCase {
    settings: SettingsStore,
    assets: Arc<dyn AssetSource>,
    calendar: Arc<dyn LiturgicalCalendar>,
    schedule: Arc<dyn PrayerSchedule>,
}

impl GetPrayerUseCase {
    #[must_use]
    pub fn new(
        settings: SettingsStore,
        assets: Arc<dyn AssetSource>,
        calendar: Arc<dyn LiturgicalCalendar>,
        schedule: Arc<dyn PrayerSchedule>,
    ) -> Self {
        Self {
            settings,
            assets,
            calendar,
            schedule,
        }
    }

    /// # Errors
    ///
    /// Returns [`JaculatoriaError::Asset`] when the prayer file is missing
    /// or has no prayer for the requested hour.
    pub async fn execute(&self, request: PrayerRequest) -> Result<PrayerDto> {
        let settings = self.settings.load();
        let season = self
            .calendar
            .current_context(self.schedule.today())
            .await
            .season;
        let book = self.assets.load_prayers(settings.language())?;

        if let Some(hour) = request.hour {
            let prayer = book.hours.get(&hour).ok_or_else(|| {
                JaculatoriaError::Asset(format!(
                    "no {} prayer for {}",
                    hour.as_str(),
                    settings.language().as_str()
                ))
            })?;
            return Ok(PrayerDto {
                kind: PrayerKind::Hour,
                title: prayer.title.clone(),
                text: prayer.text.clone(),
                image: None,
                season,
                hour: Some(hour),
            });
        }

        let easter = request
            .force_easter_time
            .unwrap_or_else(|| settings.easter_time() || season == LiturgicalSeason::Easter);
        let (kind, prayer, image) = if easter {
            (
                PrayerKind::ReginaCaeli,
                book.regina_caeli,
                self.assets.regina_caeli_image_path(),
            )
        } else {
            (
                PrayerKind::Angelus,
                book.angelus,
                self.assets.angelus_image_path(),
            )
        };

        Ok(PrayerDto {
            kind,
            title: prayer.title,
            text: prayer.text,
            image: image.as_deref().map(path_string),
            season,
            hour: None,
        })
    }
}
