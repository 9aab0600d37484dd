use crate::error::SdkError;
use crate::validation::validate_date;
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use time::OffsetDateTime;

/// A geolocation update, in lat/lng coordinates.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[non_exhaustive]
pub struct Location {
    pub latitude: f64,
    pub longitude: f64,
    #[serde(default, with = "time::serde::rfc3339::option")]
    pub date: Option<OffsetDateTime>,
    /// Precision radius in meters.
    pub precision: Option<f64>,
}

impl Location {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self { latitude, longitude, date: None, precision: None }
    }

    pub fn with_date(mut self, date: OffsetDateTime) -> Self {
        self.date = Some(date);
        self
    }

    pub fn with_precision(mut self, meters: f64) -> Self {
        self.precision = Some(meters);
        self
    }

    /// Checks coordinates and precision, and normalizes the date to UTC.
    pub fn validated(mut self) -> Result<Self, SdkError> {
        if !self.latitude.is_finite() || !(-90.0..=90.0).contains(&self.latitude) {
            return Err(SdkError::invalid_argument(
                "latitude",
                "latitude must be a finite number between -90 and 90",
            )
            .with_detail("value", JsonValue::from(self.latitude)));
        }
        if !self.longitude.is_finite() || !(-180.0..=180.0).contains(&self.longitude) {
            return Err(SdkError::invalid_argument(
                "longitude",
                "longitude must be a finite number between -180 and 180",
            )
            .with_detail("value", JsonValue::from(self.longitude)));
        }
        if let Some(precision) = self.precision {
            if !precision.is_finite() || precision < 0.0 {
                return Err(SdkError::invalid_argument(
                    "precision",
                    "precision must be a finite, non-negative radius in meters",
                ));
            }
        }
        if let Some(date) = self.date {
            let date = validate_date(date)
                .map_err(|err| SdkError::invalid_argument("date", err.to_string()))?;
            self.date = Some(date);
        }
        Ok(self)
    }
}
