use std::time::Duration;

use chrono::{Datelike, NaiveDate};
use serde::Deserialize;
use tokio::runtime::Runtime;
use tracing::debug;

use super::resolver::{ConversionError, HebrewCalendarGateway};

pub const DEFAULT_HEBCAL_URL: &str = "https://www.hebcal.com/converter";

#[derive(Debug, Deserialize)]
struct HebcalResponse {
    #[serde(default)]
    hebrew: Option<String>,
    #[serde(default)]
    error: Option<String>,
}

/// Thin wrapper around the Hebcal converter endpoint allowing the synchronous
/// scan to resolve dates without exposing async details.
pub struct HebcalClient {
    http: reqwest::Client,
    base_url: String,
    runtime: Runtime,
}

impl HebcalClient {
    pub fn new(
        base_url: impl Into<String>,
        timeout: Duration,
        runtime: Runtime,
    ) -> Result<Self, ConversionError> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|err| ConversionError::Runtime(err.to_string()))?;

        Ok(Self {
            http,
            base_url: base_url.into(),
            runtime,
        })
    }

    pub fn with_runtime(
        base_url: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, ConversionError> {
        let runtime = Runtime::new().map_err(|err| ConversionError::Runtime(err.to_string()))?;
        Self::new(base_url, timeout, runtime)
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}

impl std::fmt::Debug for HebcalClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HebcalClient")
            .field("base_url", &self.base_url)
            .finish_non_exhaustive()
    }
}

impl HebrewCalendarGateway for HebcalClient {
    fn hebrew_date_text(&self, date: NaiveDate) -> Result<String, ConversionError> {
        let query = [
            ("cfg", "json".to_string()),
            ("gy", date.year().to_string()),
            ("gm", date.month().to_string()),
            ("gd", date.day().to_string()),
            ("g2h", "1".to_string()),
        ];
        debug!(%date, url = %self.base_url, "requesting Hebrew date");

        let (status, body) = self.runtime.block_on(async {
            let response = self
                .http
                .get(&self.base_url)
                .query(&query)
                .send()
                .await
                .map_err(|err| ConversionError::Unreachable(err.to_string()))?;
            let status = response.status();
            let body = response
                .text()
                .await
                .map_err(|err| ConversionError::Unreachable(err.to_string()))?;
            Ok::<_, ConversionError>((status, body))
        })?;

        let parsed = serde_json::from_str::<HebcalResponse>(&body);

        if !status.is_success() {
            return match parsed {
                Ok(HebcalResponse {
                    error: Some(reason),
                    ..
                }) => Err(ConversionError::Rejected { date, reason }),
                _ => Err(ConversionError::Unreachable(format!(
                    "converter answered HTTP {status}"
                ))),
            };
        }

        let response = parsed.map_err(|err| ConversionError::InvalidResponse(err.to_string()))?;
        if let Some(reason) = response.error {
            return Err(ConversionError::Rejected { date, reason });
        }

        response
            .hebrew
            .filter(|text| !text.trim().is_empty())
            .ok_or_else(|| ConversionError::InvalidResponse("missing 'hebrew' field".to_string()))
    }
}
