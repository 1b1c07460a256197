use blink_core::UrlRecord;
use serde::{Deserialize, Serialize};

#[derive(Debug, Deserialize)]
pub struct ShortenRequest {
    pub url: String,
    #[serde(default)]
    pub custom_slug: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct ShortenResponse {
    pub short_url: String,
}

#[derive(Debug, Serialize)]
pub struct UrlInfoResponse {
    pub short_code: String,
    pub original_url: String,
    pub click_count: u64,
    pub custom_slug: Option<String>,
}

impl From<UrlRecord> for UrlInfoResponse {
    fn from(record: UrlRecord) -> Self {
        Self {
            short_code: record.short_code.as_str().to_string(),
            original_url: record.original_url,
            click_count: record.click_count,
            custom_slug: record.custom_slug,
        }
    }
}
