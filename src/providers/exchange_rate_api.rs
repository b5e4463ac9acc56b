use anyhow::{Result, anyhow};
use async_trait::async_trait;
use chrono::{NaiveDate, TimeZone, Utc};
use serde::Deserialize;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, instrument};

use crate::core::cache::Cache;
use crate::core::currency::{ExchangeRateProvider, ExchangeRateTable};

pub const DEFAULT_BASE_URL: &str = "https://api.exchangerate-api.com";

/// Rate tables from an exchangerate-api compatible `/v4/latest/{base}` endpoint.
pub struct ExchangeRateApiProvider {
    base_url: String,
    cache: Arc<Cache<String, ExchangeRateTable>>,
}

impl ExchangeRateApiProvider {
    pub fn new(base_url: &str, cache: Arc<Cache<String, ExchangeRateTable>>) -> Self {
        ExchangeRateApiProvider {
            base_url: base_url.trim_end_matches('/').to_string(),
            cache,
        }
    }
}

#[derive(Debug, Deserialize)]
struct LatestRatesResponse {
    base: String,
    date: Option<String>,
    rates: HashMap<String, f64>,
}

#[async_trait]
impl ExchangeRateProvider for ExchangeRateApiProvider {
    #[instrument(name = "ExchangeRateFetch", skip(self), fields(base = %base))]
    async fn fetch_rates(&self, base: &str) -> Result<ExchangeRateTable> {
        let base = base.to_uppercase();
        if let Some(cached) = self.cache.get(&base).await {
            return Ok(cached);
        }

        let url = format!("{}/v4/latest/{}", self.base_url, base);
        debug!("Requesting exchange rates from {}", url);

        let client = reqwest::Client::builder()
            .user_agent("fintrack/1.0")
            .build()?;
        let response = client
            .get(&url)
            .send()
            .await
            .map_err(|e| anyhow!("Request error: {} for base currency: {}", e, base))?;

        if !response.status().is_success() {
            return Err(anyhow!(
                "HTTP error: {} for base currency: {}",
                response.status(),
                base
            ));
        }

        let text = response.text().await?;
        let data: LatestRatesResponse = serde_json::from_str(&text)
            .map_err(|e| anyhow!("Failed to parse rates response for {}: {}", base, e))?;

        if !data.base.eq_ignore_ascii_case(&base) {
            return Err(anyhow!(
                "Rate service answered for {} instead of {}",
                data.base,
                base
            ));
        }
        if let Some((code, rate)) = data.rates.iter().find(|(_, r)| !r.is_finite() || **r <= 0.0) {
            return Err(anyhow!("Invalid rate {} for {} in response", rate, code));
        }

        let mut table = ExchangeRateTable::new(&base, data.rates);
        if let Some(date) = data
            .date
            .as_deref()
            .and_then(|d| NaiveDate::parse_from_str(d, "%Y-%m-%d").ok())
            .and_then(|d| d.and_hms_opt(0, 0, 0))
        {
            table.fetched_at = Some(Utc.from_utc_datetime(&date));
        }
        debug!("Received {} rates for {}", table.rates.len(), base);

        self.cache.put(base, table.clone()).await;
        Ok(table)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    async fn create_mock_server(base: &str, status: u16, body: &str) -> MockServer {
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path(format!("/v4/latest/{base}")))
            .respond_with(ResponseTemplate::new(status).set_body_string(body))
            .mount(&mock_server)
            .await;
        mock_server
    }

    #[tokio::test]
    async fn test_successful_rates_fetch() {
        let mock_response = r#"{
            "base": "USD",
            "date": "2026-10-15",
            "time_last_updated": 1792022401,
            "rates": {"USD": 1, "EUR": 0.85, "GBP": 0.75, "JPY": 149.2}
        }"#;
        let mock_server = create_mock_server("USD", 200, mock_response).await;
        let provider = ExchangeRateApiProvider::new(&mock_server.uri(), Arc::new(Cache::new()));

        let table = provider.fetch_rates("usd").await.unwrap();
        assert_eq!(table.base, "USD");
        assert_eq!(table.rate("EUR"), Some(0.85));
        assert_eq!(table.rates.len(), 4);
        assert_eq!(
            table.fetched_at,
            Some(Utc.with_ymd_and_hms(2026, 10, 15, 0, 0, 0).unwrap())
        );
        assert!((table.convert(100.0, "EUR", "GBP") - 88.235).abs() < 0.001);
    }

    #[tokio::test]
    async fn test_cached_rates_skip_network() {
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v4/latest/EUR"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_string(r#"{"base": "EUR", "rates": {"USD": 1.17}}"#),
            )
            .expect(1)
            .mount(&mock_server)
            .await;

        let provider = ExchangeRateApiProvider::new(&mock_server.uri(), Arc::new(Cache::new()));
        let first = provider.fetch_rates("EUR").await.unwrap();
        let second = provider.fetch_rates("EUR").await.unwrap();
        assert_eq!(first, second);
        assert!(first.fetched_at.is_some());
    }

    #[tokio::test]
    async fn test_http_error_is_reported() {
        let mock_server = create_mock_server("USD", 503, "unavailable").await;
        let provider = ExchangeRateApiProvider::new(&mock_server.uri(), Arc::new(Cache::new()));

        let err = provider.fetch_rates("USD").await.unwrap_err();
        assert!(err.to_string().contains("HTTP error"), "{err}");
    }

    #[tokio::test]
    async fn test_malformed_body_is_reported() {
        let mock_server = create_mock_server("USD", 200, r#"{"result": "error"}"#).await;
        let provider = ExchangeRateApiProvider::new(&mock_server.uri(), Arc::new(Cache::new()));

        let err = provider.fetch_rates("USD").await.unwrap_err();
        assert!(err.to_string().contains("Failed to parse"), "{err}");
    }

    #[tokio::test]
    async fn test_non_positive_rate_is_rejected() {
        let body = r#"{"base": "USD", "rates": {"EUR": 0.0}}"#;
        let mock_server = create_mock_server("USD", 200, body).await;
        let provider = ExchangeRateApiProvider::new(&mock_server.uri(), Arc::new(Cache::new()));

        assert!(provider.fetch_rates("USD").await.is_err());
    }
}
