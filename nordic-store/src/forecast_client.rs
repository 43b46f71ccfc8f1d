use async_trait::async_trait;
use serde::Deserialize;
use std::time::Duration;
use tracing::{debug, warn};

use nordic_core::forecast::{DemandForecaster, Forecast, ForecastError, ForecastQuery};

/// Client for the external forecast service (`POST {base}/forecast`).
pub struct HttpForecastClient {
    client: reqwest::Client,
    endpoint: String,
}

#[derive(Debug, Deserialize)]
struct ForecastResponse {
    #[serde(default)]
    success: bool,
    forecasted_sales: Option<f64>,
    suggested_stock: Option<f64>,
    error: Option<String>,
}

impl HttpForecastClient {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()?;

        Ok(Self {
            client,
            endpoint: format!("{}/forecast", base_url.trim_end_matches('/')),
        })
    }
}

#[async_trait]
impl DemandForecaster for HttpForecastClient {
    async fn forecast(&self, query: &ForecastQuery) -> Result<Forecast, ForecastError> {
        let response = self.client
            .post(&self.endpoint)
            .json(query)
            .send()
            .await
            .map_err(|e| ForecastError::Unavailable(e.to_string()))?;

        let status = response.status();
        let body: ForecastResponse = response
            .json()
            .await
            .map_err(|e| ForecastError::Malformed(e.to_string()))?;

        if !status.is_success() || !body.success {
            let detail = body.error.unwrap_or_else(|| format!("status {}", status.as_u16()));
            warn!("Forecast service rejected {}/{}: {}", query.product_name, query.country, detail);
            return Err(ForecastError::Rejected(detail));
        }

        let forecasted_sales = body.forecasted_sales
            .filter(|v| v.is_finite())
            .ok_or_else(|| ForecastError::Malformed("missing forecasted_sales".to_string()))?;

        debug!("Forecast for {}/{}: {}", query.product_name, query.country, forecasted_sales);
        Ok(Forecast {
            forecasted_sales,
            suggested_stock: body.suggested_stock.filter(|v| v.is_finite()).unwrap_or(forecasted_sales),
            source: "forecast-service".to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_endpoint_joins_base_url() {
        let client = HttpForecastClient::new("http://localhost:8000/", Duration::from_millis(100)).unwrap();
        assert_eq!(client.endpoint, "http://localhost:8000/forecast");
    }

    #[test]
    fn test_response_parsing_tolerates_missing_fields() {
        let body: ForecastResponse = serde_json::from_str(r#"{"success": false, "error": "model not loaded"}"#).unwrap();
        assert!(!body.success);
        assert!(body.forecasted_sales.is_none());
        assert_eq!(body.error.as_deref(), Some("model not loaded"));
    }

    #[tokio::test]
    async fn test_unreachable_service_is_unavailable() {
        // Nothing listens on port 9 locally
        let client = HttpForecastClient::new("http://127.0.0.1:9", Duration::from_millis(200)).unwrap();
        let err = client.forecast(&ForecastQuery::new("soap", "sweden", 6)).await.unwrap_err();
        assert!(matches!(err, ForecastError::Unavailable(_)));
    }
}
