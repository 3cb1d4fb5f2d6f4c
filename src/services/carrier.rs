use crate::{config::AppConfig, errors::ServiceError};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{error, instrument};
use utoipa::ToSchema;

/// Delivery fee quote as returned by the carrier, passed through verbatim.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct DeliveryFees {
    pub wilaya_id: i32,
    pub home_delivery: Option<serde_json::Value>,
    pub desk_delivery: Option<serde_json::Value>,
}

/// Thin proxy over the third-party shipping-carrier API.
///
/// The base URL and bearer token are injected from [`AppConfig`] at
/// construction; nothing here touches process environment at request time.
#[derive(Clone)]
pub struct CarrierService {
    http: reqwest::Client,
    base_url: String,
    api_token: Option<String>,
}

impl CarrierService {
    pub fn new(config: &AppConfig) -> Result<Self, ServiceError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.carrier_timeout_secs))
            .build()
            .map_err(|e| ServiceError::InternalError(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            http,
            base_url: config.carrier_api_url.trim_end_matches('/').to_string(),
            api_token: config.carrier_api_token.clone(),
        })
    }

    /// Fetches per-wilaya delivery fees from the carrier.
    #[instrument(skip(self))]
    pub async fn delivery_fees(&self, wilaya_id: i32) -> Result<DeliveryFees, ServiceError> {
        let token = self.api_token.as_deref().ok_or_else(|| {
            ServiceError::InvalidOperation("Carrier API token is not configured".to_string())
        })?;

        let url = format!("{}/fees", self.base_url);
        let response = self
            .http
            .get(&url)
            .query(&[("wilaya_id", wilaya_id)])
            .bearer_auth(token)
            .send()
            .await
            .map_err(|e| {
                error!(error = %e, wilaya_id, "Carrier request failed");
                ServiceError::ExternalServiceError(format!("Carrier request failed: {}", e))
            })?;

        let status = response.status();
        if !status.is_success() {
            error!(%status, wilaya_id, "Carrier returned an error status");
            return Err(ServiceError::ExternalServiceError(format!(
                "Carrier returned status {}",
                status
            )));
        }

        response.json::<DeliveryFees>().await.map_err(|e| {
            error!(error = %e, wilaya_id, "Carrier returned unparseable body");
            ServiceError::ExternalServiceError(format!("Invalid carrier response: {}", e))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AppConfig;

    fn config_without_token() -> AppConfig {
        AppConfig::new(
            "sqlite::memory:".into(),
            "127.0.0.1".into(),
            8080,
            "development".into(),
        )
    }

    #[tokio::test]
    async fn missing_token_is_an_invalid_operation_not_a_panic() {
        let service = CarrierService::new(&config_without_token()).unwrap();
        let err = service.delivery_fees(16).await.unwrap_err();
        assert!(matches!(err, ServiceError::InvalidOperation(_)));
    }

    #[test]
    fn base_url_trailing_slash_is_normalized() {
        let mut cfg = config_without_token();
        cfg.carrier_api_url = "https://api.carrier.example/".into();
        let service = CarrierService::new(&cfg).unwrap();
        assert_eq!(service.base_url, "https://api.carrier.example");
    }
}
