use crate::api::types::CurrentResponse;
use crate::api::{ApiClientError, WeatherApiClient};

impl WeatherApiClient {
    /// Fetch current conditions for one city or location query.
    pub async fn current(&self, city: &str) -> Result<CurrentResponse, ApiClientError> {
        let url = Self::url(&format!("/current.json?q={}", urlencoding::encode(city)));
        self.keyed_get(&url).await
    }
}
