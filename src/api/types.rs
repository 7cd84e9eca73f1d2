use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Provider response shapes (weatherapi.com /current.json)
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Deserialize)]
pub struct CurrentResponse {
    #[serde(default)]
    pub location: Option<Location>,
    pub current: Current,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Location {
    pub name: String,
    #[serde(default)]
    pub region: Option<String>,
    #[serde(default)]
    pub country: Option<String>,
    #[serde(default)]
    pub localtime: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Current {
    pub temp_c: f64,
    pub condition: Condition,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Condition {
    pub text: String,
    pub icon: String,
}

/// Error envelope the provider returns on non-2xx responses.
#[derive(Debug, Clone, Deserialize)]
pub struct ErrorResponse {
    pub error: ErrorBody,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ErrorBody {
    #[serde(default)]
    pub code: Option<u32>,
    pub message: String,
}

// ---------------------------------------------------------------------------
// Domain record
// ---------------------------------------------------------------------------

/// One city's current conditions as shown in the card grid.
///
/// `title` is the configured city name, not the provider's echo of it, so
/// lookups against the configured list stay exact.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CityWeather {
    pub title: String,
    pub temp_c: f64,
    pub description: String,
    pub icon_url: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub country: Option<String>,
}

impl CityWeather {
    /// Map a provider response into the domain record.
    pub fn from_response(title: impl Into<String>, resp: &CurrentResponse) -> Self {
        Self {
            title: title.into(),
            temp_c: resp.current.temp_c,
            description: resp.current.condition.text.clone(),
            icon_url: normalize_icon_url(&resp.current.condition.icon),
            country: resp.location.as_ref().and_then(|l| l.country.clone()),
        }
    }
}

/// The provider sends protocol-relative icon URLs (`//cdn.weatherapi.com/...`).
fn normalize_icon_url(icon: &str) -> String {
    if let Some(rest) = icon.strip_prefix("//") {
        format!("https://{rest}")
    } else {
        icon.to_string()
    }
}
