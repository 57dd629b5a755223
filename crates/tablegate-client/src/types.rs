//! Request and response types for the backend API.

use serde::{Deserialize, Deserializer, Serialize};

/// Identity payload returned by the auth service.
///
/// The client never inspects it; `check-auth` returns the token identity
/// (an email string) while `google_login` returns a profile object.
pub type User = serde_json::Value;

// ─────────────────────────────────────────────────────────────────────────────
// Auth
// ─────────────────────────────────────────────────────────────────────────────

/// Response from `GET /auth/check-auth`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CheckAuthResponse {
    #[serde(default)]
    pub authenticated: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user: Option<User>,
}

/// Request body for `POST /auth/google_login`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GoogleLoginRequest {
    /// Authorization code from the OAuth consent flow.
    pub code: String,
}

/// Response from `POST /auth/google_login`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LoginResponse {
    #[serde(default)]
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user: Option<User>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Response from `POST /auth/logout`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LogoutResponse {
    #[serde(default)]
    pub success: bool,
}

// ─────────────────────────────────────────────────────────────────────────────
// Scrape
// ─────────────────────────────────────────────────────────────────────────────

/// Shown when a restaurant has no price band.
pub const PRICE_FALLBACK: &str = "Price not specified";

/// Shown when a restaurant has no description.
pub const DESCRIPTION_FALLBACK: &str = "No description available for this restaurant.";

/// One restaurant in the scraped listing.
///
/// Every field may be missing or `null`; one sparse item must not fail the
/// whole listing. Text fields decode to empty strings and the `*_label`
/// accessors supply the display fallbacks.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Restaurant {
    /// Server-assigned identifier. The current backend never sends one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<serde_json::Value>,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub description: String,
    /// Normalized price band ("Average", "Pricey", "Bargain" or "Unavailable").
    #[serde(default, deserialize_with = "null_as_empty")]
    pub price: String,
}

fn null_as_empty<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

impl Restaurant {
    /// Create a restaurant with just a title.
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            id: None,
            title: title.into(),
            image: None,
            description: String::new(),
            price: String::new(),
        }
    }

    /// Set the price band.
    pub fn with_price(mut self, price: impl Into<String>) -> Self {
        self.price = price.into();
        self
    }

    /// Identifier used to address this restaurant in a detail view.
    ///
    /// Falls back to the listing position when the server sent no id.
    pub fn route_id(&self, index: usize) -> String {
        match &self.id {
            Some(serde_json::Value::String(s)) if !s.is_empty() => s.clone(),
            Some(serde_json::Value::Number(n)) => n.to_string(),
            _ => index.to_string(),
        }
    }

    /// Price band for display.
    pub fn price_label(&self) -> &str {
        if self.price.is_empty() {
            PRICE_FALLBACK
        } else {
            &self.price
        }
    }

    /// Description for display.
    pub fn description_label(&self) -> &str {
        if self.description.is_empty() {
            DESCRIPTION_FALLBACK
        } else {
            &self.description
        }
    }
}

/// Response from `GET /scrape`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ScrapeResponse {
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub restaurants: Vec<Restaurant>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}
