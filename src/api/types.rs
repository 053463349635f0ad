use serde::Deserialize;
use serde_json::Value;

/// Offer attributes sent to `offer/` on create.
///
/// The API owns validation; values are forwarded as-is and unset fields are
/// left out of the request body.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct OfferFields {
    pub title: Option<String>,
    pub description: Option<String>,
    pub base_inr: Option<String>,
    pub base_usd: Option<String>,
    pub quantity: Option<String>,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    pub venue: Option<String>,
    pub timezone: Option<String>,
    pub redirect_url: Option<String>,
    pub note: Option<String>,
    pub file_upload_json: Option<String>,
    pub cover_image_json: Option<String>,
}

impl OfferFields {
    /// Form parameters keyed by API field name, in a stable order.
    pub fn into_form(self) -> Vec<(String, String)> {
        [
            ("title", self.title),
            ("description", self.description),
            ("base_inr", self.base_inr),
            ("base_usd", self.base_usd),
            ("quantity", self.quantity),
            ("start_date", self.start_date),
            ("end_date", self.end_date),
            ("venue", self.venue),
            ("timezone", self.timezone),
            ("redirect_url", self.redirect_url),
            ("note", self.note),
            ("file_upload_json", self.file_upload_json),
            ("cover_image_json", self.cover_image_json),
        ]
        .into_iter()
        .filter_map(|(name, value)| value.map(|v| (name.to_string(), v)))
        .collect()
    }
}

/// The parts of an `auth/` response the client acts on.
#[derive(Debug, Deserialize)]
pub(crate) struct AuthResponse {
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub token: Option<String>,
}

/// The parts of a `DELETE auth/{token}/` or upload-url response the client acts on.
#[derive(Debug, Deserialize)]
pub(crate) struct StatusResponse {
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub upload_url: Option<String>,
}

impl AuthResponse {
    /// The issued token, if the response reports success and carries one.
    pub fn issued_token(response: &Value) -> Option<String> {
        let parsed: AuthResponse = serde_json::from_value(response.clone()).ok()?;
        if parsed.success {
            parsed.token.filter(|t| !t.is_empty())
        } else {
            None
        }
    }
}

impl StatusResponse {
    pub fn succeeded(response: &Value) -> bool {
        serde_json::from_value::<StatusResponse>(response.clone())
            .map(|r| r.success)
            .unwrap_or(false)
    }

    pub fn upload_url(response: &Value) -> Option<String> {
        let parsed: StatusResponse = serde_json::from_value(response.clone()).ok()?;
        if parsed.success { parsed.upload_url } else { None }
    }
}
