//! AI menu auto-fill.
//!
//! Asks a generative model for a starter menu (categories plus items) for a
//! cuisine and business name. The result is a suggestion only; nothing is
//! stored until the owner saves.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::json;
use thiserror::Error;
use tracing::{debug, warn};

/// Default Generative Language API endpoint.
pub const GEMINI_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";

/// Default model.
pub const DEFAULT_MODEL: &str = "gemini-1.5-flash";

/// Upper bound on a single generation round-trip.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(60);

/// Generator errors.
#[derive(Debug, Error)]
pub enum GeneratorError {
    #[error("menu generator request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("menu generator returned {status}: {body}")]
    Upstream { status: u16, body: String },

    #[error("menu generator returned no content")]
    EmptyResponse,

    #[error("menu generator returned malformed JSON: {0}")]
    Malformed(#[from] serde_json::Error),
}

/// A generated menu item.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeneratedItem {
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub price: f64,
    #[serde(default)]
    pub category: String,
}

/// A generated menu suggestion.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GeneratedMenu {
    #[serde(default)]
    pub categories: Vec<String>,
    #[serde(default)]
    pub items: Vec<GeneratedItem>,
}

impl GeneratedMenu {
    /// Make categories and items consistent with each other.
    ///
    /// Names are trimmed, empty and duplicate categories dropped, item
    /// categories missing from the list appended in first-seen order, nameless
    /// items dropped, and negative or non-finite prices clamped to 0.
    pub fn normalize(self) -> Self {
        let mut categories: Vec<String> = Vec::with_capacity(self.categories.len());
        let mut push_category = |name: &str| {
            if !name.is_empty() && !categories.iter().any(|c| c == name) {
                categories.push(name.to_string());
            }
        };

        for name in &self.categories {
            push_category(name.trim());
        }

        let items: Vec<GeneratedItem> = self
            .items
            .into_iter()
            .filter_map(|item| {
                let name = item.name.trim().to_string();
                if name.is_empty() {
                    return None;
                }
                let category = item.category.trim().to_string();
                push_category(&category);
                let price = if item.price.is_finite() && item.price > 0.0 {
                    item.price
                } else {
                    0.0
                };
                Some(GeneratedItem {
                    name,
                    description: item.description.trim().to_string(),
                    price,
                    category,
                })
            })
            .collect();

        Self { categories, items }
    }
}

/// Source of AI-generated menus.
#[async_trait]
pub trait MenuGenerator: Send + Sync {
    async fn generate_menu(
        &self,
        cuisine: &str,
        business_name: &str,
    ) -> Result<GeneratedMenu, GeneratorError>;
}

#[derive(Serialize)]
struct GenerateContentRequest {
    contents: Vec<Content>,
    #[serde(rename = "generationConfig")]
    generation_config: serde_json::Value,
}

#[derive(Serialize, Deserialize)]
struct Content {
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Serialize, Deserialize)]
struct Part {
    #[serde(default)]
    text: String,
}

#[derive(Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Deserialize)]
struct Candidate {
    content: Option<Content>,
}

/// Menu generator backed by the Gemini `generateContent` API.
#[derive(Clone)]
pub struct GeminiMenuGenerator {
    client: Client,
    api_key: String,
    model: String,
    base_url: String,
}

impl GeminiMenuGenerator {
    pub fn new(api_key: impl Into<String>, model: impl Into<String>) -> Self {
        Self::with_base_url(api_key, model, GEMINI_BASE_URL)
    }

    /// Point the generator at a different API root, e.g. a local stub.
    pub fn with_base_url(
        api_key: impl Into<String>,
        model: impl Into<String>,
        base_url: impl Into<String>,
    ) -> Self {
        Self {
            client: Client::builder()
                .timeout(REQUEST_TIMEOUT)
                .build()
                .unwrap_or_else(|_| Client::new()),
            api_key: api_key.into(),
            model: model.into(),
            base_url: base_url.into(),
        }
    }

    fn endpoint(&self) -> String {
        format!(
            "{}/models/{}:generateContent",
            self.base_url.trim_end_matches('/'),
            self.model
        )
    }
}

/// Prompt sent to the model.
pub fn menu_prompt(cuisine: &str, business_name: &str) -> String {
    format!(
        "Create a professional menu for a restaurant named \"{business_name}\" specializing in \
         {cuisine}. Provide a list of 10 items with creative names, descriptions, realistic \
         prices in EUR, and appropriate categories (e.g. Appetizers, Mains, Drinks)."
    )
}

/// JSON schema the model must answer with.
fn response_schema() -> serde_json::Value {
    json!({
        "type": "OBJECT",
        "properties": {
            "categories": { "type": "ARRAY", "items": { "type": "STRING" } },
            "items": {
                "type": "ARRAY",
                "items": {
                    "type": "OBJECT",
                    "properties": {
                        "name": { "type": "STRING" },
                        "description": { "type": "STRING" },
                        "price": { "type": "NUMBER" },
                        "category": { "type": "STRING" }
                    },
                    "required": ["name", "description", "price", "category"]
                }
            }
        },
        "required": ["categories", "items"]
    })
}

/// Extract the generated menu from a raw `generateContent` response body.
pub fn parse_generate_response(body: &str) -> Result<GeneratedMenu, GeneratorError> {
    let response: GenerateContentResponse = serde_json::from_str(body)?;
    let text = response
        .candidates
        .into_iter()
        .filter_map(|c| c.content)
        .flat_map(|c| c.parts)
        .map(|p| p.text)
        .find(|t| !t.trim().is_empty())
        .ok_or(GeneratorError::EmptyResponse)?;

    let menu: GeneratedMenu = serde_json::from_str(&text)?;
    Ok(menu.normalize())
}

#[async_trait]
impl MenuGenerator for GeminiMenuGenerator {
    async fn generate_menu(
        &self,
        cuisine: &str,
        business_name: &str,
    ) -> Result<GeneratedMenu, GeneratorError> {
        let request = GenerateContentRequest {
            contents: vec![Content {
                parts: vec![Part {
                    text: menu_prompt(cuisine, business_name),
                }],
            }],
            generation_config: json!({
                "responseMimeType": "application/json",
                "responseSchema": response_schema(),
            }),
        };

        let response = self
            .client
            .post(self.endpoint())
            .header("x-goog-api-key", &self.api_key)
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;
        if !status.is_success() {
            warn!(status = status.as_u16(), model = %self.model, "menu generation failed");
            return Err(GeneratorError::Upstream {
                status: status.as_u16(),
                body,
            });
        }

        let menu = parse_generate_response(&body)?;
        debug!(
            model = %self.model,
            categories = menu.categories.len(),
            items = menu.items.len(),
            "menu generated"
        );
        Ok(menu)
    }
}

impl std::fmt::Debug for GeminiMenuGenerator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GeminiMenuGenerator")
            .field("model", &self.model)
            .field("base_url", &self.base_url)
            .finish_non_exhaustive()
    }
}
