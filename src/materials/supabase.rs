//! Material store backed by a Supabase project (PostgREST API).
//!
//! Query shape:
//! `GET {url}/rest/v1/materials?select=*&order=created_at.desc&limit=N[&subject=ilike.*s*][&type=eq.t]`

use async_trait::async_trait;
use reqwest::Client;
use tracing::debug;
use url::Url;

use crate::config::SupabaseConfig;
use crate::types::Material;

use super::error::{StoreError, StoreResult};
use super::store::{MaterialQuery, MaterialStore};

const MATERIALS_PATH: &str = "rest/v1/materials";
const MAX_ERROR_BODY_CHARS: usize = 512;

/// PostgREST client for the `materials` table.
pub struct SupabaseStore {
    client: Client,
    endpoint: Url,
    service_key: String,
}

impl SupabaseStore {
    /// Create a store client.
    ///
    /// # Errors
    /// Returns an error if the project URL is invalid or the HTTP client cannot be built.
    pub fn new(config: &SupabaseConfig) -> StoreResult<Self> {
        let mut base = Url::parse(&config.url)?;
        if !base.path().ends_with('/') {
            let path = format!("{}/", base.path());
            base.set_path(&path);
        }
        let endpoint = base.join(MATERIALS_PATH)?;

        let client = Client::builder()
            .timeout(config.request_timeout)
            .gzip(true)
            .build()?;

        Ok(Self {
            client,
            endpoint,
            service_key: config.service_key.clone(),
        })
    }

    /// Full URL of the materials table.
    #[must_use]
    pub const fn endpoint(&self) -> &Url {
        &self.endpoint
    }
}

/// PostgREST query parameters for `query`.
fn query_params(query: &MaterialQuery) -> Vec<(&'static str, String)> {
    let mut params = vec![
        ("select", "*".to_string()),
        ("order", "created_at.desc".to_string()),
        ("limit", query.limit.to_string()),
    ];
    if let Some(subject) = &query.subject {
        params.push(("subject", format!("ilike.*{}*", subject.trim())));
    }
    if let Some(material_type) = query.material_type {
        params.push(("type", format!("eq.{material_type}")));
    }
    params
}

#[async_trait]
impl MaterialStore for SupabaseStore {
    async fn fetch_materials(&self, query: &MaterialQuery) -> StoreResult<Vec<Material>> {
        let response = self
            .client
            .get(self.endpoint.clone())
            .query(&query_params(query))
            .header("apikey", &self.service_key)
            .bearer_auth(&self.service_key)
            .header(reqwest::header::ACCEPT, "application/json")
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;
        if !status.is_success() {
            return Err(StoreError::HttpStatus {
                status: status.as_u16(),
                body: body.chars().take(MAX_ERROR_BODY_CHARS).collect(),
            });
        }

        let materials: Vec<Material> = serde_json::from_str(&body)?;
        debug!(count = materials.len(), ?query, "materials fetched");
        Ok(materials)
    }
}
