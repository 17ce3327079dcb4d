//! Cloudinary Admin API catalog.

use super::{CatalogPage, MediaCatalog, MediaResource};
use crate::config::CatalogSettings;
use crate::error::{HarkError, Result};
use async_trait::async_trait;
use serde::Deserialize;
use tracing::{debug, instrument};
use url::Url;

/// Lists uploaded video resources of a Cloudinary cloud.
pub struct CloudinaryCatalog {
    client: reqwest::Client,
    endpoint: Url,
    api_key: String,
    api_secret: String,
    page_size: u32,
}

#[derive(Debug, Deserialize)]
struct ResourcesResponse {
    #[serde(default)]
    resources: Vec<ResourceEntry>,
    next_cursor: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ResourceEntry {
    public_id: String,
    secure_url: String,
}

impl CloudinaryCatalog {
    /// Create a catalog client from settings.
    ///
    /// Fails if the cloud name or credentials are missing.
    pub fn new(settings: &CatalogSettings, client: reqwest::Client) -> Result<Self> {
        let require = |value: &Option<String>, key: &str| {
            value.clone().filter(|v| !v.is_empty()).ok_or_else(|| {
                HarkError::Config(format!(
                    "catalog.{} is not set (or set CLOUDINARY_{})",
                    key,
                    key.to_uppercase()
                ))
            })
        };

        let cloud_name = require(&settings.cloud_name, "cloud_name")?;
        let api_key = require(&settings.api_key, "api_key")?;
        let api_secret = require(&settings.api_secret, "api_secret")?;

        let endpoint = Url::parse(&format!(
            "{}/v1_1/{}/resources/video/upload",
            settings.base_url.trim_end_matches('/'),
            cloud_name
        ))
        .map_err(|e| HarkError::Config(format!("Invalid catalog.base_url: {}", e)))?;

        Ok(Self {
            client,
            endpoint,
            api_key,
            api_secret,
            page_size: settings.page_size,
        })
    }

    fn page_url(&self, cursor: Option<&str>) -> Url {
        let mut url = self.endpoint.clone();
        {
            let mut query = url.query_pairs_mut();
            query.append_pair("max_results", &self.page_size.to_string());
            if let Some(cursor) = cursor {
                query.append_pair("next_cursor", cursor);
            }
        }
        url
    }
}

#[async_trait]
impl MediaCatalog for CloudinaryCatalog {
    #[instrument(skip(self))]
    async fn list(&self, cursor: Option<&str>) -> Result<CatalogPage> {
        let url = self.page_url(cursor);

        let response = self
            .client
            .get(url)
            .basic_auth(&self.api_key, Some(&self.api_secret))
            .send()
            .await
            .map_err(|e| HarkError::CatalogUnavailable(format!("listing request failed: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(HarkError::CatalogUnavailable(format!(
                "listing returned {}: {}",
                status, body
            )));
        }

        let body: ResourcesResponse = response.json().await.map_err(|e| {
            HarkError::CatalogUnavailable(format!("unreadable listing response: {}", e))
        })?;

        debug!("Listed {} resources", body.resources.len());

        Ok(CatalogPage {
            resources: body
                .resources
                .into_iter()
                .map(|r| MediaResource::new(r.public_id, r.secure_url))
                .collect(),
            next_cursor: body.next_cursor,
        })
    }
}
