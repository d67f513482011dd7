use std::time::Duration;

use anyhow::{Context, Result};
use log::{debug, info};
use reqwest::Client;
use serde::Deserialize;

use crate::config::SonarConfig;
use crate::models::issue::Issue;

/// Response envelope for the issue search endpoint
#[derive(Debug, Deserialize)]
struct SearchResponse {
    total: usize,
    issues: Vec<Issue>,
}

/// REST client for the issue server.
///
/// Plain request/response plumbing: paginated search plus raw source
/// fetch. No state beyond the connection settings.
pub struct SonarClient {
    client: Client,
    config: SonarConfig,
}

impl SonarClient {
    pub fn new(config: &SonarConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self {
            client,
            config: config.clone(),
        })
    }

    /// Fetch open issues for the configured project, paginating until the
    /// server's total or the configured cap is reached.
    pub async fn search_issues(&self) -> Result<Vec<Issue>> {
        let url = format!("{}/api/issues/search", self.config.base_url);
        let mut issues = Vec::new();
        let mut page = 1;

        loop {
            let mut request = self
                .client
                .get(&url)
                .basic_auth(&self.config.token, None::<&str>)
                .query(&[
                    ("componentKeys", self.config.project_key.as_str()),
                    ("statuses", "OPEN,CONFIRMED,REOPENED"),
                ])
                .query(&[("p", page), ("ps", self.config.page_size)]);

            if !self.config.severities.is_empty() {
                request = request.query(&[("severities", self.config.severities.join(","))]);
            }

            let response = request
                .send()
                .await
                .context("Failed to send issue search request")?;

            let status = response.status();
            if !status.is_success() {
                let error_text = response.text().await.unwrap_or_default();
                return Err(anyhow::anyhow!(
                    "Issue search failed ({}): {}",
                    status,
                    error_text
                ));
            }

            let body: SearchResponse = response
                .json()
                .await
                .context("Failed to parse issue search response")?;

            debug!(
                "Fetched page {} with {} issues (total {})",
                page,
                body.issues.len(),
                body.total
            );

            let page_len = body.issues.len();
            issues.extend(body.issues);

            if issues.len() >= self.config.max_issues {
                issues.truncate(self.config.max_issues);
                break;
            }
            if issues.len() >= body.total || page_len == 0 {
                break;
            }
            page += 1;
        }

        info!("Fetched {} issues for {}", issues.len(), self.config.project_key);
        Ok(issues)
    }

    /// Fetch the full raw text of a component.
    pub async fn fetch_raw_source(&self, component: &str) -> Result<String> {
        let url = format!("{}/api/sources/raw", self.config.base_url);
        let response = self
            .client
            .get(&url)
            .basic_auth(&self.config.token, None::<&str>)
            .query(&[("key", component)])
            .send()
            .await
            .context(format!("Failed to fetch raw source for {}", component))?;

        let status = response.status();
        if !status.is_success() {
            return Err(anyhow::anyhow!(
                "Raw source fetch failed for {} ({})",
                component,
                status
            ));
        }

        response
            .text()
            .await
            .context(format!("Failed to read raw source for {}", component))
    }
}
