use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, AUTHORIZATION, USER_AGENT};
use reqwest::{Client, StatusCode};

use crate::config::ApiConfig;
use crate::error::{Result, TrackerError};
use crate::types::{Issue, IssueFilter, RepositoryMetadata};

/// Parameters for one page of `GET /repos/{owner}/{name}/issues`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IssueQuery {
    pub repository: String,
    pub filter: IssueFilter,
    pub page: u32,
    pub per_page: u8,
}

impl IssueQuery {
    pub fn query_pairs(&self) -> [(&'static str, String); 3] {
        [
            ("state", self.filter.as_api_str().to_string()),
            ("per_page", self.per_page.to_string()),
            ("page", self.page.to_string()),
        ]
    }
}

/// Read-only view of the GitHub REST API used by both screens
#[async_trait]
pub trait GitHubApi: Send + Sync + std::fmt::Debug {
    async fn get_repository(&self, full_name: &str) -> Result<RepositoryMetadata>;
    async fn list_issues(&self, query: &IssueQuery) -> Result<Vec<Issue>>;
}

pub struct GitHub {
    client: Client,
    base_url: String,
}

impl std::fmt::Debug for GitHub {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GitHub")
            .field("base_url", &self.base_url)
            .finish_non_exhaustive()
    }
}

impl GitHub {
    pub fn new(config: &ApiConfig) -> Result<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, header_value(&config.accept)?);
        headers.insert(USER_AGENT, header_value(&config.user_agent)?);
        if let Some(token) = config.token() {
            let mut auth = header_value(&format!("Bearer {}", token))?;
            auth.set_sensitive(true);
            headers.insert(AUTHORIZATION, auth);
        }

        let client = Client::builder()
            .default_headers(headers)
            .timeout(config.timeout())
            .build()?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }

    fn repo_url(&self, full_name: &str, suffix: &str) -> Result<String> {
        let (owner, name) = split_full_name(full_name)?;
        Ok(format!(
            "{}/repos/{}/{}{}",
            self.base_url,
            urlencoding::encode(owner),
            urlencoding::encode(name),
            suffix
        ))
    }

    async fn get_json<T: serde::de::DeserializeOwned>(
        &self,
        url: &str,
        query: &[(&str, String)],
        subject: &str,
    ) -> Result<T> {
        tracing::debug!(url, ?query, "GET");
        let response = self.client.get(url).query(query).send().await?;

        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            return Err(TrackerError::NotFound(subject.to_string()));
        }
        if !status.is_success() {
            let text = response
                .text()
                .await
                .unwrap_or_else(|_| "unknown error".to_string());
            return Err(TrackerError::Api(format!("GitHub API {}: {}", status, text)));
        }

        Ok(response.json().await?)
    }
}

#[async_trait]
impl GitHubApi for GitHub {
    async fn get_repository(&self, full_name: &str) -> Result<RepositoryMetadata> {
        let url = self.repo_url(full_name, "")?;
        self.get_json(&url, &[], full_name).await
    }

    async fn list_issues(&self, query: &IssueQuery) -> Result<Vec<Issue>> {
        let url = self.repo_url(&query.repository, "/issues")?;
        self.get_json(&url, &query.query_pairs(), &query.repository)
            .await
    }
}

fn header_value(value: &str) -> Result<HeaderValue> {
    HeaderValue::from_str(value).map_err(|e| TrackerError::Api(format!("bad header: {}", e)))
}

/// Split `owner/name` into its two non-empty segments
pub fn split_full_name(full_name: &str) -> Result<(&str, &str)> {
    match full_name.trim().split_once('/') {
        Some((owner, name)) if !owner.is_empty() && !name.is_empty() && !name.contains('/') => {
            Ok((owner, name))
        }
        _ => Err(TrackerError::InvalidRepository(full_name.to_string())),
    }
}
