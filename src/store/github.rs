use async_trait::async_trait;
use percent_encoding::{utf8_percent_encode, AsciiSet, CONTROLS};
use reqwest::{header, Client, RequestBuilder, Response, StatusCode};
use serde::{Deserialize, Serialize};

use super::{ContentStore, StoreError, StoredFile, UpdateOutcome};
use crate::context::Config;

const SEGMENT: &AsciiSet = &CONTROLS
    .add(b' ')
    .add(b'"')
    .add(b'#')
    .add(b'%')
    .add(b'<')
    .add(b'>')
    .add(b'?')
    .add(b'`')
    .add(b'{')
    .add(b'}');

/// The GitHub repository contents API.
pub struct GitHubStore {
    client: Client,
    api_url: String,
    repo: String,
    branch: String,
    token: Option<String>,
}

#[derive(Serialize)]
struct PutContents<'a> {
    message: &'a str,
    content: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    sha: Option<&'a str>,
    branch: &'a str,
}

#[derive(Deserialize)]
struct Contents {
    content: Option<String>,
    sha: String,
}

impl GitHubStore {
    pub fn new(config: &Config) -> Result<GitHubStore, StoreError> {
        let client = Client::builder()
            .user_agent(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(GitHubStore {
            client,
            api_url: config.api_url.trim_end_matches('/').to_string(),
            repo: config.repo.clone(),
            branch: config.branch.clone(),
            token: config.token.clone(),
        })
    }

    fn url(&self, path: &str) -> String {
        let path = path
            .split('/')
            .map(|segment| utf8_percent_encode(segment, SEGMENT).to_string())
            .collect::<Vec<_>>()
            .join("/");
        format!("{}/repos/{}/contents/{}", self.api_url, self.repo, path)
    }

    fn authorized(&self, builder: RequestBuilder) -> RequestBuilder {
        let builder = builder.header(header::ACCEPT, "application/vnd.github.v3+json");
        match &self.token {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        }
    }

    async fn put(&self, path: &str, body: &PutContents<'_>) -> Result<Response, StoreError> {
        let request = self.authorized(self.client.put(self.url(path))).json(body);
        Ok(request.send().await?)
    }
}

async fn status_error(response: Response) -> StoreError {
    let status = response.status().as_u16();
    let body = response.text().await.unwrap_or_default();
    StoreError::Status { status, body }
}

#[async_trait]
impl ContentStore for GitHubStore {
    async fn create_file(&self, path: &str, content: &str, message: &str) -> Result<(), StoreError> {
        let body = PutContents {
            message,
            content,
            sha: None,
            branch: &self.branch,
        };
        let response = self.put(path, &body).await?;
        if !response.status().is_success() {
            return Err(status_error(response).await);
        }
        log::debug!("created {} on {}", path, self.branch);
        Ok(())
    }

    async fn read_file(&self, path: &str) -> Result<Option<StoredFile>, StoreError> {
        let request = self
            .authorized(self.client.get(self.url(path)))
            .query(&[("ref", self.branch.as_str())]);
        let response = request.send().await?;
        if response.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        if !response.status().is_success() {
            return Err(status_error(response).await);
        }
        let Contents { content, sha } = response
            .json()
            .await
            .map_err(|e| StoreError::Decode(e.to_string()))?;
        let content = content.ok_or_else(|| StoreError::Decode(format!("{} has no inline content", path)))?;
        Ok(Some(StoredFile { content, sha }))
    }

    async fn update_file(
        &self,
        path: &str,
        content: &str,
        expected_sha: Option<&str>,
        message: &str,
    ) -> Result<UpdateOutcome, StoreError> {
        let body = PutContents {
            message,
            content,
            sha: expected_sha,
            branch: &self.branch,
        };
        let response = self.put(path, &body).await?;
        let status = response.status();
        if status == StatusCode::CONFLICT {
            let body = response.text().await.unwrap_or_default();
            log::debug!("version conflict on {}: {}", path, body);
            return Ok(UpdateOutcome::Conflict);
        }
        if !status.is_success() {
            return Err(status_error(response).await);
        }
        Ok(UpdateOutcome::Updated)
    }
}
