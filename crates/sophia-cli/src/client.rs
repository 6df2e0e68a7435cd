//! Async HTTP client wrapping the Sophia JSON API.

use std::{collections::HashSet, time::Duration};

use anyhow::{Context, Result, anyhow, bail};
use reqwest::{Client, Response, StatusCode, header};
use serde_json::json;
use sophia_core::{
  Argument, ArgumentId, ArgumentWithId, VersionNumber, validate_argument,
  validate_premises,
};

/// Connection settings for the Sophia API.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiConfig {
  pub base_url: String,
  pub username: String,
  pub password: String,
}

/// Async HTTP client for the Sophia JSON REST API.
///
/// Cheap to clone; the inner [`reqwest::Client`] is `Arc`-based.
#[derive(Clone)]
pub struct ApiClient {
  client: Client,
  config: ApiConfig,
}

impl ApiClient {
  pub fn new(config: ApiConfig) -> Result<Self> {
    let client = Client::builder()
      .timeout(Duration::from_secs(30))
      .build()
      .context("failed to build HTTP client")?;
    Ok(Self { client, config })
  }

  fn url(&self, path: &str) -> String {
    format!("{}{}", self.config.base_url.trim_end_matches('/'), path)
  }

  fn auth(&self, req: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
    if self.config.username.is_empty() {
      req
    } else {
      req.basic_auth(&self.config.username, Some(&self.config.password))
    }
  }

  /// `GET /arguments/{id}` or `GET /arguments/{id}/version/{version}`.
  /// Returns `None` on 404.
  pub async fn get_one(
    &self,
    id: ArgumentId,
    version: Option<VersionNumber>,
  ) -> Result<Option<ArgumentWithId>> {
    let path = match version {
      Some(v) => format!("/arguments/{id}/version/{v}"),
      None => format!("/arguments/{id}"),
    };
    let resp = self
      .client
      .get(self.url(&path))
      .send()
      .await
      .with_context(|| format!("GET {path} failed"))?;

    if resp.status() == StatusCode::NOT_FOUND {
      return Ok(None);
    }
    let resp = ensure_success(resp).await?;
    Ok(Some(resp.json().await.context("deserialising argument")?))
  }

  /// `GET /arguments?conclusion=<text>`
  pub async fn get_all(&self, conclusion: &str) -> Result<Vec<ArgumentWithId>> {
    if conclusion.is_empty() {
      bail!("can't get arguments with an empty conclusion");
    }
    let resp = self
      .client
      .get(self.url("/arguments"))
      .query(&[("conclusion", conclusion)])
      .send()
      .await
      .context("GET /arguments failed")?;

    if resp.status() == StatusCode::NOT_FOUND {
      return Ok(Vec::new());
    }
    let resp = ensure_success(resp).await?;
    resp.json().await.context("deserialising arguments")
  }

  /// `POST /arguments` returns the new argument's location.
  pub async fn save(&self, argument: &Argument) -> Result<String> {
    validate_argument(argument)?;
    reject_repeated_premises(&argument.premises)?;
    let resp = self
      .auth(self.client.post(self.url("/arguments")))
      .json(argument)
      .send()
      .await
      .context("POST /arguments failed")?;

    location(ensure_success(resp).await?)
  }

  /// `PATCH /arguments/{id}` returns the new version's location.
  pub async fn update(
    &self,
    id: ArgumentId,
    premises: &[String],
  ) -> Result<String> {
    validate_premises(premises)?;
    reject_repeated_premises(premises)?;
    let path = format!("/arguments/{id}");
    let resp = self
      .auth(self.client.patch(self.url(&path)))
      .json(&json!({ "premises": premises }))
      .send()
      .await
      .with_context(|| format!("PATCH {path} failed"))?;

    location(ensure_success(resp).await?)
  }

  /// `DELETE /arguments/{id}`
  pub async fn delete(&self, id: ArgumentId) -> Result<()> {
    let path = format!("/arguments/{id}");
    let resp = self
      .auth(self.client.delete(self.url(&path)))
      .send()
      .await
      .with_context(|| format!("DELETE {path} failed"))?;

    ensure_success(resp).await?;
    Ok(())
  }
}

/// Client-side only: the server itself stores repeated premises.
fn reject_repeated_premises(premises: &[String]) -> Result<()> {
  let mut seen = HashSet::new();
  for premise in premises {
    if !seen.insert(premise.as_str()) {
      bail!(
        "Arguments shouldn't use the same premise more than once. Yours repeats: {premise}"
      );
    }
  }
  Ok(())
}

/// Turn any non-2xx response into an error carrying its status and body.
async fn ensure_success(resp: Response) -> Result<Response> {
  let status = resp.status();
  if status.is_success() {
    return Ok(resp);
  }
  let body = resp.text().await.unwrap_or_default();
  Err(anyhow!("the server responded with a {}: {}", status.as_u16(), body.trim()))
}

fn location(resp: Response) -> Result<String> {
  resp
    .headers()
    .get(header::LOCATION)
    .ok_or_else(|| anyhow!("response is missing a Location header"))?
    .to_str()
    .map(str::to_owned)
    .context("Location header is not valid UTF-8")
}
