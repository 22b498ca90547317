//! GitHub release listing and asset downloads

use std::{fs::File, io::Write, path::Path, time::Instant};

use futures_util::StreamExt;
use humantime::format_duration;
use reqwest::{header, Client, RequestBuilder, StatusCode};
use serde::Deserialize;
use tracing::{debug, info};

use crate::error::Error;

/// Repository the SetOps CLI is published from.
pub const RELEASES_REPO: &str = "setopsco/releases";

const USER_AGENT: &str = concat!("setup-setops/", env!("CARGO_PKG_VERSION"));

/// A release's asset. Does not contain all fields.
#[derive(Debug, Clone, Deserialize)]
pub struct ReleaseAsset {
    pub name: String,
    pub browser_download_url: String,
}

/// A github release. Does not contain all fields.
///
/// See the github [docs](https://docs.github.com/en/rest/releases/releases?apiVersion=2022-11-28#list-releases) for more information
#[derive(Debug, Clone, Deserialize)]
pub struct Release {
    pub tag_name: String,
    pub assets: Vec<ReleaseAsset>,
}

/// Lists releases and downloads assets, authenticated when a token is given.
pub struct ReleaseSource {
    client: Client,
    base_url: String,
    token: Option<String>,
}

impl ReleaseSource {
    pub fn new(client: Client, base_url: &str, token: Option<String>) -> Self {
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            token,
        }
    }

    fn get(&self, url: &str) -> RequestBuilder {
        let request = self
            .client
            .get(url)
            .header(header::USER_AGENT, USER_AGENT)
            .header("X-GitHub-Api-Version", "2022-11-28");

        if let Some(token) = &self.token {
            request.bearer_auth(token)
        } else {
            request
        }
    }

    /// All releases of [`RELEASES_REPO`], newest first, in one page.
    pub async fn list_releases(&self) -> Result<Vec<Release>, Error> {
        let url = format!("{}/repos/{RELEASES_REPO}/releases", self.base_url);
        debug!("listing releases from {url}");

        let resp = self
            .get(&url)
            .header(header::ACCEPT, "application/vnd.github+json")
            .query(&[("per_page", "100")])
            .send()
            .await?;

        match resp.status() {
            StatusCode::OK => Ok(resp.json().await?),
            StatusCode::FORBIDDEN => Err(Error::Download(format!(
                "got 403 on api request: {}",
                resp.text().await.map_or_else(
                    |_| "no text could be parsed".to_string(),
                    |t| t.trim().to_string()
                )
            ))),
            status => Err(Error::Download(format!(
                "unhandled status {status} listing releases"
            ))),
        }
    }

    /// Streams the asset at `url` into `output`, returning the number of bytes written.
    pub async fn download(&self, url: &str, output: &Path) -> Result<u64, Error> {
        debug!("downloading SetOps CLI from {url}");
        let download_start = Instant::now();

        let resp = self
            .get(url)
            .header(header::ACCEPT, "application/octet-stream")
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            return Err(Error::Download(format!(
                "unhandled status {status} downloading {url}"
            )));
        }

        let mut file = File::create(output)?;
        let mut written = 0;

        let mut bytes_stream = resp.bytes_stream();
        while let Some(chunk) = bytes_stream.next().await {
            let chunk = chunk?;
            file.write_all(&chunk)?;
            written += chunk.len() as u64;
        }

        // close file
        drop(file);

        info!(
            "downloaded {written} bytes, took {}",
            format_duration(download_start.elapsed())
        );
        Ok(written)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::{Matcher, Server};

    const RELEASES: &str = r#"[
        {
            "tag_name": "v1.1.0",
            "name": "v1.1.0",
            "assets": [
                {
                    "name": "setops-cli_v1.1.0_linux_amd64.bz2",
                    "browser_download_url": "https://example.com/v1.1.0/linux"
                }
            ]
        },
        {"tag_name": "v1.0.0", "name": "v1.0.0", "assets": []}
    ]"#;

    #[tokio::test]
    async fn list_releases_parses_tags_and_assets() {
        let mut server = Server::new_async().await;

        let mock = server
            .mock("GET", "/repos/setopsco/releases/releases")
            .match_query(Matcher::UrlEncoded("per_page".into(), "100".into()))
            .match_header("accept", "application/vnd.github+json")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(RELEASES)
            .create_async()
            .await;

        let source = ReleaseSource::new(Client::new(), &server.url(), None);
        let releases = source.list_releases().await.unwrap();

        mock.assert_async().await;
        assert_eq!(releases.len(), 2);
        assert_eq!(releases[0].tag_name, "v1.1.0");
        assert_eq!(releases[0].assets[0].name, "setops-cli_v1.1.0_linux_amd64.bz2");
        assert!(releases[1].assets.is_empty());
    }

    #[tokio::test]
    async fn token_is_sent_as_bearer() {
        let mut server = Server::new_async().await;

        let mock = server
            .mock("GET", "/repos/setopsco/releases/releases")
            .match_query(Matcher::Any)
            .match_header("authorization", "Bearer secret-token")
            .with_status(200)
            .with_body("[]")
            .create_async()
            .await;

        let source = ReleaseSource::new(
            Client::new(),
            &format!("{}/", server.url()),
            Some("secret-token".to_string()),
        );
        let releases = source.list_releases().await.unwrap();

        mock.assert_async().await;
        assert!(releases.is_empty());
    }

    #[tokio::test]
    async fn forbidden_carries_the_response_text() {
        let mut server = Server::new_async().await;

        server
            .mock("GET", "/repos/setopsco/releases/releases")
            .match_query(Matcher::Any)
            .with_status(403)
            .with_body("API rate limit exceeded\n")
            .create_async()
            .await;

        let source = ReleaseSource::new(Client::new(), &server.url(), None);
        let err = source.list_releases().await.unwrap_err();

        assert_eq!(
            err.to_string(),
            "download failed: got 403 on api request: API rate limit exceeded"
        );
    }

    #[tokio::test]
    async fn download_writes_the_body() {
        let mut server = Server::new_async().await;

        server
            .mock("GET", "/asset")
            .with_status(200)
            .with_body("compressed bytes")
            .create_async()
            .await;

        let dir = tempfile::tempdir().unwrap();
        let output = dir.path().join("setops.bz2");
        let source = ReleaseSource::new(Client::new(), &server.url(), None);

        let written = source
            .download(&format!("{}/asset", server.url()), &output)
            .await
            .unwrap();

        assert_eq!(written, 16);
        assert_eq!(std::fs::read_to_string(&output).unwrap(), "compressed bytes");
    }

    #[tokio::test]
    async fn download_fails_on_missing_asset() {
        let mut server = Server::new_async().await;

        server
            .mock("GET", "/asset")
            .with_status(404)
            .create_async()
            .await;

        let dir = tempfile::tempdir().unwrap();
        let source = ReleaseSource::new(Client::new(), &server.url(), None);

        let err = source
            .download(&format!("{}/asset", server.url()), &dir.path().join("x"))
            .await
            .unwrap_err();

        assert!(matches!(err, Error::Download(_)));
        assert!(!dir.path().join("x").exists());
    }
}
