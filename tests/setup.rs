use std::{fs, io::Write};

use bzip2::{write::BzEncoder, Compression};
use mockito::{Matcher, Server, ServerGuard};
use semver::Version;
use serde_json::json;
use setup_setops::{
    actions::SearchPath, config::Settings, install_cli, platform::Platform, Error,
};

const CLI: &[u8] = b"#!/bin/sh\necho 'setops version 1.2.0'\n";

fn bz2(content: &[u8]) -> Vec<u8> {
    let mut encoder = BzEncoder::new(Vec::new(), Compression::default());
    encoder.write_all(content).unwrap();
    encoder.finish().unwrap()
}

fn settings(server: &ServerGuard, version: &str) -> Settings {
    Settings {
        version: version.to_string(),
        credentials: None,
        api_url: "https://api.setops.example".to_string(),
        github_token: Some("gh-token".to_string()),
        releases_api_url: server.url(),
    }
}

/// Publishes v1.0.0, v1.2.0 and v2.0.0-rc1, each with a linux build only.
async fn mock_releases(server: &mut ServerGuard) {
    let releases: Vec<_> = ["2.0.0-rc1", "1.2.0", "1.0.0"]
        .iter()
        .map(|version| {
            let name = format!("setops-cli_v{version}_linux_amd64.bz2");
            json!({
                "tag_name": format!("v{version}"),
                "name": format!("v{version}"),
                "assets": [{
                    "name": &name,
                    "browser_download_url": format!("{}/download/v{version}/{name}", server.url()),
                }],
            })
        })
        .collect();

    server
        .mock("GET", "/repos/setopsco/releases/releases")
        .match_query(Matcher::Any)
        .match_header("authorization", "Bearer gh-token")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(serde_json::to_string(&releases).unwrap())
        .create_async()
        .await;
}

#[tokio::test]
async fn installs_the_resolved_version_and_updates_path() {
    let mut server = Server::new_async().await;
    mock_releases(&mut server).await;
    let download = server
        .mock("GET", "/download/v1.2.0/setops-cli_v1.2.0_linux_amd64.bz2")
        .with_status(200)
        .with_body(bz2(CLI))
        .create_async()
        .await;

    let dir = tempfile::tempdir().unwrap();
    let github_path = dir.path().join("github_path");
    let mut search_path = SearchPath::new(Some(github_path.clone()));
    let platform = Platform::new("linux", "x64").unwrap();

    let installed = install_cli(&settings(&server, "^1.0.0"), &platform, &mut search_path)
        .await
        .unwrap();

    download.assert_async().await;
    assert_eq!(installed.version, Version::new(1, 2, 0));
    assert_eq!(installed.binary, installed.cli_dir.join("setops"));
    assert_eq!(fs::read(&installed.binary).unwrap(), CLI);
    assert_eq!(
        fs::read_to_string(&github_path).unwrap(),
        format!("{}\n", installed.cli_dir.display())
    );
    assert_eq!(search_path.added(), [installed.cli_dir.clone()]);

    fs::remove_dir_all(&installed.cli_dir).unwrap();
}

#[tokio::test]
async fn next_installs_the_prerelease() {
    let mut server = Server::new_async().await;
    mock_releases(&mut server).await;
    server
        .mock("GET", "/download/v2.0.0-rc1/setops-cli_v2.0.0-rc1_linux_amd64.bz2")
        .with_status(200)
        .with_body(bz2(CLI))
        .create_async()
        .await;

    let platform = Platform::new("linux", "x64").unwrap();
    let installed = install_cli(
        &settings(&server, "next"),
        &platform,
        &mut SearchPath::default(),
    )
    .await
    .unwrap();

    assert_eq!(installed.version, Version::parse("2.0.0-rc1").unwrap());
    fs::remove_dir_all(&installed.cli_dir).unwrap();
}

#[tokio::test]
async fn missing_platform_build_is_unavailable() {
    let mut server = Server::new_async().await;
    mock_releases(&mut server).await;

    let platform = Platform::new("darwin", "x64").unwrap();
    let err = install_cli(
        &settings(&server, "latest"),
        &platform,
        &mut SearchPath::default(),
    )
    .await
    .unwrap_err();

    assert_eq!(
        err.to_string(),
        "SetOps version latest not available for darwin and amd64"
    );
}

#[tokio::test]
async fn unmatched_range_is_unavailable() {
    let mut server = Server::new_async().await;
    mock_releases(&mut server).await;

    let platform = Platform::new("linux", "x64").unwrap();
    let err = install_cli(
        &settings(&server, "^3.0.0"),
        &platform,
        &mut SearchPath::default(),
    )
    .await
    .unwrap_err();

    assert!(matches!(err, Error::VersionUnavailable { ref version, .. } if version == "^3.0.0"));
}

#[tokio::test]
async fn invalid_constraint_fails_before_download() {
    let mut server = Server::new_async().await;
    mock_releases(&mut server).await;

    let platform = Platform::new("linux", "x64").unwrap();
    let err = install_cli(
        &settings(&server, "banana"),
        &platform,
        &mut SearchPath::default(),
    )
    .await
    .unwrap_err();

    assert!(matches!(err, Error::InvalidConstraint(ref c) if c == "banana"));
}
