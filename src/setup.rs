//! The setup flow: resolve, download, extract, add to path, log in.

use std::path::PathBuf;

use reqwest::Client;
use semver::Version;
use tracing::{debug, info};

use crate::{
    actions::SearchPath,
    config::{Inputs, Settings},
    error::Error,
    github::ReleaseSource,
    install::{create_install_dir, extract_binary},
    login,
    platform::Platform,
    release::{find_asset, BINARY_NAME},
    version::resolve,
};

/// Where a run put the CLI.
#[derive(Debug, Clone)]
pub struct Installed {
    pub version: Version,
    pub cli_dir: PathBuf,
    pub binary: PathBuf,
}

/// Resolves `settings.version` against the published releases, installs the
/// matching build for `platform` and adds its directory to `search_path`.
pub async fn install_cli(
    settings: &Settings,
    platform: &Platform,
    search_path: &mut SearchPath,
) -> Result<Installed, Error> {
    let unavailable = || Error::VersionUnavailable {
        version: settings.version.clone(),
        os: platform.os.clone(),
        arch: platform.arch.clone(),
    };

    debug!(
        "Getting download url for SetOps version {}: {} {}",
        settings.version, platform.os, platform.arch
    );
    let source = ReleaseSource::new(
        Client::new(),
        &settings.releases_api_url,
        settings.github_token.clone(),
    );
    let releases = source.list_releases().await?;

    let tags: Vec<&str> = releases.iter().map(|r| r.tag_name.as_str()).collect();
    let version = resolve(&settings.version, &tags)?.ok_or_else(unavailable)?;
    let asset = find_asset(&releases, &version, platform)?.ok_or_else(unavailable)?;
    info!("installing SetOps CLI {version} for {} {}", platform.os, platform.arch);

    let download_dir = tempfile::tempdir()?;
    let download_path = download_dir.path().join(&asset.name);
    source
        .download(&asset.browser_download_url, &download_path)
        .await?;

    let cli_dir = create_install_dir()?;
    let binary = extract_binary(&download_path, &cli_dir, BINARY_NAME)?;
    search_path.add(&cli_dir)?;

    Ok(Installed {
        version,
        cli_dir,
        binary,
    })
}

/// Runs the whole setup from the action inputs.
pub async fn setup(inputs: Inputs) -> Result<Installed, Error> {
    let platform = Platform::detect()?;
    let settings = inputs.validate()?;
    let mut search_path = SearchPath::from_env();

    let installed = install_cli(&settings, &platform, &mut search_path).await?;

    if let Some(credentials) = &settings.credentials {
        let home = dirs::home_dir().ok_or_else(|| {
            Error::InvalidConfiguration("could not determine the home directory".to_string())
        })?;
        login::prepare_helper_dir(&home, &mut search_path)?;
        login::login(
            &installed.binary,
            credentials,
            &settings.api_url,
            &search_path,
        )?;
    }

    Ok(installed)
}
