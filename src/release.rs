//! Release lookup and asset selection

use semver::Version;

use crate::{
    error::Error,
    github::{Release, ReleaseAsset},
    platform::Platform,
    version::tag_for,
};

/// Product name in asset file names.
pub const PRODUCT: &str = "setops-cli";
/// The binary inside each asset.
pub const BINARY_NAME: &str = "setops";
pub const ASSET_EXTENSION: &str = "bz2";

/// `setops-cli_v<version>_<os>_<arch>.bz2`
pub fn asset_name(version: &Version, platform: &Platform) -> String {
    format!(
        "{PRODUCT}_{}_{}_{}.{ASSET_EXTENSION}",
        tag_for(version),
        platform.os,
        platform.arch
    )
}

/// Finds the build of `version` for `platform`.
///
/// A missing release is an error since `version` was resolved from the same
/// listing. A release without a build for `platform` is `Ok(None)`.
pub fn find_asset<'a>(
    releases: &'a [Release],
    version: &Version,
    platform: &Platform,
) -> Result<Option<&'a ReleaseAsset>, Error> {
    let tag = tag_for(version);
    let release = releases
        .iter()
        .find(|r| r.tag_name == tag)
        .ok_or(Error::ReleaseNotFound(tag))?;

    let name = asset_name(version, platform);
    Ok(release.assets.iter().find(|a| a.name == name))
}
