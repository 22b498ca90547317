//! Target platform detection for asset selection

use crate::error::Error;

/// Operating systems SetOps publishes CLI builds for.
pub const SUPPORTED_OS: &[&str] = &["darwin", "linux"];
/// Architectures SetOps publishes CLI builds for.
pub const SUPPORTED_ARCH: &[&str] = &["amd64"];

/// Maps a raw OS identifier to the name used in asset names.
pub fn map_os(os: &str) -> &str {
    match os {
        "macos" => "darwin",
        os => os,
    }
}

/// Maps a raw architecture identifier to the name used in asset names.
/// Unknown identifiers are returned unchanged.
pub fn map_arch(arch: &str) -> &str {
    match arch {
        "x64" | "x86_64" => "amd64",
        "x32" | "x86" => "386",
        arch => arch,
    }
}

/// A supported OS/architecture pair, already normalized.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Platform {
    pub os: String,
    pub arch: String,
}

impl Platform {
    /// Normalizes `os` and `arch` and checks them against the supported lists.
    pub fn new(os: &str, arch: &str) -> Result<Self, Error> {
        let os = map_os(os);
        let arch = map_arch(arch);

        if !SUPPORTED_OS.contains(&os) {
            return Err(Error::UnsupportedPlatform(os.to_string()));
        }
        if !SUPPORTED_ARCH.contains(&arch) {
            return Err(Error::UnsupportedArch(arch.to_string()));
        }

        Ok(Self {
            os: os.to_string(),
            arch: arch.to_string(),
        })
    }

    /// The platform this binary runs on.
    pub fn detect() -> Result<Self, Error> {
        Self::new(std::env::consts::OS, std::env::consts::ARCH)
    }
}
