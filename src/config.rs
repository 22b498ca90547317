//! Action inputs
//!
//! Every input can be passed as a flag or through the `INPUT_*` variable the
//! Actions runner sets for it. Empty values count as absent, as the runner
//! sets unprovided inputs to an empty string.

use std::fmt;

use clap::Parser;

use crate::{actions, error::Error, login::LoginCredentials};

pub const DEFAULT_VERSION: &str = "latest";
pub const DEFAULT_RELEASES_API_URL: &str = "https://api.github.com";

const PARTIAL_CREDENTIALS: &str =
    "When providing setops_username, setops_password or setops_organization, all of them must be set.";
const DEPENDABOT_HINT: &str = "\nThis run was triggered by Dependabot. If you want to grant Dependabot access to your SetOps credentials, add them to the dedicated Dependabot Secrets in the repository settings.";
const MISSING_API_URL: &str = "Please provide a valid SetOps API URL or use the default value";

#[derive(Parser, Default)]
#[command(name = "setup-setops")]
#[command(version, about = "Install the SetOps CLI in a CI job and optionally log in")]
pub struct Inputs {
    /// Version constraint: `latest`, `next`, or a semver range
    #[arg(long, env = "INPUT_SETOPS_VERSION")]
    pub setops_version: Option<String>,

    #[arg(long, env = "INPUT_SETOPS_ORGANIZATION")]
    pub setops_organization: Option<String>,

    #[arg(long, env = "INPUT_SETOPS_USERNAME")]
    pub setops_username: Option<String>,

    #[arg(long, env = "INPUT_SETOPS_PASSWORD", hide_env_values = true)]
    pub setops_password: Option<String>,

    /// SetOps API the CLI logs in to
    #[arg(long, env = "INPUT_SETOPS_API_URL")]
    pub setops_api_url: Option<String>,

    /// Token for the GitHub release listing and download
    #[arg(long, env = "INPUT_GITHUB_TOKEN", hide_env_values = true)]
    pub github_token: Option<String>,

    /// GitHub API the releases are listed from
    #[arg(long, env = "SETOPS_RELEASES_API_URL", default_value = DEFAULT_RELEASES_API_URL)]
    pub releases_api_url: String,

    #[arg(long, env = "GITHUB_ACTOR", hide = true)]
    pub github_actor: Option<String>,
}

/// Validated inputs.
#[derive(Clone)]
pub struct Settings {
    pub version: String,
    pub credentials: Option<LoginCredentials>,
    pub api_url: String,
    pub github_token: Option<String>,
    pub releases_api_url: String,
}

impl fmt::Debug for Settings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Settings")
            .field("version", &self.version)
            .field("credentials", &self.credentials)
            .field("api_url", &self.api_url)
            .field("github_token", &self.github_token.as_ref().map(|_| "***"))
            .field("releases_api_url", &self.releases_api_url)
            .finish()
    }
}

fn present(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

impl Inputs {
    pub fn validate(self) -> Result<Settings, Error> {
        let credentials = match (
            present(self.setops_organization),
            present(self.setops_username),
            present(self.setops_password),
        ) {
            (Some(organization), Some(username), Some(password)) => Some(LoginCredentials {
                organization,
                username,
                password,
            }),
            (None, None, None) => None,
            _ => {
                let mut msg = PARTIAL_CREDENTIALS.to_string();
                if actions::is_dependabot(self.github_actor.as_deref()) {
                    msg.push_str(DEPENDABOT_HINT);
                }
                return Err(Error::InvalidConfiguration(msg));
            }
        };

        let api_url = present(self.setops_api_url)
            .ok_or_else(|| Error::InvalidConfiguration(MISSING_API_URL.to_string()))?;

        Ok(Settings {
            version: present(self.setops_version)
                .map(|v| v.trim().to_string())
                .unwrap_or_else(|| DEFAULT_VERSION.to_string()),
            credentials,
            api_url,
            github_token: present(self.github_token),
            releases_api_url: self.releases_api_url,
        })
    }
}
