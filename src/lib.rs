pub mod actions;
pub mod config;
pub mod error;
pub mod github;
pub mod install;
pub mod login;
pub mod platform;
pub mod range;
pub mod release;
pub mod setup;
pub mod version;

pub use error::{Error, Result};
pub use setup::{install_cli, setup, Installed};
pub use version::resolve;

pub fn get_error_chain(err: &anyhow::Error) -> String {
    err.chain()
        .rev()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(" => ")
}
