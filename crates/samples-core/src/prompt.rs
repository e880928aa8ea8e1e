//! Interactive selection capability

use crate::error::Result;

/// Shows a label and a list of options and returns the chosen option.
///
/// `kind` names what is being chosen (`integration`, `client`, `server`,
/// `auto-create behavior`) so implementations can answer from presets.
/// A user abort is reported as [`crate::Error::Cancelled`].
pub trait Prompter {
    fn select(&self, kind: &str, label: &str, options: &[String]) -> Result<String>;
}

/// Kinds passed to [`Prompter::select`] by the workflow
pub mod kind {
    pub const INTEGRATION: &str = "integration";
    pub const CLIENT: &str = "client";
    pub const SERVER: &str = "server";
    pub const AUTO_CREATE: &str = "auto-create behavior";
}

pub const YES: &str = "yes";
pub const NO: &str = "no";
