//! Config command for volley-stats.
//!
//! Prints the effective configuration after every layer is applied.

use std::path::PathBuf;

use serde::Serialize;

use crate::config::{volley_home, Config};

/// Options for the config command.
#[derive(Debug, Clone, Default)]
pub struct ConfigOptions {
    /// Output as JSON.
    pub json: bool,
    /// Suppress output.
    pub quiet: bool,
}

/// Output format for the config command.
#[derive(Debug, Clone, Serialize)]
pub struct ConfigOutput {
    /// Whether the configuration could be rendered.
    pub success: bool,
    /// Effective configuration.
    pub config: Config,
    /// Home directory used for the user config and crash log.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub volley_home: Option<PathBuf>,
    /// Error message if rendering failed.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// The config command implementation.
pub struct ConfigCommand {
    config: Config,
}

impl ConfigCommand {
    /// Create a new config command.
    pub fn new(config: Config) -> Self {
        Self { config }
    }

    /// Run the config command.
    pub fn run(&self, _options: &ConfigOptions) -> ConfigOutput {
        ConfigOutput {
            success: true,
            config: self.config.clone(),
            volley_home: volley_home(),
            error: None,
        }
    }

    /// Format output based on options.
    pub fn format_output(&self, output: &ConfigOutput, options: &ConfigOptions) -> String {
        if options.quiet {
            return String::new();
        }

        if options.json {
            return serde_json::to_string_pretty(output).unwrap_or_else(|_| "{}".to_string());
        }

        let mut text = match &output.volley_home {
            Some(home) => format!("# volley home: {}\n", home.display()),
            None => String::new(),
        };
        match output.config.to_toml() {
            Ok(toml) => text.push_str(&toml),
            Err(e) => text.push_str(&format!("# failed to render config: {}\n", e)),
        }
        text
    }
}
