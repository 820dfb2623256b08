//! Command-line arguments and config resolution.

use std::path::PathBuf;

use clap::Parser;

use culler_core::app::BuildError;
use culler_core::config::{ConfigError, CullerConfig};
use culler_core::domain::CullerError;

use crate::logging::LogFormat;
use crate::output::OutputFormat;

#[derive(Debug, thiserror::Error)]
pub enum CliError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("missing required setting `{0}`: pass --{1} or set it in the config file")]
    Missing(&'static str, &'static str),

    #[error(transparent)]
    Build(#[from] BuildError),

    #[error(transparent)]
    Run(#[from] CullerError),

    #[error("failed to write report: {0}")]
    Output(#[from] std::io::Error),
}

/// Keep the newest tagged machine images and deregister the rest.
#[derive(Debug, Parser)]
#[command(name = "culler", version, about)]
pub struct Cli {
    /// TOML config file; flags override its values
    #[arg(short, long, env = "CULLER_CONFIG")]
    pub config: Option<PathBuf>,

    /// Value of the Amazon_AMI_Management_Identifier tag to prune
    #[arg(long, env = "CULLER_IDENTIFIER")]
    pub identifier: Option<String>,

    /// Number of newest images to keep (negative keeps none)
    #[arg(long, env = "CULLER_KEEP_RELEASES", allow_negative_numbers = true)]
    pub keep_releases: Option<i64>,

    #[arg(long, env = "CULLER_REGION")]
    pub region: Option<String>,

    #[arg(long, env = "CULLER_ACCESS_KEY", hide_env_values = true)]
    pub access_key: Option<String>,

    #[arg(long, env = "CULLER_SECRET_KEY", hide_env_values = true)]
    pub secret_key: Option<String>,

    /// Client retries on transient provider errors
    #[arg(long)]
    pub max_retries: Option<u32>,

    #[arg(long)]
    pub endpoint_url: Option<String>,

    /// Show what would be deleted without deleting anything
    #[arg(long)]
    pub dry_run: bool,

    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    pub output: OutputFormat,

    /// Log filter directive (overrides RUST_LOG)
    #[arg(long, env = "CULLER_LOG")]
    pub log_level: Option<String>,

    #[arg(long, value_enum, default_value_t = LogFormat::Text)]
    pub log_format: LogFormat,
}

impl Cli {
    /// Config file (if any) merged with flag overrides, then validated.
    pub fn resolve_config(&self) -> Result<CullerConfig, CliError> {
        let mut config = match &self.config {
            Some(path) => CullerConfig::from_file(path)?,
            None => {
                let identifier = self
                    .identifier
                    .clone()
                    .ok_or(CliError::Missing("identifier", "identifier"))?;
                let keep_releases = self
                    .keep_releases
                    .ok_or(CliError::Missing("keep_releases", "keep-releases"))?;
                CullerConfig::new(identifier, keep_releases)
            }
        };

        if let Some(identifier) = &self.identifier {
            config.identifier = identifier.clone();
        }
        if let Some(keep_releases) = self.keep_releases {
            config.keep_releases = keep_releases;
        }
        if self.region.is_some() {
            config.region = self.region.clone();
        }
        if self.access_key.is_some() {
            config.access_key = self.access_key.clone();
        }
        if self.secret_key.is_some() {
            config.secret_key = self.secret_key.clone();
        }
        if let Some(max_retries) = self.max_retries {
            config.max_retries = max_retries;
        }
        if self.endpoint_url.is_some() {
            config.endpoint_url = self.endpoint_url.clone();
        }

        config.validate()?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use std::io::Write;

    fn parse(args: &[&str]) -> Cli {
        let mut argv = vec!["culler"];
        argv.extend_from_slice(args);
        Cli::try_parse_from(argv).unwrap()
    }

    #[test]
    fn flags_alone_build_a_config() {
        let cli = parse(&["--identifier", "web", "--keep-releases", "2", "--region", "us-east-1"]);

        let config = cli.resolve_config().unwrap();

        assert_eq!(config.identifier, "web");
        assert_eq!(config.keep_releases, 2);
        assert_eq!(config.region.as_deref(), Some("us-east-1"));
        assert_eq!(config.max_retries, 11);
    }

    #[test]
    fn negative_keep_releases_is_accepted() {
        let cli = parse(&["--identifier", "web", "--keep-releases", "-1"]);
        let config = cli.resolve_config().unwrap();
        assert_eq!(config.policy().keep_count, 0);
    }

    #[rstest]
    #[case(&["--keep-releases", "2"], "identifier")]
    #[case(&["--identifier", "web"], "keep_releases")]
    fn missing_required_settings(#[case] args: &[&str], #[case] setting: &str) {
        let err = parse(args).resolve_config().unwrap_err();
        assert!(matches!(err, CliError::Missing(name, _) if name == setting));
    }

    #[test]
    fn flags_override_config_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            r#"
            identifier = "web"
            keep_releases = 5
            region = "us-east-1"
            "#
        )
        .unwrap();
        let path = file.path().to_str().unwrap().to_string();

        let cli = parse(&["--config", &path, "--keep-releases", "1"]);
        let config = cli.resolve_config().unwrap();

        assert_eq!(config.identifier, "web");
        assert_eq!(config.keep_releases, 1);
        assert_eq!(config.region.as_deref(), Some("us-east-1"));
    }

    #[test]
    fn half_credentials_are_rejected() {
        let cli = parse(&["--identifier", "web", "--keep-releases", "1", "--access-key", "AKIA"]);
        let err = cli.resolve_config().unwrap_err();
        assert!(matches!(err, CliError::Config(ConfigError::Validation(_))));
    }
}
