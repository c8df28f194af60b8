use crate::config::toml_config::TomlConfig;
use crate::config::{LogFormat, Settings, Transport};
use crate::release::{ImageRef, DEFAULT_IMAGE_NAME};
use crate::utils::error::Result;
use crate::utils::validation::{validate_non_empty_string, validate_required_field, Validate};
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug, Clone)]
#[command(name = "news-context-analyzer")]
#[command(version, about = "MCP server for Korean news search and context analysis")]
#[command(args_conflicts_with_subcommands = true)]
pub struct CliConfig {
    #[command(subcommand)]
    pub command: Option<Command>,

    #[command(flatten)]
    pub serve: ServeArgs,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Print the container image reference for a commit and exit
    ImageRef(ImageRefArgs),
}

#[derive(Args, Debug, Clone, Default)]
pub struct ServeArgs {
    /// Optional TOML configuration file
    #[arg(short, long, env = "NEWS_CONFIG")]
    pub config: Option<PathBuf>,

    #[arg(long, value_enum, env = "MCP_TRANSPORT")]
    pub transport: Option<Transport>,

    #[arg(long, env = "HOST")]
    pub host: Option<String>,

    #[arg(long, env = "PORT")]
    pub port: Option<u16>,

    #[arg(short, long, help = "Enable verbose output")]
    pub verbose: bool,

    #[arg(long, value_enum, env = "LOG_FORMAT")]
    pub log_format: Option<LogFormat>,

    #[arg(long, env = "NAVER_CLIENT_ID", hide_env_values = true)]
    pub client_id: Option<String>,

    #[arg(long, env = "NAVER_CLIENT_SECRET", hide_env_values = true)]
    pub client_secret: Option<String>,
}

#[derive(Args, Debug, Clone, Default)]
pub struct ImageRefArgs {
    #[arg(long, env = "REGISTRY_HOST")]
    pub registry_host: Option<String>,

    #[arg(long, env = "PROJECT_ID")]
    pub project: Option<String>,

    #[arg(long, env = "REPOSITORY")]
    pub repository: Option<String>,

    #[arg(long, env = "IMAGE_NAME", default_value = DEFAULT_IMAGE_NAME)]
    pub image_name: String,

    #[arg(long, env = "COMMIT_SHA")]
    pub commit_sha: Option<String>,
}

impl ImageRefArgs {
    pub fn image_ref(&self) -> Result<ImageRef> {
        let commit_sha = validate_required_field("COMMIT_SHA", &self.commit_sha)?;
        validate_non_empty_string("COMMIT_SHA", commit_sha)?;

        ImageRef::from_commit(
            validate_required_field("REGISTRY_HOST", &self.registry_host)?,
            validate_required_field("PROJECT_ID", &self.project)?,
            validate_required_field("REPOSITORY", &self.repository)?,
            &self.image_name,
            commit_sha,
        )
    }
}

/// Log settings, which must be known before the subscriber is installed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LogSettings {
    pub format: LogFormat,
    pub verbose: bool,
}

impl ServeArgs {
    pub fn load_file(&self) -> Result<Option<TomlConfig>> {
        self.config
            .as_ref()
            .map(TomlConfig::from_file)
            .transpose()
    }

    /// Defaults, then the TOML file, then flags and environment.
    pub fn resolve_settings(&self, file: Option<&TomlConfig>) -> Result<Settings> {
        let mut settings = Settings::default();

        if let Some(file) = file {
            file.apply_to(&mut settings);
        }

        if let Some(transport) = self.transport {
            settings.server.transport = transport;
        }
        if let Some(host) = &self.host {
            settings.server.host = host.clone();
        }
        if let Some(port) = self.port {
            settings.server.port = port;
        }
        if let Some(client_id) = &self.client_id {
            settings.naver.client_id = client_id.clone();
        }
        if let Some(client_secret) = &self.client_secret {
            settings.naver.client_secret = client_secret.clone();
        }

        settings.validate()?;
        Ok(settings)
    }

    pub fn log_settings(&self, file: Option<&TomlConfig>) -> LogSettings {
        LogSettings {
            format: self
                .log_format
                .or_else(|| file.and_then(TomlConfig::log_format))
                .unwrap_or_default(),
            verbose: self.verbose || file.is_some_and(TomlConfig::verbose),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::error::NewsError;

    #[test]
    fn test_flags_override_file() {
        let file = TomlConfig::from_toml_str(
            r#"
[server]
transport = "http"
port = 9000

[naver]
client_id = "from-file"
client_secret = "file-secret"

[logging]
format = "json"
"#,
        )
        .unwrap();

        let args = ServeArgs {
            port: Some(8081),
            client_id: Some("from-flag".to_string()),
            ..Default::default()
        };

        let settings = args.resolve_settings(Some(&file)).unwrap();
        assert_eq!(settings.server.transport, Transport::Http);
        assert_eq!(settings.server.port, 8081);
        assert_eq!(settings.naver.client_id, "from-flag");
        assert_eq!(settings.naver.client_secret, "file-secret");

        let logs = args.log_settings(Some(&file));
        assert_eq!(logs.format, LogFormat::Json);
        assert!(!logs.verbose);
    }

    #[test]
    fn test_parse_serve_and_image_ref() {
        let cli = CliConfig::try_parse_from([
            "news-context-analyzer",
            "--transport",
            "http",
            "--port",
            "8088",
        ])
        .unwrap();
        assert!(cli.command.is_none());
        assert_eq!(cli.serve.transport, Some(Transport::Http));
        assert_eq!(cli.serve.port, Some(8088));

        let cli = CliConfig::try_parse_from([
            "news-context-analyzer",
            "image-ref",
            "--registry-host",
            "asia-northeast3-docker.pkg.dev",
            "--project",
            "news-project",
            "--repository",
            "mcp",
            "--commit-sha",
            "ABCDEF1234567",
        ])
        .unwrap();

        let Some(Command::ImageRef(args)) = cli.command else {
            panic!("expected image-ref subcommand");
        };
        assert_eq!(
            args.image_ref().unwrap().to_string(),
            "asia-northeast3-docker.pkg.dev/news-project/mcp/news-context-analyzer:abcdef1234567"
        );
    }

    #[test]
    fn test_image_ref_reports_missing_values() {
        let args = ImageRefArgs {
            registry_host: Some("gcr.io".to_string()),
            project: Some("news".to_string()),
            repository: Some("mcp".to_string()),
            image_name: DEFAULT_IMAGE_NAME.to_string(),
            commit_sha: None,
        };
        let err = args.image_ref().unwrap_err();
        assert!(matches!(err, NewsError::MissingConfigError { ref field } if field == "COMMIT_SHA"));

        let args = ImageRefArgs {
            commit_sha: Some("not-a-sha".to_string()),
            ..args
        };
        assert!(args.image_ref().is_err());
    }

    #[test]
    fn test_invalid_resolved_settings_fail() {
        let args = ServeArgs {
            port: Some(0),
            ..Default::default()
        };
        assert!(args.resolve_settings(None).is_err());
    }
}
