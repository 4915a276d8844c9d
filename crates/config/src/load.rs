//! Document loading and serialization.
//!
//! Base configs are read from JSON or TOML files. Resolved configs are
//! exchanged as JSON; parsing one re-runs the builder, so a hand-edited
//! document cannot break the endpoint or group-check invariants.

use crate::base::BaseConfig;
use crate::resolved::ResolvedConfig;
use cluster_overlay_shared::{ErrorClass, ErrorCode, ErrorEnvelope, Result};
use serde::Serialize;
use std::path::Path;

/// Supported document formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentFormat {
    /// JSON (`.json`, or no extension).
    Json,
    /// TOML (`.toml`).
    Toml,
}

impl DocumentFormat {
    /// Detect the format from a file extension.
    pub fn from_path(path: &Path) -> Result<Self> {
        let ext = path
            .extension()
            .and_then(std::ffi::OsStr::to_str)
            .map(str::to_ascii_lowercase);
        match ext.as_deref() {
            None | Some("json") => Ok(Self::Json),
            Some("toml") => Ok(Self::Toml),
            Some(other) => Err(ErrorEnvelope::expected(
                ErrorCode::new("config", "unsupported_format"),
                "unsupported config format; use .json or .toml",
            )
            .with_metadata("extension", other.to_string())),
        }
    }
}

/// Parse a base config from JSON.
pub fn parse_base_config_json(input: &str) -> Result<BaseConfig> {
    serde_json::from_str(input).map_err(|error| {
        ErrorEnvelope::expected(
            ErrorCode::new("config", "invalid_json"),
            format!("invalid base config JSON: {error}"),
        )
        .with_metadata("source", "base")
    })
}

/// Parse a base config from TOML.
pub fn parse_base_config_toml(input: &str) -> Result<BaseConfig> {
    toml::from_str(input).map_err(|error| {
        ErrorEnvelope::expected(
            ErrorCode::new("config", "invalid_toml"),
            format!("invalid base config TOML: {error}"),
        )
        .with_metadata("source", "base")
    })
}

/// Parse a resolved config from JSON, re-applying defaults and invariants.
pub fn parse_resolved_config_json(input: &str) -> Result<ResolvedConfig> {
    serde_json::from_str(input).map_err(|error| {
        ErrorEnvelope::expected(
            ErrorCode::new("config", "invalid_json"),
            format!("invalid resolved config JSON: {error}"),
        )
        .with_metadata("source", "resolved")
    })
}

/// Load a base config from a file; `None` yields the defaults.
pub fn load_base_config_from_path(path: Option<&Path>) -> Result<BaseConfig> {
    let Some(path) = path else {
        return Ok(BaseConfig::default());
    };

    let format = DocumentFormat::from_path(path)?;
    let text = read_config_file(path)?;
    tracing::debug!(path = %path.display(), ?format, "loading base config");
    match format {
        DocumentFormat::Json => parse_base_config_json(&text),
        DocumentFormat::Toml => parse_base_config_toml(&text),
    }
}

/// Serialize as deterministic pretty JSON (with trailing newline).
pub fn to_pretty_json<T: Serialize>(value: &T) -> Result<String> {
    let mut output = serde_json::to_string_pretty(value).map_err(|error| {
        ErrorEnvelope::unexpected(
            ErrorCode::internal(),
            format!("failed to serialize config: {error}"),
            ErrorClass::NonRetriable,
        )
    })?;
    output.push('\n');
    Ok(output)
}

fn read_config_file(path: &Path) -> Result<String> {
    std::fs::read_to_string(path).map_err(|error| read_error(path, &error))
}

fn read_error(path: &Path, error: &std::io::Error) -> ErrorEnvelope {
    let message = format!("failed to read config file: {error}");
    let envelope = match error.kind() {
        std::io::ErrorKind::NotFound => {
            ErrorEnvelope::expected(ErrorCode::new("config", "config_file_not_found"), message)
        },
        std::io::ErrorKind::PermissionDenied => ErrorEnvelope::expected(
            ErrorCode::new("config", "config_file_permission_denied"),
            message,
        ),
        kind => ErrorEnvelope::unexpected(ErrorCode::io(), message, io_error_class(kind)),
    };
    envelope.with_metadata("path", path.to_string_lossy().to_string())
}

/// Transient I/O failures are worth retrying; everything else is not.
const fn io_error_class(kind: std::io::ErrorKind) -> ErrorClass {
    match kind {
        std::io::ErrorKind::Interrupted
        | std::io::ErrorKind::TimedOut
        | std::io::ErrorKind::WouldBlock => ErrorClass::Retriable,
        _ => ErrorClass::NonRetriable,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cluster_overlay_shared::{ErrorKind, SecretString};
    use std::error::Error;
    use std::path::PathBuf;
    use std::time::Duration;

    #[test]
    fn format_is_detected_from_extension() -> std::result::Result<(), Box<dyn Error>> {
        assert_eq!(
            DocumentFormat::from_path(Path::new("cluster.json"))?,
            DocumentFormat::Json
        );
        assert_eq!(
            DocumentFormat::from_path(Path::new("cluster.TOML"))?,
            DocumentFormat::Toml
        );
        assert_eq!(
            DocumentFormat::from_path(Path::new("cluster"))?,
            DocumentFormat::Json
        );

        let error = DocumentFormat::from_path(Path::new("cluster.yaml")).err();
        assert_eq!(
            error.map(|error| error.code),
            Some(ErrorCode::new("config", "unsupported_format"))
        );
        Ok(())
    }

    #[test]
    fn base_config_parses_from_toml() -> std::result::Result<(), Box<dyn Error>> {
        let base = parse_base_config_toml(
            r#"
masterUrl = "https://cluster:8443"
namespace = "team-a"

[credentials]
oauthToken = "sha256~abc"

[retry]
backoffLimit = 3
"#,
        )?;
        assert_eq!(base.master_url, "https://cluster:8443");
        assert_eq!(base.namespace.as_deref(), Some("team-a"));
        assert_eq!(
            base.credentials.oauth_token.as_ref().map(SecretString::expose),
            Some("sha256~abc")
        );
        assert_eq!(base.retry.backoff_limit, 3);
        Ok(())
    }

    #[test]
    fn invalid_json_maps_to_expected_error() {
        let error = parse_base_config_json("{ not json").err();
        let error = error.map(|error| (error.code, error.metadata.get("source").cloned()));
        assert_eq!(
            error,
            Some((
                ErrorCode::new("config", "invalid_json"),
                Some("base".to_owned())
            ))
        );
    }

    #[test]
    fn resolved_document_reapplies_invariants() -> std::result::Result<(), Box<dyn Error>> {
        let config = parse_resolved_config_json(
            r#"{
                "masterUrl": "http://cluster:8443",
                "endpointUrl": "http://alt-host/custom/path",
                "apiGroupsEnabled": true,
                "disableApiGroupCheck": true
            }"#,
        )?;
        assert_eq!(config.endpoint_url(), "http://alt-host/custom/path/");
        assert!(config.api_groups_enabled());
        assert!(!config.disable_api_group_check());
        assert_eq!(config.secondary_api_version(), "v1");
        Ok(())
    }

    #[test]
    fn resolved_document_without_endpoint_is_derived() -> std::result::Result<(), Box<dyn Error>> {
        let config = parse_resolved_config_json(
            r#"{
                "masterUrl": "http://cluster:8443",
                "secondaryApiVersion": "v2",
                "operationTimeoutMs": 1000
            }"#,
        )?;
        assert_eq!(config.endpoint_url(), "http://cluster:8443/oapi/v2/");
        assert_eq!(config.operation_timeout(), Duration::from_secs(1));
        Ok(())
    }

    #[test]
    fn resolved_config_serializes_flat_camel_case() -> std::result::Result<(), Box<dyn Error>> {
        let config = ResolvedConfig::builder(BaseConfig::for_master("http://cluster:8443"))
            .secondary_api_version("v1")
            .operation_timeout(Duration::from_secs(60))
            .build();
        let json: serde_json::Value = serde_json::from_str(&to_pretty_json(&config)?)?;

        assert_eq!(json["masterUrl"], "http://cluster:8443");
        assert_eq!(json["apiVersion"], "v1");
        assert_eq!(json["secondaryApiVersion"], "v1");
        assert_eq!(json["endpointUrl"], "http://cluster:8443/oapi/v1/");
        assert_eq!(json["operationTimeoutMs"], 60_000);
        assert_eq!(json["apiGroupsEnabled"], false);

        let reparsed = parse_resolved_config_json(&json.to_string())?;
        assert_eq!(reparsed, config);
        Ok(())
    }

    #[test]
    fn missing_path_yields_defaults() -> std::result::Result<(), Box<dyn Error>> {
        assert_eq!(load_base_config_from_path(None)?, BaseConfig::default());
        Ok(())
    }

    #[test]
    fn transient_read_failures_are_retriable() {
        let path = Path::new("/etc/cluster.json");

        let timed_out = read_error(path, &std::io::Error::from(std::io::ErrorKind::TimedOut));
        assert_eq!(timed_out.code, ErrorCode::io());
        assert_eq!(timed_out.kind, ErrorKind::Unexpected);
        assert!(timed_out.class.is_retriable());
        assert_eq!(
            timed_out.metadata.get("path").map(String::as_str),
            Some("/etc/cluster.json")
        );

        let invalid = read_error(path, &std::io::Error::from(std::io::ErrorKind::InvalidData));
        assert_eq!(invalid.code, ErrorCode::io());
        assert!(!invalid.class.is_retriable());

        let denied =
            read_error(path, &std::io::Error::from(std::io::ErrorKind::PermissionDenied));
        assert_eq!(denied.kind, ErrorKind::Expected);
        assert_eq!(
            denied.code,
            ErrorCode::new("config", "config_file_permission_denied")
        );
    }

    #[test]
    fn unreadable_file_reports_not_found() {
        let path = PathBuf::from("/nonexistent/cluster-overlay/base.json");
        let error = load_base_config_from_path(Some(&path)).err();
        assert_eq!(
            error.map(|error| error.code),
            Some(ErrorCode::new("config", "config_file_not_found"))
        );
    }
}
