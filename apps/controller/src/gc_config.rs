use std::env;
use std::io::ErrorKind;
use std::net::{Ipv4Addr, SocketAddr};
use std::path::Path;
use std::time::Duration;

use kube_ns_gc_application::NotificationToggles;
use kube_ns_gc_core::{AppError, AppResult};
use kube_ns_gc_domain::{CleanupPolicy, CleanupPolicyInput};
use serde::Deserialize;
use tracing_subscriber::EnvFilter;

pub const DEFAULT_CONFIG_PATH: &str = "/etc/config/config.json";

const DEFAULT_CLEANUP_INTERVAL: Duration = Duration::from_secs(24 * 60 * 60);
const DEFAULT_NAMESPACE_MAX_AGE: Duration = Duration::from_secs(7 * 24 * 60 * 60);
const DEFAULT_HELM_RELEASE_TIMEOUT: Duration = Duration::from_secs(5 * 60);
const DEFAULT_EXCLUDED_NAMESPACES: [&str; 4] =
    ["kube-system", "kube-public", "kube-node-lease", "default"];
const DEFAULT_IGNORE_LABEL: &str = "kube-ns-gc.ignore";
const DEFAULT_LOG_LEVEL: &str = "info";
const DEFAULT_PORT: u16 = 8080;
const DEFAULT_HELM_BINARY: &str = "helm";
const DEFAULT_TELEGRAM_PARSE_MODE: &str = "Markdown";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TelegramSettings {
    pub enabled: bool,
    pub bot_token: String,
    pub chat_id: String,
    pub parse_mode: String,
    pub notifications: NotificationToggles,
}

impl TelegramSettings {
    /// True when notifications are enabled and both credentials are present.
    pub fn is_usable(&self) -> bool {
        self.enabled && !self.bot_token.trim().is_empty() && !self.chat_id.trim().is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GcConfig {
    pub cleanup_interval: Duration,
    pub namespace_max_age: Duration,
    pub helm_release_timeout: Duration,
    pub excluded_namespaces: Vec<String>,
    pub ignore_label: String,
    pub log_level: String,
    pub port: u16,
    pub helm_binary: String,
    pub telegram: TelegramSettings,
}

/// Optional settings read from the JSON config file.
#[derive(Debug, Default, Deserialize)]
struct FileConfig {
    #[serde(default, with = "humantime_serde")]
    cleanup_interval: Option<Duration>,
    #[serde(default, with = "humantime_serde")]
    namespace_max_age: Option<Duration>,
    #[serde(default, with = "humantime_serde")]
    helm_release_timeout: Option<Duration>,
    excluded_namespaces: Option<Vec<String>>,
    ignore_label: Option<String>,
    log_level: Option<String>,
    port: Option<u16>,
    helm_binary: Option<String>,
    #[serde(default)]
    telegram: FileTelegramConfig,
}

#[derive(Debug, Default, Deserialize)]
struct FileTelegramConfig {
    enabled: Option<bool>,
    bot_token: Option<String>,
    chat_id: Option<String>,
    parse_mode: Option<String>,
    #[serde(default)]
    notifications: FileNotificationToggles,
}

#[derive(Debug, Default, Deserialize)]
struct FileNotificationToggles {
    startup: Option<bool>,
    namespace_deleted: Option<bool>,
    helm_release_deleted: Option<bool>,
    cleanup_summary: Option<bool>,
    errors: Option<bool>,
}

impl GcConfig {
    /// Loads the config file at `CONFIG_PATH`, filling missing fields from the
    /// environment and then from defaults.
    pub fn load() -> AppResult<Self> {
        let path = env::var("CONFIG_PATH")
            .ok()
            .filter(|value| !value.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_CONFIG_PATH.to_owned());

        let file = read_config_file(Path::new(path.as_str()))?.unwrap_or_default();
        Self::from_sources(file, |name| env::var(name).ok())
    }

    fn from_sources(file: FileConfig, lookup: impl Fn(&str) -> Option<String>) -> AppResult<Self> {
        let env = EnvSource(lookup);
        let toggles = file.telegram.notifications;

        Ok(Self {
            cleanup_interval: or_env(file.cleanup_interval, || {
                env.duration("CLEANUP_INTERVAL", DEFAULT_CLEANUP_INTERVAL)
            })?,
            namespace_max_age: or_env(file.namespace_max_age, || {
                env.duration("NAMESPACE_MAX_AGE", DEFAULT_NAMESPACE_MAX_AGE)
            })?,
            helm_release_timeout: or_env(file.helm_release_timeout, || {
                env.duration("HELM_RELEASE_TIMEOUT", DEFAULT_HELM_RELEASE_TIMEOUT)
            })?,
            excluded_namespaces: normalize_names(match file.excluded_namespaces {
                Some(names) => names,
                None => env.list("EXCLUDED_NAMESPACES", &DEFAULT_EXCLUDED_NAMESPACES),
            }),
            ignore_label: file
                .ignore_label
                .unwrap_or_else(|| env.string("IGNORE_LABEL", DEFAULT_IGNORE_LABEL)),
            log_level: file
                .log_level
                .unwrap_or_else(|| env.string("LOG_LEVEL", DEFAULT_LOG_LEVEL)),
            port: or_env(file.port, || env.port("PORT", DEFAULT_PORT))?,
            helm_binary: file
                .helm_binary
                .unwrap_or_else(|| env.string("HELM_BINARY", DEFAULT_HELM_BINARY)),
            telegram: TelegramSettings {
                enabled: or_env(file.telegram.enabled, || env.bool("TELEGRAM_ENABLED", false))?,
                bot_token: file
                    .telegram
                    .bot_token
                    .unwrap_or_else(|| env.string("TELEGRAM_BOT_TOKEN", "")),
                chat_id: file
                    .telegram
                    .chat_id
                    .unwrap_or_else(|| env.string("TELEGRAM_CHAT_ID", "")),
                parse_mode: file.telegram.parse_mode.unwrap_or_else(|| {
                    env.string("TELEGRAM_PARSE_MODE", DEFAULT_TELEGRAM_PARSE_MODE)
                }),
                notifications: NotificationToggles {
                    startup: or_env(toggles.startup, || {
                        env.bool("TELEGRAM_NOTIFY_STARTUP", true)
                    })?,
                    namespace_deleted: or_env(toggles.namespace_deleted, || {
                        env.bool("TELEGRAM_NOTIFY_NAMESPACE_DELETED", true)
                    })?,
                    release_deleted: or_env(toggles.helm_release_deleted, || {
                        env.bool("TELEGRAM_NOTIFY_HELM_RELEASE_DELETED", true)
                    })?,
                    cleanup_summary: or_env(toggles.cleanup_summary, || {
                        env.bool("TELEGRAM_NOTIFY_CLEANUP_SUMMARY", true)
                    })?,
                    errors: or_env(toggles.errors, || env.bool("TELEGRAM_NOTIFY_ERRORS", true))?,
                },
            },
        })
    }

    /// Builds the validated cleanup policy.
    pub fn cleanup_policy(&self) -> AppResult<CleanupPolicy> {
        let mut input = CleanupPolicyInput::new(self.namespace_max_age, self.helm_release_timeout);
        input.excluded_names = self.excluded_namespaces.clone();
        input.ignore_label_key = Some(self.ignore_label.clone());

        CleanupPolicy::new(input)
    }

    pub fn socket_address(&self) -> SocketAddr {
        SocketAddr::from((Ipv4Addr::UNSPECIFIED, self.port))
    }
}

/// Installs the global subscriber. `RUST_LOG` wins over the configured level.
pub fn init_tracing(log_level: &str) {
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(log_level))
        .unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_LEVEL));

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .compact()
        .init();
}

fn read_config_file(path: &Path) -> AppResult<Option<FileConfig>> {
    let raw = match std::fs::read_to_string(path) {
        Ok(raw) => raw,
        Err(error) if error.kind() == ErrorKind::NotFound => return Ok(None),
        Err(error) => {
            return Err(AppError::Validation(format!(
                "failed to read config file '{}': {error}",
                path.display()
            )));
        }
    };

    parse_config_file(raw.as_str())
        .map(Some)
        .map_err(|error| error.context(format!("config file '{}'", path.display())))
}

fn parse_config_file(raw: &str) -> AppResult<FileConfig> {
    serde_json::from_str(raw)
        .map_err(|error| AppError::Validation(format!("invalid config JSON: {error}")))
}

fn or_env<T>(value: Option<T>, fallback: impl FnOnce() -> AppResult<T>) -> AppResult<T> {
    match value {
        Some(value) => Ok(value),
        None => fallback(),
    }
}

fn normalize_names(names: Vec<String>) -> Vec<String> {
    names
        .into_iter()
        .map(|name| name.trim().to_owned())
        .filter(|name| !name.is_empty())
        .collect()
}

/// Environment reader where blank values count as unset.
struct EnvSource<F>(F);

impl<F: Fn(&str) -> Option<String>> EnvSource<F> {
    fn get(&self, name: &str) -> Option<String> {
        (self.0)(name).filter(|value| !value.trim().is_empty())
    }

    fn string(&self, name: &str, default: &str) -> String {
        self.get(name).unwrap_or_else(|| default.to_owned())
    }

    fn list(&self, name: &str, default: &[&str]) -> Vec<String> {
        match self.get(name) {
            Some(value) => value.split(',').map(str::to_owned).collect(),
            None => default.iter().map(|name| (*name).to_owned()).collect(),
        }
    }

    fn duration(&self, name: &str, default: Duration) -> AppResult<Duration> {
        match self.get(name) {
            Some(value) => humantime_serde::re::humantime::parse_duration(value.trim()).map_err(
                |error| AppError::Validation(format!("invalid {name} value '{value}': {error}")),
            ),
            None => Ok(default),
        }
    }

    fn port(&self, name: &str, default: u16) -> AppResult<u16> {
        match self.get(name) {
            Some(value) => value.trim().parse::<u16>().map_err(|error| {
                AppError::Validation(format!("invalid {name} value '{value}': {error}"))
            }),
            None => Ok(default),
        }
    }

    fn bool(&self, name: &str, default: bool) -> AppResult<bool> {
        let Some(value) = self.get(name) else {
            return Ok(default);
        };

        match value.trim().to_ascii_lowercase().as_str() {
            "1" | "t" | "true" | "yes" => Ok(true),
            "0" | "f" | "false" | "no" => Ok(false),
            _ => Err(AppError::Validation(format!(
                "invalid {name} value '{value}': expected true or false"
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::time::Duration;

    use kube_ns_gc_core::AppResult;

    use super::{FileConfig, GcConfig, parse_config_file, read_config_file};

    fn from_env(vars: &[(&str, &str)]) -> AppResult<GcConfig> {
        from_file_and_env(FileConfig::default(), vars)
    }

    fn from_file_and_env(file: FileConfig, vars: &[(&str, &str)]) -> AppResult<GcConfig> {
        let vars = vars
            .iter()
            .map(|(key, value)| ((*key).to_owned(), (*value).to_owned()))
            .collect::<HashMap<_, _>>();

        GcConfig::from_sources(file, |name| vars.get(name).cloned())
    }

    #[test]
    fn defaults_apply_without_file_or_env() {
        let config = from_env(&[]).unwrap_or_else(|_| unreachable!());

        assert_eq!(config.cleanup_interval, Duration::from_secs(24 * 3600));
        assert_eq!(config.namespace_max_age, Duration::from_secs(168 * 3600));
        assert_eq!(config.helm_release_timeout, Duration::from_secs(300));
        assert_eq!(
            config.excluded_namespaces,
            vec!["kube-system", "kube-public", "kube-node-lease", "default"]
        );
        assert_eq!(config.ignore_label, "kube-ns-gc.ignore");
        assert_eq!(config.log_level, "info");
        assert_eq!(config.port, 8080);
        assert_eq!(config.helm_binary, "helm");
        assert!(!config.telegram.enabled);
        assert_eq!(config.telegram.parse_mode, "Markdown");
        assert!(config.telegram.notifications.errors);
        assert!(!config.telegram.is_usable());
    }

    #[test]
    fn environment_overrides_defaults() {
        let config = from_env(&[
            ("CLEANUP_INTERVAL", "1h"),
            ("NAMESPACE_MAX_AGE", "48h"),
            ("EXCLUDED_NAMESPACES", " kube-system, ,monitoring "),
            ("PORT", "9090"),
            ("TELEGRAM_ENABLED", "true"),
            ("TELEGRAM_BOT_TOKEN", "123:abc"),
            ("TELEGRAM_CHAT_ID", "-100"),
            ("TELEGRAM_NOTIFY_HELM_RELEASE_DELETED", "false"),
        ])
        .unwrap_or_else(|_| unreachable!());

        assert_eq!(config.cleanup_interval, Duration::from_secs(3600));
        assert_eq!(config.namespace_max_age, Duration::from_secs(48 * 3600));
        assert_eq!(config.excluded_namespaces, vec!["kube-system", "monitoring"]);
        assert_eq!(config.port, 9090);
        assert!(config.telegram.is_usable());
        assert!(!config.telegram.notifications.release_deleted);
        assert!(config.telegram.notifications.startup);
    }

    #[test]
    fn blank_environment_values_count_as_unset() {
        let config = from_env(&[("IGNORE_LABEL", "  "), ("PORT", "")])
            .unwrap_or_else(|_| unreachable!());

        assert_eq!(config.ignore_label, "kube-ns-gc.ignore");
        assert_eq!(config.port, 8080);
    }

    #[test]
    fn invalid_environment_values_name_the_variable() {
        let error = from_env(&[("NAMESPACE_MAX_AGE", "a week")])
            .err()
            .map(|error| error.to_string())
            .unwrap_or_default();
        assert!(error.contains("NAMESPACE_MAX_AGE"));

        assert!(from_env(&[("PORT", "70000")]).is_err());
        assert!(from_env(&[("TELEGRAM_ENABLED", "maybe")]).is_err());
    }

    #[test]
    fn file_fields_win_and_missing_fields_fall_back_to_env() {
        let file = parse_config_file(
            r#"{
                "namespace_max_age": "3d",
                "excluded_namespaces": ["default", "ci"],
                "telegram": {
                    "enabled": true,
                    "bot_token": "file-token",
                    "notifications": { "startup": false }
                }
            }"#,
        )
        .unwrap_or_else(|_| unreachable!());

        let config = from_file_and_env(
            file,
            &[
                ("NAMESPACE_MAX_AGE", "1h"),
                ("CLEANUP_INTERVAL", "30m"),
                ("TELEGRAM_CHAT_ID", "-200"),
            ],
        )
        .unwrap_or_else(|_| unreachable!());

        assert_eq!(config.namespace_max_age, Duration::from_secs(3 * 24 * 3600));
        assert_eq!(config.cleanup_interval, Duration::from_secs(30 * 60));
        assert_eq!(config.excluded_namespaces, vec!["default", "ci"]);
        assert_eq!(config.telegram.bot_token, "file-token");
        assert_eq!(config.telegram.chat_id, "-200");
        assert!(!config.telegram.notifications.startup);
        assert!(config.telegram.notifications.cleanup_summary);
    }

    #[test]
    fn malformed_file_is_rejected() {
        assert!(parse_config_file("{ not json").is_err());
        assert!(parse_config_file(r#"{"cleanup_interval": "soon"}"#).is_err());
    }

    #[test]
    fn missing_file_means_no_file_config() {
        let result = read_config_file(std::path::Path::new("/nonexistent/kube-ns-gc/config.json"))
            .unwrap_or_else(|_| unreachable!());

        assert!(result.is_none());
    }

    #[test]
    fn policy_carries_configured_filter_settings() {
        let config = from_env(&[("EXCLUDED_NAMESPACES", "default")])
            .unwrap_or_else(|_| unreachable!());

        let policy = config.cleanup_policy().unwrap_or_else(|_| unreachable!());

        assert!(policy.is_excluded("default"));
        assert!(!policy.is_excluded("kube-system"));
        assert_eq!(policy.ignore_label_key(), Some("kube-ns-gc.ignore"));
        assert_eq!(policy.release_uninstall_timeout(), Duration::from_secs(300));
    }

    #[test]
    fn zero_max_age_is_rejected_by_policy() {
        let config =
            from_env(&[("NAMESPACE_MAX_AGE", "0s")]).unwrap_or_else(|_| unreachable!());

        assert!(config.cleanup_policy().is_err());
    }
}
