//! Tool configuration
//!
//! Every constant of the generator is an option here: the start URL, the
//! session name, the role list, the regions, and the browser settings.
//! Values come from defaults, then an optional JSON config file, then CLI
//! flags.

use std::path::{Path, PathBuf};
use tracing::{info, warn};
use url::Url;

use crate::GenError;
use crate::browser::BrowserSessionConfig;

/// Generator configuration
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct GenConfig {
    /// SSO start page URL
    pub start_url: String,
    /// Region the SSO service is hosted in
    pub sso_region: String,
    /// Name of the generated sso-session stanza
    pub sso_session: String,
    /// Region written into profiles by default
    pub default_region: String,
    /// Region written into profiles whose slug looks Canadian
    pub ca_region: String,
    /// Roles to request per account, in output order
    pub roles: Vec<String>,
    /// Where the generated config is written
    pub output_path: String,
    /// Path to Chrome/Chromium executable
    pub chrome_path: Option<String>,
    /// Browser profile directory to reuse (keeps the SSO session between runs)
    pub user_data_dir: Option<String>,
    /// Run the browser in headless mode
    pub headless: bool,
    /// Seconds to wait for the account list before giving up
    pub timeout_secs: u64,
}

impl Default for GenConfig {
    fn default() -> Self {
        Self {
            start_url: "https://d-92671f41c2.awsapps.com/start#".to_string(),
            sso_region: "us-west-2".to_string(),
            sso_session: "cli-access".to_string(),
            default_region: "us-west-2".to_string(),
            ca_region: "ca-central-1".to_string(),
            roles: vec![
                "administrator_access".to_string(),
                "oncall".to_string(),
                "monitoring".to_string(),
            ],
            output_path: "./aws-config.generated".to_string(),
            chrome_path: None,
            user_data_dir: None,
            headless: false,
            timeout_secs: 120,
        }
    }
}

impl GenConfig {
    /// Get config file path
    fn config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("aws-gen-config").join("config.json"))
    }

    /// Load config from the default location.
    /// A missing or unreadable file falls back to defaults.
    pub fn load() -> Self {
        if let Some(path) = Self::config_path() {
            if path.exists() {
                match std::fs::read_to_string(&path) {
                    Ok(content) => {
                        match serde_json::from_str(&content) {
                            Ok(config) => {
                                info!("Loaded config from {:?}", path);
                                return config;
                            }
                            Err(e) => {
                                warn!("Failed to parse config file: {}", e);
                            }
                        }
                    }
                    Err(e) => {
                        warn!("Failed to read config file: {}", e);
                    }
                }
            }
        }
        Self::default()
    }

    /// Load config from an explicit path.
    /// Unlike the default location, errors here are fatal: the user asked for
    /// this exact file.
    pub fn load_from(path: &Path) -> Result<Self, GenError> {
        let content = std::fs::read_to_string(path)?;
        let config = serde_json::from_str(&content)
            .map_err(|e| GenError::Config(format!("Invalid config file {}: {}", path.display(), e)))?;

        info!("Loaded config from {:?}", path);
        Ok(config)
    }

    /// Check values that serde cannot reject on its own
    pub fn validate(&self) -> Result<(), GenError> {
        Url::parse(&self.start_url)
            .map_err(|e| GenError::Config(format!("Invalid start URL {}: {}", self.start_url, e)))?;

        Ok(())
    }

    /// Browser session settings derived from this config
    pub fn browser_config(&self) -> BrowserSessionConfig {
        BrowserSessionConfig::default()
            .chrome_path(self.chrome_path.clone())
            .user_data_dir(self.user_data_dir.clone())
            .headless(self.headless)
            .timeout(self.timeout_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = GenConfig::default();
        assert_eq!(config.start_url, "https://d-92671f41c2.awsapps.com/start#");
        assert_eq!(config.sso_region, "us-west-2");
        assert_eq!(config.sso_session, "cli-access");
        assert_eq!(config.default_region, "us-west-2");
        assert_eq!(config.ca_region, "ca-central-1");
        assert_eq!(config.roles, vec!["administrator_access", "oncall", "monitoring"]);
        assert_eq!(config.output_path, "./aws-config.generated");
        assert!(config.chrome_path.is_none());
        assert!(config.user_data_dir.is_none());
        assert!(!config.headless);
        assert_eq!(config.timeout_secs, 120);
    }

    #[test]
    fn test_partial_config_file_fills_defaults() {
        let config: GenConfig =
            serde_json::from_str(r#"{ "headless": true, "roles": ["oncall"] }"#).unwrap();

        assert!(config.headless);
        assert_eq!(config.roles, vec!["oncall"]);
        assert_eq!(config.sso_session, "cli-access");
        assert_eq!(config.timeout_secs, 120);
    }

    #[test]
    fn test_config_round_trips_through_json() {
        let mut config = GenConfig::default();
        config.chrome_path = Some("/usr/bin/chromium".to_string());
        config.timeout_secs = 30;

        let json = serde_json::to_string_pretty(&config).unwrap();
        let parsed: GenConfig = serde_json::from_str(&json).unwrap();

        assert_eq!(parsed.chrome_path.as_deref(), Some("/usr/bin/chromium"));
        assert_eq!(parsed.timeout_secs, 30);
        assert_eq!(parsed.roles, GenConfig::default().roles);
    }

    #[test]
    fn test_config_file_uses_camel_case_keys() {
        let json = serde_json::to_string(&GenConfig::default()).unwrap();
        assert!(json.contains("\"startUrl\""));
        assert!(json.contains("\"ssoSession\""));
        assert!(json.contains("\"outputPath\""));
        assert!(json.contains("\"timeoutSecs\""));
    }

    #[test]
    fn test_load_from_explicit_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, r#"{ "ssoSession": "my-org", "timeoutSecs": 15 }"#).unwrap();

        let config = GenConfig::load_from(&path).unwrap();
        assert_eq!(config.sso_session, "my-org");
        assert_eq!(config.timeout_secs, 15);
        assert_eq!(config.sso_region, "us-west-2");
    }

    #[test]
    fn test_load_from_missing_path_fails() {
        let dir = tempfile::tempdir().unwrap();
        let result = GenConfig::load_from(&dir.path().join("nope.json"));
        assert!(result.is_err());
    }

    #[test]
    fn test_load_from_invalid_json_fails() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, "not json at all").unwrap();

        let result = GenConfig::load_from(&path);
        assert!(matches!(result, Err(GenError::Config(_))));
    }

    #[test]
    fn test_validate_accepts_defaults() {
        assert!(GenConfig::default().validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_bad_start_url() {
        let config = GenConfig {
            start_url: "not a url".to_string(),
            ..Default::default()
        };

        assert!(matches!(config.validate(), Err(GenError::Config(_))));
    }

    #[test]
    fn test_browser_config_mapping() {
        let config = GenConfig {
            headless: true,
            timeout_secs: 45,
            chrome_path: Some("/opt/chrome".to_string()),
            user_data_dir: Some("/tmp/profile".to_string()),
            ..Default::default()
        };

        let browser = config.browser_config();
        assert!(browser.headless);
        assert_eq!(browser.timeout_secs, 45);
        assert_eq!(browser.chrome_path.as_deref(), Some("/opt/chrome"));
        assert_eq!(browser.user_data_dir.as_deref(), Some("/tmp/profile"));
    }
}
