use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Deserializer};

/// Run configuration, loaded once at startup and immutable afterwards.
///
/// # Examples
///
/// ```toml
/// user = "jane@example.com"
/// workspace = 123456
/// api_key = "0123456789abcdef"
/// report_file = "report.html"
///
/// [reportees]
/// 1001 = "Jane Doe"
/// 1002 = "John Doe"
/// ```
#[derive(Debug, Deserialize)]
pub struct Config {
    /// Display name sent to the API as the `user_agent` parameter.
    pub user: String,
    pub workspace: u64,
    pub api_key: String,
    /// Path the final HTML report is written to.
    pub report_file: PathBuf,
    /// User id to display name, one report section per reportee.
    #[serde(deserialize_with = "reportee_map")]
    pub reportees: BTreeMap<u64, String>,
}

impl Config {
    /// Reads and validates the configuration file at `path`.
    pub fn load(path: &Path) -> Result<Self> {
        let data = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        let config = Self::parse(&data)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        Ok(config)
    }

    /// Default location: `<config_dir>/toggl-reporter/config.toml`.
    pub fn default_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir().context("Failed to determine config directory")?;

        Ok(config_dir.join("toggl-reporter").join("config.toml"))
    }

    /// All configured reportee user ids, in ascending order.
    pub fn reportee_ids(&self) -> Vec<u64> {
        self.reportees.keys().copied().collect()
    }

    fn parse(data: &str) -> Result<Self> {
        let config: Config = toml::from_str(data).context("Invalid TOML")?;
        if config.reportees.is_empty() {
            bail!("Config must list at least one reportee");
        }

        Ok(config)
    }
}

/// TOML table keys are strings; reportee keys must parse as numeric user ids.
fn reportee_map<'de, D>(deserializer: D) -> Result<BTreeMap<u64, String>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = BTreeMap::<String, String>::deserialize(deserializer)?;
    raw.into_iter()
        .map(|(id, name)| {
            let id = id
                .parse()
                .map_err(|_| serde::de::Error::custom(format!("invalid reportee user id: {id}")))?;
            Ok((id, name))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use super::Config;

    const VALID: &str = r#"
        user = "jane@example.com"
        workspace = 123456
        api_key = "0123456789abcdef"
        report_file = "report.html"

        [reportees]
        1002 = "John Doe"
        1001 = "Jane Doe"
    "#;

    #[test]
    fn test_parse_valid_config() {
        let config = Config::parse(VALID).unwrap();

        assert_eq!(config.user, "jane@example.com");
        assert_eq!(config.workspace, 123456);
        assert_eq!(config.api_key, "0123456789abcdef");
        assert_eq!(config.report_file, PathBuf::from("report.html"));
        assert_eq!(config.reportees.get(&1001).unwrap(), "Jane Doe");
        assert_eq!(config.reportees.get(&1002).unwrap(), "John Doe");
    }

    /// Reportee ids come back sorted regardless of file order.
    #[test]
    fn test_reportee_ids_sorted() {
        let config = Config::parse(VALID).unwrap();

        assert_eq!(config.reportee_ids(), vec![1001, 1002]);
    }

    #[test]
    fn test_parse_rejects_non_numeric_reportee_id() {
        let data = VALID.replace("1001", "jane");

        let err = Config::parse(&data).unwrap_err();

        assert!(format!("{err:#}").contains("invalid reportee user id"));
    }

    #[test]
    fn test_parse_rejects_empty_reportees() {
        let data = r#"
            user = "jane@example.com"
            workspace = 123456
            api_key = "0123456789abcdef"
            report_file = "report.html"

            [reportees]
        "#;

        let err = Config::parse(data).unwrap_err();

        assert!(format!("{err:#}").contains("at least one reportee"));
    }

    #[test]
    fn test_parse_rejects_missing_field() {
        let data = r#"
            user = "jane@example.com"
            workspace = 123456

            [reportees]
            1001 = "Jane Doe"
        "#;

        assert!(Config::parse(data).is_err());
    }
}
