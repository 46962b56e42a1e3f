//! Runtime settings for ledgerbridge
//!
//! Every setting is a command-line flag with an environment variable fallback.
//! `SyncSettings::from_args` validates the lot up front so a bad or missing
//! value stops the process before any state is touched or request is sent.

use std::fmt;
use std::path::PathBuf;

use chrono_tz::Tz;
use clap::Args;

use crate::error::SyncError;
use crate::models::FlagColor;

/// Timezone used when none is configured
pub const DEFAULT_TIMEZONE: &str = "Australia/Sydney";

/// Raw settings as collected by clap
#[derive(Debug, Clone, Args)]
pub struct SettingsArgs {
    /// Budget service personal access token
    #[arg(long, env = "YNAB_ACCESS_TOKEN", hide_env_values = true)]
    pub ynab_access_token: Option<String>,

    /// Name of the budget to sync with
    #[arg(long, env = "YNAB_BUDGET_NAME")]
    pub ynab_budget_name: Option<String>,

    /// Name of the budget account that receives shared expenses
    #[arg(long, env = "YNAB_ACCOUNT_NAME")]
    pub ynab_account_name: Option<String>,

    /// Flag color that marks budget transactions for sharing
    #[arg(long, env = "YNAB_FLAG_COLOR", default_value = "red")]
    pub flag_color: String,

    /// Shared-expense service API key
    #[arg(long, env = "SPLITWISE_API_KEY", hide_env_values = true)]
    pub splitwise_api_key: Option<String>,

    /// Name of the shared-expense group new expenses are created in
    #[arg(long, env = "SPLITWISE_GROUP_NAME")]
    pub splitwise_group_name: Option<String>,

    /// IANA timezone that defines "today" (e.g. Australia/Sydney)
    #[arg(long, env = "LEDGERBRIDGE_TIMEZONE", default_value = DEFAULT_TIMEZONE)]
    pub timezone: String,

    /// Directory for sync state, lock and run journal
    #[arg(long, env = "LEDGERBRIDGE_STATE_DIR")]
    pub state_dir: Option<PathBuf>,
}

/// A credential that never shows up in debug output
#[derive(Clone, PartialEq, Eq)]
pub struct Secret(String);

impl Secret {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for Secret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Secret(***)")
    }
}

/// Settings for the budget service
#[derive(Debug, Clone)]
pub struct BudgetSettings {
    pub access_token: Secret,
    pub budget_name: String,
    pub account_name: String,
    pub flag_color: FlagColor,
}

/// Settings for the shared-expense ledger
#[derive(Debug, Clone)]
pub struct LedgerSettings {
    pub api_key: Secret,
    pub group_name: String,
}

/// Validated settings for one run
#[derive(Debug, Clone)]
pub struct SyncSettings {
    pub budget: BudgetSettings,
    pub ledger: LedgerSettings,
    pub timezone: Tz,
    pub state_dir: Option<PathBuf>,
}

impl SyncSettings {
    /// Validate raw settings
    ///
    /// All missing required settings are reported together.
    pub fn from_args(args: SettingsArgs) -> Result<Self, SyncError> {
        let mut missing = Vec::new();
        let mut require = |value: Option<String>, name: &'static str| -> String {
            match value.map(|v| v.trim().to_string()).filter(|v| !v.is_empty()) {
                Some(v) => v,
                None => {
                    missing.push(name);
                    String::new()
                }
            }
        };

        let access_token = require(args.ynab_access_token, "YNAB_ACCESS_TOKEN");
        let budget_name = require(args.ynab_budget_name, "YNAB_BUDGET_NAME");
        let account_name = require(args.ynab_account_name, "YNAB_ACCOUNT_NAME");
        let api_key = require(args.splitwise_api_key, "SPLITWISE_API_KEY");
        let group_name = require(args.splitwise_group_name, "SPLITWISE_GROUP_NAME");

        if !missing.is_empty() {
            return Err(SyncError::Configuration(format!(
                "missing required settings: {}",
                missing.join(", ")
            )));
        }

        let flag_color = args
            .flag_color
            .parse::<FlagColor>()
            .map_err(|e| SyncError::Configuration(format!("YNAB_FLAG_COLOR: {}", e)))?;

        let timezone = parse_timezone(&args.timezone)?;

        Ok(Self {
            budget: BudgetSettings {
                access_token: Secret::new(access_token),
                budget_name,
                account_name,
                flag_color,
            },
            ledger: LedgerSettings {
                api_key: Secret::new(api_key),
                group_name,
            },
            timezone,
            state_dir: args.state_dir,
        })
    }
}

/// Parse an IANA timezone name
///
/// There is no fallback to UTC: a typo here would shift every date boundary.
pub fn parse_timezone(name: &str) -> Result<Tz, SyncError> {
    name.trim().parse::<Tz>().map_err(|e| {
        SyncError::Configuration(format!("invalid timezone '{}': {}", name, e))
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn complete_args() -> SettingsArgs {
        SettingsArgs {
            ynab_access_token: Some("token".into()),
            ynab_budget_name: Some("Household".into()),
            ynab_account_name: Some("Splitwise".into()),
            flag_color: "blue".into(),
            splitwise_api_key: Some("key".into()),
            splitwise_group_name: Some("Home".into()),
            timezone: DEFAULT_TIMEZONE.into(),
            state_dir: None,
        }
    }

    #[test]
    fn test_valid_settings() {
        let settings = SyncSettings::from_args(complete_args()).unwrap();
        assert_eq!(settings.budget.flag_color, FlagColor::Blue);
        assert_eq!(settings.timezone, chrono_tz::Australia::Sydney);
        assert_eq!(settings.ledger.group_name, "Home");
        assert_eq!(settings.budget.access_token.expose(), "token");
    }

    #[test]
    fn test_missing_settings_reported_together() {
        let mut args = complete_args();
        args.ynab_access_token = None;
        args.splitwise_group_name = Some("   ".into());

        let err = SyncSettings::from_args(args).unwrap_err();
        let msg = err.to_string();
        assert!(matches!(err, SyncError::Configuration(_)));
        assert!(msg.contains("YNAB_ACCESS_TOKEN"));
        assert!(msg.contains("SPLITWISE_GROUP_NAME"));
        assert!(!msg.contains("YNAB_BUDGET_NAME"));
    }

    #[test]
    fn test_invalid_timezone_is_configuration_error() {
        let mut args = complete_args();
        args.timezone = "Mars/Olympus_Mons".into();

        let err = SyncSettings::from_args(args).unwrap_err();
        assert!(matches!(err, SyncError::Configuration(_)));
        assert!(err.to_string().contains("Mars/Olympus_Mons"));
    }

    #[test]
    fn test_invalid_flag_color() {
        let mut args = complete_args();
        args.flag_color = "magenta".into();
        assert!(matches!(
            SyncSettings::from_args(args),
            Err(SyncError::Configuration(_))
        ));
    }

    #[test]
    fn test_secret_debug_is_redacted() {
        let settings = SyncSettings::from_args(complete_args()).unwrap();
        let debug = format!("{:?}", settings);
        assert!(!debug.contains("token\""));
        assert!(debug.contains("Secret(***)"));
    }
}
