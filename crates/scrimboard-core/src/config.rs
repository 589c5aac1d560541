use chrono_tz::Tz;
use figment::{
    providers::{Env, Format, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};

use crate::error::{Result, ScrimError};

pub const DEFAULT_PORT: u16 = 8000;
pub const DEFAULT_BIND: &str = "127.0.0.1";
pub const DEFAULT_DB_PATH: &str = "scrims.db";
pub const DEFAULT_CONFIG_PATH: &str = "scrimboard.toml";
pub const DEFAULT_TIMEZONE: &str = "Australia/Melbourne";
pub const DEFAULT_TICK_SECS: u64 = 60;
pub const DEFAULT_REMINDER_THRESHOLDS: [u32; 3] = [30, 15, 5];
pub const DEFAULT_MENTION: &str = "@everyone";
/// Config-table key holding the board message id.
pub const BOARD_MESSAGE_KEY: &str = "scrims_message_id";

/// Top-level config (scrimboard.toml + SCRIMBOARD_* env overrides).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ScrimConfig {
    #[serde(default)]
    pub web: WebConfig,
    #[serde(default)]
    pub database: DatabaseConfig,
    #[serde(default)]
    pub schedule: ScheduleConfig,
    pub discord: Option<DiscordConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WebConfig {
    #[serde(default = "default_bind")]
    pub bind: String,
    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for WebConfig {
    fn default() -> Self {
        Self {
            bind: default_bind(),
            port: default_port(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    #[serde(default = "default_db_path")]
    pub path: String,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: default_db_path(),
        }
    }
}

/// Reminder loop and display settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScheduleConfig {
    /// IANA timezone used to group the board by day and to read local input.
    #[serde(default = "default_timezone")]
    pub timezone: String,
    /// Seconds between reconciliation ticks. Thresholds are minute-granular,
    /// so anything above 60 can step over a reminder window.
    #[serde(default = "default_tick_secs")]
    pub tick_secs: u64,
    /// Minutes-before-start at which reminders fire.
    #[serde(default = "default_thresholds")]
    pub reminder_thresholds: Vec<u32>,
}

impl Default for ScheduleConfig {
    fn default() -> Self {
        Self {
            timezone: default_timezone(),
            tick_secs: default_tick_secs(),
            reminder_thresholds: default_thresholds(),
        }
    }
}

impl ScheduleConfig {
    pub fn tz(&self) -> Result<Tz> {
        crate::time::parse_timezone(&self.timezone)
    }

    /// Thresholds sorted largest first with duplicates removed.
    pub fn thresholds_desc(&self) -> Vec<u32> {
        let mut t = self.reminder_thresholds.clone();
        t.sort_unstable_by(|a, b| b.cmp(a));
        t.dedup();
        t
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DiscordConfig {
    pub bot_token: String,
    /// Channel holding the board and receiving reminders.
    pub channel_id: u64,
    /// Register slash commands on this guild only (instant); global otherwise.
    pub guild_id: Option<u64>,
    /// Prefix for reminder messages. Empty string disables the mention.
    #[serde(default = "default_mention")]
    pub mention: String,
    #[serde(default = "bool_true")]
    pub slash_commands: bool,
}

fn bool_true() -> bool {
    true
}
fn default_port() -> u16 {
    DEFAULT_PORT
}
fn default_bind() -> String {
    DEFAULT_BIND.to_string()
}
fn default_db_path() -> String {
    DEFAULT_DB_PATH.to_string()
}
fn default_timezone() -> String {
    DEFAULT_TIMEZONE.to_string()
}
fn default_tick_secs() -> u64 {
    DEFAULT_TICK_SECS
}
fn default_thresholds() -> Vec<u32> {
    DEFAULT_REMINDER_THRESHOLDS.to_vec()
}
fn default_mention() -> String {
    DEFAULT_MENTION.to_string()
}

impl ScrimConfig {
    /// Load config from a TOML file with SCRIMBOARD_* env var overrides.
    ///
    /// Checks in order:
    ///   1. Explicit path argument
    ///   2. SCRIMBOARD_CONFIG
    ///   3. ./scrimboard.toml
    ///
    /// A missing file is not an error; defaults and env vars still apply.
    /// Nested keys use a double underscore: `SCRIMBOARD_DISCORD__BOT_TOKEN`.
    pub fn load(config_path: Option<&str>) -> Result<Self> {
        let path = config_path
            .map(String::from)
            .or_else(|| std::env::var("SCRIMBOARD_CONFIG").ok())
            .unwrap_or_else(|| DEFAULT_CONFIG_PATH.to_string());
        tracing::debug!(path = %path, "loading config");

        let config: ScrimConfig = Figment::new()
            .merge(Toml::file(&path))
            .merge(Env::prefixed("SCRIMBOARD_").ignore(&["CONFIG"]).split("__"))
            .extract()
            .map_err(|e| ScrimError::Config(e.to_string()))?;

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        self.schedule.tz()?;
        if self.schedule.tick_secs == 0 {
            return Err(ScrimError::Config("schedule.tick_secs must be > 0".into()));
        }
        if self.schedule.reminder_thresholds.is_empty() {
            return Err(ScrimError::Config(
                "schedule.reminder_thresholds cannot be empty".into(),
            ));
        }
        if self.schedule.reminder_thresholds.contains(&0) {
            return Err(ScrimError::Config(
                "schedule.reminder_thresholds must be positive minutes".into(),
            ));
        }
        if let Some(ref discord) = self.discord {
            if discord.bot_token.trim().is_empty() {
                return Err(ScrimError::Config("discord.bot_token is empty".into()));
            }
            // Discord snowflakes are never zero
            if discord.channel_id == 0 {
                return Err(ScrimError::Config("discord.channel_id must be non-zero".into()));
            }
            if discord.guild_id == Some(0) {
                return Err(ScrimError::Config("discord.guild_id must be non-zero".into()));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn defaults_are_valid() {
        let config = ScrimConfig::default();
        config.validate().unwrap();
        assert_eq!(config.schedule.tick_secs, 60);
        assert_eq!(config.schedule.thresholds_desc(), vec![30, 15, 5]);
        assert!(config.discord.is_none());
    }

    #[test]
    fn thresholds_are_sorted_descending() {
        let schedule = ScheduleConfig {
            reminder_thresholds: vec![5, 60, 15, 5],
            ..ScheduleConfig::default()
        };
        assert_eq!(schedule.thresholds_desc(), vec![60, 15, 5]);
    }

    #[test]
    fn rejects_zero_tick_and_bad_timezone() {
        let mut config = ScrimConfig::default();
        config.schedule.tick_secs = 0;
        assert!(config.validate().is_err());

        let mut config = ScrimConfig::default();
        config.schedule.timezone = "Nowhere/Special".into();
        assert_eq!(config.validate().unwrap_err().code(), "UNKNOWN_TIMEZONE");

        let mut config = ScrimConfig::default();
        config.schedule.reminder_thresholds = vec![15, 0];
        assert!(config.validate().is_err());

        let discord = DiscordConfig {
            bot_token: "abc".into(),
            channel_id: 0,
            guild_id: None,
            mention: DEFAULT_MENTION.into(),
            slash_commands: true,
        };
        let mut config = ScrimConfig {
            discord: Some(discord.clone()),
            ..ScrimConfig::default()
        };
        assert_eq!(config.validate().unwrap_err().code(), "CONFIG_ERROR");

        config.discord = Some(DiscordConfig {
            channel_id: 42,
            guild_id: Some(0),
            ..discord.clone()
        });
        assert!(config.validate().is_err());

        config.discord = Some(DiscordConfig {
            channel_id: 42,
            guild_id: Some(7),
            ..discord
        });
        config.validate().unwrap();
    }

    #[test]
    fn loads_toml_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            r#"
[web]
port = 9100

[schedule]
timezone = "UTC"
reminder_thresholds = [10, 60]

[discord]
bot_token = "abc"
channel_id = 42
"#
        )
        .unwrap();

        let config = ScrimConfig::load(file.path().to_str()).unwrap();
        assert_eq!(config.web.port, 9100);
        assert_eq!(config.web.bind, DEFAULT_BIND);
        assert_eq!(config.schedule.tick_secs, DEFAULT_TICK_SECS);
        assert_eq!(config.schedule.thresholds_desc(), vec![60, 10]);
        let discord = config.discord.unwrap();
        assert_eq!(discord.channel_id, 42);
        assert_eq!(discord.mention, DEFAULT_MENTION);
        assert!(discord.slash_commands);
        assert!(discord.guild_id.is_none());
    }
}
