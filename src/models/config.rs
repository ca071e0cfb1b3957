//! Application configuration structures.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use url::Url;

use crate::error::{AppError, Result};

/// Root application configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Location of the listings document
    #[serde(default = "defaults::target_url")]
    pub target_url: String,

    /// Recency window in hours
    #[serde(default = "defaults::lookback_hours")]
    pub lookback_hours: i64,

    /// Preferred date format for parsing and display
    #[serde(default = "defaults::date_format")]
    pub date_format: String,

    /// Send a "no results" message when a run matches nothing
    #[serde(default = "defaults::notify_when_empty")]
    pub notify_when_empty: bool,

    /// Mirror a recorded fetch failure to the notification channel
    #[serde(default)]
    pub alert_on_fetch_failure: bool,

    /// Visible lifetime of sent messages in seconds (0 disables expiry)
    #[serde(default = "defaults::delete_after_secs")]
    pub delete_after_secs: u64,

    /// HTTP client settings
    #[serde(default)]
    pub http: HttpConfig,

    /// Notification channel credentials
    #[serde(default)]
    pub telegram: TelegramConfig,

    /// CSS selectors for the primary extraction strategy
    #[serde(default)]
    pub selectors: SelectorConfig,
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        Ok(toml::from_str(&content)?)
    }

    /// Load configuration, writing the documented defaults if the file
    /// does not exist yet.
    pub fn load_or_init(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            let config = Self::default();
            fs::write(path, toml::to_string_pretty(&config)?)?;
            log::info!("Wrote default configuration to {}", path.display());
            return Ok(config);
        }
        Self::load(path)
    }

    /// Apply process-environment overrides. Environment takes
    /// precedence over the configuration file.
    pub fn apply_env(&mut self) {
        self.apply_env_map(std::env::vars());
    }

    /// Apply overrides from an explicit variable set.
    pub fn apply_env_map(&mut self, vars: impl Iterator<Item = (String, String)>) {
        for (key, value) in vars {
            match key.as_str() {
                "TARGET_URL" => self.target_url = value,
                "DATE_FORMAT" => self.date_format = value,
                "LOOKBACK_HOURS" => match value.parse() {
                    Ok(hours) => self.lookback_hours = hours,
                    Err(_) => log::warn!("Ignoring non-numeric LOOKBACK_HOURS: {value}"),
                },
                "TELEGRAM_BOT_TOKEN" => self.telegram.bot_token = value,
                "TELEGRAM_CHAT_ID" => self.telegram.chat_id = value,
                _ => {}
            }
        }
    }

    /// Validate configuration values for basic sanity.
    pub fn validate(&self) -> Result<()> {
        Url::parse(&self.target_url)
            .map_err(|e| AppError::config(format!("target_url is not a valid URL: {e}")))?;
        if self.lookback_hours <= 0 {
            return Err(AppError::config("lookback_hours must be > 0"));
        }
        if self.date_format.trim().is_empty() {
            return Err(AppError::config("date_format is empty"));
        }
        if self.http.user_agent.trim().is_empty() {
            return Err(AppError::config("http.user_agent is empty"));
        }
        if self.http.timeout_secs == 0 {
            return Err(AppError::config("http.timeout_secs must be > 0"));
        }
        Ok(())
    }

    /// Validate that channel credentials are present. Separate from
    /// [`Config::validate`] so offline runs work without them.
    pub fn validate_channel(&self) -> Result<()> {
        if self.telegram.bot_token.trim().is_empty() {
            return Err(AppError::config("telegram.bot_token is not set"));
        }
        if self.telegram.chat_id.trim().is_empty() {
            return Err(AppError::config("telegram.chat_id is not set"));
        }
        Ok(())
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            target_url: defaults::target_url(),
            lookback_hours: defaults::lookback_hours(),
            date_format: defaults::date_format(),
            notify_when_empty: defaults::notify_when_empty(),
            alert_on_fetch_failure: false,
            delete_after_secs: defaults::delete_after_secs(),
            http: HttpConfig::default(),
            telegram: TelegramConfig::default(),
            selectors: SelectorConfig::default(),
        }
    }
}

/// HTTP client settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HttpConfig {
    /// User-Agent header for requests; the source site gates on a
    /// plausible browser identity
    #[serde(default = "defaults::user_agent")]
    pub user_agent: String,

    /// Request timeout in seconds
    #[serde(default = "defaults::timeout")]
    pub timeout_secs: u64,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            user_agent: defaults::user_agent(),
            timeout_secs: defaults::timeout(),
        }
    }
}

/// Telegram channel credentials.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct TelegramConfig {
    /// Bot API token
    #[serde(default)]
    pub bot_token: String,

    /// Destination chat identifier (numeric ID or @channel name)
    #[serde(default)]
    pub chat_id: String,
}

/// CSS selectors describing the source site's listing markup.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SelectorConfig {
    /// Selector for a listing row
    #[serde(default = "defaults::row_selector")]
    pub row: String,

    /// Selector for the posted-date cell
    #[serde(default = "defaults::posted_date_selector")]
    pub posted_date: String,

    /// Selector for the organization cell
    #[serde(default = "defaults::organization_selector")]
    pub organization: String,

    /// Selector for the position cell
    #[serde(default = "defaults::position_selector")]
    pub position: String,

    /// Selector for the qualifications cell
    #[serde(default = "defaults::qualifications_selector")]
    pub qualifications: String,

    /// Selector for the apply-by-date cell
    #[serde(default = "defaults::apply_by_selector")]
    pub apply_by_date: String,

    /// HTML attribute carrying the apply link
    #[serde(default = "defaults::link_attr")]
    pub link_attr: String,
}

impl Default for SelectorConfig {
    fn default() -> Self {
        Self {
            row: defaults::row_selector(),
            posted_date: defaults::posted_date_selector(),
            organization: defaults::organization_selector(),
            position: defaults::position_selector(),
            qualifications: defaults::qualifications_selector(),
            apply_by_date: defaults::apply_by_selector(),
            link_attr: defaults::link_attr(),
        }
    }
}

mod defaults {
    // Pipeline defaults
    pub fn target_url() -> String {
        "https://www.freejobalert.com/latest-notifications/".into()
    }
    pub fn lookback_hours() -> i64 {
        24
    }
    pub fn date_format() -> String {
        "%d-%m-%Y".into()
    }
    pub fn notify_when_empty() -> bool {
        true
    }
    pub fn delete_after_secs() -> u64 {
        1800
    }

    // HTTP defaults
    pub fn user_agent() -> String {
        "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 \
         (KHTML, like Gecko) Chrome/91.0.4472.124 Safari/537.36"
            .into()
    }
    pub fn timeout() -> u64 {
        30
    }

    // Selector defaults matching the source site's listing table
    pub fn row_selector() -> String {
        "tr.lattrbord.latoclr".into()
    }
    pub fn posted_date_selector() -> String {
        "td.latcpb".into()
    }
    pub fn organization_selector() -> String {
        "td.latcr".into()
    }
    pub fn position_selector() -> String {
        "td.latceb".into()
    }
    pub fn qualifications_selector() -> String {
        "td.latcqb".into()
    }
    pub fn apply_by_selector() -> String {
        "td.latclb".into()
    }
    pub fn link_attr() -> String {
        "href".into()
    }
}
