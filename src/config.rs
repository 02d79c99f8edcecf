use crate::components::google_calendar::client::DEFAULT_CALENDAR_ENDPOINT;
use crate::components::google_calendar::ChangeDetection;
use crate::error::{config_error, env_error, BillboardResult};
use crate::utils::time::{parse_offset, DEFAULT_UTC_OFFSET};
use chrono::FixedOffset;
use dotenvy::dotenv;
use serde::Deserialize;
use std::env;
use std::fs;
use std::path::Path;
use std::time::Duration;

/// Optional file with defaults; environment variables take precedence
pub const CONFIG_FILE: &str = "config/billboard.toml";

/// Default page title
pub const DEFAULT_TITLE: &str = "Startup Edmonton Billboard";

/// Main configuration structure for the billboard
#[derive(Debug, Clone)]
pub struct Config {
    /// Google API key used for the public calendar
    pub google_api_key: String,
    /// Google Calendar ID to show
    pub google_calendar_id: String,
    /// Base URL holding the calendars
    pub calendar_endpoint: String,
    /// Offset the calendar timestamps are written in
    pub utc_offset: FixedOffset,
    /// How long a single fetch may take
    pub fetch_timeout: Duration,
    /// Number of upcoming events shown on the index page
    pub upcoming_limit: u32,
    /// Rule deciding whether polling browsers get a re-render
    pub change_detection: ChangeDetection,
    /// Address the web server binds to
    pub bind_address: String,
    pub port: u16,
    /// Page title
    pub title: String,
}

/// Values that may come from the config file, all optional
#[derive(Debug, Clone, Default, Deserialize)]
pub struct FileConfig {
    pub google_api_key: Option<String>,
    pub google_calendar_id: Option<String>,
    pub calendar_endpoint: Option<String>,
    pub utc_offset: Option<String>,
    pub fetch_timeout_secs: Option<u64>,
    pub upcoming_limit: Option<u32>,
    pub change_detection: Option<ChangeDetection>,
    pub bind_address: Option<String>,
    pub port: Option<u16>,
    pub title: Option<String>,
}

impl FileConfig {
    /// Read the config file if it exists
    pub fn read(path: &Path) -> BillboardResult<Option<Self>> {
        if !path.exists() {
            return Ok(None);
        }
        let content = fs::read_to_string(path)?;
        Ok(Some(toml::from_str(&content)?))
    }
}

impl Config {
    /// Load configuration from environment and config file
    pub fn load() -> BillboardResult<Self> {
        // Load .env file if it exists
        dotenv().ok();

        let file = FileConfig::read(Path::new(CONFIG_FILE))?.unwrap_or_default();
        Self::from_sources(|key| env::var(key).ok(), file)
    }

    /// Build the configuration from a variable lookup and file defaults
    pub fn from_sources<F>(lookup: F, file: FileConfig) -> BillboardResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        // Required values
        let google_api_key = lookup("GOOGLE_API_KEY")
            .or(file.google_api_key)
            .ok_or_else(|| env_error("GOOGLE_API_KEY"))?;
        let google_calendar_id = lookup("GOOGLE_CALENDAR_ID")
            .or(file.google_calendar_id)
            .ok_or_else(|| env_error("GOOGLE_CALENDAR_ID"))?;

        let calendar_endpoint = lookup("CALENDAR_ENDPOINT")
            .or(file.calendar_endpoint)
            .unwrap_or_else(|| DEFAULT_CALENDAR_ENDPOINT.to_string());

        let utc_offset = lookup("UTC_OFFSET")
            .or(file.utc_offset)
            .unwrap_or_else(|| DEFAULT_UTC_OFFSET.to_string());
        let utc_offset = parse_offset(&utc_offset)
            .map_err(|e| config_error(&format!("Invalid UTC_OFFSET: {}", e)))?;

        // Parse numeric values
        let fetch_timeout_secs = match lookup("FETCH_TIMEOUT_SECS") {
            Some(value) => value
                .parse::<u64>()
                .map_err(|_| config_error("Invalid FETCH_TIMEOUT_SECS format"))?,
            None => file.fetch_timeout_secs.unwrap_or(10),
        };
        if fetch_timeout_secs == 0 {
            return Err(config_error("FETCH_TIMEOUT_SECS must be greater than zero"));
        }

        let upcoming_limit = match lookup("UPCOMING_LIMIT") {
            Some(value) => value
                .parse::<u32>()
                .map_err(|_| config_error("Invalid UPCOMING_LIMIT format"))?,
            None => file.upcoming_limit.unwrap_or(10),
        };

        let change_detection = match lookup("CHANGE_DETECTION") {
            Some(value) => value.parse::<ChangeDetection>().map_err(|e| config_error(&e))?,
            None => file.change_detection.unwrap_or_default(),
        };

        let bind_address = lookup("BIND_ADDRESS")
            .or(file.bind_address)
            .unwrap_or_else(|| String::from("0.0.0.0"));

        let port = match lookup("PORT") {
            Some(value) => value
                .parse::<u16>()
                .map_err(|_| config_error("Invalid PORT format"))?,
            None => file.port.unwrap_or(5000),
        };

        let title = lookup("BILLBOARD_TITLE")
            .or(file.title)
            .unwrap_or_else(|| String::from(DEFAULT_TITLE));

        Ok(Config {
            google_api_key,
            google_calendar_id,
            calendar_endpoint,
            utc_offset,
            fetch_timeout: Duration::from_secs(fetch_timeout_secs),
            upcoming_limit,
            change_detection,
            bind_address,
            port,
            title,
        })
    }
}
