use std::fs;
use std::path::{Path, PathBuf};
use iced::Theme;
use serde::{Deserialize, Serialize};
use crate::error::{ConfigError, StorageError};

pub const BACKEND_URL_VAR: &str = "EBD_BACKEND_URL";
pub const DATA_DIR_VAR: &str = "EBD_DATA_DIR";
pub const DEFAULT_BACKEND_URL: &str = "http://127.0.0.1:8001";
pub const DEFAULT_DATA_DIR: &str = "ebd-data";
pub const PREFERENCES_FILE: &str = "config.json";

/// Startup configuration, read once from the environment (and `.env`).
#[derive(Debug, Clone, PartialEq)]
pub struct AppConfig {
    pub backend_url: String,
    pub data_dir: PathBuf,
    /// True when `EBD_BACKEND_URL` was unset and the local default is used.
    pub backend_url_defaulted: bool,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        // a missing .env is fine
        let _ = dotenvy::dotenv();
        Self::from_values(
            std::env::var(BACKEND_URL_VAR).ok(),
            std::env::var(DATA_DIR_VAR).ok(),
        )
    }

    pub fn from_values(
        backend_url: Option<String>,
        data_dir: Option<String>,
    ) -> Result<Self, ConfigError> {
        let backend_url = backend_url
            .map(|url| url.trim().to_string())
            .filter(|url| !url.is_empty());
        let backend_url_defaulted = backend_url.is_none();
        let backend_url = backend_url.unwrap_or_else(|| DEFAULT_BACKEND_URL.to_string());

        if !(backend_url.starts_with("http://") || backend_url.starts_with("https://")) {
            return Err(ConfigError::InvalidBackendUrl(backend_url));
        }

        let data_dir = data_dir
            .filter(|dir| !dir.trim().is_empty())
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_DATA_DIR));

        Ok(Self {
            backend_url: backend_url.trim_end_matches('/').to_string(),
            data_dir,
            backend_url_defaulted,
        })
    }

    /// Called once logging is up.
    pub fn log_summary(&self) {
        if self.backend_url_defaulted {
            tracing::warn!(
                url = %self.backend_url,
                "{BACKEND_URL_VAR} not set, using the local development backend"
            );
        }
        tracing::info!(
            backend = %self.backend_url,
            data_dir = %self.data_dir.display(),
            "configuration loaded"
        );
    }
}

/// User preferences stored in `<data_dir>/config.json`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Preferences {
    pub theme_name: String,
}

pub fn save_theme(data_dir: &Path, theme: &Theme) -> Result<(), StorageError> {
    let prefs = Preferences {
        theme_name: theme_to_str(theme).to_string(),
    };
    fs::create_dir_all(data_dir)?;
    let json = serde_json::to_string_pretty(&prefs)?;
    fs::write(data_dir.join(PREFERENCES_FILE), json)?;
    Ok(())
}

pub fn load_theme(data_dir: &Path) -> Option<Theme> {
    let contents = fs::read_to_string(data_dir.join(PREFERENCES_FILE)).ok()?;
    match serde_json::from_str::<Preferences>(&contents) {
        Ok(prefs) => theme_from_str(&prefs.theme_name),
        Err(e) => {
            tracing::warn!(error = %e, "preferences file is malformed, using the default theme");
            None
        }
    }
}

pub fn theme_from_str(name: &str) -> Option<Theme> {
    Theme::ALL
        .iter()
        .find(|t| theme_to_str(t).eq_ignore_ascii_case(name))
        .cloned()
}

pub fn theme_names() -> Vec<&'static str> {
    Theme::ALL.iter().map(theme_to_str).collect()
}

pub fn theme_to_str(theme: &Theme) -> &'static str {
    match theme {
        Theme::Light => "Light",
        Theme::Dark => "Dark",
        Theme::Dracula => "Dracula",
        Theme::Nord => "Nord",
        Theme::SolarizedLight => "SolarizedLight",
        Theme::SolarizedDark => "SolarizedDark",
        Theme::GruvboxLight => "GruvboxLight",
        Theme::GruvboxDark => "GruvboxDark",
        Theme::CatppuccinLatte => "CatppuccinLatte",
        Theme::CatppuccinFrappe => "CatppuccinFrappe",
        Theme::CatppuccinMacchiato => "CatppuccinMacchiato",
        Theme::CatppuccinMocha => "CatppuccinMocha",
        Theme::TokyoNight => "TokyoNight",
        Theme::TokyoNightStorm => "TokyoNightStorm",
        Theme::TokyoNightLight => "TokyoNightLight",
        Theme::KanagawaWave => "KanagawaWave",
        Theme::KanagawaDragon => "KanagawaDragon",
        Theme::KanagawaLotus => "KanagawaLotus",
        Theme::Moonfly => "Moonfly",
        Theme::Nightfly => "Nightfly",
        Theme::Oxocarbon => "Oxocarbon",
        Theme::Ferra => "Ferra",
        _ => "Unknown",
    }
}
