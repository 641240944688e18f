mod api;
mod app;
mod attendance;
mod backup;
mod config;
mod dashboard;
mod error;
mod forms;
mod logging;
mod router;
mod screens;
mod session;
mod storage;
#[cfg(test)]
mod testing;

use api::ApiClient;
use app::App;
use config::AppConfig;

fn main() -> iced::Result {
    let config = match AppConfig::from_env() {
        Ok(config) => config,
        Err(err) => {
            eprintln!("invalid configuration: {err}");
            std::process::exit(2);
        }
    };

    let _log_guard = logging::init(&config.data_dir);
    config.log_summary();

    let api = match ApiClient::new(&config.backend_url) {
        Ok(api) => api,
        Err(err) => {
            tracing::error!(error = %err, "failed to build the HTTP client");
            std::process::exit(1);
        }
    };

    iced::application("EBD Manager", App::update, App::view)
        .theme(|app: &App| app.theme.clone())
        .window_size(iced::Size::new(1400.0, 800.0))
        .run_with(move || App::new(config, api))
}
