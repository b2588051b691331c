mod bootstrap;

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use dashboard_core::settings::{Settings, View};
use dashboard_data::loader::LoadSource;
use dashboard_runtime::session::DashboardSession;
use dashboard_ui::app::{App, Status};

#[tokio::main]
async fn main() -> Result<()> {
    let settings = Settings::load_with_last_used();

    bootstrap::ensure_directories()?;

    let log_file = log_destination(&settings);
    bootstrap::setup_logging(&settings.log_level, log_file.as_deref())?;

    tracing::info!("Evergreen Dashboard v{} starting", env!("CARGO_PKG_VERSION"));
    tracing::info!("View: {}, Theme: {}", settings.view.as_str(), settings.theme);

    match settings.view {
        View::Json => {
            let report = json_report(&settings)?;
            println!("{}", report);
        }

        View::Dashboard => {
            let (session, load_error) = open_session(&settings);

            let mut app = App::new(&settings.theme, session);
            if let Some(message) = load_error {
                app.status = Some(Status::error(message));
            }

            // The loop exits on 'q' / Ctrl+C inside the TUI. Ctrl+C is also
            // caught at the OS level for signals that arrive outside raw mode.
            tokio::select! {
                result = app.run() => {
                    result?;
                }
                _ = tokio::signal::ctrl_c() => {
                    tracing::info!("Ctrl+C received; shutting down");
                }
            }
        }
    }

    Ok(())
}

/// Where logs go: `--log-file` if given, a file when the dashboard owns the
/// terminal, stderr (`None`) otherwise.
fn log_destination(settings: &Settings) -> Option<PathBuf> {
    match (settings.view, &settings.log_file) {
        (_, Some(path)) => Some(path.clone()),
        (View::Dashboard, None) => Some(bootstrap::default_log_file()),
        (View::Json, None) => None,
    }
}

/// Load the requested file and apply any command-line window.
///
/// Load failures do not abort: the dashboard opens empty and shows the error.
fn open_session(settings: &Settings) -> (Arc<DashboardSession>, Option<String>) {
    let session = Arc::new(DashboardSession::new());

    let Some(file) = &settings.file else {
        return (session, None);
    };

    match session.upload(&LoadSource::path(file)) {
        Ok(full) => {
            let requested = settings.date_range();
            if !requested.is_unbounded() {
                session.set_range(
                    requested.start.or(full.start),
                    requested.end.or(full.end),
                );
            }
            (session, None)
        }
        Err(e) => {
            let message = format!("Could not load {}: {}", file.display(), e);
            (session, Some(message))
        }
    }
}

/// Load, filter and aggregate in one shot, returning pretty-printed JSON.
fn json_report(settings: &Settings) -> Result<String> {
    let file = settings
        .file
        .as_ref()
        .context("no sales export given; pass a .csv or spreadsheet path")?;

    let session = DashboardSession::new();
    session
        .upload(&LoadSource::path(file))
        .with_context(|| format!("loading {}", file.display()))?;

    let requested = settings.date_range();
    if !requested.is_unbounded() {
        session.set_range(requested.start, requested.end);
    }

    let snapshot = session.snapshot()?;
    Ok(serde_json::to_string_pretty(&snapshot)?)
}
