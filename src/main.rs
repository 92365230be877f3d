use anyhow::Result;
use std::fs::OpenOptions;
use std::path::Path;
use std::sync::Mutex;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use quotacard::config::{default_state_dir, Config, Settings};
use quotacard::ui::{render_once, App};

/// Log file under the state directory; the terminal belongs to the card
const LOG_FILE_NAME: &str = "quotacard.log";

#[tokio::main]
async fn main() -> Result<()> {
    // Parse CLI arguments
    let cli = Config::parse_args();

    // Setup logging
    setup_logging(cli.debug, &default_state_dir());

    // Load settings
    let mut settings = Settings::load(cli.config.as_ref())?;
    settings.merge_cli(&cli);
    settings.validate();
    tracing::debug!("Settings: {:?}", settings);

    if let Some(json) = cli.once_mode() {
        print!("{}", render_once(&settings, json)?);
        return Ok(());
    }

    // Run the application
    let mut app = App::new(settings)?;
    app.run().await
}

fn setup_logging(debug: bool, log_dir: &Path) {
    let filter = if debug {
        EnvFilter::new("quotacard=debug,quotacard_core=debug")
    } else {
        EnvFilter::new("quotacard=info")
    };

    // Logging is best effort: no log file, no logs
    if std::fs::create_dir_all(log_dir).is_err() {
        return;
    }
    let Ok(file) = OpenOptions::new()
        .create(true)
        .append(true)
        .open(log_dir.join(LOG_FILE_NAME))
    else {
        return;
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_ansi(false)
                .with_writer(Mutex::new(file)),
        )
        .init();
}
