use std::fs::File;
use std::process::ExitCode;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use clap::Parser;
use tokio::runtime::Runtime;
use tokio::sync::mpsc;
use tracing::{error, info};
use tracing_error::ErrorLayer;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use staffview::api::RestClient;
use staffview::controller::Controller;
use staffview::domain::{AppConfig, AppError};
use staffview::model::{Model, Status};
use staffview::pages::PageContext;
use staffview::task::Tasks;
use staffview::ui::AppUI;

const SHUTDOWN_TIMEOUT: Duration = Duration::from_millis(500);

fn main() -> ExitCode {
    let config = AppConfig::parse();
    if let Err(e) = init_logging(&config) {
        eprintln!("Error: {e}");
        return ExitCode::FAILURE;
    }

    let result = run(&config);
    ratatui::restore();
    match result {
        Err(e) => {
            error!("Exiting with error: {e:?}");
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
        Ok(_) => ExitCode::SUCCESS,
    }
}

fn init_logging(config: &AppConfig) -> Result<(), AppError> {
    let log_file = File::create(config.log_path()?)?;
    let filter = match &config.log_level {
        Some(level) => EnvFilter::try_new(level),
        None => EnvFilter::try_from_default_env().or_else(|_| EnvFilter::try_new("info")),
    }
    .map_err(|e| AppError::Logging(e.to_string()))?;

    tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(Mutex::new(log_file))
                .with_ansi(false),
        )
        .with(ErrorLayer::default())
        .try_init()
        .map_err(|e| AppError::Logging(e.to_string()))
}

fn run(config: &AppConfig) -> Result<(), AppError> {
    info!("Starting staffview against {}", config.base_url);

    let runtime = Runtime::new()?;
    let (sender, mut receiver) = mpsc::unbounded_channel();
    let ctx = PageContext {
        api: Arc::new(RestClient::new(&config.base_url)?),
        tasks: Tasks::new(runtime.handle().clone(), sender),
    };

    let mut model = Model::init(config, ctx);
    let mut ui = AppUI::new();
    let controller = Controller::new(config);

    let mut terminal = ratatui::init();

    while model.status != Status::Quitting {
        // Render the current view
        terminal.draw(|f| ui.draw(&model, f))?;

        // Apply finished background work
        while let Ok(message) = receiver.try_recv() {
            model.update(message);
        }

        // Handle events and map to a Message
        if let Some(message) = controller.handle_event(&model)? {
            model.update(message);
        };
    }

    info!("Shutting down");
    drop(model);
    runtime.shutdown_timeout(SHUTDOWN_TIMEOUT);
    Ok(())
}
