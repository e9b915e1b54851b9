use std::process::ExitCode;

use drite_engine::core::Application;
use drite_engine::logging::{init_logging, LoggingConfig};
use drite_engine::window::WindowConfig;

fn main() -> ExitCode {
    init_logging(LoggingConfig::default());

    let config = WindowConfig::default();
    let title = config.title.clone();
    let mut app = Application::new();

    if let Err(e) = app.initialize(config) {
        log::error!("failed to initialize {title}: {e:#}");
        app.shutdown();
        return ExitCode::FAILURE;
    }
    log::info!("initialized {title}");

    app.run();
    app.shutdown();
    ExitCode::SUCCESS
}
