use anyhow::Result;
use gossamer::cli;
use gossamer::engine::OfflineBackend;
use gossamer::shell::{BrowserShell, PromptKind};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::runtime::Runtime;

fn main() -> Result<()> {
    // Process CLI arguments first (before logging init for cleaner output)
    let options = match cli::process_cli() {
        cli::CliResult::Exit(code) => {
            if code == 0 {
                return Ok(());
            }
            std::process::exit(code);
        }
        cli::CliResult::Continue(options) => options,
    };

    init_logging(options.log_level.as_deref());
    log::info!("Starting gossamer browser shell");

    let config = gossamer_config::Config::load_from(&options.profile_dir)?;

    // Tokio runtime for engine-side async work
    let runtime = Arc::new(Runtime::new()?);
    let backend = Arc::new(OfflineBackend::new(Arc::clone(&runtime)));

    let mut shell = BrowserShell::new(
        config,
        options.profile_dir.clone(),
        options.private,
        backend,
    );

    shell.startup(options.url.as_deref());
    shell.pump_events();

    log::info!(
        "Session running: {} window(s), {} tab(s)",
        shell.window_count(),
        shell.windows().map(|window| window.tabs().len()).sum::<usize>()
    );

    // No GUI host is attached in this build: drive the session to a clean
    // close, answering confirmations affirmatively, then exit.
    for id in shell.window_ids() {
        shell.request_close_window(id);
    }

    let deadline = Instant::now() + Duration::from_secs(5);
    while shell.window_count() > 0 {
        while let Some(prompt) = shell.take_prompt() {
            match prompt.kind {
                PromptKind::CloseDocument => shell.answer_close_document(prompt.window, true),
                PromptKind::AbortDownloads => shell.answer_abort_downloads(prompt.window, true),
            }
        }

        if !shell.wait_events(Duration::from_millis(50)) && Instant::now() > deadline {
            log::warn!(
                "Timed out waiting for {} window(s) to close",
                shell.window_count()
            );
            break;
        }
    }

    drop(shell);

    // Drop the runtime explicitly so tokio can shut its workers down before
    // main returns.
    log::info!("Session closed, shutting down runtime");
    if let Ok(runtime) = Arc::try_unwrap(runtime) {
        runtime.shutdown_timeout(Duration::from_secs(2));
    }

    Ok(())
}

fn init_logging(level: Option<&str>) {
    let mut builder = env_logger::Builder::from_default_env();
    if let Some(level) = level
        && let Ok(filter) = level.parse()
    {
        builder.filter_level(filter);
    }
    builder.init();
}
