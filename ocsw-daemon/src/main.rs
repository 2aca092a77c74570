//
// Copyright (c) The Holo Core Contributors
//
// SPDX-License-Identifier: MIT
//

use std::sync::Arc;

use clap::{App, Arg};
use ocsw_daemon::config::{self, Config, LoggingFileRotation, LoggingFmtStyle};
use ocsw_daemon::northbound::Northbound;
use ocsw_daemon::northbound::client::shell;
use ocsw_interface::SimulatedSwitch;
use ocsw_utils::Receiver;
use tokio::signal::unix::{SignalKind, signal};
use tokio::sync::mpsc;
use tracing::level_filters::LevelFilter;
use tracing::{error, info};
use tracing_appender::rolling;
use tracing_subscriber::Layer;
use tracing_subscriber::prelude::*;

fn init_tracing(config: &config::Logging) {
    // Enable logging to journald.
    let journald = config.journald.enabled.then(tracing_journald::layer);
    let journald = match journald.transpose() {
        Ok(journald) => journald,
        Err(error) => {
            eprintln!("couldn't connect to journald: {error}");
            None
        }
    };

    // Enable logging to a file.
    let file = config.file.enabled.then(|| {
        let file_appender = match config.file.rotation {
            LoggingFileRotation::Never => {
                rolling::never(&config.file.dir, &config.file.name)
            }
            LoggingFileRotation::Hourly => {
                rolling::hourly(&config.file.dir, &config.file.name)
            }
            LoggingFileRotation::Daily => {
                rolling::daily(&config.file.dir, &config.file.name)
            }
        };

        let log_level_filter = LevelFilter::from_level(tracing::Level::TRACE);
        let layer = tracing_subscriber::fmt::layer()
            .with_writer(file_appender)
            .with_target(false)
            .with_thread_ids(config.file.fmt.show_thread_id)
            .with_file(config.file.fmt.show_source)
            .with_line_number(config.file.fmt.show_source)
            .with_ansi(config.file.fmt.colors);
        let layer = match config.file.fmt.style {
            LoggingFmtStyle::Compact => layer.compact().boxed(),
            LoggingFmtStyle::Full => layer.boxed(),
            LoggingFmtStyle::Json => layer.json().boxed(),
            LoggingFmtStyle::Pretty => layer.pretty().boxed(),
        };
        layer.with_filter(log_level_filter)
    });

    // Enable logging to stdout.
    let stdout = config.stdout.enabled.then(|| {
        let log_level_filter = LevelFilter::from_level(tracing::Level::TRACE);
        let layer = tracing_subscriber::fmt::layer()
            .with_target(false)
            .with_thread_ids(config.stdout.fmt.show_thread_id)
            .with_file(config.stdout.fmt.show_source)
            .with_line_number(config.stdout.fmt.show_source)
            .with_ansi(config.stdout.fmt.colors);
        let layer = match config.stdout.fmt.style {
            LoggingFmtStyle::Compact => layer.compact().boxed(),
            LoggingFmtStyle::Full => layer.boxed(),
            LoggingFmtStyle::Json => layer.json().boxed(),
            LoggingFmtStyle::Pretty => layer.pretty().boxed(),
        };
        layer.with_filter(log_level_filter)
    });

    let directive = "ocsw=debug"
        .parse()
        .unwrap_or_else(|_| LevelFilter::DEBUG.into());
    let env_filter = tracing_subscriber::EnvFilter::builder()
        .with_default_directive(directive)
        .from_env_lossy();
    tracing_subscriber::registry()
        .with(env_filter)
        .with(journald)
        .with(file)
        .with(stdout)
        .init();
}

fn signal_listener() -> Receiver<()> {
    let (signal_tx, signal_rx) = mpsc::channel(1);

    tokio::task::spawn(async move {
        let (mut sigint, mut sigterm) = match (
            signal(SignalKind::interrupt()),
            signal(SignalKind::terminate()),
        ) {
            (Ok(sigint), Ok(sigterm)) => (sigint, sigterm),
            (Err(error), _) | (_, Err(error)) => {
                error!(%error, "failed to install signal handlers");
                return;
            }
        };

        tokio::select! {
            _ = sigint.recv() => {
                info!("received SIGINT");
                let _ = signal_tx.send(()).await;
            },
            _ = sigterm.recv() => {
                info!("received SIGTERM");
                let _ = signal_tx.send(()).await;
            }
        }
    });

    signal_rx
}

fn build_version() -> String {
    const VERSION: &str = env!("CARGO_PKG_VERSION");
    match rustc_tools_util::get_version_info!().commit_hash {
        Some(hash) => format!("{VERSION} ({hash})"),
        None => VERSION.to_owned(),
    }
}

// Serves management clients until a termination signal is received or the
// shell is closed.
async fn run(
    nb: Arc<Northbound>,
    config: &Config,
    mut signal_rx: Receiver<()>,
) {
    if !config.plugins.shell.enabled {
        let _ = signal_rx.recv().await;
        return;
    }

    let mut shell = shell::start(nb);
    tokio::select! {
        _ = signal_rx.recv() => (),
        _ = &mut shell => {
            info!("shell closed");
        }
    }
}

// ===== main =====

fn main() {
    // Parse command-line parameters.
    let matches = App::new("OpenConfig switch management daemon")
        .version(build_version().as_str())
        .arg(
            Arg::with_name("config")
                .short("c")
                .long("config")
                .value_name("file")
                .help("Specify an alternative configuration file."),
        )
        .arg(
            Arg::with_name("shell")
                .long("shell")
                .help("Start the interactive diagnostic shell."),
        )
        .get_matches();

    // Read configuration file.
    let config_file = matches.value_of("config");
    let mut config = Config::load(config_file);
    if matches.is_present("shell") {
        config.plugins.shell.enabled = true;
    }

    // Initialize tracing.
    init_tracing(&config.logging);

    // We're ready to go!
    info!("starting up");

    let runtime = match tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
    {
        Ok(runtime) => runtime,
        Err(error) => {
            error!(%error, "failed to create async runtime");
            std::process::exit(1);
        }
    };
    runtime.block_on(async {
        // Spawn signal listener.
        let signal_rx = signal_listener();

        // Restore the saved configuration before serving clients.
        let switch = Arc::new(SimulatedSwitch::new());
        let nb = Arc::new(Northbound::new(&config, switch));
        if let Err(error) = nb.load_snapshot().await {
            error!(%error, "failed to restore configuration snapshot");
        }

        run(nb, &config, signal_rx).await;
    });

    // The shell might still be blocked reading input.
    runtime.shutdown_background();

    info!("exiting");
}
