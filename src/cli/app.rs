//! Recorder runner: capture, control listener and export reporting

use std::env;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use crate::application::ports::{AudioSource, ConfigStore, ControlSource};
use crate::application::recorder::{
    ControlOutcome, ExportTask, FaultCallback, RecorderError, RecorderService, RecorderSettings,
};
use crate::domain::config::{AppConfig, OscConfig};
use crate::domain::error::BufferError;
use crate::domain::recording::Duration;
use crate::infrastructure::{
    default_output_path, CpalCapture, OscControlServer, WavFileWriter, XdgConfigStore,
};

use super::args::RecorderOptions;
use super::presenter::Presenter;
use super::signals::{forward_control_events, ServiceSignal, ServiceSignalHandler};

/// Exit codes
pub const EXIT_SUCCESS: u8 = 0;
pub const EXIT_ERROR: u8 = 1;
pub const EXIT_USAGE_ERROR: u8 = 2;

/// Environment override for the export destination
pub const ENV_OUTPUT: &str = "GHOST_REC_OUTPUT";

/// Environment override for the OSC port
pub const ENV_OSC_PORT: &str = "GHOST_REC_OSC_PORT";

/// Load and merge configuration from file, env, and CLI
pub async fn load_merged_config(cli_config: AppConfig) -> AppConfig {
    let store = XdgConfigStore::new();
    let file_config = match store.load().await {
        Ok(config) => config,
        Err(e) => {
            tracing::warn!(path = %store.path().display(), error = %e, "ignoring unreadable config file");
            AppConfig::empty()
        }
    };

    // Merge: defaults < file < env < cli
    AppConfig::defaults()
        .merge(file_config)
        .merge(env_config())
        .merge(cli_config)
}

fn env_config() -> AppConfig {
    let output_path = env::var(ENV_OUTPUT).ok().filter(|s| !s.is_empty());
    let port = env::var(ENV_OSC_PORT).ok().and_then(|s| s.parse::<u16>().ok());

    AppConfig {
        output_path,
        osc: port.map(|port| OscConfig {
            port: Some(port),
            address: None,
        }),
        ..Default::default()
    }
}

/// Resolve merged config into runner options; errors are usage errors
pub fn resolve_options(config: &AppConfig) -> Result<RecorderOptions, String> {
    fn parse(key: &str, value: &Option<String>, default: Duration) -> Result<Duration, String> {
        match value {
            Some(s) => s.parse().map_err(|e| format!("Invalid {}: {}", key, e)),
            None => Ok(default),
        }
    }

    let retention = parse("retention", &config.retention, Duration::default_retention())?;
    if retention.as_secs() == 0 {
        return Err(format!("Invalid retention: {} is shorter than one second", retention));
    }

    Ok(RecorderOptions {
        retention,
        pre_roll: parse("pre_roll", &config.pre_roll, Duration::default_pre_roll())?,
        pre_time: parse("pre_time", &config.pre_time, Duration::default_pre_time())?,
        min_duration: parse("min_duration", &config.min_duration, Duration::default_min_export())?,
        output_path: config
            .output_path
            .as_ref()
            .map(PathBuf::from)
            .unwrap_or_else(default_output_path),
        osc_port: config.osc_port_or_default(),
        osc_address: config.osc_address_or_default().to_string(),
    })
}

impl RecorderOptions {
    fn settings(&self) -> RecorderSettings {
        let mut settings = RecorderSettings::new(&self.output_path);
        settings.retention = self.retention;
        settings.pre_roll = self.pre_roll;
        settings.pre_time = self.pre_time;
        settings.min_duration = self.min_duration;
        settings
    }
}

/// Run the recorder until SIGINT/SIGTERM or a fatal fault
pub async fn run_recorder(options: RecorderOptions) -> ExitCode {
    let presenter = Presenter::new();

    #[cfg(unix)]
    let pid_file = {
        let pid_file = super::pid_file::PidFile::new();
        if let Err(e) = pid_file.acquire() {
            presenter.error(&e.to_string());
            return ExitCode::from(EXIT_ERROR);
        }
        pid_file
    };

    let (mut signals, signal_tx) = match ServiceSignalHandler::new().await {
        Ok(s) => s,
        Err(e) => {
            presenter.error(&format!("Failed to setup signal handler: {}", e));
            return ExitCode::from(EXIT_ERROR);
        }
    };

    let service = RecorderService::new(options.settings(), Arc::new(WavFileWriter::new()));

    // Control listener
    let mut server = OscControlServer::localhost(options.osc_port, options.osc_address.clone());
    if let Err(e) = server.bind().await {
        presenter.error(&format!("Port {}: {}", options.osc_port, RecorderError::Control(e)));
        return ExitCode::from(EXIT_ERROR);
    }
    let endpoint = server.endpoint();
    let (event_tx, event_rx) = mpsc::channel(32);
    let control_task = tokio::spawn(async move {
        if let Err(e) = server.run(event_tx).await {
            tracing::error!(error = %e, "control listener stopped");
        }
    });
    let forward_task = tokio::spawn(forward_control_events(event_rx, signal_tx.clone()));

    // Capture
    let fault_tx = signal_tx.clone();
    let on_fault: FaultCallback = Arc::new(move |e: BufferError| {
        let _ = fault_tx.try_send(ServiceSignal::Fault(RecorderError::Buffer(e).to_string()));
    });
    let producer = service.producer().with_fault_callback(on_fault);
    let stop = Arc::new(AtomicBool::new(false));
    let stop_for_capture = Arc::clone(&stop);
    let session = match tokio::task::spawn_blocking(move || {
        CpalCapture::new().start(producer, stop_for_capture)
    })
    .await
    {
        Ok(Ok(session)) => session,
        Ok(Err(e)) => {
            presenter.error(&RecorderError::Capture(e).to_string());
            control_task.abort();
            forward_task.abort();
            return ExitCode::from(EXIT_ERROR);
        }
        Err(e) => {
            presenter.error(&format!("Capture task failed: {}", e));
            control_task.abort();
            forward_task.abort();
            return ExitCode::from(EXIT_ERROR);
        }
    };

    presenter.recorder_status("Recording, waiting for triggers...");
    presenter.info(&format!(
        "Device: {} ({} Hz, {} ch) | Retention: {} | Control: {}",
        session.device, session.sample_rate, session.channels, options.retention, endpoint
    ));
    presenter.info(&format!(
        "Output: {} | SIGINT: exit",
        options.output_path.display()
    ));
    tracing::info!(
        pid = std::process::id(),
        sample_rate = session.sample_rate,
        retention = %options.retention,
        "recorder started"
    );

    let (ok, exports) = recorder_loop(&service, &mut signals, &presenter, &options.output_path).await;

    // Stop producer and control paths before the buffer goes away
    control_task.abort();
    forward_task.abort();
    stop.store(true, Ordering::SeqCst);
    let joined = tokio::task::spawn_blocking(move || session.thread.join()).await;
    if !matches!(joined, Ok(Ok(()))) {
        tracing::warn!("capture thread did not shut down cleanly");
    }

    if exports.iter().any(|h| !h.is_finished()) {
        presenter.info("Waiting for export to finish...");
    }
    for handle in exports {
        let _ = handle.await;
    }

    tracing::info!(
        buffered = service.context().blocks_buffered(),
        dropped = service.context().blocks_dropped(),
        "recorder stopped"
    );

    #[cfg(unix)]
    let _ = pid_file.release();

    if ok {
        ExitCode::from(EXIT_SUCCESS)
    } else {
        ExitCode::from(EXIT_ERROR)
    }
}

async fn recorder_loop(
    service: &RecorderService,
    signals: &mut ServiceSignalHandler,
    presenter: &Presenter,
    output_path: &std::path::Path,
) -> (bool, Vec<JoinHandle<()>>) {
    let handler = service.control_handler();
    let mut exports: Vec<JoinHandle<()>> = Vec::new();

    while let Some(signal) = signals.recv().await {
        match signal {
            ServiceSignal::Control(event) => match handler.handle(event) {
                ControlOutcome::Armed => presenter.info("Marker armed"),
                ControlOutcome::ExportStarted(task) => {
                    exports.retain(|h| !h.is_finished());
                    exports.push(tokio::spawn(report_export(task, output_path.to_path_buf())));
                }
                ControlOutcome::ExportAlreadyRunning => {
                    presenter.warn("Export already in progress, commit ignored")
                }
            },
            ServiceSignal::Fault(message) => {
                presenter.error(&message);
                return (false, exports);
            }
            ServiceSignal::Shutdown => break,
        }
    }

    (true, exports)
}

async fn report_export(task: ExportTask, path: PathBuf) {
    let presenter = Presenter::new();
    match task.await {
        Ok(Ok(summary)) => {
            tracing::info!(samples = summary.samples, clamped = summary.clamped, "export written");
            presenter.success(&presenter.format_export(&summary, &path));
        }
        Ok(Err(e)) => {
            tracing::warn!(error = %e, "export failed");
            presenter.error(&format!("Export failed: {}", e));
        }
        Err(e) => {
            tracing::error!(error = %e, "export task panicked");
            presenter.error(&format!("Export task failed: {}", e));
        }
    }
}
