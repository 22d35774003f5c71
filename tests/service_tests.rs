//! Recorder service tests: export gating and producer behavior under load

use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{mpsc, Arc, Mutex};
use std::time::Duration as StdDuration;

use ghost_rec::application::ports::AudioFileWriter;
use ghost_rec::application::recorder::{ControlOutcome, RecorderService, RecorderSettings};
use ghost_rec::domain::buffer::MarkerPattern;
use ghost_rec::domain::control::ControlEvent;
use ghost_rec::domain::error::CodecError;
use ghost_rec::domain::recording::Duration;
use ghost_rec::infrastructure::WavFileWriter;

/// Counts writes and blocks each one until released
struct GatedWriter {
    calls: AtomicUsize,
    entered: Mutex<mpsc::Sender<()>>,
    release: Mutex<mpsc::Receiver<()>>,
}

impl GatedWriter {
    fn new() -> (Arc<Self>, mpsc::Receiver<()>, mpsc::Sender<()>) {
        let (entered_tx, entered_rx) = mpsc::channel();
        let (release_tx, release_rx) = mpsc::channel();
        let writer = Arc::new(Self {
            calls: AtomicUsize::new(0),
            entered: Mutex::new(entered_tx),
            release: Mutex::new(release_rx),
        });
        (writer, entered_rx, release_tx)
    }
}

impl AudioFileWriter for GatedWriter {
    fn write_mono(&self, _: &Path, _: &[f32], _: u32) -> Result<(), CodecError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let _ = self.entered.lock().unwrap().send(());
        let _ = self.release.lock().unwrap().recv();
        Ok(())
    }
}

fn settings(path: impl AsRef<Path>) -> RecorderSettings {
    let mut settings = RecorderSettings::new(path.as_ref());
    settings.retention = Duration::from_secs(2);
    settings
}

/// Feed blocks until the armed marker has been injected
fn prime(service: &RecorderService, rate: u32, block: usize) {
    let mut producer = service.producer();
    producer.process(Some(&vec![0.1; block]), None, rate);
    service.control_handler().handle(ControlEvent::Arm);
    while service.context().marker_pending() {
        producer.process(Some(&vec![0.1; block]), None, rate);
    }
    for _ in 0..50 {
        producer.process(Some(&vec![0.1; block]), None, rate);
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_commits_start_one_export() {
    let (writer, entered, release) = GatedWriter::new();
    let service = Arc::new(RecorderService::new(settings("/tmp/unused.wav"), writer.clone()));
    prime(&service, 48_000, 128);

    let mut commits = Vec::new();
    for _ in 0..8 {
        let handler = service.control_handler();
        commits.push(tokio::spawn(async move { handler.handle(ControlEvent::Commit) }));
    }

    let mut started = Vec::new();
    let mut rejected = 0;
    for commit in commits {
        match commit.await.unwrap() {
            ControlOutcome::ExportStarted(task) => started.push(task),
            ControlOutcome::ExportAlreadyRunning => rejected += 1,
            ControlOutcome::Armed => panic!("commit reported as arm"),
        }
    }
    assert_eq!(started.len(), 1);
    assert_eq!(rejected, 7);

    entered.recv_timeout(StdDuration::from_secs(5)).unwrap();
    release.send(()).unwrap();
    for task in started {
        task.await.unwrap().unwrap();
    }

    assert_eq!(writer.calls.load(Ordering::SeqCst), 1);
    assert!(!service.context().is_exporting());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn producer_drops_blocks_while_export_runs() {
    let (writer, entered, release) = GatedWriter::new();
    let service = RecorderService::new(settings("/tmp/unused.wav"), writer.clone());
    prime(&service, 48_000, 128);
    let buffered_before = service.context().blocks_buffered();

    let ControlOutcome::ExportStarted(task) = service.control_handler().handle(ControlEvent::Commit) else {
        panic!("export did not start");
    };
    entered.recv_timeout(StdDuration::from_secs(5)).unwrap();

    // The exporter holds the lock inside the writer
    let mut producer = service.producer();
    let mut out = vec![0.0f32; 128];
    for _ in 0..10 {
        producer.process(Some(&[0.4; 128]), Some(&mut out), 48_000);
    }
    assert_eq!(service.context().blocks_dropped(), 10);
    assert_eq!(service.context().blocks_buffered(), buffered_before);
    assert!(out.iter().all(|&s| s == 0.4));

    release.send(()).unwrap();
    task.await.unwrap().unwrap();

    producer.process(Some(&[0.4; 128]), None, 48_000);
    assert_eq!(service.context().blocks_buffered(), buffered_before + 1);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn committed_file_holds_marker_near_pre_time() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("takes/last.wav");
    let service = RecorderService::new(settings(&path), Arc::new(WavFileWriter::new()));

    let rate = 48_000;
    let mut producer = service.producer();
    let mut out = vec![0.0f32; 128];
    let mut passthrough = Vec::new();
    let handler = service.control_handler();

    for block in 0..400 {
        if block == 100 {
            handler.handle(ControlEvent::Arm);
        }
        let input: Vec<f32> = (0..128).map(|i| ((block * 128 + i) % 64) as f32 / 256.0).collect();
        producer.process(Some(&input), Some(&mut out), rate);
        passthrough.extend_from_slice(&out);
    }

    let ControlOutcome::ExportStarted(task) = handler.handle(ControlEvent::Commit) else {
        panic!("export did not start");
    };
    let summary = task.await.unwrap().unwrap();
    assert_eq!(summary.sample_rate, rate);

    let mut reader = hound::WavReader::open(&path).unwrap();
    let exported: Vec<f32> = reader
        .samples::<i32>()
        .map(|s| s.unwrap() as f32 / 8_388_607.0)
        .collect();

    // 100ms of pre-time, less the marker block itself
    let in_file = MarkerPattern::find(&exported).expect("marker in export");
    assert!((4_600..=4_800).contains(&in_file), "marker at {}", in_file);

    // The live output carries the same marker, 100ms after the arm
    let in_stream = MarkerPattern::find(&passthrough).expect("marker in passthrough");
    assert_eq!(in_stream % 128, 0);
    assert!(in_stream >= 100 * 128 + 4_800);
}
