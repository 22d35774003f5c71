//! Live input capture using cpal
//!
//! The stream is owned by a dedicated thread because `cpal::Stream` is
//! not `Send`. Interleaved frames are down-mixed to mono and handed to
//! the producer without touching the heap once the scratch buffer has
//! grown to the device's block size.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{mpsc, Arc};
use std::time::Duration as StdDuration;

use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use cpal::{SampleFormat, StreamConfig};

use crate::application::ports::{AudioSource, CaptureError, CaptureSession};
use crate::application::recorder::CaptureProducer;

/// How often the owning thread checks the stop flag
const STOP_POLL_INTERVAL: StdDuration = StdDuration::from_millis(100);

/// Default-input-device capture
#[derive(Debug, Default)]
pub struct CpalCapture;

/// Parameters resolved on the stream thread and reported back to `start`
struct StreamInfo {
    device: String,
    sample_rate: u32,
    channels: u16,
}

impl CpalCapture {
    pub fn new() -> Self {
        Self
    }

    fn get_input_device() -> Result<cpal::Device, CaptureError> {
        let host = cpal::default_host();
        host.default_input_device().ok_or(CaptureError::NoAudioDevice)
    }

    fn get_input_config(
        device: &cpal::Device,
    ) -> Result<(StreamConfig, SampleFormat), CaptureError> {
        let supported = device
            .default_input_config()
            .map_err(|e| CaptureError::StartFailed(format!("Failed to get config: {}", e)))?;

        let sample_format = supported.sample_format();
        match sample_format {
            SampleFormat::F32 | SampleFormat::I16 => Ok((supported.config(), sample_format)),
            other => Err(CaptureError::UnsupportedFormat(format!("{:?}", other))),
        }
    }

    /// Average interleaved frames into `mono`, reusing its allocation
    fn downmix_into<T: Copy>(data: &[T], channels: u16, mono: &mut Vec<f32>, to_f32: impl Fn(T) -> f32) {
        mono.clear();
        if channels <= 1 {
            mono.extend(data.iter().map(|&s| to_f32(s)));
            return;
        }
        let scale = 1.0 / channels as f32;
        mono.extend(
            data.chunks(channels as usize)
                .map(|frame| frame.iter().map(|&s| to_f32(s)).sum::<f32>() * scale),
        );
    }

    fn i16_to_f32(sample: i16) -> f32 {
        sample as f32 / 32_768.0
    }

    fn build_stream(
        device: &cpal::Device,
        config: &StreamConfig,
        sample_format: SampleFormat,
        mut producer: CaptureProducer,
    ) -> Result<cpal::Stream, CaptureError> {
        let channels = config.channels;
        let sample_rate = config.sample_rate.0;
        let mut mono: Vec<f32> = Vec::new();

        let stream = match sample_format {
            SampleFormat::F32 => device.build_input_stream(
                config,
                move |data: &[f32], _: &cpal::InputCallbackInfo| {
                    Self::downmix_into(data, channels, &mut mono, |s| s);
                    producer.process(Some(&mono), None, sample_rate);
                },
                |err| tracing::warn!(error = %err, "audio stream error"),
                None,
            ),
            SampleFormat::I16 => device.build_input_stream(
                config,
                move |data: &[i16], _: &cpal::InputCallbackInfo| {
                    Self::downmix_into(data, channels, &mut mono, Self::i16_to_f32);
                    producer.process(Some(&mono), None, sample_rate);
                },
                |err| tracing::warn!(error = %err, "audio stream error"),
                None,
            ),
            other => return Err(CaptureError::UnsupportedFormat(format!("{:?}", other))),
        };

        stream.map_err(|e| CaptureError::StartFailed(e.to_string()))
    }

    fn open(producer: CaptureProducer) -> Result<(cpal::Stream, StreamInfo), CaptureError> {
        let device = Self::get_input_device()?;
        let (config, sample_format) = Self::get_input_config(&device)?;
        let info = StreamInfo {
            device: device.name().unwrap_or_else(|_| "unknown".to_string()),
            sample_rate: config.sample_rate.0,
            channels: config.channels,
        };

        let stream = Self::build_stream(&device, &config, sample_format, producer)?;
        stream
            .play()
            .map_err(|e| CaptureError::StartFailed(e.to_string()))?;
        Ok((stream, info))
    }
}

impl AudioSource for CpalCapture {
    fn start(
        &self,
        producer: CaptureProducer,
        stop: Arc<AtomicBool>,
    ) -> Result<CaptureSession, CaptureError> {
        let (ready_tx, ready_rx) = mpsc::sync_channel(1);

        let thread = std::thread::Builder::new()
            .name("ghost-rec-capture".to_string())
            .spawn(move || {
                let stream = match Self::open(producer) {
                    Ok((stream, info)) => {
                        let _ = ready_tx.send(Ok(info));
                        stream
                    }
                    Err(e) => {
                        let _ = ready_tx.send(Err(e));
                        return;
                    }
                };

                while !stop.load(Ordering::SeqCst) {
                    std::thread::sleep(STOP_POLL_INTERVAL);
                }

                drop(stream);
                tracing::debug!("capture stream closed");
            })
            .map_err(|e| CaptureError::StartFailed(e.to_string()))?;

        let info = ready_rx
            .recv()
            .map_err(|_| CaptureError::StartFailed("capture thread exited".to_string()))??;

        Ok(CaptureSession {
            device: info.device,
            sample_rate: info.sample_rate,
            channels: info.channels,
            thread,
        })
    }
}
