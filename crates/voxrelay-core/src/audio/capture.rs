use crate::{CoreError, CoreResult};

use std::{
    collections::VecDeque,
    panic::Location,
    sync::{
        atomic::{AtomicBool, Ordering},
        {Arc, Mutex},
    },
};

use cpal::{
    Device, Stream, StreamConfig,
    traits::{DeviceTrait, HostTrait, StreamTrait},
};
use error_location::ErrorLocation;
use tracing::{debug, error, info, instrument};

/// Maximum mono samples to buffer (5 minutes at 48kHz).
/// Prevents unbounded memory growth during long recordings.
///
/// **Memory footprint at max capacity:**
/// - 48,000 Hz * 60s * 5 min * 4 bytes/f32 = ~58MB
pub(crate) const MAX_BUFFER_SAMPLES: usize = 48_000 * 60 * 5;

/// Average interleaved frames down to mono and append them to `buf`,
/// dropping the oldest samples beyond [`MAX_BUFFER_SAMPLES`].
pub(crate) fn push_mono(buf: &mut VecDeque<f32>, data: &[f32], channels: usize) {
    if channels <= 1 {
        buf.extend(data.iter().copied());
    } else {
        buf.extend(
            data.chunks(channels)
                .map(|frame| frame.iter().sum::<f32>() / frame.len() as f32),
        );
    }
    while buf.len() > MAX_BUFFER_SAMPLES {
        buf.pop_front();
    }
}

/// Microphone stream on the default input device.
pub struct AudioCapturer {
    device: Device,
    config: StreamConfig,
    stream: Option<Stream>,
    samples: Arc<Mutex<VecDeque<f32>>>,
    /// Set before the stream is dropped so a late callback writes nothing.
    shutdown: Arc<AtomicBool>,
}

impl AudioCapturer {
    #[track_caller]
    #[instrument]
    pub fn new() -> CoreResult<Self> {
        let host = cpal::default_host();

        let device = host
            .default_input_device()
            .ok_or(CoreError::NoMicrophoneFound {
                location: ErrorLocation::from(Location::caller()),
            })?;

        let config = device
            .default_input_config()
            .map_err(|e| CoreError::DeviceError {
                reason: format!("Failed to get config: {}", e),
                location: ErrorLocation::from(Location::caller()),
            })?;

        info!(
            device_id = ?device.id(),
            sample_rate = config.sample_rate(),
            channels = config.channels(),
            "AudioCapturer initialized"
        );

        Ok(Self {
            device,
            config: config.into(),
            stream: None,
            samples: Arc::new(Mutex::new(VecDeque::with_capacity(MAX_BUFFER_SAMPLES))),
            shutdown: Arc::new(AtomicBool::new(false)),
        })
    }

    #[track_caller]
    #[instrument(skip(self))]
    pub fn start(&mut self) -> CoreResult<()> {
        if self.stream.is_some() {
            return Err(CoreError::AlreadyRecording {
                location: ErrorLocation::from(Location::caller()),
            });
        }

        let samples = Arc::clone(&self.samples);
        let shutdown = Arc::clone(&self.shutdown);
        let channels = usize::from(self.config.channels);

        self.shutdown.store(false, Ordering::Release);

        samples
            .lock()
            .map_err(|e| CoreError::DeviceError {
                reason: format!("Failed to lock samples: {}", e),
                location: ErrorLocation::from(Location::caller()),
            })?
            .clear();

        let stream = self
            .device
            .build_input_stream(
                &self.config,
                move |data: &[f32], _: &cpal::InputCallbackInfo| {
                    if shutdown.load(Ordering::Acquire) {
                        return;
                    }
                    // A poisoned buffer still holds valid samples.
                    let mut buf = samples.lock().unwrap_or_else(|e| {
                        error!("Sample buffer lock poisoned, recovering: {}", e);
                        e.into_inner()
                    });
                    push_mono(&mut buf, data, channels);
                },
                |err| {
                    error!("Audio stream error: {}", err);
                },
                None,
            )
            .map_err(|e| CoreError::DeviceError {
                reason: format!("Failed to build stream: {}", e),
                location: ErrorLocation::from(Location::caller()),
            })?;

        stream.play().map_err(|e| CoreError::DeviceError {
            reason: format!("Failed to start stream: {}", e),
            location: ErrorLocation::from(Location::caller()),
        })?;

        self.stream = Some(stream);
        info!("Audio capture started");

        Ok(())
    }

    /// Stop the stream and take every buffered sample, leaving the buffer empty.
    #[track_caller]
    #[instrument(skip(self))]
    pub fn stop(&mut self) -> CoreResult<Vec<f32>> {
        let stream = self.stream.take().ok_or(CoreError::NotRecording {
            location: ErrorLocation::from(Location::caller()),
        })?;

        self.shutdown.store(true, Ordering::Release);
        drop(stream);
        info!("Audio capture stopped");

        let samples: Vec<f32> = self
            .samples
            .lock()
            .map_err(|e| CoreError::DeviceError {
                reason: format!("Failed to lock samples: {}", e),
                location: ErrorLocation::from(Location::caller()),
            })?
            .drain(..)
            .collect();

        debug!(sample_count = samples.len(), "Captured audio samples");

        Ok(samples)
    }

    pub fn is_active(&self) -> bool {
        self.stream.is_some()
    }

    pub fn sample_rate(&self) -> u32 {
        self.config.sample_rate
    }
}
