use std::time::Instant;

use thiserror::Error;

use crate::types::Frame;

#[derive(Debug, Error)]
pub enum CameraError {
    #[error("camera unavailable: {0}")]
    DeviceUnavailable(String),
    #[error("camera frame read failed: {0}")]
    ReadFailed(String),
    #[error("camera is not active")]
    Inactive,
}

/// Opens capture streams for a given device index.
pub trait CaptureBackend: Send {
    fn open(&self, index: u32) -> Result<Box<dyn CaptureStream>, CameraError>;
}

/// An open capture device producing frames on demand.
pub trait CaptureStream: Send {
    fn read(&mut self) -> Result<Frame, CameraError>;
}

/// Result of a `start()` call on an already-working controller.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StartOutcome {
    Started,
    AlreadyActive,
}

/// Camera feed controller: `Idle` until `start()` succeeds, `Active` until
/// `stop()`. Owns no thread; callers pull frames at their own cadence.
pub struct CameraFeed {
    index: u32,
    backend: Box<dyn CaptureBackend>,
    stream: Option<Box<dyn CaptureStream>>,
}

impl CameraFeed {
    pub fn new(index: u32, backend: Box<dyn CaptureBackend>) -> Self {
        Self {
            index,
            backend,
            stream: None,
        }
    }

    pub fn is_active(&self) -> bool {
        self.stream.is_some()
    }

    /// Open the capture device. Idempotent: starting an active feed is a
    /// no-op that reports `AlreadyActive`. On failure the feed stays idle.
    pub fn start(&mut self) -> Result<StartOutcome, CameraError> {
        if self.stream.is_some() {
            return Ok(StartOutcome::AlreadyActive);
        }
        let stream = self.backend.open(self.index)?;
        self.stream = Some(stream);
        Ok(StartOutcome::Started)
    }

    /// Read the next frame. Valid only while active. A failed read leaves
    /// the state untouched; the caller decides whether to reinitialize.
    pub fn read_frame(&mut self) -> Result<Frame, CameraError> {
        match self.stream.as_mut() {
            Some(stream) => stream.read(),
            None => Err(CameraError::Inactive),
        }
    }

    /// Release the device. Safe to call while idle.
    pub fn stop(&mut self) {
        self.stream = None;
    }
}

/// Synthetic capture backend producing a moving gradient. Stands in for real
/// hardware in tests and in builds without a camera feature.
pub struct SyntheticBackend {
    pub width: u32,
    pub height: u32,
}

impl Default for SyntheticBackend {
    fn default() -> Self {
        Self {
            width: 320,
            height: 240,
        }
    }
}

impl CaptureBackend for SyntheticBackend {
    fn open(&self, _index: u32) -> Result<Box<dyn CaptureStream>, CameraError> {
        Ok(Box::new(SyntheticStream {
            width: self.width,
            height: self.height,
            tick: 0,
        }))
    }
}

struct SyntheticStream {
    width: u32,
    height: u32,
    tick: u8,
}

impl CaptureStream for SyntheticStream {
    fn read(&mut self) -> Result<Frame, CameraError> {
        self.tick = self.tick.wrapping_add(1);
        let mut rgba = Vec::with_capacity((self.width * self.height * 4) as usize);
        for y in 0..self.height {
            for x in 0..self.width {
                rgba.extend_from_slice(&[
                    (x & 0xff) as u8,
                    (y & 0xff) as u8,
                    self.tick,
                    255,
                ]);
            }
        }
        Ok(Frame {
            rgba,
            width: self.width,
            height: self.height,
            timestamp: Instant::now(),
        })
    }
}

#[cfg(feature = "camera-nokhwa")]
pub use nokhwa_backend::{available_cameras, CameraDevice, NokhwaBackend};

#[cfg(feature = "camera-nokhwa")]
mod nokhwa_backend {
    use std::time::Instant;

    use nokhwa::{
        pixel_format::RgbFormat,
        query,
        utils::{ApiBackend, CameraIndex, RequestedFormat, RequestedFormatType},
        Camera,
    };

    use super::{CameraError, CaptureBackend, CaptureStream};
    use crate::types::Frame;

    #[derive(Clone, Debug)]
    pub struct CameraDevice {
        pub index: u32,
        pub label: String,
    }

    pub fn available_cameras() -> anyhow::Result<Vec<CameraDevice>> {
        let cameras = query(ApiBackend::Auto)?;
        Ok(cameras
            .into_iter()
            .enumerate()
            .map(|(pos, info)| CameraDevice {
                index: pos as u32,
                label: info.human_name(),
            })
            .collect())
    }

    /// Capture backend over the native camera stack.
    pub struct NokhwaBackend;

    impl CaptureBackend for NokhwaBackend {
        fn open(&self, index: u32) -> Result<Box<dyn CaptureStream>, CameraError> {
            let requested = RequestedFormat::new::<RgbFormat>(RequestedFormatType::None);
            let mut camera = Camera::new(CameraIndex::Index(index), requested)
                .map_err(|err| CameraError::DeviceUnavailable(err.to_string()))?;
            camera
                .open_stream()
                .map_err(|err| CameraError::DeviceUnavailable(err.to_string()))?;
            Ok(Box::new(NokhwaStream { camera }))
        }
    }

    struct NokhwaStream {
        camera: Camera,
    }

    impl CaptureStream for NokhwaStream {
        fn read(&mut self) -> Result<Frame, CameraError> {
            let frame = self
                .camera
                .frame()
                .map_err(|err| CameraError::ReadFailed(err.to_string()))?;
            let decoded = frame
                .decode_image::<RgbFormat>()
                .map_err(|err| CameraError::ReadFailed(err.to_string()))?;
            let (width, height) = decoded.dimensions();
            let rgb = decoded.into_raw();

            // Expand RGB to RGBA for the render pipeline.
            let mut rgba = Vec::with_capacity(rgb.len() / 3 * 4);
            for chunk in rgb.chunks_exact(3) {
                rgba.extend_from_slice(&[chunk[0], chunk[1], chunk[2], 255]);
            }

            Ok(Frame {
                rgba,
                width,
                height,
                timestamp: Instant::now(),
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{
        atomic::{AtomicUsize, Ordering},
        Arc,
    };

    use super::*;

    struct CountingBackend {
        opens: Arc<AtomicUsize>,
        fail: bool,
    }

    impl CaptureBackend for CountingBackend {
        fn open(&self, _index: u32) -> Result<Box<dyn CaptureStream>, CameraError> {
            self.opens.fetch_add(1, Ordering::SeqCst);
            if self.fail {
                return Err(CameraError::DeviceUnavailable("no device".into()));
            }
            SyntheticBackend::default().open(0)
        }
    }

    #[test]
    fn start_is_idempotent_and_opens_device_once() {
        let opens = Arc::new(AtomicUsize::new(0));
        let backend = CountingBackend {
            opens: opens.clone(),
            fail: false,
        };
        let mut feed = CameraFeed::new(0, Box::new(backend));

        assert_eq!(feed.start().unwrap(), StartOutcome::Started);
        assert_eq!(feed.start().unwrap(), StartOutcome::AlreadyActive);
        assert_eq!(opens.load(Ordering::SeqCst), 1);
        assert!(feed.is_active());
    }

    #[test]
    fn failed_start_leaves_feed_idle() {
        let backend = CountingBackend {
            opens: Arc::new(AtomicUsize::new(0)),
            fail: true,
        };
        let mut feed = CameraFeed::new(0, Box::new(backend));

        assert!(matches!(
            feed.start(),
            Err(CameraError::DeviceUnavailable(_))
        ));
        assert!(!feed.is_active());
        assert!(matches!(feed.read_frame(), Err(CameraError::Inactive)));
    }

    #[test]
    fn read_requires_active_state() {
        let mut feed = CameraFeed::new(0, Box::new(SyntheticBackend::default()));
        assert!(matches!(feed.read_frame(), Err(CameraError::Inactive)));

        feed.start().unwrap();
        let frame = feed.read_frame().unwrap();
        assert_eq!(frame.rgba.len(), (frame.width * frame.height * 4) as usize);
    }

    #[test]
    fn stop_is_unconditional_and_safe_when_idle() {
        let mut feed = CameraFeed::new(0, Box::new(SyntheticBackend::default()));
        feed.stop();
        feed.start().unwrap();
        feed.stop();
        assert!(!feed.is_active());
        // A stopped feed can be restarted.
        assert_eq!(feed.start().unwrap(), StartOutcome::Started);
    }
}
