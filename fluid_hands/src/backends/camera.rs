//! Camera sources.
//!
//! [`SimCamera`] paints a synthetic scene and is always available.  With
//! `--features webcam`, [`Webcam`] captures from the default device on its
//! own thread and hands frames over a channel; `update` keeps the newest.

use std::time::{Duration, Instant};

use flow_field::{ColorField, Resolution, Rgba};

use crate::collab::CameraSource;
use crate::error::Result;

// ════════════════════════════════════════════════════════════════════════════
// SimCamera
// ════════════════════════════════════════════════════════════════════════════

/// A bright disc orbiting over a dark vertical gradient.
pub struct SimCamera {
    frame:     ColorField,
    interval:  Duration,
    last:      Option<Instant>,
    frame_new: bool,
    frames:    u64,
}

impl SimCamera {
    /// Produce at most `fps` frames per second.  A non-positive rate yields a
    /// frame on every update; a rate too slow for `Duration` yields only the
    /// first frame.
    pub fn new(fps: f32) -> Self {
        let interval = if fps > 0.0 {
            Duration::try_from_secs_f32(1.0 / fps).unwrap_or(Duration::MAX)
        } else {
            Duration::ZERO
        };
        SimCamera {
            frame:     ColorField::zeros(Resolution::new(1, 1)),
            interval,
            last:      None,
            frame_new: false,
            frames:    0,
        }
    }

    pub fn frames(&self) -> u64 { self.frames }

    fn paint(&mut self) {
        let res = self.frame.resolution();
        let (w, h) = (res.width as f32, res.height as f32);
        let t = self.frames as f32 / 30.0;
        let (bx, by) = (0.5 + 0.3 * t.cos(), 0.5 + 0.25 * (t * 1.3).sin());
        let r = 0.12;

        for y in 0..res.height {
            let v = (y as f32 + 0.5) / h;
            for x in 0..res.width {
                let u = (x as f32 + 0.5) / w;
                let (dx, dy) = ((u - bx) * res.aspect(), v - by);
                let c = if dx * dx + dy * dy < r * r {
                    Rgba::new(1.0, 0.85, 0.6, 1.0)
                } else {
                    Rgba::new(0.05, 0.05 + 0.1 * v, 0.15 + 0.1 * v, 1.0)
                };
                self.frame.set(x, y, c);
            }
        }
    }
}

impl CameraSource for SimCamera {
    fn init_grabber(&mut self, res: Resolution) -> Result<()> {
        self.frame = ColorField::zeros(res);
        log::info!("synthetic camera {} started", res);
        Ok(())
    }

    fn update(&mut self) {
        let now = Instant::now();
        let due = self.last.map_or(true, |t| now.duration_since(t) >= self.interval);
        self.frame_new = due;
        if due {
            self.last = Some(now);
            self.frames += 1;
            self.paint();
        }
    }

    fn is_frame_new(&self) -> bool { self.frame_new }

    fn frame(&self) -> &ColorField { &self.frame }
}

// ════════════════════════════════════════════════════════════════════════════
// FallbackCamera
// ════════════════════════════════════════════════════════════════════════════

/// A camera that falls back to [`SimCamera`] when the preferred device cannot
/// be opened.
pub struct FallbackCamera {
    preferred: Option<Box<dyn CameraSource>>,
    fallback:  SimCamera,
}

impl FallbackCamera {
    pub fn new(preferred: Box<dyn CameraSource>, fallback: SimCamera) -> Self {
        FallbackCamera { preferred: Some(preferred), fallback }
    }

    /// True once the synthetic camera has taken over.
    pub fn is_fallback(&self) -> bool { self.preferred.is_none() }

    fn active(&self) -> &dyn CameraSource {
        match &self.preferred {
            Some(cam) => cam.as_ref(),
            None      => &self.fallback,
        }
    }
}

impl CameraSource for FallbackCamera {
    fn init_grabber(&mut self, res: Resolution) -> Result<()> {
        if let Some(cam) = self.preferred.as_mut() {
            match cam.init_grabber(res) {
                Ok(()) => return Ok(()),
                Err(e) => {
                    log::warn!("{e}; using the synthetic camera");
                    self.preferred = None;
                }
            }
        }
        self.fallback.init_grabber(res)
    }

    fn update(&mut self) {
        match self.preferred.as_mut() {
            Some(cam) => cam.update(),
            None      => self.fallback.update(),
        }
    }

    fn is_frame_new(&self) -> bool { self.active().is_frame_new() }

    fn frame(&self) -> &ColorField { self.active().frame() }
}

// ════════════════════════════════════════════════════════════════════════════
// Webcam (feature = "webcam")
// ════════════════════════════════════════════════════════════════════════════

#[cfg(feature = "webcam")]
pub use webcam::Webcam;

#[cfg(feature = "webcam")]
mod webcam {
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::mpsc::{self, Receiver, TryRecvError};
    use std::sync::Arc;
    use std::thread;

    use flow_field::{ColorField, Resolution, Rgba};
    use nokhwa::pixel_format::RgbFormat;
    use nokhwa::utils::{
        CameraFormat, CameraIndex, FrameFormat, RequestedFormat, RequestedFormatType,
        Resolution as CameraResolution,
    };
    use nokhwa::Camera;

    use crate::collab::CameraSource;
    use crate::error::{Error, Result};

    /// Frames in flight between the capture thread and `update`.
    const QUEUE: usize = 2;

    pub struct Webcam {
        index:     u32,
        frame:     ColorField,
        rx:        Option<Receiver<ColorField>>,
        running:   Arc<AtomicBool>,
        frame_new: bool,
    }

    impl Webcam {
        pub fn new(index: u32) -> Self {
            Webcam {
                index,
                frame:     ColorField::zeros(Resolution::new(1, 1)),
                rx:        None,
                running:   Arc::new(AtomicBool::new(false)),
                frame_new: false,
            }
        }
    }

    fn open(index: u32, res: Resolution) -> Result<Camera> {
        let fmt = CameraFormat::new(
            CameraResolution::new(res.width as u32, res.height as u32),
            FrameFormat::YUYV,
            30,
        );
        let req = RequestedFormat::new::<RgbFormat>(RequestedFormatType::Closest(fmt));
        let mut cam = Camera::new(CameraIndex::Index(index), req)
            .map_err(|e| Error::Camera(format!("create camera: {e}")))?;
        cam.open_stream()
            .map_err(|e| Error::Camera(format!("open stream: {e}")))?;
        Ok(cam)
    }

    /// Packed 8-bit RGB rows into a color field.
    fn to_field(width: u32, height: u32, rgb: &[u8]) -> ColorField {
        let mut field = ColorField::zeros(Resolution::new(width as usize, height as usize));
        for (cell, px) in field.data_mut().iter_mut().zip(rgb.chunks_exact(3)) {
            *cell = Rgba::new(px[0] as f32 / 255.0, px[1] as f32 / 255.0, px[2] as f32 / 255.0, 1.0);
        }
        field
    }

    impl CameraSource for Webcam {
        fn init_grabber(&mut self, res: Resolution) -> Result<()> {
            self.frame = ColorField::zeros(res);

            let (ready_tx, ready_rx) = mpsc::channel::<Result<Resolution>>();
            let (tx, rx) = mpsc::sync_channel::<ColorField>(QUEUE);
            let running = Arc::clone(&self.running);
            running.store(true, Ordering::SeqCst);
            let index = self.index;

            // The camera handle is not Send; it lives entirely on this thread.
            thread::spawn(move || {
                let mut cam = match open(index, res) {
                    Ok(cam) => cam,
                    Err(e) => { let _ = ready_tx.send(Err(e)); return; }
                };
                let actual = cam.resolution();
                let _ = ready_tx.send(Ok(Resolution::new(actual.width() as usize, actual.height() as usize)));

                while running.load(Ordering::SeqCst) {
                    let decoded = cam.frame()
                        .and_then(|f| f.decode_image::<RgbFormat>())
                        .map(|img| {
                            let (w, h) = img.dimensions();
                            to_field(w, h, &img.into_raw())
                        });
                    match decoded {
                        Ok(field) => {
                            if let Err(mpsc::TrySendError::Disconnected(_)) = tx.try_send(field) {
                                break;
                            }
                        }
                        Err(e) => log::warn!("webcam frame dropped: {e}"),
                    }
                }
                let _ = cam.stop_stream();
            });

            let actual = ready_rx.recv()
                .map_err(|_| Error::Camera("capture thread exited during setup".into()))??;
            log::info!("webcam {} opened at {} (requested {})", self.index, actual, res);
            self.rx = Some(rx);
            Ok(())
        }

        fn update(&mut self) {
            self.frame_new = false;
            let Some(rx) = self.rx.take() else { return };
            let mut latest = None;
            loop {
                match rx.try_recv() {
                    Ok(f) => latest = Some(f),
                    Err(TryRecvError::Empty) => {
                        self.rx = Some(rx);
                        break;
                    }
                    Err(TryRecvError::Disconnected) => {
                        log::warn!("webcam capture thread stopped");
                        break;
                    }
                }
            }
            if let Some(f) = latest {
                self.frame.resample_from(&f);
                self.frame_new = true;
            }
        }

        fn is_frame_new(&self) -> bool { self.frame_new }

        fn frame(&self) -> &ColorField { &self.frame }
    }

    impl Drop for Webcam {
        fn drop(&mut self) {
            self.running.store(false, Ordering::SeqCst);
        }
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════
