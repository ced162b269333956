//! Shared fixtures for unit tests.

use std::io::Cursor;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use image::{DynamicImage, ImageFormat, RgbImage};

use crate::codec::ImageCodec;
use crate::decode::{DecodeError, DecodedImage};
use crate::encode::EncodeError;
use crate::export::{ExportSink, ExportedFile};
use crate::ingest::RawFile;
use crate::quality::Quality;

// Minimal valid JPEG bytes (1x1 pixel, no EXIF)
pub const MINIMAL_JPEG: &[u8] = &[
    0xFF, 0xD8, 0xFF, 0xE0, 0x00, 0x10, 0x4A, 0x46, 0x49, 0x46, 0x00, 0x01, 0x01, 0x00, 0x00,
    0x01, 0x00, 0x01, 0x00, 0x00, 0xFF, 0xDB, 0x00, 0x43, 0x00, 0x08, 0x06, 0x06, 0x07, 0x06,
    0x05, 0x08, 0x07, 0x07, 0x07, 0x09, 0x09, 0x08, 0x0A, 0x0C, 0x14, 0x0D, 0x0C, 0x0B, 0x0B,
    0x0C, 0x19, 0x12, 0x13, 0x0F, 0x14, 0x1D, 0x1A, 0x1F, 0x1E, 0x1D, 0x1A, 0x1C, 0x1C, 0x20,
    0x24, 0x2E, 0x27, 0x20, 0x22, 0x2C, 0x23, 0x1C, 0x1C, 0x28, 0x37, 0x29, 0x2C, 0x30, 0x31,
    0x34, 0x34, 0x34, 0x1F, 0x27, 0x39, 0x3D, 0x38, 0x32, 0x3C, 0x2E, 0x33, 0x34, 0x32, 0xFF,
    0xC0, 0x00, 0x0B, 0x08, 0x00, 0x01, 0x00, 0x01, 0x01, 0x01, 0x11, 0x00, 0xFF, 0xC4, 0x00,
    0x1F, 0x00, 0x00, 0x01, 0x05, 0x01, 0x01, 0x01, 0x01, 0x01, 0x01, 0x00, 0x00, 0x00, 0x00,
    0x00, 0x00, 0x00, 0x00, 0x01, 0x02, 0x03, 0x04, 0x05, 0x06, 0x07, 0x08, 0x09, 0x0A, 0x0B,
    0xFF, 0xC4, 0x00, 0xB5, 0x10, 0x00, 0x02, 0x01, 0x03, 0x03, 0x02, 0x04, 0x03, 0x05, 0x05,
    0x04, 0x04, 0x00, 0x00, 0x01, 0x7D, 0x01, 0x02, 0x03, 0x00, 0x04, 0x11, 0x05, 0x12, 0x21,
    0x31, 0x41, 0x06, 0x13, 0x51, 0x61, 0x07, 0x22, 0x71, 0x14, 0x32, 0x81, 0x91, 0xA1, 0x08,
    0x23, 0x42, 0xB1, 0xC1, 0x15, 0x52, 0xD1, 0xF0, 0x24, 0x33, 0x62, 0x72, 0x82, 0x09, 0x0A,
    0x16, 0x17, 0x18, 0x19, 0x1A, 0x25, 0x26, 0x27, 0x28, 0x29, 0x2A, 0x34, 0x35, 0x36, 0x37,
    0x38, 0x39, 0x3A, 0x43, 0x44, 0x45, 0x46, 0x47, 0x48, 0x49, 0x4A, 0x53, 0x54, 0x55, 0x56,
    0x57, 0x58, 0x59, 0x5A, 0x63, 0x64, 0x65, 0x66, 0x67, 0x68, 0x69, 0x6A, 0x73, 0x74, 0x75,
    0x76, 0x77, 0x78, 0x79, 0x7A, 0x83, 0x84, 0x85, 0x86, 0x87, 0x88, 0x89, 0x8A, 0x92, 0x93,
    0x94, 0x95, 0x96, 0x97, 0x98, 0x99, 0x9A, 0xA2, 0xA3, 0xA4, 0xA5, 0xA6, 0xA7, 0xA8, 0xA9,
    0xAA, 0xB2, 0xB3, 0xB4, 0xB5, 0xB6, 0xB7, 0xB8, 0xB9, 0xBA, 0xC2, 0xC3, 0xC4, 0xC5, 0xC6,
    0xC7, 0xC8, 0xC9, 0xCA, 0xD2, 0xD3, 0xD4, 0xD5, 0xD6, 0xD7, 0xD8, 0xD9, 0xDA, 0xE1, 0xE2,
    0xE3, 0xE4, 0xE5, 0xE6, 0xE7, 0xE8, 0xE9, 0xEA, 0xF1, 0xF2, 0xF3, 0xF4, 0xF5, 0xF6, 0xF7,
    0xF8, 0xF9, 0xFA, 0xFF, 0xDA, 0x00, 0x08, 0x01, 0x01, 0x00, 0x00, 0x3F, 0x00, 0xFB, 0xD5,
    0xDB, 0x20, 0xA8, 0xF1, 0x7E, 0xFF, 0xD9,
];

/// A textured RGB raster; flat images compress to nearly the same size at
/// every quality.
pub fn gradient(width: u32, height: u32) -> DecodedImage {
    let mut pixels = Vec::with_capacity(width as usize * height as usize * 3);
    for y in 0..height {
        for x in 0..width {
            pixels.push((x * 255 / width.max(1)) as u8);
            pixels.push((y * 255 / height.max(1)) as u8);
            pixels.push(((x * 31) ^ (y * 17)) as u8);
        }
    }
    DecodedImage::new(width, height, pixels)
}

/// Lossless PNG encoding of [`gradient`].
pub fn png_bytes(width: u32, height: u32) -> Vec<u8> {
    let raster = gradient(width, height);
    let img = RgbImage::from_raw(width, height, raster.pixels).expect("gradient buffer size");
    let mut buffer = Cursor::new(Vec::new());
    DynamicImage::ImageRgb8(img)
        .write_to(&mut buffer, ImageFormat::Png)
        .expect("PNG encoding");
    buffer.into_inner()
}

pub fn png_file(name: &str, width: u32, height: u32) -> RawFile {
    RawFile::new(name, png_bytes(width, height)).with_content_type("image/png")
}

/// First byte that makes [`StubCodec::encode`] fail.
pub const POISON: u8 = 0xEE;
/// First byte that makes [`StubCodec::encode`] return no bytes.
pub const EMPTY_OUTPUT: u8 = 0xE0;

/// Codec that never touches real image data.
///
/// Any non-empty input decodes to a 1x1 raster filled with the input's first
/// byte; encoding yields `percent + 1` copies of that byte.
#[derive(Debug, Default)]
pub struct StubCodec {
    fail_next: AtomicBool,
    encoded: Mutex<Vec<u8>>,
}

impl StubCodec {
    /// Make the next encode fail regardless of input.
    pub fn fail_next(&self) {
        self.fail_next.store(true, Ordering::SeqCst);
    }

    /// Marker bytes of every raster handed to `encode`, in call order.
    pub fn encoded(&self) -> Vec<u8> {
        self.encoded.lock().unwrap().clone()
    }
}

impl ImageCodec for StubCodec {
    fn decode(&self, bytes: &[u8]) -> Result<DecodedImage, DecodeError> {
        match bytes.first() {
            Some(&marker) => Ok(DecodedImage::new(1, 1, vec![marker; 3])),
            None => Err(DecodeError::EmptyInput),
        }
    }

    fn encode(&self, image: &DecodedImage, quality: Quality) -> Result<Vec<u8>, EncodeError> {
        let marker = image.pixels[0];
        self.encoded.lock().unwrap().push(marker);

        if self.fail_next.swap(false, Ordering::SeqCst) || marker == POISON {
            return Err(EncodeError::EncodingFailed("stub failure".to_string()));
        }
        if marker == EMPTY_OUTPUT {
            return Ok(Vec::new());
        }
        Ok(vec![marker; quality.percent() as usize + 1])
    }
}

/// Stub codec whose `decode` holds for a while and records how many calls
/// overlapped.
#[derive(Debug)]
pub struct CountingCodec {
    hold: Duration,
    live: AtomicUsize,
    peak: AtomicUsize,
}

impl CountingCodec {
    pub fn new(hold: Duration) -> Self {
        Self {
            hold,
            live: AtomicUsize::new(0),
            peak: AtomicUsize::new(0),
        }
    }

    /// Most `decode` calls seen in progress at once.
    pub fn peak(&self) -> usize {
        self.peak.load(Ordering::SeqCst)
    }
}

impl ImageCodec for CountingCodec {
    fn decode(&self, bytes: &[u8]) -> Result<DecodedImage, DecodeError> {
        let live = self.live.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak.fetch_max(live, Ordering::SeqCst);
        std::thread::sleep(self.hold);
        self.live.fetch_sub(1, Ordering::SeqCst);
        StubCodec::default().decode(bytes)
    }

    fn encode(&self, image: &DecodedImage, quality: Quality) -> Result<Vec<u8>, EncodeError> {
        StubCodec::default().encode(image, quality)
    }
}

/// Codec whose `encode` blocks until the test releases it.
#[derive(Clone)]
pub struct GatedCodec {
    started_tx: tokio::sync::mpsc::UnboundedSender<()>,
    started_rx: Arc<tokio::sync::Mutex<tokio::sync::mpsc::UnboundedReceiver<()>>>,
    release_tx: std::sync::mpsc::Sender<()>,
    release_rx: Arc<Mutex<std::sync::mpsc::Receiver<()>>>,
}

impl GatedCodec {
    pub fn new() -> Self {
        let (started_tx, started_rx) = tokio::sync::mpsc::unbounded_channel();
        let (release_tx, release_rx) = std::sync::mpsc::channel();
        Self {
            started_tx,
            started_rx: Arc::new(tokio::sync::Mutex::new(started_rx)),
            release_tx,
            release_rx: Arc::new(Mutex::new(release_rx)),
        }
    }

    /// Wait until one more `encode` call has begun.
    pub async fn wait_started(&self) {
        self.started_rx.lock().await.recv().await.expect("codec dropped");
    }

    /// Let one blocked `encode` call finish.
    pub fn release(&self) {
        self.release_tx.send(()).expect("codec dropped");
    }
}

impl ImageCodec for GatedCodec {
    fn decode(&self, bytes: &[u8]) -> Result<DecodedImage, DecodeError> {
        StubCodec::default().decode(bytes)
    }

    fn encode(&self, _image: &DecodedImage, quality: Quality) -> Result<Vec<u8>, EncodeError> {
        let _ = self.started_tx.send(());
        self.release_rx
            .lock()
            .unwrap()
            .recv()
            .map_err(|e| EncodeError::EncodingFailed(e.to_string()))?;
        Ok(vec![1u8; quality.percent() as usize + 1])
    }
}

/// Sink that remembers every save and when it happened.
#[derive(Debug, Default)]
pub struct RecordingSink {
    saves: Mutex<Vec<(ExportedFile, tokio::time::Instant)>>,
}

impl RecordingSink {
    pub fn saves(&self) -> Vec<(ExportedFile, tokio::time::Instant)> {
        self.saves.lock().unwrap().clone()
    }

    pub fn files(&self) -> Vec<ExportedFile> {
        self.saves().into_iter().map(|(file, _)| file).collect()
    }
}

impl ExportSink for RecordingSink {
    fn save(&self, file: ExportedFile) {
        self.saves
            .lock()
            .unwrap()
            .push((file, tokio::time::Instant::now()));
    }
}
