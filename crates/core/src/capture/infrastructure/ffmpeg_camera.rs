use std::thread;
use std::time::{Duration, Instant};

use crate::capture::domain::camera_device::CameraDevice;
use crate::capture::domain::capture_error::CaptureError;
use crate::capture::domain::frame_source::{FrameSource, ReadOutcome};
use crate::shared::frame::Frame;
use crate::shared::video_metadata::VideoMetadata;

/// Back-off while a live device has no packet ready.
const EAGAIN_BACKOFF: Duration = Duration::from_millis(2);

/// How long `read` keeps retrying a device with no packet ready before it
/// reports [`ReadOutcome::Pending`].
const READ_BUDGET: Duration = Duration::from_millis(100);

/// Captures camera frames via libavdevice (v4l2, avfoundation, dshow).
///
/// Decoded frames are converted to RGB24 and wrapped in a [`Frame`].
pub struct FfmpegCamera {
    input_ctx: Option<ffmpeg_next::format::context::Input>,
    decoder: Option<ffmpeg_next::decoder::Video>,
    scaler: Option<ScalerState>,
    video_stream_index: usize,
    frame_index: usize,
}

/// The scaler is built from the first decoded frame, since some devices
/// only report their pixel format once decoding starts.
struct ScalerState {
    context: ffmpeg_next::software::scaling::Context,
    format: ffmpeg_next::format::Pixel,
    width: u32,
    height: u32,
}

// Safety: FfmpegCamera is only used from a single thread at a time.
// The raw pointers inside ffmpeg types are not shared across threads.
unsafe impl Send for FfmpegCamera {}

impl FfmpegCamera {
    pub fn new() -> Self {
        Self {
            input_ctx: None,
            decoder: None,
            scaler: None,
            video_stream_index: 0,
            frame_index: 0,
        }
    }

    fn receive(&mut self) -> Result<Option<Frame>, CaptureError> {
        let decoder = self.decoder.as_mut().ok_or(CaptureError::NotOpened)?;
        let mut decoded = ffmpeg_next::util::frame::video::Video::empty();
        if decoder.receive_frame(&mut decoded).is_err() {
            return Ok(None);
        }

        let (width, height) = (decoded.width(), decoded.height());
        let needs_scaler = match &self.scaler {
            Some(s) => s.format != decoded.format() || s.width != width || s.height != height,
            None => true,
        };
        if needs_scaler {
            let context = ffmpeg_next::software::scaling::Context::get(
                decoded.format(),
                width,
                height,
                ffmpeg_next::format::Pixel::RGB24,
                width,
                height,
                ffmpeg_next::software::scaling::Flags::BILINEAR,
            )
            .map_err(CaptureError::Decode)?;
            log::debug!("Camera scaler: {:?} {width}x{height} -> RGB24", decoded.format());
            self.scaler = Some(ScalerState {
                context,
                format: decoded.format(),
                width,
                height,
            });
        }

        let Some(scaler) = self.scaler.as_mut() else {
            return Ok(None);
        };
        let mut rgb_frame = ffmpeg_next::util::frame::video::Video::empty();
        scaler
            .context
            .run(&decoded, &mut rgb_frame)
            .map_err(CaptureError::Decode)?;

        let pixels = extract_rgb_pixels(&rgb_frame, width, height);
        let frame = Frame::new(pixels, width, height, 3, self.frame_index);
        self.frame_index += 1;
        Ok(Some(frame))
    }
}

impl Default for FfmpegCamera {
    fn default() -> Self {
        Self::new()
    }
}

impl FrameSource for FfmpegCamera {
    fn open(&mut self, device: &CameraDevice) -> Result<VideoMetadata, Box<dyn std::error::Error>> {
        ffmpeg_next::init()?;
        ffmpeg_next::device::register_all();

        let format_name = device.input_format();
        let input_format = ffmpeg_next::device::input::video()
            .find(|f| f.name() == format_name)
            .ok_or_else(|| CaptureError::InputFormatUnavailable(format_name.to_string()))?;

        let mut options = ffmpeg_next::Dictionary::new();
        for (key, value) in device.options() {
            options.set(key, &value);
        }

        let url = device.url();
        let ictx = match ffmpeg_next::format::open_with(
            &url,
            &ffmpeg_next::format::Format::Input(input_format),
            options,
        ) {
            Ok(ffmpeg_next::format::context::Context::Input(ictx)) => ictx,
            Ok(_) => return Err(CaptureError::NoVideoStream(device.to_string()).into()),
            Err(source) => {
                return Err(CaptureError::DeviceNotFound {
                    device: device.to_string(),
                    source,
                }
                .into())
            }
        };

        let stream = ictx
            .streams()
            .best(ffmpeg_next::media::Type::Video)
            .ok_or_else(|| CaptureError::NoVideoStream(device.to_string()))?;

        let video_stream_index = stream.index();
        let codec_ctx = ffmpeg_next::codec::context::Context::from_parameters(stream.parameters())?;
        let decoder = codec_ctx.decoder().video()?;

        let fps = rational_to_fps(stream.avg_frame_rate())
            .or_else(|| rational_to_fps(stream.rate()))
            .unwrap_or(0.0);

        let metadata = VideoMetadata {
            width: decoder.width(),
            height: decoder.height(),
            fps,
            codec: decoder
                .codec()
                .map(|c| c.name().to_string())
                .unwrap_or_default(),
            source: Some(device.to_string()),
        };

        log::info!(
            "Opened camera {device}: {}x{} @ {:.2} fps ({})",
            metadata.width,
            metadata.height,
            metadata.fps,
            metadata.codec
        );

        self.video_stream_index = video_stream_index;
        self.decoder = Some(decoder);
        self.input_ctx = Some(ictx);
        self.scaler = None;
        self.frame_index = 0;

        Ok(metadata)
    }

    fn read(&mut self) -> Result<ReadOutcome, Box<dyn std::error::Error>> {
        let started = Instant::now();
        loop {
            if let Some(frame) = self.receive()? {
                return Ok(ReadOutcome::Frame(frame));
            }

            let ictx = self.input_ctx.as_mut().ok_or(CaptureError::NotOpened)?;
            let mut packet = ffmpeg_next::Packet::empty();
            match packet.read(ictx) {
                Ok(()) => {}
                Err(ffmpeg_next::Error::Eof) => return Ok(ReadOutcome::Ended),
                Err(ffmpeg_next::Error::Other { errno })
                    if errno == ffmpeg_next::util::error::EAGAIN =>
                {
                    if started.elapsed() >= READ_BUDGET {
                        return Ok(ReadOutcome::Pending);
                    }
                    thread::sleep(EAGAIN_BACKOFF);
                    continue;
                }
                Err(e) => return Err(CaptureError::Decode(e).into()),
            }

            if packet.stream() != self.video_stream_index {
                continue;
            }

            let decoder = self.decoder.as_mut().ok_or(CaptureError::NotOpened)?;
            if let Err(e) = decoder.send_packet(&packet) {
                log::warn!("Dropping undecodable camera packet: {e}");
            }
        }
    }

    fn close(&mut self) {
        if self.input_ctx.take().is_some() {
            log::info!("Camera closed after {} frames", self.frame_index);
        }
        self.decoder = None;
        self.scaler = None;
    }
}

fn rational_to_fps(rate: ffmpeg_next::Rational) -> Option<f64> {
    if rate.numerator() > 0 && rate.denominator() > 0 {
        Some(rate.numerator() as f64 / rate.denominator() as f64)
    } else {
        None
    }
}

/// Copies pixel data from an ffmpeg frame into a contiguous RGB buffer,
/// dropping the per-row padding (stride may exceed width * 3).
fn extract_rgb_pixels(
    rgb_frame: &ffmpeg_next::util::frame::video::Video,
    width: u32,
    height: u32,
) -> Vec<u8> {
    let stride = rgb_frame.stride(0);
    let data = rgb_frame.data(0);
    let row_bytes = width as usize * 3;

    let mut pixels = Vec::with_capacity(row_bytes * height as usize);
    for row in 0..height as usize {
        let row_start = row * stride;
        pixels.extend_from_slice(&data[row_start..row_start + row_bytes]);
    }
    pixels
}
