use std::path::{Path, PathBuf};

use crate::shared::frame::Frame;
use crate::shared::video_metadata::VideoMetadata;
use crate::video::domain::video_writer::VideoWriter;

/// Default MPEG-4 quantizer scale (2 = best, 31 = worst).
pub const DEFAULT_QSCALE: u32 = 4;
pub const MIN_QSCALE: u32 = 2;
pub const MAX_QSCALE: u32 = 31;

/// libavcodec's quantizer-to-lambda factor (`FF_QP2LAMBDA`).
const QP2LAMBDA: usize = 118;

/// Encodes frames to MPEG-4 Part 2 (the `mp4v` FourCC) via ffmpeg-next.
///
/// The container is picked from the output extension; `.mp4` is the
/// recorder's default. Frames are timestamped by count, so the file plays
/// back at the rate given in the metadata. YUV420P needs even sizes, so an
/// odd width or height loses its last column or row.
pub struct FfmpegWriter {
    output_path: Option<PathBuf>,
    octx: Option<ffmpeg_next::format::context::Output>,
    encoder: Option<ffmpeg_next::codec::encoder::video::Encoder>,
    scaler: Option<ffmpeg_next::software::scaling::Context>,
    width: u32,
    height: u32,
    encode_width: u32,
    encode_height: u32,
    fps: i32,
    qscale: u32,
    frame_count: usize,
    video_stream_index: usize,
}

// Safety: FfmpegWriter is only used from a single thread at a time.
// The raw pointers inside ffmpeg types are not shared across threads.
unsafe impl Send for FfmpegWriter {}

impl FfmpegWriter {
    pub fn new() -> Self {
        Self {
            output_path: None,
            octx: None,
            encoder: None,
            scaler: None,
            width: 0,
            height: 0,
            encode_width: 0,
            encode_height: 0,
            fps: 0,
            qscale: DEFAULT_QSCALE,
            frame_count: 0,
            video_stream_index: 0,
        }
    }

    /// Sets the quantizer scale, clamped to 2..=31.
    pub fn with_quality(mut self, qscale: u32) -> Self {
        self.qscale = qscale.clamp(MIN_QSCALE, MAX_QSCALE);
        self
    }

    pub fn frames_written(&self) -> usize {
        self.frame_count
    }

    pub fn is_open(&self) -> bool {
        self.encoder.is_some()
    }

    fn drain_packets(&mut self) -> Result<(), Box<dyn std::error::Error>> {
        let encoder = self.encoder.as_mut().ok_or("FfmpegWriter: not opened")?;
        let octx = self.octx.as_mut().ok_or("FfmpegWriter: not opened")?;
        let ost_time_base = octx
            .stream(self.video_stream_index)
            .ok_or("FfmpegWriter: output stream missing")?
            .time_base();

        let mut encoded = ffmpeg_next::Packet::empty();
        while encoder.receive_packet(&mut encoded).is_ok() {
            encoded.set_stream(self.video_stream_index);
            encoded.rescale_ts(ffmpeg_next::Rational(1, self.fps), ost_time_base);
            encoded.write_interleaved(octx)?;
        }
        Ok(())
    }
}

impl Default for FfmpegWriter {
    fn default() -> Self {
        Self::new()
    }
}

impl VideoWriter for FfmpegWriter {
    fn open(
        &mut self,
        path: &Path,
        metadata: &VideoMetadata,
    ) -> Result<(), Box<dyn std::error::Error>> {
        if self.is_open() {
            return Err("FfmpegWriter: already open".into());
        }
        let (encode_width, encode_height) = even_dimensions(metadata.width, metadata.height)?;
        if (encode_width, encode_height) != (metadata.width, metadata.height) {
            log::warn!(
                "Cropping {}x{} frames to {encode_width}x{encode_height} for YUV420P",
                metadata.width,
                metadata.height
            );
        }

        ffmpeg_next::init()?;

        let mut octx = ffmpeg_next::format::output(path)?;

        let global_header = octx
            .format()
            .flags()
            .contains(ffmpeg_next::format::Flags::GLOBAL_HEADER);

        let codec = ffmpeg_next::encoder::find(ffmpeg_next::codec::Id::MPEG4)
            .ok_or("MPEG4 encoder not found")?;

        let mut ost = octx.add_stream(Some(codec))?;

        let mut encoder_ctx = ffmpeg_next::codec::context::Context::new_with_codec(codec)
            .encoder()
            .video()?;

        let fps = encoder_fps(metadata);

        encoder_ctx.set_width(encode_width);
        encoder_ctx.set_height(encode_height);
        encoder_ctx.set_format(ffmpeg_next::format::Pixel::YUV420P);
        encoder_ctx.set_time_base(ffmpeg_next::Rational(1, fps));
        encoder_ctx.set_frame_rate(Some(ffmpeg_next::Rational(fps, 1)));
        encoder_ctx.set_quality(self.qscale as usize * QP2LAMBDA);

        let mut flags = ffmpeg_next::codec::Flags::QSCALE;
        if global_header {
            flags |= ffmpeg_next::codec::Flags::GLOBAL_HEADER;
        }
        encoder_ctx.set_flags(flags);

        let encoder = encoder_ctx.open_with(ffmpeg_next::Dictionary::new())?;
        ost.set_parameters(&encoder);
        ost.set_time_base(ffmpeg_next::Rational(1, fps));

        octx.write_header()?;

        let scaler = ffmpeg_next::software::scaling::Context::get(
            ffmpeg_next::format::Pixel::RGB24,
            encode_width,
            encode_height,
            ffmpeg_next::format::Pixel::YUV420P,
            encode_width,
            encode_height,
            ffmpeg_next::software::scaling::Flags::BILINEAR,
        )?;

        log::info!(
            "Encoder opened: {} ({encode_width}x{encode_height} @ {fps} fps, qscale {})",
            path.display(),
            self.qscale
        );

        self.width = metadata.width;
        self.height = metadata.height;
        self.encode_width = encode_width;
        self.encode_height = encode_height;
        self.fps = fps;
        self.output_path = Some(path.to_path_buf());
        self.video_stream_index = 0;
        self.octx = Some(octx);
        self.encoder = Some(encoder);
        self.scaler = Some(scaler);
        self.frame_count = 0;

        Ok(())
    }

    fn write(&mut self, frame: &Frame) -> Result<(), Box<dyn std::error::Error>> {
        if !self.is_open() {
            return Err("FfmpegWriter: not opened".into());
        }
        if frame.width() != self.width || frame.height() != self.height || frame.channels() != 3 {
            return Err(format!(
                "FfmpegWriter: frame is {}x{}x{}, encoder expects {}x{}x3",
                frame.width(),
                frame.height(),
                frame.channels(),
                self.width,
                self.height
            )
            .into());
        }

        let mut rgb_frame = ffmpeg_next::util::frame::video::Video::new(
            ffmpeg_next::format::Pixel::RGB24,
            self.encode_width,
            self.encode_height,
        );

        let stride = rgb_frame.stride(0);
        let src_row_bytes = self.width as usize * 3;
        let row_bytes = self.encode_width as usize * 3;
        let data = rgb_frame.data_mut(0);
        let src = frame.data();
        for row in 0..self.encode_height as usize {
            let src_start = row * src_row_bytes;
            let dst_start = row * stride;
            data[dst_start..dst_start + row_bytes]
                .copy_from_slice(&src[src_start..src_start + row_bytes]);
        }

        let mut yuv_frame = ffmpeg_next::util::frame::video::Video::empty();
        self.scaler
            .as_mut()
            .ok_or("FfmpegWriter: not opened")?
            .run(&rgb_frame, &mut yuv_frame)?;
        yuv_frame.set_pts(Some(self.frame_count as i64));

        self.encoder
            .as_mut()
            .ok_or("FfmpegWriter: not opened")?
            .send_frame(&yuv_frame)?;
        self.drain_packets()?;

        self.frame_count += 1;
        Ok(())
    }

    fn close(&mut self) -> Result<(), Box<dyn std::error::Error>> {
        if let Some(encoder) = self.encoder.as_mut() {
            encoder.send_eof()?;
            self.drain_packets()?;
            if let Some(octx) = self.octx.as_mut() {
                octx.write_trailer()?;
            }
            if let Some(path) = self.output_path.as_ref() {
                log::info!(
                    "Encoder closed: {} ({} frames)",
                    path.display(),
                    self.frame_count
                );
            }
        }

        self.octx = None;
        self.encoder = None;
        self.scaler = None;
        self.output_path = None;

        Ok(())
    }
}

/// Encoder frame rate: the metadata rate rounded to a whole number, with
/// the default rate when the camera reported none.
fn encoder_fps(metadata: &VideoMetadata) -> i32 {
    let fps = metadata.effective_fps().round() as i32;
    fps.max(1)
}

/// Largest even size that fits in `width`x`height`.
fn even_dimensions(width: u32, height: u32) -> Result<(u32, u32), Box<dyn std::error::Error>> {
    let even = (width & !1, height & !1);
    if even.0 == 0 || even.1 == 0 {
        return Err(format!("FfmpegWriter: invalid frame size {width}x{height}").into());
    }
    Ok(even)
}
