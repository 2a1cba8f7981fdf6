use std::io::Write;
use std::path::PathBuf;
use std::process;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use clap::Parser;

use webcam_recorder_core::capture::domain::camera_device::{parse_video_size, CameraDevice};
use webcam_recorder_core::capture::domain::frame_source::{FrameSource, ReadOutcome};
use webcam_recorder_core::capture::infrastructure::ffmpeg_camera::FfmpegCamera;
use webcam_recorder_core::recording::output_naming::default_output_dir;
use webcam_recorder_core::recording::recording_session::RecordingSession;
use webcam_recorder_core::shared::constants::{DEFAULT_CAMERA_INDEX, OVERLAY_INTERVAL_SECS};
use webcam_recorder_core::video::infrastructure::ffmpeg_writer::{
    FfmpegWriter, DEFAULT_QSCALE, MAX_QSCALE, MIN_QSCALE,
};

/// Record a webcam to an MP4 file without opening a window.
#[derive(Parser, Debug)]
#[command(name = "webcam-recorder")]
struct Cli {
    /// Camera index (0 = first camera).
    #[arg(long, default_value_t = DEFAULT_CAMERA_INDEX)]
    device: u32,

    /// DirectShow device name (Windows only).
    #[arg(long)]
    device_name: Option<String>,

    /// Capture frame rate to request from the camera.
    #[arg(long)]
    framerate: Option<u32>,

    /// Capture size to request from the camera, e.g. 1280x720.
    #[arg(long)]
    video_size: Option<String>,

    /// Output file. Defaults to recording_<timestamp>.mp4 in --output-dir.
    #[arg(long, conflicts_with = "output_dir")]
    output: Option<PathBuf>,

    /// Directory for generated file names. Defaults to the Movies folder.
    #[arg(long)]
    output_dir: Option<PathBuf>,

    /// Stop after this many seconds. Records until Ctrl-C when omitted.
    #[arg(long)]
    duration: Option<u64>,

    /// MPEG-4 quantizer scale (2 = best, 31 = worst).
    #[arg(long, default_value_t = DEFAULT_QSCALE)]
    quality: u32,
}

fn main() {
    env_logger::init();

    if let Err(e) = run() {
        eprintln!("Error: {e}");
        process::exit(1);
    }
}

fn run() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    validate(&cli)?;

    let device = build_device(&cli)?;
    let stop = Arc::new(AtomicBool::new(false));
    let stop_handler = stop.clone();
    ctrlc::set_handler(move || stop_handler.store(true, Ordering::Relaxed))?;

    let mut camera = FfmpegCamera::new();
    let metadata = camera
        .open(&device)
        .map_err(|e| format!("Camera not found ({e})"))?;

    let writer = Box::new(FfmpegWriter::new().with_quality(cli.quality));
    let mut session = RecordingSession::new();
    let path = match &cli.output {
        Some(path) => session.start_at(writer, path, &metadata)?,
        None => {
            let dir = cli.output_dir.clone().unwrap_or_else(default_output_dir);
            session.start(writer, &dir, &metadata, chrono::Local::now().naive_local())?
        }
    };
    eprintln!("Recording to {} (Ctrl-C to stop)", path.display());

    let result = record_loop(&mut camera, &mut session, cli.duration, &stop);
    eprintln!();

    let summary = session.stop();
    camera.close();
    result?;
    let summary = summary?;

    log::info!(
        "Output written to {} ({} frames)",
        summary.path.display(),
        summary.frames_written
    );
    if summary.frames_dropped > 0 {
        eprintln!(
            "Warning: {} frames were dropped because the encoder fell behind",
            summary.frames_dropped
        );
    }
    eprintln!("Saved {}", summary.path.display());
    Ok(())
}

fn record_loop(
    camera: &mut dyn FrameSource,
    session: &mut RecordingSession,
    duration: Option<u64>,
    stop: &AtomicBool,
) -> Result<(), Box<dyn std::error::Error>> {
    let interval = Duration::from_secs(OVERLAY_INTERVAL_SECS);
    let mut next_tick = Instant::now() + interval;
    print_overlay(session);

    while !stop.load(Ordering::Relaxed) {
        match camera.read()? {
            ReadOutcome::Frame(frame) => {
                session.write_frame(frame)?;
            }
            ReadOutcome::Pending => {}
            ReadOutcome::Ended => {
                log::warn!("Camera stream ended");
                break;
            }
        }

        if Instant::now() >= next_tick {
            next_tick += interval;
            session.tick();
            print_overlay(session);
            if duration.is_some_and(|limit| session.elapsed_seconds() >= limit) {
                break;
            }
        }
    }
    Ok(())
}

fn print_overlay(session: &RecordingSession) {
    if let Some(text) = session.overlay_text() {
        eprint!("\r{text}");
        let _ = std::io::stderr().flush();
    }
}

fn build_device(cli: &Cli) -> Result<CameraDevice, Box<dyn std::error::Error>> {
    let mut device = CameraDevice::new(cli.device);
    if let Some(name) = &cli.device_name {
        device = device.with_name(name.clone());
    }
    if let Some(rate) = cli.framerate {
        device = device.with_framerate(rate);
    }
    if let Some(size) = &cli.video_size {
        let (w, h) = parse_video_size(size)
            .ok_or_else(|| format!("Video size must look like 1280x720, got '{size}'"))?;
        device = device.with_video_size(w, h);
    }
    Ok(device)
}

fn validate(cli: &Cli) -> Result<(), Box<dyn std::error::Error>> {
    if !(MIN_QSCALE..=MAX_QSCALE).contains(&cli.quality) {
        return Err(format!(
            "Quality must be between {MIN_QSCALE} and {MAX_QSCALE}, got {}",
            cli.quality
        )
        .into());
    }
    if cli.framerate == Some(0) {
        return Err("Frame rate must be positive".into());
    }
    if cli.duration == Some(0) {
        return Err("Duration must be at least 1 second".into());
    }
    if let Some(size) = &cli.video_size {
        if parse_video_size(size).is_none() {
            return Err(format!("Video size must look like 1280x720, got '{size}'").into());
        }
    }
    if let Some(output) = &cli.output {
        if output.is_dir() {
            return Err(format!("Output must be a file, got directory {}", output.display()).into());
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Cli {
        let mut argv = vec!["webcam-recorder"];
        argv.extend_from_slice(args);
        Cli::try_parse_from(argv).unwrap()
    }

    #[test]
    fn test_defaults() {
        let cli = parse(&[]);
        assert_eq!(cli.device, 0);
        assert_eq!(cli.quality, DEFAULT_QSCALE);
        assert!(cli.duration.is_none());
        assert!(validate(&cli).is_ok());
    }

    #[test]
    fn test_output_conflicts_with_output_dir() {
        let result = Cli::try_parse_from([
            "webcam-recorder",
            "--output",
            "a.mp4",
            "--output-dir",
            "clips",
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn test_quality_out_of_range_is_rejected() {
        assert!(validate(&parse(&["--quality", "1"])).is_err());
        assert!(validate(&parse(&["--quality", "32"])).is_err());
        assert!(validate(&parse(&["--quality", "31"])).is_ok());
    }

    #[test]
    fn test_zero_duration_is_rejected() {
        assert!(validate(&parse(&["--duration", "0"])).is_err());
        assert!(validate(&parse(&["--duration", "5"])).is_ok());
    }

    #[test]
    fn test_bad_video_size_is_rejected() {
        assert!(validate(&parse(&["--video-size", "wide"])).is_err());
    }

    #[test]
    fn test_output_directory_is_rejected() {
        let dir = std::env::temp_dir();
        let cli = parse(&["--output", dir.to_str().unwrap()]);
        assert!(validate(&cli).is_err());
    }

    /// Never delivers a frame; raises `stop` after a number of reads.
    struct StalledCamera {
        reads: usize,
        stop_after: usize,
        stop: Arc<AtomicBool>,
    }

    impl FrameSource for StalledCamera {
        fn open(
            &mut self,
            _device: &CameraDevice,
        ) -> Result<webcam_recorder_core::shared::video_metadata::VideoMetadata, Box<dyn std::error::Error>>
        {
            Err("unused".into())
        }

        fn read(&mut self) -> Result<ReadOutcome, Box<dyn std::error::Error>> {
            self.reads += 1;
            if self.reads >= self.stop_after {
                self.stop.store(true, Ordering::Relaxed);
            }
            Ok(ReadOutcome::Pending)
        }

        fn close(&mut self) {}
    }

    #[test]
    fn test_record_loop_honours_stop_while_camera_is_stalled() {
        let stop = Arc::new(AtomicBool::new(false));
        let mut camera = StalledCamera {
            reads: 0,
            stop_after: 5,
            stop: stop.clone(),
        };
        let mut session = RecordingSession::new();

        record_loop(&mut camera, &mut session, None, &stop).unwrap();
        assert_eq!(camera.reads, 5);
    }

    #[test]
    fn test_build_device_applies_capture_mode() {
        let cli = parse(&[
            "--device",
            "2",
            "--framerate",
            "15",
            "--video-size",
            "640x480",
        ]);
        let device = build_device(&cli).unwrap();
        assert_eq!(device.index, 2);
        assert_eq!(device.framerate, Some(15));
        assert_eq!(device.video_size, Some((640, 480)));
    }
}
