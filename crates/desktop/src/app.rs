use std::path::PathBuf;
use std::time::Duration;

use iced::widget::{button, column, container, image, row, scrollable, text};
use iced::{window, Element, Length, Subscription, Task, Theme};

use webcam_recorder_core::capture::domain::camera_device::CameraDevice;
use webcam_recorder_core::recording::recording_error::RecordingError;
use webcam_recorder_core::recording::recording_session::RecordingSession;
use webcam_recorder_core::shared::constants::{OVERLAY_INTERVAL_SECS, PREVIEW_INTERVAL_MS};
use webcam_recorder_core::shared::frame::Frame;
use webcam_recorder_core::shared::video_metadata::VideoMetadata;
use webcam_recorder_core::video::domain::video_writer::VideoWriter;
use webcam_recorder_core::video::infrastructure::ffmpeg_writer::FfmpegWriter;

use crate::platform;
use crate::settings::{Appearance, Settings};
use crate::tabs;
use crate::theme;
use crate::workers::camera_worker::{CameraEvent, CameraWorker};

// ---------------------------------------------------------------------------
// Tab enum
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tab {
    Recorder,
    Settings,
    Appearance,
    About,
}

impl Tab {
    const ALL: &[Tab] = &[Tab::Recorder, Tab::Settings, Tab::Appearance, Tab::About];

    fn label(self) -> &'static str {
        match self {
            Tab::Recorder => "Recorder",
            Tab::Settings => "Settings",
            Tab::Appearance => "Appearance",
            Tab::About => "About",
        }
    }
}

// ---------------------------------------------------------------------------
// Message
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub enum Message {
    TabSelected(Tab),
    PreviewTick,
    OverlayTick,
    StartRecording,
    StopRecording,
    StartHovered(bool),
    StopHovered(bool),
    ShowInFolder,
    CameraIndexChanged(u32),
    SelectOutputDir,
    OutputDirSelected(Option<PathBuf>),
    OpenOutputDir,
    QualityChanged(u32),
    AppearanceChanged(Appearance),
    HighContrastChanged(bool),
    FontScaleChanged(f32),
    PollSystemTheme,
    CloseRequested(window::Id),
}

// ---------------------------------------------------------------------------
// State
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub enum CameraState {
    Initializing,
    Live(VideoMetadata),
    Unavailable(String),
    Ended,
}

/// Outcome of the most recent recording, shown under the buttons.
#[derive(Debug, Clone, PartialEq)]
pub enum Status {
    None,
    Saved(PathBuf),
    Failed(String),
}

/// Builds the encoder for a new recording from the configured qscale.
pub type WriterFactory = Box<dyn Fn(u32) -> Box<dyn VideoWriter> + Send>;

fn ffmpeg_writer(qscale: u32) -> Box<dyn VideoWriter> {
    Box::new(FfmpegWriter::new().with_quality(qscale))
}

pub struct App {
    active_tab: Tab,
    pub settings: Settings,
    pub camera: CameraState,
    worker: Option<CameraWorker>,
    pub preview: Option<image::Handle>,
    pub session: RecordingSession,
    pub status: Status,
    pub start_hovered: bool,
    pub stop_hovered: bool,
    make_writer: WriterFactory,
}

impl App {
    pub fn new() -> (Self, Task<Message>) {
        let settings = Settings::load();
        let worker = CameraWorker::spawn(CameraDevice::new(settings.camera_index));
        (
            Self::with_camera(settings, worker, Box::new(ffmpeg_writer)),
            Task::none(),
        )
    }

    pub fn with_camera(settings: Settings, worker: CameraWorker, make_writer: WriterFactory) -> Self {
        Self {
            active_tab: Tab::Recorder,
            settings,
            camera: CameraState::Initializing,
            worker: Some(worker),
            preview: None,
            session: RecordingSession::new(),
            status: Status::None,
            start_hovered: false,
            stop_hovered: false,
            make_writer,
        }
    }

    pub fn update(&mut self, message: Message) -> Task<Message> {
        match message {
            Message::TabSelected(tab) => {
                self.active_tab = tab;
            }
            Message::PreviewTick => self.poll_camera(),
            Message::OverlayTick => self.session.tick(),
            Message::StartRecording => self.start_recording(),
            Message::StopRecording => self.finish_recording(),
            Message::StartHovered(hovered) => self.start_hovered = hovered,
            Message::StopHovered(hovered) => self.stop_hovered = hovered,
            Message::ShowInFolder => {
                if let Status::Saved(path) = &self.status {
                    platform::reveal_in_file_manager(path);
                }
            }
            Message::CameraIndexChanged(index) => {
                if self.session.is_recording() || index == self.settings.camera_index {
                    return Task::none();
                }
                self.settings.camera_index = index;
                self.settings.save();
                self.restart_camera();
            }
            Message::SelectOutputDir => {
                let start_dir = self.settings.resolved_output_dir();
                return Task::perform(
                    async move {
                        rfd::AsyncFileDialog::new()
                            .set_title("Choose recordings folder")
                            .set_directory(start_dir)
                            .pick_folder()
                            .await
                            .map(|h| h.path().to_path_buf())
                    },
                    Message::OutputDirSelected,
                );
            }
            Message::OutputDirSelected(Some(dir)) => {
                self.settings.output_dir = Some(dir);
                self.settings.save();
            }
            Message::OutputDirSelected(None) => {}
            Message::OpenOutputDir => {
                let dir = self.settings.resolved_output_dir();
                if let Err(e) = open::that(&dir) {
                    log::warn!("Could not open {}: {e}", dir.display());
                }
            }
            Message::QualityChanged(quality) => {
                self.settings.quality = quality;
                self.settings.save();
            }
            Message::AppearanceChanged(appearance) => {
                self.settings.appearance = appearance;
                self.settings.save();
            }
            Message::HighContrastChanged(enabled) => {
                self.settings.high_contrast = enabled;
                self.settings.save();
            }
            Message::FontScaleChanged(scale) => {
                self.settings.font_scale = scale;
                self.settings.save();
            }
            Message::PollSystemTheme => {
                // Theme is resolved fresh in theme() on every render,
                // so just requesting a redraw is enough.
            }
            Message::CloseRequested(id) => {
                self.shutdown();
                return window::close(id);
            }
        }
        Task::none()
    }

    fn poll_camera(&mut self) {
        let events = match &self.worker {
            Some(worker) => worker.drain(),
            None => return,
        };

        let mut newest: Option<Frame> = None;
        for event in events {
            match event {
                CameraEvent::Opened(metadata) => {
                    self.camera = CameraState::Live(metadata);
                }
                CameraEvent::Frame(frame) => {
                    if let Some(previous) = newest.replace(frame) {
                        self.record(previous);
                    }
                }
                CameraEvent::Unavailable(reason) => {
                    self.camera = CameraState::Unavailable(reason);
                    self.worker = None;
                }
                CameraEvent::Ended => {
                    self.camera = CameraState::Ended;
                    self.worker = None;
                }
            }
        }

        if let Some(frame) = newest {
            self.preview = Some(image::Handle::from_rgba(
                frame.width(),
                frame.height(),
                frame.to_rgba(),
            ));
            self.record(frame);
        }

        if self.camera == CameraState::Ended && self.session.is_recording() {
            self.finish_recording();
        }
    }

    fn record(&mut self, frame: Frame) {
        if let Err(e) = self.session.write_frame(frame) {
            log::error!("Recording interrupted: {e}");
            self.finish_recording();
        }
    }

    fn start_recording(&mut self) {
        let CameraState::Live(metadata) = &self.camera else {
            return;
        };
        let writer = (self.make_writer)(self.settings.qscale());
        let dir = self.settings.resolved_output_dir();
        match self.session.start(
            writer,
            &dir,
            metadata,
            chrono::Local::now().naive_local(),
        ) {
            Ok(_) => {
                self.status = Status::None;
                self.start_hovered = false;
            }
            Err(e) => {
                log::error!("Failed to start recording in {}: {e}", dir.display());
                self.status = Status::Failed("Failed to record.".to_string());
            }
        }
    }

    fn finish_recording(&mut self) {
        match self.session.stop() {
            Ok(summary) => {
                if summary.frames_dropped > 0 {
                    log::warn!(
                        "{} frames were dropped because the encoder fell behind",
                        summary.frames_dropped
                    );
                }
                self.status = Status::Saved(summary.path);
            }
            Err(RecordingError::NotRecording) => {}
            Err(e) => {
                log::error!("Recording failed: {e}");
                self.status = Status::Failed(format!("Recording failed: {e}"));
            }
        }
        self.stop_hovered = false;
    }

    fn restart_camera(&mut self) {
        if let Some(mut worker) = self.worker.take() {
            worker.stop();
        }
        self.camera = CameraState::Initializing;
        self.preview = None;
        self.worker = Some(CameraWorker::spawn(CameraDevice::new(
            self.settings.camera_index,
        )));
    }

    /// Whether the camera may still deliver frames, so the preview tick
    /// has work to do.
    fn preview_active(&self) -> bool {
        self.worker.is_some()
            && matches!(
                self.camera,
                CameraState::Initializing | CameraState::Live(_)
            )
    }

    /// Finalizes any open recording and closes the camera.
    fn shutdown(&mut self) {
        if self.session.is_recording() {
            self.finish_recording();
        }
        if let Some(mut worker) = self.worker.take() {
            worker.stop();
        }
        log::info!("Shut down cleanly");
    }

    pub fn view(&self) -> Element<'_, Message> {
        let fs = self.settings.font_scale;
        let theme = self.theme();

        // Tab bar
        let tab_bar = row(Tab::ALL
            .iter()
            .map(|&tab| {
                let label = text(tab.label()).size(scaled(13.0, fs));
                let btn = button(label)
                    .on_press(Message::TabSelected(tab))
                    .padding([6, 14]);
                if tab == self.active_tab {
                    btn.style(button::primary).into()
                } else {
                    btn.style(button::text).into()
                }
            })
            .collect::<Vec<_>>())
        .spacing(2);

        let content: Element<'_, Message> = match self.active_tab {
            Tab::Recorder => tabs::recorder_tab::view(self, &theme),
            Tab::Settings => scrollable(tabs::settings_tab::view(
                &self.settings,
                self.session.is_recording(),
            ))
            .into(),
            Tab::Appearance => scrollable(tabs::appearance_tab::view(&self.settings)).into(),
            Tab::About => scrollable(tabs::about_tab::view(fs)).into(),
        };

        let tab_content = container(content)
            .padding(16)
            .width(Length::Fill)
            .height(Length::Fill);

        column![tab_bar, tab_content]
            .spacing(0)
            .height(Length::Fill)
            .into()
    }

    pub fn theme(&self) -> Theme {
        theme::resolve_theme(self.settings.appearance, self.settings.high_contrast)
    }

    pub fn subscription(&self) -> Subscription<Message> {
        let mut subscriptions = vec![window::close_requests().map(Message::CloseRequested)];

        if self.preview_active() {
            subscriptions.push(
                iced::time::every(Duration::from_millis(PREVIEW_INTERVAL_MS))
                    .map(|_| Message::PreviewTick),
            );
        }
        if self.session.is_recording() {
            subscriptions.push(
                iced::time::every(Duration::from_secs(OVERLAY_INTERVAL_SECS))
                    .map(|_| Message::OverlayTick),
            );
        }
        if self.settings.appearance == Appearance::System {
            subscriptions.push(
                iced::time::every(Duration::from_secs(2)).map(|_| Message::PollSystemTheme),
            );
        }

        Subscription::batch(subscriptions)
    }
}

/// Scale a base font size by the user's font_scale setting.
pub fn scaled(base: f32, font_scale: f32) -> f32 {
    (base * font_scale).round()
}
