use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use crossbeam_channel::Receiver;

use crate::shared::frame::Frame;
use crate::shared::video_metadata::VideoMetadata;
use crate::video::domain::video_writer::VideoWriter;

#[derive(Clone, Debug, PartialEq)]
pub enum WriterCall {
    Open(PathBuf, u32, u32),
    Write(usize),
    Close,
}

/// Records the calls it receives so tests can check their order.
pub struct MockWriter {
    pub calls: Arc<Mutex<Vec<WriterCall>>>,
    pub fail_open: bool,
    pub fail_write_at: Option<usize>,
    /// When set, each write waits for a message (or disconnect) first.
    pub gate: Option<Receiver<()>>,
}

impl MockWriter {
    pub fn new() -> (Self, Arc<Mutex<Vec<WriterCall>>>) {
        let calls = Arc::new(Mutex::new(Vec::new()));
        (
            Self {
                calls: calls.clone(),
                fail_open: false,
                fail_write_at: None,
                gate: None,
            },
            calls,
        )
    }
}

impl VideoWriter for MockWriter {
    fn open(
        &mut self,
        path: &Path,
        metadata: &VideoMetadata,
    ) -> Result<(), Box<dyn std::error::Error>> {
        if self.fail_open {
            return Err("mock open failure".into());
        }
        self.calls.lock().unwrap().push(WriterCall::Open(
            path.to_path_buf(),
            metadata.width,
            metadata.height,
        ));
        Ok(())
    }

    fn write(&mut self, frame: &Frame) -> Result<(), Box<dyn std::error::Error>> {
        if let Some(gate) = &self.gate {
            let _ = gate.recv();
        }
        if self.fail_write_at == Some(frame.index()) {
            return Err("mock write failure".into());
        }
        self.calls
            .lock()
            .unwrap()
            .push(WriterCall::Write(frame.index()));
        Ok(())
    }

    fn close(&mut self) -> Result<(), Box<dyn std::error::Error>> {
        self.calls.lock().unwrap().push(WriterCall::Close);
        Ok(())
    }
}

pub fn metadata() -> VideoMetadata {
    VideoMetadata {
        width: 4,
        height: 2,
        fps: 30.0,
        codec: "rawvideo".to_string(),
        source: None,
    }
}

pub fn frame(index: usize) -> Frame {
    Frame::new(vec![0u8; 4 * 2 * 3], 4, 2, 3, index)
}
