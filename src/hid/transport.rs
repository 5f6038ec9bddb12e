use std::fs::File;
use std::io::{ErrorKind, Read};
use std::path::{Path, PathBuf};

use super::{
    HidError,
    device::{open_device, unlock},
};
use crate::protocol::types::{FRAME_SIZE, RawFrame};

/// Anything that yields raw 8-byte frames, one blocking read at a time.
pub trait FrameSource {
    fn read_frame(&mut self) -> Result<RawFrame, HidError>;
}

/// Exclusive owner of an unlocked sensor handle. The device is released when
/// this is dropped.
pub struct HidTransport {
    file: File,
    path: PathBuf,
}

impl HidTransport {
    /// Open the device and unlock it. A transport is never handed out
    /// without a successful unlock, so no read can precede it.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, HidError> {
        let path = path.as_ref();
        let file = open_device(path)?;
        unlock(&file)?;
        tracing::info!(device = %path.display(), "Sensor opened and unlocked");
        Ok(Self {
            file,
            path: path.to_path_buf(),
        })
    }
}

impl FrameSource for HidTransport {
    fn read_frame(&mut self) -> Result<RawFrame, HidError> {
        read_raw_frame(&mut self.file)
    }
}

impl Drop for HidTransport {
    fn drop(&mut self) {
        tracing::debug!(device = %self.path.display(), "Sensor released");
    }
}

/// One read, one report. A short read is a failure for this attempt; partial
/// frames are never stitched together across calls.
pub(crate) fn read_raw_frame<R: Read>(reader: &mut R) -> Result<RawFrame, HidError> {
    let mut frame = [0u8; FRAME_SIZE];
    let n = loop {
        match reader.read(&mut frame) {
            Ok(n) => break n,
            Err(e) if e.kind() == ErrorKind::Interrupted => continue,
            Err(e) => return Err(HidError::ReadFailed(e.to_string())),
        }
    };
    if n != FRAME_SIZE {
        return Err(HidError::ReadFailed(format!(
            "short read: {n} of {FRAME_SIZE} bytes"
        )));
    }
    tracing::trace!(raw = ?frame, "HID rx");
    Ok(frame)
}
