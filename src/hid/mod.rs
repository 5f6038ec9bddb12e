use std::io;
use std::path::PathBuf;

pub mod device;
pub mod ioctl;
pub mod transport;

pub use transport::{FrameSource, HidTransport};

#[derive(Debug, thiserror::Error)]
pub enum HidError {
    #[error("Device unavailable at {}: {source}", .path.display())]
    DeviceUnavailable { path: PathBuf, source: io::Error },
    #[error("Unlock feature report rejected: {0}")]
    UnlockFailed(nix::errno::Errno),
    #[error("HID read error: {0}")]
    ReadFailed(String),
}
