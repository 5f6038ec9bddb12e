use std::fs::{File, OpenOptions};
use std::os::fd::AsRawFd;
use std::path::Path;

use super::{HidError, ioctl::hidraw_ioc_set_feature};
use crate::protocol::types::UNLOCK_REPORT;

/// Open the hidraw node for unbuffered read/write.
pub fn open_device(path: &Path) -> Result<File, HidError> {
    OpenOptions::new()
        .read(true)
        .write(true)
        .open(path)
        .map_err(|source| HidError::DeviceUnavailable {
            path: path.to_path_buf(),
            source,
        })
}

/// Send the one-time feature report that switches the sensor into the
/// streaming mode [`decrypt`](crate::protocol::decrypt) understands.
pub fn unlock(file: &File) -> Result<(), HidError> {
    let mut report = UNLOCK_REPORT;
    // SAFETY: the fd is owned by `file` and stays open for the call; the
    // buffer length is encoded into the request number by the macro.
    let sent = unsafe { hidraw_ioc_set_feature(file.as_raw_fd(), &mut report) }
        .map_err(HidError::UnlockFailed)?;
    tracing::debug!(sent, "Unlock feature report sent");
    Ok(())
}
