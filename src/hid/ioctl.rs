//! hidraw ioctls, from linux/hidraw.h

use nix::ioctl_readwrite_buf;

const HIDRAW_IOC_MAGIC: u8 = b'H';
const HIDRAW_SET_FEATURE: u8 = 0x06;

// HIDIOCSFEATURE(len) is declared _IOC(_IOC_WRITE|_IOC_READ, ...) and the
// kernel checks the direction bits, so this has to be readwrite, not write.
ioctl_readwrite_buf!(
    hidraw_ioc_set_feature,
    HIDRAW_IOC_MAGIC,
    HIDRAW_SET_FEATURE,
    u8
);
