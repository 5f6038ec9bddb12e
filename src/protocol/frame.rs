use super::types::*;

/// Why a decrypted frame was dropped. Only ever logged.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameDefect {
    BadTerminator(u8),
    ChecksumMismatch { expected: u8, actual: u8 },
}

impl std::fmt::Display for FrameDefect {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FrameDefect::BadTerminator(t) => write!(f, "bad terminator {t:#04x}"),
            FrameDefect::ChecksumMismatch { expected, actual } => {
                write!(f, "checksum error: expected {expected:#04x}, got {actual:#04x}")
            }
        }
    }
}

/// Additive checksum over op-code and value bytes.
pub fn checksum(frame: &DecryptedFrame) -> u8 {
    frame[FRAME_OP]
        .wrapping_add(frame[FRAME_VALUE_HI])
        .wrapping_add(frame[FRAME_VALUE_LO])
}

/// Classify a decrypted frame, terminator first.
pub fn inspect(frame: &DecryptedFrame) -> Result<(), FrameDefect> {
    if frame[FRAME_TERMINATOR] != TERMINATOR {
        return Err(FrameDefect::BadTerminator(frame[FRAME_TERMINATOR]));
    }
    let expected = checksum(frame);
    if expected != frame[FRAME_CHECKSUM] {
        return Err(FrameDefect::ChecksumMismatch {
            expected,
            actual: frame[FRAME_CHECKSUM],
        });
    }
    Ok(())
}

pub fn validate(frame: &DecryptedFrame) -> bool {
    inspect(frame).is_ok()
}
