pub mod cipher;
pub mod frame;
pub mod reading;
pub mod types;

pub use cipher::{decrypt, decrypt_frame};
pub use frame::{FrameDefect, validate};
pub use reading::{Reading, extract};
pub use types::{DecryptedFrame, RawFrame};
