pub const FRAME_SIZE: usize = 8;

/// Raw frame exactly as read from the hidraw node.
pub type RawFrame = [u8; FRAME_SIZE];
/// Frame after the obfuscation transform: op, value hi, value lo, checksum, terminator.
pub type DecryptedFrame = [u8; FRAME_SIZE];

pub const KEY: [u8; FRAME_SIZE] = [0xC4, 0xC6, 0xC0, 0x92, 0x40, 0x23, 0xDC, 0x96];
pub const CIPHER_STATE: [u8; FRAME_SIZE] = [0x48, 0x74, 0x65, 0x6D, 0x70, 0x39, 0x39, 0x65];
pub const SHUFFLE_MAP: [usize; FRAME_SIZE] = [2, 4, 0, 7, 1, 6, 5, 3];

pub const FRAME_OP: usize = 0;
pub const FRAME_VALUE_HI: usize = 1;
pub const FRAME_VALUE_LO: usize = 2;
pub const FRAME_CHECKSUM: usize = 3;
pub const FRAME_TERMINATOR: usize = 4;
pub const TERMINATOR: u8 = 0x0D;

pub const OP_TEMPERATURE: u8 = 0x42;
pub const OP_CARBON_DIOXIDE: u8 = 0x50;

pub const FEATURE_REPORT_ID: u8 = 0x00;
pub const UNLOCK_REPORT_SIZE: usize = FRAME_SIZE + 1;

/// Feature report payload that switches the sensor into decodable streaming mode.
pub const UNLOCK_REPORT: [u8; UNLOCK_REPORT_SIZE] = [
    FEATURE_REPORT_ID,
    KEY[0],
    KEY[1],
    KEY[2],
    KEY[3],
    KEY[4],
    KEY[5],
    KEY[6],
    KEY[7],
];

pub const KELVIN_OFFSET: f64 = 273.15;
pub const TEMPERATURE_SCALE: f64 = 16.0;
