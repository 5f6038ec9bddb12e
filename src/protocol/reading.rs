use super::types::*;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Reading {
    Temperature { celsius: f64 },
    CarbonDioxide { ppm: u16 },
}

/// Big-endian 16-bit value carried in bytes 1..=2.
pub fn frame_value(frame: &DecryptedFrame) -> u16 {
    u16::from_be_bytes([frame[FRAME_VALUE_HI], frame[FRAME_VALUE_LO]])
}

/// The sensor reports temperature in 1/16 kelvin.
pub fn kelvin16_to_celsius(value: u16) -> f64 {
    f64::from(value) / TEMPERATURE_SCALE - KELVIN_OFFSET
}

/// Map a validated frame to a reading. The sensor multiplexes many op-codes
/// over the same channel; anything other than temperature and CO2 yields `None`.
pub fn extract(frame: &DecryptedFrame) -> Option<Reading> {
    let value = frame_value(frame);
    match frame[FRAME_OP] {
        OP_TEMPERATURE => Some(Reading::Temperature {
            celsius: kelvin16_to_celsius(value),
        }),
        OP_CARBON_DIOXIDE => Some(Reading::CarbonDioxide { ppm: value }),
        _ => None,
    }
}
