use crate::error::ProtocolError;

/// Raw slider readings live in [-255, 255].
pub const AXIS_LIMIT: i16 = 255;
/// Readings with magnitude strictly below this are treated as centered.
pub const DEAD_ZONE: i16 = 20;
/// Smallest motor speed the firmware drives reliably.
pub const MIN_SPEED: i16 = 100;
pub const MAX_SPEED: i16 = 255;

/// One validated raw reading from a slider axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct AxisSample(i16);

impl AxisSample {
    pub const CENTERED: AxisSample = AxisSample(0);

    pub fn new(raw: i16) -> Result<Self, ProtocolError> {
        // unsigned_abs: i16::MIN has no i16 negation, and it must be
        // rejected here, not panic.
        if raw.unsigned_abs() > AXIS_LIMIT as u16 {
            return Err(ProtocolError::AxisOutOfRange(raw));
        }
        Ok(Self(raw))
    }

    pub fn raw(&self) -> i16 {
        self.0
    }

    pub fn mapped(&self) -> i16 {
        map_axis(self.0)
    }
}

/// Maps a raw axis reading to a motor speed.
///
/// Magnitudes strictly inside the dead zone collapse to 0; everything else is
/// rescaled linearly from [DEAD_ZONE, 255] onto [MIN_SPEED, MAX_SPEED] with
/// the sign preserved, so the output is always 0 or has magnitude in
/// [MIN_SPEED, MAX_SPEED]. Jitter near center never produces a weak motor
/// command.
pub fn map_axis(raw: i16) -> i16 {
    if raw.unsigned_abs() < DEAD_ZONE as u16 {
        return 0;
    }
    let span = f64::from(MAX_SPEED - MIN_SPEED) / f64::from(AXIS_LIMIT - DEAD_ZONE);
    if raw > 0 {
        (f64::from(MIN_SPEED) + f64::from(raw - DEAD_ZONE) * span).round() as i16
    } else {
        (f64::from(-MIN_SPEED) + f64::from(raw + DEAD_ZONE) * span).round() as i16
    }
}

/// Renders the two-axis differential-drive frame from raw slider readings.
pub fn encode_motion(left_raw: i16, right_raw: i16) -> String {
    format!("M:{},{}", map_axis(left_raw), map_axis(right_raw))
}
