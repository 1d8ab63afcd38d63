//! Hand angles for a given wall-clock time

use chrono::Timelike;

/// Rotation of each hand in degrees, clockwise from 12 o'clock
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HandAngles {
    pub hour: f32,
    pub minute: f32,
    pub second: f32,
}

impl HandAngles {
    /// Angles for `hour` in 0..24, `minute` and `second` in 0..60.
    pub fn at(hour: u32, minute: u32, second: u32) -> Self {
        let minute_f = minute as f32;
        let second_f = second as f32;
        Self {
            hour: 30.0 * ((hour % 12) as f32 + minute_f / 60.0),
            minute: 6.0 * (minute_f + second_f / 60.0),
            second: 6.0 * second_f,
        }
    }

    pub fn from_time<T: Timelike>(time: &T) -> Self {
        Self::at(time.hour(), time.minute(), time.second())
    }
}
