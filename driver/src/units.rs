//! Device ticks to physical units and back.
//!
//! Everything here is pure. Out-of-range inputs are clamped to what the registers can hold;
//! refusing an angle outside a joint's soft limits is the joint's job.

use core::f64::consts::PI;

#[derive(Clone, Copy, Debug, PartialEq, thiserror::Error)]
pub enum CalibrationError {
    #[error("Calibration field `{field}` must be positive and finite but was {value}")]
    NotPositive { field: &'static str, value: f64 },
    #[error("Calibration field `{field}` must be finite and not negative but was {value}")]
    Negative { field: &'static str, value: f64 },
}

/// Numeric constants of one actuator model.
#[derive(Clone, Copy, Debug, PartialEq, serde::Deserialize, serde::Serialize)]
#[serde(default)]
pub struct Calibration {
    /// Largest position register value.
    pub max_angle_ticks: u16,
    /// Mechanical travel covered by `0..=max_angle_ticks`.
    pub angle_range_deg: f64,
    pub rpm_per_tick: f64,
    /// Largest speed register value.
    pub max_speed_ticks: u16,
    /// User-imposed ceiling for percentage speeds, below the device's own maximum.
    pub speed_cap_rpm: f64,
    pub ticks_per_volt: f64,
    pub ticks_per_celsius: f64,
}

impl Calibration {
    pub const AX12A: Self = Self {
        max_angle_ticks: 1023,
        angle_range_deg: 300.0,
        rpm_per_tick: 0.111,
        max_speed_ticks: 1023,
        speed_cap_rpm: 80.0,
        ticks_per_volt: 10.0,
        ticks_per_celsius: 1.0,
    };

    /// Every conversion below is well-defined for a calibration that passes this.
    #[inline]
    pub fn validate(&self) -> Result<(), CalibrationError> {
        for (field, value) in [
            ("max_angle_ticks", self.max_angle_ticks as f64),
            ("angle_range_deg", self.angle_range_deg),
            ("rpm_per_tick", self.rpm_per_tick),
            ("max_speed_ticks", self.max_speed_ticks as f64),
            ("ticks_per_volt", self.ticks_per_volt),
            ("ticks_per_celsius", self.ticks_per_celsius),
        ] {
            if !(value.is_finite() && value > 0.0) {
                return Err(CalibrationError::NotPositive { field, value });
            }
        }
        if !(self.speed_cap_rpm.is_finite() && self.speed_cap_rpm >= 0.0) {
            return Err(CalibrationError::Negative {
                field: "speed_cap_rpm",
                value: self.speed_cap_rpm,
            });
        }
        Ok(())
    }

    #[inline(always)]
    pub fn angle_range_rad(&self) -> f64 {
        self.angle_range_deg * PI / 180.0
    }

    #[inline(always)]
    pub fn ticks_per_radian(&self) -> f64 {
        self.max_angle_ticks as f64 / self.angle_range_rad()
    }

    /// Mid-travel, where the joint frame puts zero.
    #[inline(always)]
    pub fn zero_offset_rad(&self) -> f64 {
        self.angle_range_rad() / 2.0
    }

    #[inline(always)]
    pub fn max_rpm(&self) -> f64 {
        self.max_speed_ticks as f64 * self.rpm_per_tick
    }

    /// Speed register value that corresponds to 100%.
    #[inline]
    pub fn limited_max_ticks(&self) -> u16 {
        let ticks = (self.max_speed_ticks as f64 / self.max_rpm() * self.speed_cap_rpm).floor();
        clamp_ticks(ticks, self.max_speed_ticks)
    }

    #[inline]
    pub fn angle_to_ticks(&self, angle_rad: f64, reversed: bool, offset_rad: f64) -> u16 {
        let ticks = ((angle_rad + offset_rad) * self.ticks_per_radian()).round();
        let ticks = if reversed {
            self.max_angle_ticks as f64 - 1.0 - ticks
        } else {
            ticks
        };
        clamp_ticks(ticks, self.max_angle_ticks)
    }

    #[inline]
    pub fn ticks_to_angle(&self, ticks: u16, reversed: bool, offset_rad: f64) -> f64 {
        let ticks = ticks.min(self.max_angle_ticks) as f64;
        let ticks = if reversed {
            self.max_angle_ticks as f64 - 1.0 - ticks
        } else {
            ticks
        };
        ticks / self.ticks_per_radian() - offset_rad
    }

    #[inline]
    pub fn speed_to_ticks(&self, rpm: f64) -> u16 {
        let rpm = rpm.max(0.0).min(self.max_rpm());
        clamp_ticks((rpm / self.rpm_per_tick + 0.5).floor(), self.max_speed_ticks)
    }

    #[inline]
    pub fn ticks_to_speed(&self, ticks: u16) -> f64 {
        (ticks.min(self.max_speed_ticks) as f64 * self.rpm_per_tick).floor()
    }

    #[inline]
    pub fn percent_to_ticks(&self, percent: f64) -> u16 {
        let percent = percent.clamp(0.0, 100.0);
        let ticks = (percent * self.limited_max_ticks() as f64 / 100.0).floor();
        clamp_ticks(ticks, self.max_speed_ticks)
    }

    #[inline(always)]
    pub fn ticks_to_voltage(&self, ticks: u8) -> f64 {
        ticks as f64 / self.ticks_per_volt
    }

    #[inline(always)]
    pub fn ticks_to_celsius(&self, ticks: u8) -> f64 {
        ticks as f64 / self.ticks_per_celsius
    }
}

impl Default for Calibration {
    #[inline(always)]
    fn default() -> Self {
        Self::AX12A
    }
}

/// NaN lands on zero.
#[inline(always)]
fn clamp_ticks(ticks: f64, max: u16) -> u16 {
    if ticks.is_nan() {
        return 0;
    }
    ticks.clamp(0.0, max as f64) as u16
}

#[inline(always)]
pub fn angle_to_ticks(angle_rad: f64, reversed: bool, offset_rad: f64) -> u16 {
    Calibration::AX12A.angle_to_ticks(angle_rad, reversed, offset_rad)
}

#[inline(always)]
pub fn ticks_to_angle(ticks: u16, reversed: bool, offset_rad: f64) -> f64 {
    Calibration::AX12A.ticks_to_angle(ticks, reversed, offset_rad)
}

#[inline(always)]
pub fn speed_to_ticks(rpm: f64) -> u16 {
    Calibration::AX12A.speed_to_ticks(rpm)
}

#[inline(always)]
pub fn ticks_to_speed(ticks: u16) -> f64 {
    Calibration::AX12A.ticks_to_speed(ticks)
}

#[inline(always)]
pub fn percent_to_ticks(percent: f64) -> u16 {
    Calibration::AX12A.percent_to_ticks(percent)
}

#[inline(always)]
pub fn ticks_to_voltage(ticks: u8) -> f64 {
    Calibration::AX12A.ticks_to_voltage(ticks)
}
