//! A servo as a revolute joint: radians and rpm in, radians and rpm out.

use {
    crate::{Error, actuator::Actuator, bus::Bus, comm::Comm, mutex::Mutex, units::Calibration},
    servo_packet::{
        control_table::{GoalPosition, Item},
        send::SyncWrite,
    },
};

#[derive(Clone, Copy, Debug, PartialEq, serde::Deserialize, serde::Serialize)]
#[serde(default)]
pub struct JointConfig {
    pub device_id: u8,
    pub rotation_reversed: bool,
    /// Added to the calibration's mid-travel offset.
    pub angle_offset_rad: f64,
    /// Lowest permitted position, measured from the device's zero tick.
    pub angle_min_rad: f64,
    /// Highest permitted position, measured from the device's zero tick.
    pub angle_max_rad: f64,
}

impl Default for JointConfig {
    #[inline]
    fn default() -> Self {
        Self {
            device_id: 1,
            rotation_reversed: false,
            angle_offset_rad: 0.0,
            angle_min_rad: 0.0,
            angle_max_rad: Calibration::AX12A.angle_range_rad(),
        }
    }
}

pub struct Joint<'bus, C: Comm, M: Mutex<Item = Bus<C>>> {
    actuator: Actuator<'bus, C, M>,
    config: JointConfig,
    calibration: Calibration,
    offset_rad: f64,
    goal_angle: Option<f64>,
}

impl<'bus, C: Comm, M: Mutex<Item = Bus<C>>> Joint<'bus, C, M> {
    /// Pushes the session's return level and the hardware angle limits to the device.
    #[inline]
    pub fn new(
        mut actuator: Actuator<'bus, C, M>,
        config: JointConfig,
        calibration: Calibration,
    ) -> Result<Self, Error> {
        if actuator.id() != config.device_id {
            return Err(Error::IdMismatch {
                config: config.device_id,
                session: actuator.id(),
            });
        }
        let () = actuator.set_status_return_level(actuator.status_return_level(), true)?;
        let () = actuator.write_cw_angle_limit(
            calibration.angle_to_ticks(config.angle_min_rad, false, 0.0),
            true,
        )?;
        let () = actuator.write_ccw_angle_limit(
            calibration.angle_to_ticks(config.angle_max_rad, false, 0.0),
            true,
        )?;
        Ok(Self {
            actuator,
            config,
            calibration,
            offset_rad: calibration.zero_offset_rad() + config.angle_offset_rad,
            goal_angle: None,
        })
    }

    #[inline(always)]
    pub const fn actuator(&mut self) -> &mut Actuator<'bus, C, M> {
        &mut self.actuator
    }

    #[inline(always)]
    pub const fn config(&self) -> &JointConfig {
        &self.config
    }

    #[inline(always)]
    pub const fn calibration(&self) -> &Calibration {
        &self.calibration
    }

    /// Soft limits in the joint frame.
    #[inline(always)]
    pub fn limits(&self) -> (f64, f64) {
        (
            self.config.angle_min_rad - self.offset_rad,
            self.config.angle_max_rad - self.offset_rad,
        )
    }

    #[inline]
    fn check_limits(&self, angle_rad: f64) -> Result<(), Error> {
        let (min, max) = self.limits();
        if !(min..=max).contains(&angle_rad) {
            return Err(Error::SoftLimit {
                id: self.actuator.id(),
                angle: angle_rad,
                min,
                max,
            });
        }
        Ok(())
    }

    #[inline(always)]
    fn position_ticks(&self, angle_rad: f64) -> u16 {
        self.calibration
            .angle_to_ticks(angle_rad, self.config.rotation_reversed, self.offset_rad)
    }

    #[inline(always)]
    fn angle(&self, ticks: u16) -> f64 {
        self.calibration
            .ticks_to_angle(ticks, self.config.rotation_reversed, self.offset_rad)
    }

    /// Direction lives in bit 10; counterclockwise comes back positive.
    #[inline]
    fn signed_speed(&self, ticks: u16) -> f64 {
        let rpm = self.calibration.ticks_to_speed(ticks & 0x3FF);
        if (ticks & 0x400 != 0) != self.config.rotation_reversed {
            -rpm
        } else {
            rpm
        }
    }

    #[inline]
    pub fn set_goal_angle(&mut self, angle_rad: f64, immediate: bool) -> Result<(), Error> {
        let () = self.check_limits(angle_rad)?;
        let ticks = self.position_ticks(angle_rad);
        let () = self.actuator.write_goal_position(ticks, immediate)?;
        self.goal_angle = Some(angle_rad);
        Ok(())
    }

    /// Read back from the device.
    #[inline]
    pub fn goal_angle(&mut self) -> Result<f64, Error> {
        let ticks = self.actuator.read_goal_position()?;
        Ok(self.angle(ticks))
    }

    /// Last angle this joint commanded, without touching the bus.
    #[inline(always)]
    pub const fn saved_goal_angle(&self) -> Option<f64> {
        self.goal_angle
    }

    #[inline]
    pub fn present_angle(&mut self) -> Result<f64, Error> {
        let ticks = self.actuator.read_present_position()?;
        Ok(self.angle(ticks))
    }

    #[inline]
    pub fn set_speed_rpm(&mut self, rpm: f64, immediate: bool) -> Result<(), Error> {
        self.actuator
            .write_moving_speed(self.calibration.speed_to_ticks(rpm), immediate)
    }

    #[inline]
    pub fn set_speed_percent(&mut self, percent: f64, immediate: bool) -> Result<(), Error> {
        self.actuator
            .write_moving_speed(self.calibration.percent_to_ticks(percent), immediate)
    }

    /// Goal position and moving speed in one write.
    #[inline]
    pub fn set_angle_speed(
        &mut self,
        angle_rad: f64,
        percent: f64,
        immediate: bool,
    ) -> Result<(), Error> {
        let () = self.check_limits(angle_rad)?;
        let words = [
            self.position_ticks(angle_rad),
            self.calibration.percent_to_ticks(percent),
        ];
        let () = self
            .actuator
            .write_words(<GoalPosition as Item>::ADDRESS, &words, immediate)?;
        self.goal_angle = Some(angle_rad);
        Ok(())
    }

    #[inline]
    pub fn moving_speed_rpm(&mut self) -> Result<f64, Error> {
        let ticks = self.actuator.read_moving_speed()?;
        Ok(self.calibration.ticks_to_speed(ticks))
    }

    #[inline]
    pub fn present_speed_rpm(&mut self) -> Result<f64, Error> {
        let ticks = self.actuator.read_present_speed()?;
        Ok(self.signed_speed(ticks))
    }

    /// Position and speed from one read.
    #[inline]
    pub fn present_angle_speed(&mut self) -> Result<(f64, f64), Error> {
        let words = self
            .actuator
            .read_words(<servo_packet::control_table::PresentPosition as Item>::ADDRESS, 2)?;
        let &[position, speed] = words.as_slice() else {
            return Err(Error::ParameterCount {
                id: self.actuator.id(),
                expected: 4,
                actual: 2 * words.len(),
            });
        };
        Ok((self.angle(position), self.signed_speed(speed)))
    }

    #[inline]
    pub fn present_voltage(&mut self) -> Result<f64, Error> {
        let ticks = self.actuator.read_present_voltage()?;
        Ok(self.calibration.ticks_to_voltage(ticks))
    }

    #[inline]
    pub fn present_temperature(&mut self) -> Result<f64, Error> {
        let ticks = self.actuator.read_present_temperature()?;
        Ok(self.calibration.ticks_to_celsius(ticks))
    }

    #[inline]
    pub fn is_moving(&mut self) -> Result<bool, Error> {
        Ok(self.actuator.read_moving()? != 0)
    }

    /// Move every joint with one broadcast frame: `(joint, angle in radians, speed in percent)`.
    ///
    /// Nothing is sent unless every angle is within its joint's soft limits
    /// and every joint shares one bus.
    #[inline]
    pub fn set_angle_speed_sync(commands: &mut [(&mut Self, f64, f64)]) -> Result<(), Error> {
        let Some(&(ref first, _, _)) = commands.first() else {
            return Err(servo_packet::UsageError::EmptyBatch.into());
        };
        let bus = first.actuator.bus();
        for &(ref joint, angle_rad, _) in commands.iter() {
            let () = joint.check_limits(angle_rad)?;
            if !core::ptr::eq(joint.actuator.bus(), bus) {
                return Err(Error::MixedBuses);
            }
        }
        let batch = SyncWrite::new(
            <GoalPosition as Item>::ADDRESS,
            commands.iter().map(|&(ref joint, angle_rad, percent)| {
                (
                    joint.actuator.id(),
                    [
                        joint.position_ticks(angle_rad),
                        joint.calibration.percent_to_ticks(percent),
                    ],
                )
            }),
        )?;
        let () = commands[0].0.actuator.lock()?.sync_write(&batch)?;
        for &mut (ref mut joint, angle_rad, _) in commands.iter_mut() {
            joint.goal_angle = Some(angle_rad);
        }
        Ok(())
    }
}
