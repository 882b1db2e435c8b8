use {
    crate::{Error, bus::Bus, check_faults, comm::Comm, mutex::Mutex},
    core::{marker::PhantomData, ops::DerefMut},
    paste::paste,
    servo_packet::{
        ReturnLevel, UsageError, check_individual_id,
        control_table::{self, Item, Value},
        fault::Faults,
        recv::StatusPacket,
    },
};

/// Factory setting for `ReturnDelayTime` (2 µs per unit).
pub const DEFAULT_RETURN_DELAY: u8 = 250;

macro_rules! control_table_methods {
    ($id:ident: $ty:ty, read_only) => {
        paste! {
            #[inline]
            pub fn [< read_ $id:snake >](&mut self) -> Result<$ty, Error> {
                const { assert!(<$ty as Value>::BYTES == <control_table::$id as Item>::BYTES) };
                let bytes = self.read_bytes(
                    <control_table::$id as Item>::ADDRESS,
                    <control_table::$id as Item>::BYTES,
                )?;
                <$ty as Value>::from_le(&bytes).ok_or(Error::ParameterCount {
                    id: self.id,
                    expected: <$ty as Value>::BYTES as usize,
                    actual: bytes.len(),
                })
            }
        }
    };
    ($id:ident: $ty:ty) => {
        control_table_methods!($id: $ty, read_only);
        paste! {
            #[inline]
            pub fn [< write_ $id:snake >](&mut self, value: $ty, immediate: bool) -> Result<(), Error> {
                const { assert!(<$ty as Value>::BYTES == <control_table::$id as Item>::BYTES) };
                let mut data = Vec::with_capacity(<$ty as Value>::BYTES as usize);
                let () = value.push_le(&mut data);
                self.write_bytes(<control_table::$id as Item>::ADDRESS, &data, immediate)
            }
        }
    };
}

/// One addressable device on a shared bus.
pub struct Actuator<'bus, C: Comm, M: Mutex<Item = Bus<C>>> {
    bus: &'bus M,
    id: u8,
    status_return_level: ReturnLevel,
    return_delay: u8,
    /// Registered with a buffered write, in force once the device acts on it.
    pending_return_level: Option<ReturnLevel>,
    pending_return_delay: Option<u8>,
    last_error: Faults,
    _comm: PhantomData<fn() -> C>,
}

impl<'bus, C: Comm, M: Mutex<Item = Bus<C>>> Actuator<'bus, C, M> {
    /// Assume factory settings: every instruction answered, default return delay.
    #[inline]
    pub fn new(bus: &'bus M, id: u8) -> Result<Self, Error> {
        let () = check_individual_id(id)?;
        Ok(Self {
            bus,
            id,
            status_return_level: ReturnLevel::All,
            return_delay: DEFAULT_RETURN_DELAY,
            pending_return_level: None,
            pending_return_delay: None,
            last_error: Faults::NONE,
            _comm: PhantomData,
        })
    }

    /// Ask the device for its return level and delay instead of assuming them.
    #[inline]
    pub fn connect(bus: &'bus M, id: u8) -> Result<Self, Error> {
        let mut actuator = Self::new(bus, id)?;
        actuator.status_return_level = ReturnLevel::try_from(actuator.read_status_return_level()?)
            .map_err(UsageError::from)?;
        actuator.return_delay = actuator.read_return_delay_time()?;
        log::debug!(
            "Connected to ID {id}: return level {:?}, return delay {}",
            actuator.status_return_level,
            actuator.return_delay,
        );
        Ok(actuator)
    }

    #[inline(always)]
    pub const fn id(&self) -> u8 {
        self.id
    }

    #[inline(always)]
    pub const fn bus(&self) -> &'bus M {
        self.bus
    }

    #[inline(always)]
    pub const fn status_return_level(&self) -> ReturnLevel {
        self.status_return_level
    }

    #[inline(always)]
    pub const fn return_delay(&self) -> u8 {
        self.return_delay
    }

    /// Return level written with a buffered write and not yet acted on.
    #[inline(always)]
    pub const fn pending_return_level(&self) -> Option<ReturnLevel> {
        self.pending_return_level
    }

    /// Error byte of the most recent status packet from this device.
    #[inline(always)]
    pub const fn last_error(&self) -> Faults {
        self.last_error
    }

    #[inline]
    pub(crate) fn lock(&self) -> Result<impl DerefMut<Target = Bus<C>>, Error> {
        self.bus.lock().map_err(|e| Error::Lock(e.to_string()))
    }

    #[inline]
    fn inspect(&mut self, status: Option<StatusPacket>) -> Result<Option<StatusPacket>, Error> {
        let Some(status) = status else {
            return Ok(None);
        };
        self.last_error = status.faults();
        let () = check_faults(&status)?;
        Ok(Some(status))
    }

    #[inline]
    pub fn read_bytes(&mut self, address: u8, count: u8) -> Result<Vec<u8>, Error> {
        let status = self.lock()?.read(self.id, address, count)?;
        let Some(status) = self.inspect(Some(status))? else {
            return Err(Error::NoReply { id: self.id });
        };
        if status.parameters.len() != count as usize {
            return Err(Error::ParameterCount {
                id: self.id,
                expected: count as usize,
                actual: status.parameters.len(),
            });
        }
        Ok(status.parameters)
    }

    #[inline]
    pub fn read_word(&mut self, address: u8) -> Result<u16, Error> {
        let bytes = self.read_bytes(address, 2)?;
        <u16 as Value>::from_le(&bytes).ok_or(Error::ParameterCount {
            id: self.id,
            expected: 2,
            actual: bytes.len(),
        })
    }

    /// Consecutive little-endian words starting at `address`.
    #[inline]
    pub fn read_words(&mut self, address: u8, count: u8) -> Result<Vec<u16>, Error> {
        let Some(bytes) = count.checked_mul(2) else {
            return Err(UsageError::RegisterOverflow {
                address,
                bytes: 2 * count as usize,
            }
            .into());
        };
        let raw = self.read_bytes(address, bytes)?;
        Ok(raw
            .chunks_exact(2)
            .filter_map(<u16 as Value>::from_le)
            .collect())
    }

    #[inline]
    pub fn write_bytes(&mut self, address: u8, data: &[u8], immediate: bool) -> Result<(), Error> {
        let status = self.lock()?.write(
            self.id,
            address,
            data,
            immediate,
            self.status_return_level,
        )?;
        let _ = self.inspect(status)?;
        Ok(())
    }

    #[inline]
    pub fn write_word(&mut self, address: u8, value: u16, immediate: bool) -> Result<(), Error> {
        self.write_words(address, &[value], immediate)
    }

    #[inline]
    pub fn write_words(&mut self, address: u8, values: &[u16], immediate: bool) -> Result<(), Error> {
        let mut data = Vec::with_capacity(2 * values.len());
        for &value in values {
            let () = value.push_le(&mut data);
        }
        self.write_bytes(address, &data, immediate)
    }

    /// Apply this device's buffered writes.
    ///
    /// The action is answered at the level in force before it; a buffered return level
    /// applies from the next packet on.
    #[inline]
    pub fn action(&mut self) -> Result<(), Error> {
        let status = self.lock()?.action(self.id, self.status_return_level);
        let () = self.settle_buffered();
        let _ = self.inspect(status?)?;
        Ok(())
    }

    /// Adopt buffered settings after the device acted on them some other way,
    /// e.g. through [`Bus::action_all`].
    #[inline]
    pub fn settle_buffered(&mut self) {
        if let Some(level) = self.pending_return_level.take() {
            self.status_return_level = level;
        }
        if let Some(units) = self.pending_return_delay.take() {
            self.return_delay = units;
        }
    }

    /// `Ok(None)` if the device did not answer.
    #[inline]
    pub fn ping(&mut self) -> Result<Option<StatusPacket>, Error> {
        let status = self.lock()?.ping(self.id);
        if let Err(Error::Device { faults, .. }) = status {
            self.last_error = faults;
        }
        let status = status?;
        if let Some(ref status) = status {
            self.last_error = status.faults();
        }
        Ok(status)
    }

    /// The write itself is answered according to the level in force when it is sent.
    /// A buffered change leaves the session's level alone until [`Self::action`].
    #[inline]
    pub fn set_status_return_level(&mut self, level: ReturnLevel, immediate: bool) -> Result<(), Error> {
        let () = self.write_bytes(
            <control_table::StatusReturnLevel as Item>::ADDRESS,
            &[level as u8],
            immediate,
        )?;
        if immediate {
            self.status_return_level = level;
        } else {
            self.pending_return_level = Some(level);
        }
        Ok(())
    }

    /// Units of 2 µs, 0 through 254.
    #[inline]
    pub fn set_return_delay(&mut self, units: u8, immediate: bool) -> Result<(), Error> {
        if units == u8::MAX {
            return Err(UsageError::InvalidReturnDelay { units }.into());
        }
        let () = self.write_bytes(
            <control_table::ReturnDelayTime as Item>::ADDRESS,
            &[units],
            immediate,
        )?;
        if immediate {
            self.return_delay = units;
        } else {
            self.pending_return_delay = Some(units);
        }
        Ok(())
    }

    control_table_methods!(ModelNumber: u16, read_only);
    control_table_methods!(FirmwareVersion: u8, read_only);
    control_table_methods!(Id: u8, read_only);
    control_table_methods!(BaudRate: u8);
    control_table_methods!(ReturnDelayTime: u8, read_only);
    control_table_methods!(CwAngleLimit: u16);
    control_table_methods!(CcwAngleLimit: u16);
    control_table_methods!(TemperatureLimit: u8);
    control_table_methods!(MinVoltageLimit: u8);
    control_table_methods!(MaxVoltageLimit: u8);
    control_table_methods!(MaxTorque: u16);
    control_table_methods!(StatusReturnLevel: u8, read_only);
    control_table_methods!(AlarmLed: u8);
    control_table_methods!(Shutdown: u8);
    control_table_methods!(TorqueEnable: u8);
    control_table_methods!(Led: u8);
    control_table_methods!(CwComplianceMargin: u8);
    control_table_methods!(CcwComplianceMargin: u8);
    control_table_methods!(CwComplianceSlope: u8);
    control_table_methods!(CcwComplianceSlope: u8);
    control_table_methods!(GoalPosition: u16);
    control_table_methods!(MovingSpeed: u16);
    control_table_methods!(TorqueLimit: u16);
    control_table_methods!(PresentPosition: u16, read_only);
    control_table_methods!(PresentSpeed: u16, read_only);
    control_table_methods!(PresentLoad: u16, read_only);
    control_table_methods!(PresentVoltage: u8, read_only);
    control_table_methods!(PresentTemperature: u8, read_only);
    control_table_methods!(Registered: u8, read_only);
    control_table_methods!(Moving: u8, read_only);
    control_table_methods!(Lock: u8);
    control_table_methods!(Punch: u16);
}
