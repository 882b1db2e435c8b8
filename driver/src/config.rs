use {
    crate::{bus::Bus, comm::Comm, joint::JointConfig, units::{Calibration, CalibrationError}},
    servo_packet::InstructionSet,
    std::{fs, io, path::{Path, PathBuf}, time::Duration},
};

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Couldn't read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("Invalid bus configuration: {0}")]
    Parse(#[from] toml::de::Error),
    #[error(transparent)]
    Calibration(#[from] CalibrationError),
}

/// One serial bus and the joints on it. Missing keys take their defaults.
///
/// ```toml
/// port = "/dev/ttyUSB0"
/// baud_rate = 1000000
///
/// [[joints]]
/// device_id = 1
/// rotation_reversed = true
/// ```
#[derive(Clone, Debug, PartialEq, serde::Deserialize, serde::Serialize)]
#[serde(default)]
pub struct BusConfig {
    pub port: Option<String>,
    pub baud_rate: u32,
    pub timeout_ms: u64,
    pub instructions: InstructionSet,
    pub calibration: Calibration,
    pub joints: Vec<JointConfig>,
}

impl Default for BusConfig {
    #[inline]
    fn default() -> Self {
        Self {
            port: None,
            baud_rate: 1_000_000,
            timeout_ms: 200,
            instructions: InstructionSet::PROTOCOL_1,
            calibration: Calibration::AX12A,
            joints: vec![],
        }
    }
}

impl BusConfig {
    #[inline]
    pub fn from_toml(source: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(source)?;
        let () = config.calibration.validate()?;
        Ok(config)
    }

    #[inline]
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        log::debug!("Loading bus configuration from {}", path.display());
        let source = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_owned(),
            source,
        })?;
        Self::from_toml(&source)
    }

    #[inline(always)]
    pub const fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    /// A bus over `comm` speaking this configuration's instruction set.
    #[inline(always)]
    pub fn bus<C: Comm>(&self, comm: C) -> Bus<C> {
        Bus::with_instructions(comm, self.instructions)
    }
}
