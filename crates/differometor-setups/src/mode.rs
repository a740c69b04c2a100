//! Signal injection modes shared by the detector topologies.

use std::fmt;
use std::str::FromStr;

use differometor_core::SetupError;

/// Where the signal generators of a topology act.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Mode {
    /// Phase modulation of the arm and recycling spaces.
    #[default]
    SpaceModulation,
    /// Amplitude modulation of the input lasers.
    AmplitudeModulation,
    /// Frequency modulation of the input lasers.
    FrequencyModulation,
}

impl Mode {
    pub const NAMES: &'static [&'static str] = &[
        "space_modulation",
        "amplitude_modulation",
        "frequency_modulation",
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Mode::SpaceModulation => "space_modulation",
            Mode::AmplitudeModulation => "amplitude_modulation",
            Mode::FrequencyModulation => "frequency_modulation",
        }
    }
}

impl FromStr for Mode {
    type Err = SetupError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "space_modulation" => Ok(Mode::SpaceModulation),
            "amplitude_modulation" => Ok(Mode::AmplitudeModulation),
            "frequency_modulation" => Ok(Mode::FrequencyModulation),
            _ => Err(SetupError::InvalidEnum {
                field: "mode",
                value: s.to_string(),
                allowed: Mode::NAMES,
            }),
        }
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
