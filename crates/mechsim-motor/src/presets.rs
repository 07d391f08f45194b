//! Nameplate data for commonly used competition motors.

use core::fmt;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::MotorSpec;

/// A motor from the built-in catalogue.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MotorPreset {
    /// CIM.
    Cim,
    /// MiniCIM.
    MiniCim,
    /// BAG.
    Bag,
    /// 775pro.
    Pro775,
    /// AndyMark 9015.
    Am9015,
    /// NeveRest.
    NeveRest,
    /// RS775-125.
    Rs775_125,
    /// BaneBots RS775 18V.
    BanebotsRs775,
    /// BaneBots RS550.
    BanebotsRs550,
}

impl MotorPreset {
    /// Every preset, in catalogue order.
    pub const ALL: [MotorPreset; 9] = [
        MotorPreset::Cim,
        MotorPreset::MiniCim,
        MotorPreset::Bag,
        MotorPreset::Pro775,
        MotorPreset::Am9015,
        MotorPreset::NeveRest,
        MotorPreset::Rs775_125,
        MotorPreset::BanebotsRs775,
        MotorPreset::BanebotsRs550,
    ];

    /// Display name as printed on the catalogue.
    pub const fn name(self) -> &'static str {
        match self {
            MotorPreset::Cim => "CIM",
            MotorPreset::MiniCim => "MiniCIM",
            MotorPreset::Bag => "BAG",
            MotorPreset::Pro775 => "775pro",
            MotorPreset::Am9015 => "AM 9015",
            MotorPreset::NeveRest => "NeveRest",
            MotorPreset::Rs775_125 => "RS775-125",
            MotorPreset::BanebotsRs775 => "Banebot RS775-18V",
            MotorPreset::BanebotsRs550 => "Banebots RS550",
        }
    }

    /// Nameplate data, all rated at 12 V.
    pub const fn spec(self) -> MotorSpec {
        match self {
            MotorPreset::Cim => MotorSpec::new(12.0, 5330.0, 2.41, 131.0, 2.7),
            MotorPreset::MiniCim => MotorSpec::new(12.0, 5840.0, 1.41, 89.0, 3.0),
            MotorPreset::Bag => MotorSpec::new(12.0, 13180.0, 0.43, 53.0, 1.8),
            MotorPreset::Pro775 => MotorSpec::new(12.0, 18730.0, 0.71, 134.0, 0.7),
            MotorPreset::Am9015 => MotorSpec::new(12.0, 14270.0, 0.36, 71.0, 3.7),
            MotorPreset::NeveRest => MotorSpec::new(12.0, 5480.0, 0.17, 10.0, 0.4),
            MotorPreset::Rs775_125 => MotorSpec::new(12.0, 5800.0, 0.28, 18.0, 1.6),
            MotorPreset::BanebotsRs775 => MotorSpec::new(12.0, 13050.0, 0.72, 97.0, 2.7),
            MotorPreset::BanebotsRs550 => MotorSpec::new(12.0, 19000.0, 0.38, 84.0, 0.4),
        }
    }

    /// Look a preset up by its catalogue name, ignoring ASCII case.
    pub fn from_name(name: &str) -> Option<Self> {
        let name = name.trim();
        Self::ALL
            .into_iter()
            .find(|preset| preset.name().eq_ignore_ascii_case(name))
    }
}

impl fmt::Display for MotorPreset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::MotorModel;

    #[test]
    fn test_lookup_by_name() {
        assert_eq!(MotorPreset::from_name("CIM"), Some(MotorPreset::Cim));
        assert_eq!(MotorPreset::from_name("minicim"), Some(MotorPreset::MiniCim));
        assert_eq!(MotorPreset::from_name(" am 9015 "), Some(MotorPreset::Am9015));
        assert_eq!(MotorPreset::from_name("Falcon"), None);
    }

    #[test]
    fn test_every_preset_derives() {
        for preset in MotorPreset::ALL {
            let model = MotorModel::derive(preset.spec(), 2);
            assert!(model.is_ok(), "{} failed to derive", preset);
        }
    }

    #[test]
    fn test_names_round_trip() {
        for preset in MotorPreset::ALL {
            assert_eq!(MotorPreset::from_name(preset.name()), Some(preset));
        }
    }
}
