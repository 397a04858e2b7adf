#[cfg(feature = "clap")]
use clap::ValueEnum;
use enumset::EnumSetType;
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};
use strum::{Display, EnumCount, EnumIter, IntoEnumIterator, IntoStaticStr};

/// The command family used by every DSP effect on the G6.
pub const FAMILY_DSP: u8 = 0x96;

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum ValueKind {
    /// Stored as a float on the device, but only ever 0.0 or 1.0.
    Toggle,
    Level,
}

/// DSP features in family 0x96, keyed by their on-wire id.
#[repr(u8)]
#[derive(
    Copy, Clone, Debug, Display, EnumIter, EnumCount, IntoStaticStr, PartialEq, Eq, Hash,
)]
#[cfg_attr(feature = "clap", derive(ValueEnum))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum DspFeature {
    #[strum(to_string = "Surround")]
    SurroundToggle = 0x00,
    #[strum(to_string = "Surround Slider")]
    SurroundLevel = 0x01,
    #[strum(to_string = "Dialog+")]
    DialogPlusToggle = 0x02,
    #[strum(to_string = "Dialog+ Slider")]
    DialogPlusLevel = 0x03,
    #[strum(to_string = "Smart Volume")]
    SmartVolToggle = 0x04,
    #[strum(to_string = "Smart Volume Slider")]
    SmartVolLevel = 0x05,
    #[strum(to_string = "Smart Volume Mode")]
    SmartVolMode = 0x06,
    #[strum(to_string = "Crystalizer")]
    CrystalizerToggle = 0x07,
    #[strum(to_string = "Crystalizer Slider")]
    CrystalizerLevel = 0x08,
    #[strum(to_string = "Equalizer")]
    EqToggle = 0x09,
    #[strum(to_string = "EQ Pre-Amp")]
    EqPreAmp = 0x0a,
    #[strum(to_string = "EQ 31Hz")]
    Eq31Hz = 0x0b,
    #[strum(to_string = "EQ 62Hz")]
    Eq62Hz = 0x0c,
    #[strum(to_string = "EQ 125Hz")]
    Eq125Hz = 0x0d,
    #[strum(to_string = "EQ 250Hz")]
    Eq250Hz = 0x0e,
    #[strum(to_string = "EQ 500Hz")]
    Eq500Hz = 0x0f,
    #[strum(to_string = "EQ 1kHz")]
    Eq1kHz = 0x10,
    #[strum(to_string = "EQ 2kHz")]
    Eq2kHz = 0x11,
    #[strum(to_string = "EQ 4kHz")]
    Eq4kHz = 0x12,
    #[strum(to_string = "EQ 8kHz")]
    Eq8kHz = 0x13,
    #[strum(to_string = "EQ 16kHz")]
    Eq16kHz = 0x14,
    #[strum(to_string = "Surround Distance")]
    SurroundDistance = 0x17,
    #[strum(to_string = "Bass")]
    BassToggle = 0x18,
    #[strum(to_string = "Bass Slider")]
    BassLevel = 0x19,
}

impl DspFeature {
    pub fn id(&self) -> u8 {
        *self as u8
    }

    pub fn family(&self) -> u8 {
        FAMILY_DSP
    }

    pub fn name(&self) -> &'static str {
        self.into()
    }

    pub fn from_id(id: u8) -> Option<Self> {
        DspFeature::iter().find(|feature| feature.id() == id)
    }

    pub fn value_kind(&self) -> ValueKind {
        match self {
            DspFeature::SurroundToggle
            | DspFeature::DialogPlusToggle
            | DspFeature::SmartVolToggle
            | DspFeature::CrystalizerToggle
            | DspFeature::EqToggle
            | DspFeature::BassToggle => ValueKind::Toggle,
            _ => ValueKind::Level,
        }
    }

    /// The range the official software offers for a level. The device accepts
    /// anything, so this is only useful for presentation.
    pub fn range(&self) -> Option<(f32, f32)> {
        match self {
            DspFeature::SurroundLevel
            | DspFeature::DialogPlusLevel
            | DspFeature::SmartVolLevel
            | DspFeature::CrystalizerLevel
            | DspFeature::BassLevel => Some((0.0, 100.0)),
            DspFeature::SmartVolMode => Some((0.0, 2.0)),
            DspFeature::EqPreAmp => Some((-6.0, 6.0)),
            DspFeature::Eq31Hz
            | DspFeature::Eq62Hz
            | DspFeature::Eq125Hz
            | DspFeature::Eq250Hz
            | DspFeature::Eq500Hz
            | DspFeature::Eq1kHz
            | DspFeature::Eq2kHz
            | DspFeature::Eq4kHz
            | DspFeature::Eq8kHz
            | DspFeature::Eq16kHz => Some((-12.0, 12.0)),
            DspFeature::SurroundDistance => Some((10.0, 300.0)),
            _ => None,
        }
    }

    pub fn presets(&self) -> Option<&'static [&'static str]> {
        match self {
            DspFeature::SmartVolMode => Some(&["Normal", "Loud", "Night"]),
            _ => None,
        }
    }

    /// The toggle gating this slider, if any.
    pub fn paired_toggle(&self) -> Option<DspFeature> {
        match self {
            DspFeature::SurroundLevel | DspFeature::SurroundDistance => {
                Some(DspFeature::SurroundToggle)
            }
            DspFeature::DialogPlusLevel => Some(DspFeature::DialogPlusToggle),
            DspFeature::SmartVolLevel | DspFeature::SmartVolMode => {
                Some(DspFeature::SmartVolToggle)
            }
            DspFeature::CrystalizerLevel => Some(DspFeature::CrystalizerToggle),
            DspFeature::BassLevel => Some(DspFeature::BassToggle),
            DspFeature::EqPreAmp
            | DspFeature::Eq31Hz
            | DspFeature::Eq62Hz
            | DspFeature::Eq125Hz
            | DspFeature::Eq250Hz
            | DspFeature::Eq500Hz
            | DspFeature::Eq1kHz
            | DspFeature::Eq2kHz
            | DspFeature::Eq4kHz
            | DspFeature::Eq8kHz
            | DspFeature::Eq16kHz => Some(DspFeature::EqToggle),
            _ => None,
        }
    }

    /// Everything that has to be switched on before a change to this feature is
    /// audible, outermost first.
    pub fn requirements(&self) -> Vec<Requirement> {
        let mut requirements = vec![Requirement::Profile(GlobalProfileFlag::SbxMaster)];
        if let Some(toggle) = self.paired_toggle() {
            requirements.push(Requirement::Toggle(toggle));
        }
        requirements
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Requirement {
    Profile(GlobalProfileFlag),
    Toggle(DspFeature),
}

/// Bits of the global profile mask, in bit order.
#[derive(Debug, Display, EnumIter, EnumSetType)]
#[cfg_attr(feature = "clap", derive(ValueEnum))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum GlobalProfileFlag {
    #[strum(to_string = "SBX")]
    SbxMaster,
    #[strum(to_string = "Scout Mode")]
    ScoutMode,
    #[strum(to_string = "Equalizer")]
    Equalizer,
}

impl GlobalProfileFlag {
    /// The group id used when writing this flag. The equalizer bit is only ever
    /// reported, it's switched through the DSP family instead.
    pub fn group_id(&self) -> Option<u8> {
        match self {
            GlobalProfileFlag::SbxMaster => Some(0x01),
            GlobalProfileFlag::ScoutMode => Some(0x02),
            GlobalProfileFlag::Equalizer => None,
        }
    }
}

#[derive(Copy, Clone, Debug, Display, EnumIter, EnumCount, PartialEq, Eq)]
#[cfg_attr(feature = "clap", derive(ValueEnum))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum OutputMode {
    Speakers = 0x02,
    Headphones = 0x04,
}

impl OutputMode {
    pub fn mode(&self) -> u8 {
        *self as u8
    }

    pub fn from_mode(mode: u8) -> Option<Self> {
        OutputMode::iter().find(|output| output.mode() == mode)
    }
}
