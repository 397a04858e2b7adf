use blasterx_types::{DspFeature, ValueKind, FAMILY_DSP};
use strum::IntoEnumIterator;

#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Feature {
    pub id: u8,
    pub family: u8,
    pub name: &'static str,
    pub kind: ValueKind,
}

impl From<DspFeature> for Feature {
    fn from(feature: DspFeature) -> Self {
        Self {
            id: feature.id(),
            family: feature.family(),
            name: feature.name(),
            kind: feature.value_kind(),
        }
    }
}

pub fn lookup(family: u8, id: u8) -> Option<Feature> {
    match family {
        FAMILY_DSP => DspFeature::from_id(id).map(Feature::from),
        _ => None,
    }
}

/// All known features of a family, ascending by id.
pub fn list(family: u8) -> Vec<Feature> {
    let mut features: Vec<Feature> = match family {
        FAMILY_DSP => DspFeature::iter().map(Feature::from).collect(),
        _ => vec![],
    };
    features.sort_by_key(|feature| feature.id);
    features
}

/// Matches either the display name ("Dialog+") or the variant name
/// ("DialogPlusToggle"), ignoring case.
pub fn find(name: &str) -> Option<DspFeature> {
    DspFeature::iter().find(|feature| {
        feature.name().eq_ignore_ascii_case(name)
            || format!("{:?}", feature).eq_ignore_ascii_case(name)
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lookup_known_and_unknown() {
        let crystalizer = lookup(0x96, 0x07).unwrap();
        assert_eq!(crystalizer.name, "Crystalizer");
        assert_eq!(crystalizer.kind, ValueKind::Toggle);
        assert_eq!(crystalizer.family, 0x96);

        assert_eq!(lookup(0x96, 0x15), None);
        assert_eq!(lookup(0x97, 0x07), None);
    }

    #[test]
    fn list_is_ascending_and_unique() {
        let features = list(0x96);
        assert_eq!(features.len(), 24);
        assert!(features.windows(2).all(|pair| pair[0].id < pair[1].id));
        assert_eq!(features.first().map(|f| f.id), Some(0x00));
        assert_eq!(features.last().map(|f| f.id), Some(0x19));
    }

    #[test]
    fn unknown_family_lists_nothing() {
        assert!(list(0x26).is_empty());
    }

    #[test]
    fn names_match_the_type_display() {
        for feature in DspFeature::iter() {
            assert_eq!(Feature::from(feature).name, feature.to_string());
        }
    }

    #[test]
    fn find_by_either_name() {
        assert_eq!(find("dialog+"), Some(DspFeature::DialogPlusToggle));
        assert_eq!(find("EqPreAmp"), Some(DspFeature::EqPreAmp));
        assert_eq!(find("eq 16khz"), Some(DspFeature::Eq16kHz));
        assert_eq!(find("volume"), None);
    }
}
