use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::Axis;

const POLSAR_PARADIGMS: &[&str] = &["all", "ann", "dat", "hgt", "mlc", "stk", "grd", "dem", "kmz"];
const POLSAR_CHANNELS: &[&str] = &["HHHH", "HHHV", "HHVV", "HVVV", "HVHV", "VVVV"];
const POLSAR_CHANNEL_ALIASES: &[&str] = &[
    "ach", "cop", "copl", "crp", "crpl", "pow", "powr", "sig", "sig0", "nrcs",
];
const POLSAR_CO_POL: &[&str] = &["HHHH", "HHVV", "VVVV"];
const POLSAR_CROSS_POL: &[&str] = &["HVHV", "HHHV", "HVVV"];
const POLSAR_POWER: &[&str] = &["HHHH", "HVHV", "VVVV"];

const INSAR_PARADIGMS: &[&str] = &["all", "ann", "rdr", "grd", "kmz"];
const INSAR_TYPES: &[&str] = &["igm", "amp1", "amp2", "int", "unw", "cor", "hgt", "dem"];
const INSAR_CHANNELS: &[&str] = &["HH", "HV", "VV"];

/// UAVSAR product line; each carries its own vocabularies and naming widths.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProductFamily {
    Polsar,
    Insar,
}

impl fmt::Display for ProductFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProductFamily::Polsar => write!(f, "polsar"),
            ProductFamily::Insar => write!(f, "insar"),
        }
    }
}

impl ProductFamily {
    /// Characters kept from the front of the sample stem.
    pub const fn lead_width(self) -> usize {
        match self {
            ProductFamily::Polsar => 34,
            ProductFamily::Insar => 47,
        }
    }

    /// Characters kept from the end of the sample stem.
    pub const fn trail_width(self) -> usize {
        match self {
            ProductFamily::Polsar => 6,
            ProductFamily::Insar => 3,
        }
    }

    pub const fn has_type_axis(self) -> bool {
        matches!(self, ProductFamily::Insar)
    }

    pub const fn max_selection_args(self) -> usize {
        match self {
            ProductFamily::Polsar => 2,
            ProductFamily::Insar => 3,
        }
    }

    /// Tokens whose presence claims a whole argument for `axis`.
    ///
    /// The channel axis has no membership test: it takes any argument the
    /// other axes did not claim.
    pub fn classifying_tokens(self, axis: Axis) -> &'static [&'static str] {
        match (self, axis) {
            (ProductFamily::Polsar, Axis::Paradigm) => POLSAR_PARADIGMS,
            (ProductFamily::Insar, Axis::Paradigm) => INSAR_PARADIGMS,
            (ProductFamily::Insar, Axis::Type) => INSAR_TYPES,
            _ => &[],
        }
    }

    /// Every token the normalizer accepts on `axis`, aliases included.
    pub fn accepted_tokens(self, axis: Axis) -> Vec<&'static str> {
        match (self, axis) {
            (ProductFamily::Polsar, Axis::Channel) => POLSAR_CHANNEL_ALIASES
                .iter()
                .copied()
                .chain(POLSAR_CHANNELS.iter().copied())
                .collect(),
            (ProductFamily::Insar, Axis::Type) => INSAR_TYPES[..7].to_vec(),
            (ProductFamily::Insar, Axis::Channel) => std::iter::once("ach")
                .chain(INSAR_CHANNELS.iter().copied())
                .collect(),
            _ => self.classifying_tokens(axis).to_vec(),
        }
    }

    /// The "everything" token of an axis together with what it stands for.
    pub fn wildcard(self, axis: Axis) -> Option<(&'static str, &'static [&'static str])> {
        match (self, axis) {
            (ProductFamily::Polsar, Axis::Paradigm) => Some(("all", &POLSAR_PARADIGMS[4..])),
            (ProductFamily::Polsar, Axis::Channel) => Some(("ach", POLSAR_CHANNELS)),
            (ProductFamily::Polsar, Axis::Type) => None,
            (ProductFamily::Insar, Axis::Paradigm) => Some(("all", &INSAR_PARADIGMS[1..])),
            (ProductFamily::Insar, Axis::Type) => Some(("igm", &INSAR_TYPES[1..7])),
            (ProductFamily::Insar, Axis::Channel) => Some(("ach", INSAR_CHANNELS)),
        }
    }

    /// Maps one token onto the canonical vocabulary entries it selects.
    /// An empty slice means the token is not valid on this axis.
    pub fn resolve(self, axis: Axis, token: &str) -> &'static [&'static str] {
        match (self, axis) {
            (ProductFamily::Polsar, Axis::Paradigm) => single(&POLSAR_PARADIGMS[1..], token),
            (ProductFamily::Polsar, Axis::Type) => &[],
            (ProductFamily::Polsar, Axis::Channel) => match token {
                "cop" | "copl" => POLSAR_CO_POL,
                "crp" | "crpl" => POLSAR_CROSS_POL,
                "pow" | "powr" | "sig" | "sig0" | "nrcs" => POLSAR_POWER,
                "ach" => POLSAR_CHANNELS,
                other => single_upper(POLSAR_CHANNELS, other),
            },
            (ProductFamily::Insar, Axis::Paradigm) => single(&INSAR_PARADIGMS[1..], token),
            // `dem` claims an argument for the type axis but selects nothing.
            (ProductFamily::Insar, Axis::Type) => single(&INSAR_TYPES[1..7], token),
            (ProductFamily::Insar, Axis::Channel) => match token {
                "ach" => INSAR_CHANNELS,
                other => single_upper(INSAR_CHANNELS, other),
            },
        }
    }

    /// Paradigm used when the user names none, derived from the sample extension.
    pub fn default_paradigm(self, extension: &str) -> String {
        match self {
            ProductFamily::Polsar => extension.trim().to_string(),
            ProductFamily::Insar => match extension.trim() {
                "ann" => "ann".to_string(),
                "grd" => "grd".to_string(),
                "kmz" => "kmz".to_string(),
                _ => "rdr".to_string(),
            },
        }
    }

    pub fn default_types(self) -> Vec<String> {
        match self {
            ProductFamily::Polsar => Vec::new(),
            ProductFamily::Insar => vec!["igm".to_string()],
        }
    }

    pub fn default_channels(self) -> Vec<String> {
        match self {
            ProductFamily::Polsar => vec!["ach".to_string()],
            ProductFamily::Insar => vec!["hh".to_string()],
        }
    }

    /// Whether requesting `paradigm` pulls in the annotation file.
    pub fn paradigm_carries_annotation(self, paradigm: &str) -> bool {
        match self {
            ProductFamily::Polsar => paradigm != "kmz",
            ProductFamily::Insar => true,
        }
    }
}

fn single(vocabulary: &'static [&'static str], token: &str) -> &'static [&'static str] {
    vocabulary
        .iter()
        .position(|entry| *entry == token)
        .map(|idx| &vocabulary[idx..=idx])
        .unwrap_or(&[])
}

fn single_upper(vocabulary: &'static [&'static str], token: &str) -> &'static [&'static str] {
    let is_lower = token.chars().all(|ch| ch.is_ascii_lowercase());
    let is_upper = token.chars().all(|ch| ch.is_ascii_uppercase());
    if !is_lower && !is_upper {
        return &[];
    }
    single(vocabulary, &token.to_ascii_uppercase())
}

#[cfg(test)]
mod tests {
    use super::*;

    const FAMILIES: [ProductFamily; 2] = [ProductFamily::Polsar, ProductFamily::Insar];
    const AXES: [Axis; 3] = [Axis::Paradigm, Axis::Type, Axis::Channel];

    #[test]
    fn vocabularies_are_pairwise_disjoint() {
        for family in FAMILIES {
            for (i, left) in AXES.iter().enumerate() {
                for right in &AXES[i + 1..] {
                    let left_tokens = family.accepted_tokens(*left);
                    for token in family.accepted_tokens(*right) {
                        assert!(
                            !left_tokens.contains(&token),
                            "{family}: token {token} is on both {left} and {right}"
                        );
                    }
                }
            }
        }
    }

    #[test]
    fn slice_widths() {
        assert_eq!(ProductFamily::Polsar.lead_width(), 34);
        assert_eq!(ProductFamily::Polsar.trail_width(), 6);
        assert_eq!(ProductFamily::Insar.lead_width(), 47);
        assert_eq!(ProductFamily::Insar.trail_width(), 3);
    }

    #[test]
    fn resolve_polsar_channels() {
        let family = ProductFamily::Polsar;
        assert_eq!(family.resolve(Axis::Channel, "hhvv"), ["HHVV"]);
        assert_eq!(family.resolve(Axis::Channel, "HVHV"), ["HVHV"]);
        assert!(family.resolve(Axis::Channel, "HhHh").is_empty());
        assert_eq!(
            family.resolve(Axis::Channel, "crpl"),
            ["HVHV", "HHHV", "HVVV"]
        );
    }

    #[test]
    fn wildcard_never_resolves_to_itself() {
        for family in FAMILIES {
            for axis in AXES {
                if let Some((token, expansion)) = family.wildcard(axis) {
                    assert!(!expansion.contains(&token));
                }
            }
        }
    }

    #[test]
    fn insar_default_paradigm_from_extension() {
        let family = ProductFamily::Insar;
        assert_eq!(family.default_paradigm("grd"), "grd");
        assert_eq!(family.default_paradigm("int"), "rdr");
        assert_eq!(family.default_paradigm("ann"), "ann");
    }
}
