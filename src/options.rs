use serde::Serialize;
use tracing::debug;

use crate::dedup::dedup_stable;
use crate::domain::ProductFamily;
use crate::error::{Axis, FetchError};

/// Axes are tried in this order; the first one claiming any token of an
/// argument takes the whole argument.
pub const AXIS_PRIORITY: [Axis; 3] = [Axis::Paradigm, Axis::Type, Axis::Channel];

/// Validated selections for one invocation. Every entry belongs to its
/// axis vocabulary and each axis is free of repeats.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SelectionSet {
    pub family: ProductFamily,
    pub paradigms: Vec<String>,
    pub types: Vec<String>,
    pub channels: Vec<String>,
}

impl SelectionSet {
    /// Builds the selection from the raw arguments that follow the sample URL.
    ///
    /// `extension` is the sample's file extension and seeds the default paradigm.
    pub fn normalize(
        family: ProductFamily,
        extension: &str,
        args: &[String],
    ) -> Result<Self, FetchError> {
        let mut paradigms = vec![family.default_paradigm(extension)];
        let mut types = family.default_types();
        let mut channels = family.default_channels();

        for arg in args {
            let tokens: Vec<String> = arg.split(',').map(|token| token.to_string()).collect();
            match classify(family, &tokens) {
                Axis::Paradigm => paradigms = tokens,
                Axis::Type => types = tokens,
                Axis::Channel => channels = tokens,
            }
        }

        let paradigms = resolve_axis(family, Axis::Paradigm, &paradigms)?;
        let types = if family.has_type_axis() {
            resolve_axis(family, Axis::Type, &types)?
        } else {
            Vec::new()
        };
        let channels = resolve_axis(family, Axis::Channel, &channels)?;

        Ok(Self {
            family,
            paradigms,
            types,
            channels,
        })
    }
}

/// Decides which axis an argument belongs to.
pub fn classify(family: ProductFamily, tokens: &[String]) -> Axis {
    AXIS_PRIORITY
        .into_iter()
        .find(|axis| {
            let vocabulary = family.classifying_tokens(*axis);
            tokens.iter().any(|token| vocabulary.contains(&token.as_str()))
        })
        .unwrap_or(Axis::Channel)
}

fn resolve_axis(
    family: ProductFamily,
    axis: Axis,
    tokens: &[String],
) -> Result<Vec<String>, FetchError> {
    let expanded: Vec<&str> = match family.wildcard(axis) {
        Some((wildcard, everything)) if tokens.iter().any(|token| token == wildcard) => {
            everything.to_vec()
        }
        _ => tokens.iter().map(String::as_str).collect(),
    };

    let mut accepted = Vec::new();
    for token in expanded {
        let resolved = family.resolve(axis, token);
        if resolved.is_empty() {
            debug!(%axis, token, "dropping unrecognized token");
        }
        accepted.extend(resolved.iter().map(|entry| entry.to_string()));
    }

    if accepted.is_empty() {
        return Err(FetchError::InvalidSelection {
            axis,
            tokens: tokens.to_vec(),
        });
    }
    Ok(dedup_stable(accepted))
}
