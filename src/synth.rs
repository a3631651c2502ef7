use serde::Serialize;

use crate::dedup::dedup_stable;
use crate::domain::ProductFamily;
use crate::options::SelectionSet;
use crate::sample::SampleReference;

/// Ordered, repeat-free list of sibling filenames for one sample.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TargetList {
    pub url_lead: String,
    pub filenames: Vec<String>,
}

impl TargetList {
    pub fn build(sample: &SampleReference, selection: &SelectionSet) -> Self {
        Self {
            url_lead: sample.url_lead(),
            filenames: dedup_stable(synthesize(sample, selection)),
        }
    }

    pub fn urls(&self) -> impl Iterator<Item = String> + '_ {
        self.filenames
            .iter()
            .map(move |name| format!("{}{name}", self.url_lead))
    }

    pub fn len(&self) -> usize {
        self.filenames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.filenames.is_empty()
    }
}

/// Filenames accumulated so far plus whether the annotation file is already in.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Synthesis {
    pub filenames: Vec<String>,
    pub annotated: bool,
}

/// Generates every target filename, paradigm by paradigm, without removing repeats.
pub fn synthesize(sample: &SampleReference, selection: &SelectionSet) -> Vec<String> {
    selection
        .paradigms
        .iter()
        .fold(Synthesis::default(), |acc, paradigm| {
            step(acc, sample, selection, paradigm)
        })
        .filenames
}

/// Adds the files one paradigm contributes, then the annotation file if this
/// is the first paradigm that carries one.
pub fn step(
    mut acc: Synthesis,
    sample: &SampleReference,
    selection: &SelectionSet,
    paradigm: &str,
) -> Synthesis {
    let family = selection.family;
    let lead = sample.lead(family.lead_width());
    let trail = sample.trail(family.trail_width());

    match family {
        ProductFamily::Polsar => {
            acc.filenames
                .extend(polsar_files(lead, trail, paradigm, &selection.channels));
        }
        ProductFamily::Insar => {
            acc.filenames.extend(insar_files(
                lead,
                trail,
                paradigm,
                &selection.types,
                &selection.channels,
            ));
        }
    }

    if !acc.annotated && family.paradigm_carries_annotation(paradigm) {
        acc.filenames
            .push(annotation_file(family, lead, trail, &selection.channels));
        acc.annotated = true;
    }
    acc
}

fn polsar_files(lead: &str, trail: &str, paradigm: &str, channels: &[String]) -> Vec<String> {
    match paradigm {
        "mlc" | "grd" => channels
            .iter()
            .map(|chan| format!("{lead}{chan}{trail}.{paradigm}"))
            .collect(),
        "dat" | "hgt" | "kmz" => vec![format!("{lead}{trail}.{paradigm}")],
        "stk" => vec![format!("{lead}{trail}.dat")],
        "dem" => vec![format!("{lead}{trail}.hgt")],
        _ => Vec::new(),
    }
}

fn insar_files(
    lead: &str,
    trail: &str,
    paradigm: &str,
    types: &[String],
    channels: &[String],
) -> Vec<String> {
    if paradigm == "ann" {
        return Vec::new();
    }
    // slant-range products carry no paradigm suffix
    let suffix = match paradigm {
        "rdr" => String::new(),
        other => format!(".{other}"),
    };
    channels
        .iter()
        .flat_map(|chan| types.iter().map(move |typ| (chan, typ)))
        .map(|(chan, typ)| format!("{lead}{chan}{trail}.{typ}{suffix}"))
        .collect()
}

fn annotation_file(family: ProductFamily, lead: &str, trail: &str, channels: &[String]) -> String {
    match family {
        ProductFamily::Polsar => format!("{lead}{trail}.ann"),
        // InSAR annotations are per polarization; the last selected channel names it.
        ProductFamily::Insar => {
            let chan = channels.last().map(String::as_str).unwrap_or_default();
            format!("{lead}{chan}{trail}.ann")
        }
    }
}
