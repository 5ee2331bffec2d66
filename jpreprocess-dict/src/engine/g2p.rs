//! Grapheme-to-phoneme output assembly.

use serde::Serialize;

use super::feature::NjdFeature;

/// Result of `g2p`: one string, or the individual units.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum G2pOutput {
    Joined(String),
    Units(Vec<String>),
}

impl G2pOutput {
    pub(crate) fn from_units(units: Vec<String>, join: bool, separator: &str) -> Self {
        if join {
            Self::Joined(units.join(separator))
        } else {
            Self::Units(units)
        }
    }

    pub fn as_joined(&self) -> Option<&str> {
        match self {
            Self::Joined(s) => Some(s),
            Self::Units(_) => None,
        }
    }

    pub fn as_units(&self) -> Option<&[String]> {
        match self {
            Self::Joined(_) => None,
            Self::Units(units) => Some(units),
        }
    }
}

/// Kana units, one per feature record.
pub(crate) fn kana_units(features: &[NjdFeature]) -> Vec<String> {
    features.iter().map(NjdFeature::kana).collect()
}

/// The centre phoneme of a full-context label (`p1^p2-p3+p4=p5/A:...`).
pub(crate) fn center_phoneme(label: &str) -> Option<&str> {
    let start = label.find('-')? + 1;
    let len = label[start..].find('+')?;
    Some(&label[start..start + len])
}

/// Centre phonemes of every label except the leading and trailing silence.
pub(crate) fn phoneme_units(labels: &[String]) -> Result<Vec<String>, String> {
    if labels.len() < 2 {
        return Ok(Vec::new());
    }

    labels[1..labels.len() - 1]
        .iter()
        .map(|label| {
            center_phoneme(label)
                .map(str::to_string)
                .ok_or_else(|| format!("malformed full-context label: {}", label))
        })
        .collect()
}
