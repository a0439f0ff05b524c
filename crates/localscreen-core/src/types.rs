//! Domain types shared by the normalizer, the oracle and the host.

use serde::de::{MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

/// Binary decision for one unit of text.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Verdict {
    Bullying,
    NotBullying,
}

/// Raw oracle output for one input: the bully probability and one
/// probability per configured type label, in label order.
#[derive(Debug, Clone, PartialEq)]
pub struct RawScores {
    pub p_bully: f32,
    pub type_probs: Vec<f32>,
}

/// Per-type probabilities keyed by label.
///
/// Serialized as a JSON object whose keys keep the configured label order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TypeProbs(pub Vec<(String, f32)>);

impl TypeProbs {
    pub fn get(&self, label: &str) -> Option<f32> {
        self.0.iter().find(|(l, _)| l == label).map(|(_, p)| *p)
    }

    pub fn sum(&self) -> f32 {
        self.0.iter().map(|(_, p)| p).sum()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl Serialize for TypeProbs {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for (label, p) in &self.0 {
            map.serialize_entry(label, p)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for TypeProbs {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct OrderedProbs;

        impl<'de> Visitor<'de> for OrderedProbs {
            type Value = TypeProbs;

            fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
                f.write_str("a map of type label to probability")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<TypeProbs, A::Error> {
                let mut entries = Vec::with_capacity(access.size_hint().unwrap_or(5));
                while let Some((label, p)) = access.next_entry::<String, f32>()? {
                    entries.push((label, p));
                }
                Ok(TypeProbs(entries))
            }
        }

        deserializer.deserialize_map(OrderedProbs)
    }
}

/// Thresholded oracle result for one unit of text.
///
/// `kind` and `type_probs` are `Some` exactly when `binary` is
/// [`Verdict::Bullying`]; otherwise they serialize as `null`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassificationResult {
    pub binary: Verdict,
    pub p_bully: f32,
    #[serde(rename = "type")]
    pub kind: Option<String>,
    pub type_probs: Option<TypeProbs>,
}

impl ClassificationResult {
    pub fn is_bullying(&self) -> bool {
        self.binary == Verdict::Bullying
    }
}

/// A contiguous, trimmed scan unit of a document.
///
/// `order` is the chunk's position among the chunks produced for the
/// document, so sorting by it restores document order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Chunk {
    pub text: String,
    pub order: usize,
}

/// A chunk judged harmful, as reported back to the caller.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Hit {
    pub snippet: String,
    pub p_bully: f32,
    #[serde(rename = "type")]
    pub kind: String,
    pub type_probs: TypeProbs,
}

/// Ranked findings for one scanned document.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ScanReport {
    pub hits: Vec<Hit>,
    pub total_chunks: usize,
}
