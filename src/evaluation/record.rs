use std::fmt;

use serde::ser::{Serialize, SerializeMap, Serializer};

#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct SectionScore {
    pub score: u8,
    pub explanation: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EvaluationRecord {
    sections: Vec<(String, SectionScore)>,
}

impl EvaluationRecord {
    pub(crate) fn new(sections: Vec<(String, SectionScore)>) -> Self {
        Self { sections }
    }

    pub fn get(&self, heading: &str) -> Option<&SectionScore> {
        self.sections
            .iter()
            .find(|(label, _)| label == heading)
            .map(|(_, section)| section)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &SectionScore)> {
        self.sections
            .iter()
            .map(|(label, section)| (label.as_str(), section))
    }

    pub fn len(&self) -> usize {
        self.sections.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sections.is_empty()
    }
}

impl Serialize for EvaluationRecord {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.sections.len()))?;
        for (label, section) in &self.sections {
            map.serialize_entry(label, section)?;
        }
        map.end()
    }
}

/// Why an evaluation could not be turned into an [`EvaluationRecord`].
///
/// The `Display` form is the reason string stored in reports.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParseFailure {
    Empty,
    MissingSections(Vec<String>),
    MissingScore(String),
}

impl ParseFailure {
    pub fn reason(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for ParseFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Empty => write!(f, "empty"),
            Self::MissingSections(labels) => write!(f, "missing_sections:{}", labels.join(",")),
            Self::MissingScore(label) => write!(f, "missing_score_for_{label}"),
        }
    }
}

impl std::error::Error for ParseFailure {}
