use std::collections::HashSet;

use anyhow::{Context, Result, bail};
use regex::{Regex, RegexBuilder};

use super::envelope::unwrap_payload;
use super::normalize::normalize_text;
use super::record::{EvaluationRecord, ParseFailure, SectionScore};

pub const DEFAULT_HEADINGS: [&str; 4] = [
    "Coerenza narrativa",
    "Originalità",
    "Impatto emotivo",
    "Azione",
];

#[derive(Debug)]
struct RubricHeading {
    label: String,
    pattern: Regex,
}

/// Extracts one score per rubric heading from normalized evaluation text.
///
/// Headings are located independently, so their order in the source text does
/// not matter. A section runs from the end of its heading to the nearest later
/// occurrence of any other heading.
#[derive(Debug)]
pub struct EvaluationParser {
    headings: Vec<RubricHeading>,
    score_line: Regex,
}

impl EvaluationParser {
    pub fn new<I, S>(headings: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut seen = HashSet::new();
        let mut compiled = Vec::new();

        for heading in headings {
            let label = heading.into().trim().to_string();
            if label.is_empty() {
                bail!("rubric heading labels must not be blank");
            }
            if !seen.insert(label.to_lowercase()) {
                bail!("duplicate rubric heading: {label}");
            }

            let pattern = RegexBuilder::new(&regex::escape(&label))
                .case_insensitive(true)
                .build()
                .with_context(|| format!("failed to compile heading pattern: {label}"))?;
            compiled.push(RubricHeading { label, pattern });
        }

        if compiled.is_empty() {
            bail!("at least one rubric heading is required");
        }

        let score_line =
            Regex::new(r"^\s*([1-5])\s*$").context("failed to compile score line regex")?;

        Ok(Self {
            headings: compiled,
            score_line,
        })
    }

    pub fn headings(&self) -> impl Iterator<Item = &str> {
        self.headings.iter().map(|heading| heading.label.as_str())
    }

    pub fn parse_payload(&self, raw: &str) -> Result<EvaluationRecord, ParseFailure> {
        let unwrapped = unwrap_payload(raw);
        let normalized = normalize_text(&unwrapped);
        self.extract(&normalized)
    }

    pub fn extract(&self, text: &str) -> Result<EvaluationRecord, ParseFailure> {
        if text.trim().is_empty() {
            return Err(ParseFailure::Empty);
        }

        let mut sections = Vec::with_capacity(self.headings.len());
        let mut missing = Vec::new();
        let mut first_unscored = None;

        for (index, heading) in self.headings.iter().enumerate() {
            let Some(found) = heading.pattern.find(text) else {
                missing.push(heading.label.clone());
                continue;
            };

            let section_end = self.section_end(text, index, found.end());
            match self.score_section(&text[found.end()..section_end]) {
                Some(section) => sections.push((heading.label.clone(), section)),
                None => {
                    first_unscored.get_or_insert_with(|| heading.label.clone());
                }
            }
        }

        if !missing.is_empty() {
            return Err(ParseFailure::MissingSections(missing));
        }
        if let Some(label) = first_unscored {
            return Err(ParseFailure::MissingScore(label));
        }

        Ok(EvaluationRecord::new(sections))
    }

    fn section_end(&self, text: &str, own_index: usize, heading_end: usize) -> usize {
        self.headings
            .iter()
            .enumerate()
            .filter(|(index, _)| *index != own_index)
            .filter_map(|(_, other)| other.pattern.find_at(text, heading_end))
            .map(|found| found.start())
            .min()
            .unwrap_or(text.len())
    }

    fn score_section(&self, section: &str) -> Option<SectionScore> {
        let lines = section
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .collect::<Vec<&str>>();

        lines.iter().enumerate().find_map(|(index, line)| {
            let score = self
                .score_line
                .captures(line)?
                .get(1)?
                .as_str()
                .parse::<u8>()
                .ok()?;
            let explanation = lines[index + 1..].join(" ").trim().to_string();
            Some(SectionScore { score, explanation })
        })
    }
}
