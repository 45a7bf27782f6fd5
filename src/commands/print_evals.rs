use std::io::{self, Write};

use anyhow::{Context, Result};
use serde_json::Value;
use tracing::info;

use crate::cli::PrintEvalsArgs;
use crate::model::StoredEvaluation;
use crate::store;

pub fn run(args: PrintEvalsArgs) -> Result<()> {
    let connection = store::open_read_only(&args.db_path)?;
    let evaluations = store::fetch_story_evaluations(&connection, args.story_id, args.limit)?;

    info!(
        story_id = args.story_id,
        returned = evaluations.len(),
        "loaded story evaluations"
    );

    let mut output = io::BufWriter::new(io::stdout().lock());
    write_evaluations(&mut output, args.story_id, &evaluations)?;
    output.flush()?;
    Ok(())
}

fn write_evaluations<W: Write>(
    output: &mut W,
    story_id: i64,
    evaluations: &[StoredEvaluation],
) -> Result<()> {
    if evaluations.is_empty() {
        writeln!(output, "No evaluations found for story {story_id}")?;
        return Ok(());
    }

    for evaluation in evaluations {
        writeln!(
            output,
            "--- eval id {} story {} agent {} model {} ts {}",
            evaluation.id,
            display_optional(evaluation.story_id),
            display_optional(evaluation.agent_id),
            display_optional(evaluation.model_id),
            evaluation.ts.as_deref().unwrap_or("-"),
        )?;

        match evaluation.raw_json.as_deref() {
            None => writeln!(output, "(raw_json is NULL)")?,
            Some(raw) => writeln!(output, "{}", pretty_payload(raw)?)?,
        }
        writeln!(output)?;
    }

    Ok(())
}

fn pretty_payload(raw: &str) -> Result<String> {
    match serde_json::from_str::<Value>(raw) {
        Ok(value) => {
            serde_json::to_string_pretty(&value).context("failed to pretty-print payload json")
        }
        Err(_) => Ok(raw.to_string()),
    }
}

fn display_optional(value: Option<i64>) -> String {
    value.map_or_else(|| "-".to_string(), |value| value.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn render(story_id: i64, evaluations: &[StoredEvaluation]) -> String {
        let mut buffer = Vec::new();
        write_evaluations(&mut buffer, story_id, evaluations).expect("render should succeed");
        String::from_utf8(buffer).expect("output should be utf-8")
    }

    #[test]
    fn write_evaluations_reports_missing_story() {
        assert_eq!(render(121, &[]), "No evaluations found for story 121\n");
    }

    #[test]
    fn write_evaluations_pretty_prints_json_and_keeps_plain_text() {
        let evaluations = vec![
            StoredEvaluation {
                id: 7,
                story_id: Some(121),
                model_id: Some(3),
                agent_id: None,
                ts: Some("2025-03-01 09:30:00".to_string()),
                raw_json: Some(r#"{"role":"assistant","content":"Azione"}"#.to_string()),
            },
            StoredEvaluation {
                id: 8,
                story_id: Some(121),
                model_id: Some(3),
                agent_id: Some(4),
                ts: None,
                raw_json: Some("Azione\n4".to_string()),
            },
            StoredEvaluation {
                id: 9,
                story_id: Some(121),
                model_id: None,
                agent_id: Some(4),
                ts: None,
                raw_json: None,
            },
        ];

        let expected = "\
--- eval id 7 story 121 agent - model 3 ts 2025-03-01 09:30:00
{
  \"content\": \"Azione\",
  \"role\": \"assistant\"
}

--- eval id 8 story 121 agent 4 model 3 ts -
Azione
4

--- eval id 9 story 121 agent 4 model - ts -
(raw_json is NULL)

";
        assert_eq!(render(121, &evaluations), expected);
    }
}
