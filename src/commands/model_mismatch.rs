use std::io::{self, Write};

use anyhow::Result;
use tracing::info;

use crate::cli::ModelMismatchArgs;
use crate::model::ModelMismatch;
use crate::store;

pub fn run(args: ModelMismatchArgs) -> Result<()> {
    let connection = store::open_read_only(&args.db_path)?;
    let (story_count, mismatches) = store::fetch_model_mismatches(&connection)?;

    info!(
        stories = story_count,
        mismatches = mismatches.len(),
        "compared story and agent models"
    );

    let mut output = io::BufWriter::new(io::stdout().lock());
    write_summary(&mut output, story_count, &mismatches, args.sample)?;
    output.flush()?;
    Ok(())
}

fn write_summary<W: Write>(
    output: &mut W,
    story_count: usize,
    mismatches: &[ModelMismatch],
    sample: usize,
) -> Result<()> {
    writeln!(output, "Total stories: {story_count}")?;
    writeln!(
        output,
        "Mismatches (story.model_id != agent.model_id): {}",
        mismatches.len()
    )?;

    if mismatches.is_empty() || sample == 0 {
        return Ok(());
    }

    writeln!(output)?;
    writeln!(output, "Sample mismatches:")?;
    for mismatch in mismatches.iter().take(sample) {
        writeln!(
            output,
            "story_id={}, story_model_id={} ({}), agent_id={}, agent_model_id={} ({}), agent_name={}",
            mismatch.story_id,
            mismatch
                .story_model_id
                .map_or_else(|| "-".to_string(), |id| id.to_string()),
            mismatch.story_model_name.as_deref().unwrap_or("-"),
            mismatch.agent_id,
            mismatch.agent_model_id,
            mismatch.agent_model_name.as_deref().unwrap_or("-"),
            mismatch.agent_name.as_deref().unwrap_or("-"),
        )?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mismatch(story_id: i64) -> ModelMismatch {
        ModelMismatch {
            story_id,
            story_model_id: Some(1),
            story_model_name: Some("qwen".to_string()),
            agent_id: 2,
            agent_model_id: 3,
            agent_model_name: None,
            agent_name: Some("critic".to_string()),
        }
    }

    #[test]
    fn write_summary_limits_sample_rows() {
        let mismatches = vec![mismatch(10), mismatch(11), mismatch(12)];
        let mut buffer = Vec::new();
        write_summary(&mut buffer, 40, &mismatches, 2).expect("render should succeed");

        let rendered = String::from_utf8(buffer).expect("utf-8");
        assert_eq!(
            rendered,
            "Total stories: 40\n\
             Mismatches (story.model_id != agent.model_id): 3\n\
             \n\
             Sample mismatches:\n\
             story_id=10, story_model_id=1 (qwen), agent_id=2, agent_model_id=3 (-), agent_name=critic\n\
             story_id=11, story_model_id=1 (qwen), agent_id=2, agent_model_id=3 (-), agent_name=critic\n"
        );
    }

    #[test]
    fn write_summary_omits_sample_section_without_mismatches() {
        let mut buffer = Vec::new();
        write_summary(&mut buffer, 5, &[], 50).expect("render should succeed");

        let rendered = String::from_utf8(buffer).expect("utf-8");
        assert_eq!(
            rendered,
            "Total stories: 5\nMismatches (story.model_id != agent.model_id): 0\n"
        );
    }
}
