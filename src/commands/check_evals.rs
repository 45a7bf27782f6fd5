use std::path::Path;

use anyhow::Result;
use tracing::{debug, info, warn};

use crate::cli::CheckEvalsArgs;
use crate::evaluation::{EvaluationParser, unwrap_payload};
use crate::model::{EvalParseReport, EvalReportMeta, EvalReportRow, ParseStats, StoredEvaluation};
use crate::store;
use crate::util::{char_prefix, now_utc_string, write_json_pretty};

pub fn run(args: CheckEvalsArgs) -> Result<()> {
    let parser = EvaluationParser::new(args.headings.iter().cloned())?;
    let connection = store::open_read_only(&args.db_path)?;

    info!(
        db_path = %args.db_path.display(),
        limit = args.limit,
        headings = parser.headings().count(),
        "checking stored evaluations"
    );

    let evaluations = store::fetch_recent_evaluations(&connection, args.limit)?;
    let report = build_report(&parser, &evaluations, &args.db_path, args.snippet_chars);
    let stats = report.meta.stats;

    info!(
        checked = stats.checked,
        parsed = stats.parsed,
        failed = stats.failed,
        "evaluation parse check complete"
    );

    if args.dry_run {
        info!("dry-run: report not written");
        return Ok(());
    }

    write_json_pretty(&args.report_path, &report)?;
    info!(path = %args.report_path.display(), "wrote evaluation parse report");

    Ok(())
}

pub fn build_report(
    parser: &EvaluationParser,
    evaluations: &[StoredEvaluation],
    db_path: &Path,
    snippet_chars: usize,
) -> EvalParseReport {
    let mut stats = ParseStats::default();
    let mut rows = Vec::with_capacity(evaluations.len());

    for evaluation in evaluations {
        let row = check_evaluation(parser, evaluation, snippet_chars);
        stats.checked += 1;
        if row.ok {
            stats.parsed += 1;
        } else {
            stats.failed += 1;
        }
        rows.push(row);
    }

    EvalParseReport {
        meta: EvalReportMeta {
            generated_at: now_utc_string(),
            db_path: db_path.display().to_string(),
            headings: parser.headings().map(ToOwned::to_owned).collect(),
            stats,
        },
        rows,
    }
}

fn check_evaluation(
    parser: &EvaluationParser,
    evaluation: &StoredEvaluation,
    snippet_chars: usize,
) -> EvalReportRow {
    let raw = evaluation.raw_json.as_deref().unwrap_or_default();
    let mut row = EvalReportRow {
        id: evaluation.id,
        story_id: evaluation.story_id,
        model_id: evaluation.model_id,
        agent_id: evaluation.agent_id,
        ts: evaluation.ts.clone(),
        ok: false,
        parsed: None,
        error: None,
        snippet: None,
    };

    match parser.parse_payload(raw) {
        Ok(record) => {
            debug!(id = evaluation.id, sections = record.len(), "evaluation parsed");
            row.ok = true;
            row.parsed = Some(record);
        }
        Err(failure) => {
            warn!(
                id = evaluation.id,
                story_id = evaluation.story_id.unwrap_or_default(),
                reason = %failure,
                "evaluation failed to parse"
            );
            let unwrapped = unwrap_payload(raw);
            row.error = Some(failure.reason());
            row.snippet = Some(char_prefix(&unwrapped, snippet_chars).to_string());
        }
    }

    row
}
