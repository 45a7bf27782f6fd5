use std::io::{self, Write};

use anyhow::Result;
use tracing::info;

use crate::cli::LogsArgs;
use crate::model::{LogEntry, LogFilter};
use crate::store;
use crate::util::char_prefix;

const SCOPE_MAX_CHARS: usize = 40;
const FAIL_REASON_MAX_CHARS: usize = 70;

pub fn run(args: LogsArgs) -> Result<()> {
    let filter = LogFilter {
        only_model: args.only_model,
        categories: args.categories,
        agents: args.agents,
        contains: args.contains,
        level: args.level,
        thread_id: args.thread_id,
    };

    let connection = store::open_read_only(&args.db_path)?;
    let entries = store::fetch_recent_logs(&connection, &filter, args.limit)?;

    info!(
        path = %args.db_path.display(),
        returned = entries.len(),
        only_model = filter.only_model,
        "loaded recent log rows"
    );

    let mut output = io::BufWriter::new(io::stdout().lock());
    write_logs(&mut output, &entries)?;
    output.flush()?;
    Ok(())
}

fn write_logs<W: Write>(output: &mut W, entries: &[LogEntry]) -> Result<()> {
    writeln!(
        output,
        "Id | Ts | ThreadId | Scope | Category | Agent | Model | Result | Examined | FailReason | ChatText | Message"
    )?;

    for entry in entries {
        writeln!(
            output,
            "{} | {} | {} | {} | {} | {} | {} | {} | {} | {} | {} | {}",
            entry.id,
            entry.ts.as_deref().unwrap_or("-"),
            entry
                .thread_id
                .map_or_else(|| "-".to_string(), |id| id.to_string()),
            shorten(entry.thread_scope.as_deref(), SCOPE_MAX_CHARS),
            entry.category.as_deref().unwrap_or("-"),
            entry.agent_name.as_deref().unwrap_or("-"),
            entry.model_name.as_deref().unwrap_or("-"),
            entry.result.as_deref().unwrap_or("-"),
            entry.examined.as_deref().unwrap_or("-"),
            shorten(entry.fail_reason.as_deref(), FAIL_REASON_MAX_CHARS),
            single_line(entry.chat_text.as_deref()),
            single_line(entry.message.as_deref()),
        )?;
    }

    Ok(())
}

fn shorten(value: Option<&str>, max_chars: usize) -> String {
    let text = value.unwrap_or_default();
    if text.chars().count() > max_chars {
        format!("{}…", char_prefix(text, max_chars))
    } else {
        text.to_string()
    }
}

fn single_line(value: Option<&str>) -> String {
    value.unwrap_or_default().replace(['\n', '\r'], " ")
}
