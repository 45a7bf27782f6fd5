use std::path::Path;

use anyhow::{Context, Result, bail};
use rusqlite::types::Value as SqlValue;
use rusqlite::{Connection, OpenFlags, Row, params, params_from_iter};

use crate::model::{ColumnInfo, LogEntry, LogFilter, ModelMismatch, StoredEvaluation};

const EVALUATIONS_TABLE: &str = "stories_evaluations";
const TIMESTAMP_COLUMNS: [&str; 2] = ["ts", "timestamp"];
const MODEL_TRAFFIC_CATEGORIES: [&str; 4] =
    ["ModelCompletion", "ModelResponse", "ModelRequest", "ModelPrompt"];

pub fn open_read_only(db_path: &Path) -> Result<Connection> {
    if !db_path.exists() {
        bail!("database not found: {}", db_path.display());
    }

    Connection::open_with_flags(
        db_path,
        OpenFlags::SQLITE_OPEN_READ_ONLY | OpenFlags::SQLITE_OPEN_NO_MUTEX,
    )
    .with_context(|| format!("failed to open database read-only: {}", db_path.display()))
}

pub fn fetch_recent_evaluations(
    connection: &Connection,
    limit: usize,
) -> Result<Vec<StoredEvaluation>> {
    let ts_column = resolve_timestamp_column(connection)?;
    let sql = format!(
        "
        SELECT id, story_id, model_id, agent_id, CAST({ts_column} AS TEXT), raw_json
        FROM {EVALUATIONS_TABLE}
        WHERE raw_json IS NOT NULL
        ORDER BY {ts_column} DESC
        LIMIT ?1
        "
    );

    let mut statement = connection
        .prepare(&sql)
        .context("failed to prepare recent evaluations query")?;
    let rows = statement
        .query_map(params![sql_limit(limit)?], stored_evaluation_from_row)?
        .collect::<rusqlite::Result<Vec<StoredEvaluation>>>()
        .context("failed to read recent evaluations")?;

    Ok(rows)
}

pub fn fetch_story_evaluations(
    connection: &Connection,
    story_id: i64,
    limit: usize,
) -> Result<Vec<StoredEvaluation>> {
    let ts_column = resolve_timestamp_column(connection)?;
    let sql = format!(
        "
        SELECT id, story_id, model_id, agent_id, CAST({ts_column} AS TEXT), raw_json
        FROM {EVALUATIONS_TABLE}
        WHERE story_id = ?1
        ORDER BY {ts_column} DESC
        LIMIT ?2
        "
    );

    let mut statement = connection
        .prepare(&sql)
        .context("failed to prepare story evaluations query")?;
    let rows = statement
        .query_map(
            params![story_id, sql_limit(limit)?],
            stored_evaluation_from_row,
        )?
        .collect::<rusqlite::Result<Vec<StoredEvaluation>>>()
        .with_context(|| format!("failed to read evaluations for story {story_id}"))?;

    Ok(rows)
}

fn sql_limit(limit: usize) -> Result<i64> {
    i64::try_from(limit).with_context(|| format!("limit out of range for SQLite: {limit}"))
}

fn stored_evaluation_from_row(row: &Row<'_>) -> rusqlite::Result<StoredEvaluation> {
    Ok(StoredEvaluation {
        id: row.get(0)?,
        story_id: row.get(1)?,
        model_id: row.get(2)?,
        agent_id: row.get(3)?,
        ts: row.get(4)?,
        raw_json: row.get(5)?,
    })
}

fn resolve_timestamp_column(connection: &Connection) -> Result<&'static str> {
    let columns = table_columns(connection, EVALUATIONS_TABLE)?;
    if columns.is_empty() {
        bail!("table {EVALUATIONS_TABLE} does not exist");
    }

    TIMESTAMP_COLUMNS
        .into_iter()
        .find(|candidate| columns.iter().any(|column| column.name == *candidate))
        .with_context(|| {
            format!(
                "table {EVALUATIONS_TABLE} has no timestamp column (expected one of: {})",
                TIMESTAMP_COLUMNS.join(", ")
            )
        })
}

pub fn fetch_model_mismatches(connection: &Connection) -> Result<(usize, Vec<ModelMismatch>)> {
    let mut statement = connection
        .prepare(
            "
            SELECT s.id, s.model_id, s.agent_id, a.model_id, m.name, am.name, a.name
            FROM stories s
            LEFT JOIN agents a ON a.id = s.agent_id
            LEFT JOIN models m ON m.id = s.model_id
            LEFT JOIN models am ON am.id = a.model_id
            ORDER BY s.id
            ",
        )
        .context("failed to prepare model mismatch query")?;

    let mut rows = statement.query([])?;
    let mut story_count = 0;
    let mut mismatches = Vec::new();

    while let Some(row) = rows.next()? {
        story_count += 1;

        let story_model_id: Option<i64> = row.get(1)?;
        let agent_id: Option<i64> = row.get(2)?;
        let agent_model_id: Option<i64> = row.get(3)?;

        let (Some(agent_id), Some(agent_model_id)) = (agent_id, agent_model_id) else {
            continue;
        };
        if story_model_id == Some(agent_model_id) {
            continue;
        }

        mismatches.push(ModelMismatch {
            story_id: row.get(0)?,
            story_model_id,
            story_model_name: row.get(4)?,
            agent_id,
            agent_model_id,
            agent_model_name: row.get(5)?,
            agent_name: row.get(6)?,
        });
    }

    Ok((story_count, mismatches))
}

pub fn fetch_recent_logs(
    connection: &Connection,
    filter: &LogFilter,
    limit: usize,
) -> Result<Vec<LogEntry>> {
    let mut clauses = Vec::new();
    let mut values = Vec::new();

    if filter.only_model {
        clauses.push(format!(
            "Category IN ({})",
            placeholders(MODEL_TRAFFIC_CATEGORIES.len())
        ));
        values.extend(
            MODEL_TRAFFIC_CATEGORIES
                .iter()
                .map(|category| SqlValue::Text(category.to_string())),
        );
    }
    if !filter.categories.is_empty() {
        clauses.push(format!("Category IN ({})", placeholders(filter.categories.len())));
        values.extend(filter.categories.iter().cloned().map(SqlValue::Text));
    }
    if let Some(needle) = filter.contains.as_deref().filter(|needle| !needle.is_empty()) {
        clauses.push("LOWER(Message) LIKE ?".to_string());
        values.push(SqlValue::Text(format!("%{}%", needle.to_lowercase())));
    }
    if !filter.agents.is_empty() {
        clauses.push(format!("AgentName IN ({})", placeholders(filter.agents.len())));
        values.extend(filter.agents.iter().cloned().map(SqlValue::Text));
    }
    if let Some(level) = filter.level.as_deref() {
        clauses.push("Level = ?".to_string());
        values.push(SqlValue::Text(level.to_string()));
    }
    if let Some(thread_id) = filter.thread_id {
        clauses.push("ThreadId = ?".to_string());
        values.push(SqlValue::Integer(thread_id));
    }
    values.push(SqlValue::Integer(sql_limit(limit.max(1))?));

    let where_clause = if clauses.is_empty() {
        String::new()
    } else {
        format!("WHERE {}", clauses.join(" AND "))
    };
    let sql = format!(
        "
        SELECT
          Id,
          CAST(Ts AS TEXT),
          ThreadId,
          ThreadScope,
          Category,
          AgentName,
          model_name,
          CAST(Result AS TEXT),
          ResultFailReason,
          CAST(Examined AS TEXT),
          substr(Message, 1, 140),
          substr(chat_text, 1, 180)
        FROM Log
        {where_clause}
        ORDER BY Id DESC
        LIMIT ?
        "
    );

    let mut statement = connection
        .prepare(&sql)
        .context("failed to prepare recent logs query")?;
    let entries = statement
        .query_map(params_from_iter(values.iter()), |row| {
            Ok(LogEntry {
                id: row.get(0)?,
                ts: row.get(1)?,
                thread_id: row.get(2)?,
                thread_scope: row.get(3)?,
                category: row.get(4)?,
                agent_name: row.get(5)?,
                model_name: row.get(6)?,
                result: row.get(7)?,
                fail_reason: row.get(8)?,
                examined: row.get(9)?,
                message: row.get(10)?,
                chat_text: row.get(11)?,
            })
        })?
        .collect::<rusqlite::Result<Vec<LogEntry>>>()
        .context("failed to read recent logs")?;

    Ok(entries)
}

fn placeholders(count: usize) -> String {
    vec!["?"; count].join(",")
}

pub fn list_tables(connection: &Connection) -> Result<Vec<String>> {
    let mut statement = connection
        .prepare("SELECT name FROM sqlite_master WHERE type = 'table' ORDER BY name")
        .context("failed to prepare table listing")?;
    let tables = statement
        .query_map([], |row| row.get(0))?
        .collect::<rusqlite::Result<Vec<String>>>()
        .context("failed to list tables")?;

    Ok(tables)
}

pub fn table_columns(connection: &Connection, table_name: &str) -> Result<Vec<ColumnInfo>> {
    let pragma_sql = format!("PRAGMA table_info(\"{}\")", table_name.replace('"', "\"\""));
    let mut statement = connection
        .prepare(&pragma_sql)
        .with_context(|| format!("failed to inspect schema for table {table_name}"))?;

    let mut rows = statement.query([])?;
    let mut columns = Vec::new();
    while let Some(row) = rows.next()? {
        columns.push(ColumnInfo {
            name: row.get(1)?,
            declared_type: row.get(2)?,
        });
    }

    Ok(columns)
}
