use serde::Serialize;

use crate::evaluation::EvaluationRecord;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredEvaluation {
    pub id: i64,
    pub story_id: Option<i64>,
    pub model_id: Option<i64>,
    pub agent_id: Option<i64>,
    pub ts: Option<String>,
    pub raw_json: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelMismatch {
    pub story_id: i64,
    pub story_model_id: Option<i64>,
    pub story_model_name: Option<String>,
    pub agent_id: i64,
    pub agent_model_id: i64,
    pub agent_model_name: Option<String>,
    pub agent_name: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnInfo {
    pub name: String,
    pub declared_type: String,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ParseStats {
    pub checked: usize,
    pub parsed: usize,
    pub failed: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct EvalReportMeta {
    pub generated_at: String,
    pub db_path: String,
    pub headings: Vec<String>,
    pub stats: ParseStats,
}

#[derive(Debug, Clone, Serialize)]
pub struct EvalReportRow {
    pub id: i64,
    pub story_id: Option<i64>,
    pub model_id: Option<i64>,
    pub agent_id: Option<i64>,
    pub ts: Option<String>,
    pub ok: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parsed: Option<EvaluationRecord>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub snippet: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct EvalParseReport {
    pub meta: EvalReportMeta,
    pub rows: Vec<EvalReportRow>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LogFilter {
    pub only_model: bool,
    pub categories: Vec<String>,
    pub agents: Vec<String>,
    pub contains: Option<String>,
    pub level: Option<String>,
    pub thread_id: Option<i64>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LogEntry {
    pub id: i64,
    pub ts: Option<String>,
    pub thread_id: Option<i64>,
    pub thread_scope: Option<String>,
    pub category: Option<String>,
    pub agent_name: Option<String>,
    pub model_name: Option<String>,
    pub result: Option<String>,
    pub fail_reason: Option<String>,
    pub examined: Option<String>,
    pub message: Option<String>,
    pub chat_text: Option<String>,
}
