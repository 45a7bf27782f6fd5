use std::io::{self, Write};

use anyhow::{Context, Result, bail};
use rusqlite::Connection;
use tracing::{info, warn};

use crate::cli::SchemaArgs;
use crate::store;

#[derive(Debug, Clone, PartialEq, Eq)]
struct RequiredColumn {
    table: String,
    column: String,
}

pub fn run(args: SchemaArgs) -> Result<()> {
    let required = args
        .required_columns
        .iter()
        .map(|raw| parse_required_column(raw))
        .collect::<Result<Vec<RequiredColumn>>>()?;

    let connection = store::open_read_only(&args.db_path)?;
    let mut output = io::BufWriter::new(io::stdout().lock());

    let table_count = write_tables(&mut output, &connection)?;
    info!(path = %args.db_path.display(), tables = table_count, "described schema");

    if required.is_empty() {
        output.flush()?;
        return Ok(());
    }

    let missing = find_missing_columns(&connection, &required)?;
    write_migrations(&mut output, &missing)?;
    output.flush()?;

    if !missing.is_empty() {
        for entry in &missing {
            warn!(table = %entry.table, column = %entry.column, "required column missing");
        }
        bail!("{} required column(s) missing", missing.len());
    }

    info!(checked = required.len(), "all required columns present");
    Ok(())
}

fn write_tables<W: Write>(output: &mut W, connection: &Connection) -> Result<usize> {
    let tables = store::list_tables(connection)?;

    writeln!(output, "=== DATABASE TABLES ===")?;
    for table in &tables {
        writeln!(output)?;
        writeln!(output, "{table}:")?;
        for column in store::table_columns(connection, table)? {
            writeln!(output, "  {} ({})", column.name, column.declared_type)?;
        }
    }

    Ok(tables.len())
}

fn find_missing_columns(
    connection: &Connection,
    required: &[RequiredColumn],
) -> Result<Vec<RequiredColumn>> {
    let mut missing = Vec::new();
    for entry in required {
        let columns = store::table_columns(connection, &entry.table)?;
        if !columns.iter().any(|column| column.name == entry.column) {
            missing.push(entry.clone());
        }
    }
    Ok(missing)
}

fn write_migrations<W: Write>(output: &mut W, missing: &[RequiredColumn]) -> Result<()> {
    writeln!(output)?;
    writeln!(output, "=== SCHEMA VALIDATION ===")?;
    writeln!(output, "Total missing columns: {}", missing.len())?;

    for entry in missing {
        writeln!(
            output,
            "ALTER TABLE {} ADD COLUMN {} {};",
            entry.table,
            entry.column,
            suggested_column_type(&entry.column)
        )?;
    }

    Ok(())
}

fn parse_required_column(raw: &str) -> Result<RequiredColumn> {
    let (table, column) = raw
        .split_once('.')
        .with_context(|| format!("required column must look like table.column: {raw}"))?;
    let (table, column) = (table.trim(), column.trim());
    if table.is_empty() || column.is_empty() {
        bail!("required column must look like table.column: {raw}");
    }

    Ok(RequiredColumn {
        table: table.to_string(),
        column: column.to_string(),
    })
}

fn suggested_column_type(column: &str) -> &'static str {
    let lowered = column.to_lowercase();
    if ["id", "score", "count", "step"]
        .iter()
        .any(|marker| lowered.contains(marker))
    {
        "INTEGER"
    } else {
        "TEXT"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn connection() -> Connection {
        let connection = Connection::open_in_memory().expect("in-memory DB should open");
        connection
            .execute_batch(
                "
                CREATE TABLE stories (id INTEGER PRIMARY KEY, folder TEXT, score REAL);
                CREATE TABLE agents (id INTEGER PRIMARY KEY, name TEXT);
                ",
            )
            .expect("schema should be created");
        connection
    }

    #[test]
    fn parse_required_column_splits_table_and_column() {
        assert_eq!(
            parse_required_column(" stories . summary ").expect("valid column"),
            RequiredColumn {
                table: "stories".to_string(),
                column: "summary".to_string(),
            }
        );
        assert!(parse_required_column("stories").is_err());
        assert!(parse_required_column(".summary").is_err());
    }

    #[test]
    fn suggested_column_type_uses_name_markers() {
        assert_eq!(suggested_column_type("serie_id"), "INTEGER");
        assert_eq!(suggested_column_type("TotalScore"), "INTEGER");
        assert_eq!(suggested_column_type("char_count"), "INTEGER");
        assert_eq!(suggested_column_type("summary"), "TEXT");
    }

    #[test]
    fn write_tables_lists_columns_alphabetically_by_table() {
        let mut buffer = Vec::new();
        let count = write_tables(&mut buffer, &connection()).expect("render should succeed");

        assert_eq!(count, 2);
        assert_eq!(
            String::from_utf8(buffer).expect("utf-8"),
            "=== DATABASE TABLES ===\n\
             \n\
             agents:\n  id (INTEGER)\n  name (TEXT)\n\
             \n\
             stories:\n  id (INTEGER)\n  folder (TEXT)\n  score (REAL)\n"
        );
    }

    #[test]
    fn find_missing_columns_reports_absent_tables_and_columns() {
        let required = ["stories.folder", "stories.summary", "series.titolo"]
            .iter()
            .map(|raw| parse_required_column(raw).expect("valid column"))
            .collect::<Vec<RequiredColumn>>();

        let missing = find_missing_columns(&connection(), &required).expect("check should run");
        let names = missing
            .iter()
            .map(|entry| format!("{}.{}", entry.table, entry.column))
            .collect::<Vec<String>>();
        assert_eq!(names, vec!["stories.summary", "series.titolo"]);

        let mut buffer = Vec::new();
        write_migrations(&mut buffer, &missing).expect("render should succeed");
        let rendered = String::from_utf8(buffer).expect("utf-8");
        assert!(rendered.contains("Total missing columns: 2"));
        assert!(rendered.contains("ALTER TABLE stories ADD COLUMN summary TEXT;"));
        assert!(rendered.contains("ALTER TABLE series ADD COLUMN titolo TEXT;"));
    }
}
