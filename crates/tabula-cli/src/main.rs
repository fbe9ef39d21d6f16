//! Tabula CLI - shared table in a SQLite file

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tabula::prelude::*;
use tabula::{edit_text, registry, SqliteOptions, TableView};

#[derive(Parser)]
#[command(name = "tabula")]
#[command(author, version, about = "Typed, shared table stored in a SQLite file")]
struct Cli {
    /// Database file
    #[arg(long, env = "TABULA_DB", default_value = "tabula.db", global = true)]
    db: PathBuf,

    /// Log debug output (otherwise RUST_LOG decides)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Add the starter columns and rows to an empty database
    Seed,

    /// List the column types and the filter operators each offers
    Types,

    /// List columns
    Columns,

    /// Add a column
    AddColumn {
        /// Column name
        name: String,

        /// Column type (text, number, select, multi_select, date, checkbox, url)
        #[arg(short = 't', long = "type", default_value = "text")]
        column_type: ColumnType,

        /// Comma-separated options for select columns
        #[arg(short, long)]
        options: Option<String>,
    },

    /// Rename a column
    RenameColumn {
        /// Column id or name
        column: String,
        /// New name
        name: String,
    },

    /// Change a column's type
    SetType {
        /// Column id or name
        column: String,
        /// New type
        column_type: ColumnType,
    },

    /// Replace a select column's options
    SetOptions {
        /// Column id or name
        column: String,
        /// Option labels
        labels: Vec<String>,
    },

    /// Delete a column and its cells
    DeleteColumn {
        /// Column id or name
        column: String,
    },

    /// Put columns in the given order
    ReorderColumns {
        /// Column ids or names, first to last
        #[arg(required = true)]
        columns: Vec<String>,
    },

    /// Show rows, optionally searched and filtered
    #[command(alias = "ls")]
    Rows {
        /// Free-text search over every cell
        #[arg(short, long)]
        search: Option<String>,

        /// Structured filter as COLUMN:OPERATOR[:VALUE]
        #[arg(short, long)]
        filter: Option<String>,

        /// Show row ids
        #[arg(long)]
        ids: bool,
    },

    /// Append an empty row
    AddRow,

    /// Set a cell from text as typed into an edit box
    Set {
        /// Row id or 1-based position
        row: String,
        /// Column id or name
        column: String,
        /// New value
        value: String,

        /// Pass the value to the parser without edit-box normalization
        #[arg(long)]
        raw: bool,
    },

    /// Show a cell as it would appear in an edit box
    Get {
        /// Row id or 1-based position
        row: String,
        /// Column id or name
        column: String,
    },

    /// Empty a cell
    Clear {
        /// Row id or 1-based position
        row: String,
        /// Column id or name
        column: String,
    },

    /// Copy a row to the end of the table
    #[command(alias = "dup")]
    Duplicate {
        /// Row id or 1-based position
        row: String,
    },

    /// Delete a row and its cells
    DeleteRow {
        /// Row id or 1-based position
        row: String,
    },

    /// Put rows in the given order
    ReorderRows {
        /// Row ids or 1-based positions, first to last
        #[arg(required = true)]
        rows: Vec<String>,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let store = SqliteStore::open_with_options(&cli.db, &SqliteOptions::default())
        .with_context(|| format!("Failed to open '{}'", cli.db.display()))?;
    let db = Database::new(store);

    match cli.command {
        Commands::Seed => seed(&db),
        Commands::Types => {
            list_types();
            Ok(())
        }
        Commands::Columns => list_columns(&db),
        Commands::AddColumn {
            name,
            column_type,
            options,
        } => add_column(&db, &name, column_type, options.as_deref()),
        Commands::RenameColumn { column, name } => {
            let id = resolve_column(&db, &column)?;
            let column = db.rename_column(&id, &name).context("Failed to rename column")?;
            println!("Renamed column to {:?}", column.name);
            Ok(())
        }
        Commands::SetType {
            column,
            column_type,
        } => {
            let id = resolve_column(&db, &column)?;
            let column = db
                .change_column_type(&id, column_type)
                .context("Failed to change column type")?;
            println!("{} is now {}", column.name, column.column_type);
            Ok(())
        }
        Commands::SetOptions { column, labels } => {
            let id = resolve_column(&db, &column)?;
            let column = db
                .set_column_options(&id, &labels)
                .context("Failed to set options")?;
            println!("{} options: {}", column.name, option_labels(&column));
            Ok(())
        }
        Commands::DeleteColumn { column } => {
            let id = resolve_column(&db, &column)?;
            db.delete_column(&id).context("Failed to delete column")?;
            println!("Deleted column {id}");
            Ok(())
        }
        Commands::ReorderColumns { columns } => {
            let ids = columns
                .iter()
                .map(|c| resolve_column(&db, c))
                .collect::<Result<Vec<_>>>()?;
            db.reorder_columns(&ids).context("Failed to reorder columns")?;
            list_columns(&db)
        }
        Commands::Rows {
            search,
            filter,
            ids,
        } => show_rows(&db, search, filter.as_deref(), ids),
        Commands::AddRow => {
            let row = db.create_row().context("Failed to create row")?;
            println!("{}", row.id);
            Ok(())
        }
        Commands::Set {
            row,
            column,
            value,
            raw,
        } => set_cell(&db, &row, &column, &value, raw),
        Commands::Get { row, column } => {
            let row = resolve_row(&db, &row)?;
            let column = db.column(&resolve_column(&db, &column)?)?;
            let value = db.cell(&row, &column.id)?;
            println!("{}", edit_text(value.as_ref(), column.column_type));
            Ok(())
        }
        Commands::Clear { row, column } => {
            let row = resolve_row(&db, &row)?;
            let column = resolve_column(&db, &column)?;
            db.clear_cell(&row, &column).context("Failed to clear cell")?;
            Ok(())
        }
        Commands::Duplicate { row } => {
            let row = resolve_row(&db, &row)?;
            let copy = db.duplicate_row(&row).context("Failed to duplicate row")?;
            println!("{}", copy.id);
            Ok(())
        }
        Commands::DeleteRow { row } => {
            let row = resolve_row(&db, &row)?;
            db.delete_row(&row).context("Failed to delete row")?;
            println!("Deleted row {row}");
            Ok(())
        }
        Commands::ReorderRows { rows } => {
            let ids = rows
                .iter()
                .map(|r| resolve_row(&db, r))
                .collect::<Result<Vec<_>>>()?;
            db.reorder_rows(&ids).context("Failed to reorder rows")?;
            show_rows(&db, None, None, false)
        }
    }
}

fn init_logging(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default)).init();
}

fn seed(db: &Database<SqliteStore>) -> Result<()> {
    if db.seed().context("Failed to seed database")? {
        println!("Seeded starter columns and rows");
    } else {
        println!("Database already has columns; nothing to do");
    }
    Ok(())
}

fn list_types() {
    for def in registry::all() {
        let operators: Vec<&str> = def.operators.iter().map(|op| op.as_str()).collect();
        println!(
            "{:<14} {:<14} {}",
            def.name,
            def.label,
            operators.join(", ")
        );
    }
}

fn option_labels(column: &Column) -> String {
    column
        .options()
        .iter()
        .map(|o| format!("{} ({})", o.label, o.color))
        .collect::<Vec<_>>()
        .join(", ")
}

fn list_columns(db: &Database<SqliteStore>) -> Result<()> {
    let columns = db.columns().context("Failed to read columns")?;
    if columns.is_empty() {
        eprintln!("No columns yet; try `tabula seed` or `tabula add-column`");
        return Ok(());
    }
    for column in columns {
        let mut line = format!("{}  {:<20} {}", column.id, column.name, column.column_type);
        if column.column_type.uses_options() {
            line.push_str(&format!("  [{}]", option_labels(&column)));
        }
        println!("{line}");
    }
    Ok(())
}

fn add_column(
    db: &Database<SqliteStore>,
    name: &str,
    column_type: ColumnType,
    options: Option<&str>,
) -> Result<()> {
    let mut column = db
        .create_column(name, column_type)
        .context("Failed to create column")?;
    if let Some(options) = options {
        if !column_type.uses_options() {
            bail!("Only select and multi_select columns take options");
        }
        column = db.set_column_options(&column.id, options.split(','))?;
    }
    println!("{}", column.id);
    Ok(())
}

fn set_cell(
    db: &Database<SqliteStore>,
    row: &str,
    column: &str,
    value: &str,
    raw: bool,
) -> Result<()> {
    let row = resolve_row(db, row)?;
    let column = resolve_column(db, column)?;
    let stored = if raw {
        db.update_cell(&row, &column, value)
    } else {
        db.edit_cell(&row, &column, value)
    }
    .context("Value not saved")?;
    match stored {
        Some(value) => println!("{value}"),
        None => println!("(empty)"),
    }
    Ok(())
}

fn parse_filter(db: &Database<SqliteStore>, text: &str) -> Result<Filter> {
    let mut parts = text.splitn(3, ':');
    let (Some(column), Some(operator)) = (parts.next(), parts.next()) else {
        bail!("Filter must look like COLUMN:OPERATOR[:VALUE], got {text:?}");
    };
    let operator = FilterOperator::parse(operator);
    if !operator.is_known() {
        log::warn!("Unknown operator {operator}; every row will match");
    }
    let value = match parts.next() {
        Some(value) => value,
        None if operator.is_known() && operator.takes_value() => {
            bail!("Operator {operator} needs a value: {column}:{operator}:VALUE");
        }
        None => "",
    };
    Ok(Filter::new(resolve_column(db, column)?, operator, value))
}

fn show_rows(
    db: &Database<SqliteStore>,
    search: Option<String>,
    filter: Option<&str>,
    show_ids: bool,
) -> Result<()> {
    let mut query = RowQuery::new();
    if let Some(search) = search {
        query = query.with_search(search);
    }
    if let Some(filter) = filter {
        query = query.with_filter(parse_filter(db, filter)?);
    }
    let view = db.table(&query).context("Failed to read rows")?;
    print_table(&view, &db.options().format, show_ids);
    Ok(())
}

fn print_table(view: &TableView, format: &FormatOptions, show_ids: bool) {
    let mut lines: Vec<Vec<String>> = Vec::with_capacity(view.rows.len() + 1);
    let mut header = vec!["#".to_string()];
    header.extend(view.columns.iter().map(|c| c.name.clone()));
    if show_ids {
        header.push("id".to_string());
    }
    lines.push(header);

    for (position, row) in view.rows.iter().enumerate() {
        let mut line = vec![(position + 1).to_string()];
        line.extend(row.render(format));
        if show_ids {
            line.push(row.id().to_string());
        }
        lines.push(line);
    }

    let mut widths = vec![0; lines[0].len()];
    for line in &lines {
        for (width, cell) in widths.iter_mut().zip(line) {
            *width = (*width).max(cell.chars().count());
        }
    }
    for line in &lines {
        let padded: Vec<String> = line
            .iter()
            .zip(&widths)
            .map(|(cell, &width)| format!("{cell:<width$}"))
            .collect();
        println!("{}", padded.join("  ").trim_end());
    }
    if view.is_empty() {
        eprintln!("No matching rows");
    }
}

/// Accept a column id or a (case-insensitive) column name
fn resolve_column(db: &Database<SqliteStore>, reference: &str) -> Result<ColumnId> {
    let columns = db.columns()?;
    columns
        .iter()
        .find(|c| c.id.as_str() == reference)
        .or_else(|| {
            columns
                .iter()
                .find(|c| c.name.eq_ignore_ascii_case(reference.trim()))
        })
        .map(|c| c.id.clone())
        .with_context(|| format!("No column {reference:?}"))
}

/// Accept a row id or a 1-based position in display order
fn resolve_row(db: &Database<SqliteStore>, reference: &str) -> Result<RowId> {
    let rows = db.rows()?;
    if let Some(row) = rows.iter().find(|r| r.id().as_str() == reference) {
        return Ok(row.id().clone());
    }
    let position: usize = reference
        .parse()
        .ok()
        .filter(|&p| p >= 1 && p <= rows.len())
        .with_context(|| format!("No row {reference:?}"))?;
    Ok(rows[position - 1].id().clone())
}
