//! Starter data for an empty database

use chrono::{Days, Local, NaiveDate};
use tabula_core::{ColumnPatch, ColumnSettings, ColumnType, OptionColor, Result, SelectOption};
use tabula_store::Store;

use crate::database::Database;

struct SeedColumn {
    name: &'static str,
    column_type: ColumnType,
    options: &'static [(&'static str, OptionColor)],
}

const fn column(name: &'static str, column_type: ColumnType) -> SeedColumn {
    SeedColumn {
        name,
        column_type,
        options: &[],
    }
}

static SEED_COLUMNS: [SeedColumn; 10] = [
    column("Item", ColumnType::Text),
    SeedColumn {
        name: "Owner",
        column_type: ColumnType::Select,
        options: &[("David", OptionColor::Teal), ("Daniel", OptionColor::Purple)],
    },
    SeedColumn {
        name: "Status",
        column_type: ColumnType::Select,
        options: &[
            ("Backlog", OptionColor::Gray),
            ("In Progress", OptionColor::Yellow),
            ("Blocked", OptionColor::Red),
            ("Done", OptionColor::Green),
        ],
    },
    SeedColumn {
        name: "Priority",
        column_type: ColumnType::Select,
        options: &[
            ("Low", OptionColor::Gray),
            ("Medium", OptionColor::Blue),
            ("High", OptionColor::Orange),
            ("Urgent", OptionColor::Red),
        ],
    },
    column("Due Date", ColumnType::Date),
    column("Next Step", ColumnType::Text),
    column("Notes", ColumnType::Text),
    SeedColumn {
        name: "Tags",
        column_type: ColumnType::MultiSelect,
        options: &[
            ("Ops", OptionColor::Blue),
            ("Tech", OptionColor::Purple),
            ("Finance", OptionColor::Green),
            ("Compliance", OptionColor::Red),
            ("Personal", OptionColor::Pink),
        ],
    },
    column("Link", ColumnType::Url),
    column("Done?", ColumnType::Checkbox),
];

fn cells(pairs: &[(usize, &str)]) -> Vec<(usize, String)> {
    pairs.iter().map(|(i, raw)| (*i, raw.to_string())).collect()
}

/// Raw input per starter row, keyed by column position
fn seed_rows(due: &str) -> [Vec<(usize, String)>; 3] {
    [
        cells(&[
            (0, "Set up shared tracker"),
            (1, "Daniel"),
            (2, "Done"),
            (3, "Medium"),
            (5, "Add your real tasks"),
            (7, r#"["Tech"]"#),
            (9, "true"),
        ]),
        cells(&[
            (0, "Add first real project list"),
            (1, "David"),
            (2, "In Progress"),
            (3, "High"),
            (4, due),
            (7, r#"["Ops"]"#),
        ]),
        cells(&[
            (0, "Agree on weekly review cadence"),
            (1, "David"),
            (2, "Backlog"),
            (3, "Medium"),
            (7, r#"["Personal"]"#),
        ]),
    ]
}

impl<S: Store> Database<S> {
    /// Add the starter columns and rows if the database has no columns
    ///
    /// Returns whether anything was added.
    pub fn seed(&self) -> Result<bool> {
        self.seed_as_of(Local::now().date_naive())
    }

    /// [`seed`](Self::seed) with an explicit "today" for the relative due date
    pub fn seed_as_of(&self, today: NaiveDate) -> Result<bool> {
        if !self.columns()?.is_empty() {
            log::info!("Database already seeded; skipping");
            return Ok(false);
        }

        let mut columns = Vec::with_capacity(SEED_COLUMNS.len());
        for seed in &SEED_COLUMNS {
            let column = self.create_column(seed.name, seed.column_type)?;
            if !seed.options.is_empty() {
                let options = seed
                    .options
                    .iter()
                    .map(|(label, color)| SelectOption::new(*label, *color))
                    .collect();
                self.update_column(
                    &column.id,
                    ColumnPatch {
                        settings: Some(Some(ColumnSettings::with_options(options))),
                        ..Default::default()
                    },
                )?;
            }
            columns.push(column);
        }

        let due = today.checked_add_days(Days::new(7)).unwrap_or(today);
        let due = due.format("%Y-%m-%d").to_string();
        for cells in seed_rows(&due) {
            let row = self.create_row()?;
            for (position, raw) in cells {
                self.update_cell(&row.id, &columns[position].id, &raw)?;
            }
        }

        log::info!("Seeded {} columns and 3 rows", columns.len());
        Ok(true)
    }
}
