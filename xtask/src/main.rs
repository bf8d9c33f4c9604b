// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! # xtask
//!
//! Workspace automation for `InnSync`: build, lint and test wrappers, plus a
//! check that the embedded `SQLite` migrations agree with the diesel schema
//! module of `innsync-persistence`.
//!
//! - `cargo xtask ci` lints, builds, tests and verifies the migrations
//! - `cargo xtask verify-migrations` migrates an in-memory database, diffs it
//!   against `diesel_schema.rs`, then reverts and re-applies every migration

#![deny(
    clippy::pedantic,
    clippy::nursery,
    clippy::style,
    clippy::correctness,
    clippy::all
)]

use std::collections::{BTreeMap, BTreeSet};
use std::io;
use std::process::Output;

use clap::{Parser, Subcommand};
use clap_verbosity_flag::{InfoLevel, Verbosity};
use color_eyre::Result;
use color_eyre::eyre::{Context, eyre};
use diesel::sql_types::{Integer, Text};
use diesel::{Connection, QueryableByName, RunQueryDsl, SqliteConnection};
use diesel_migrations::{EmbeddedMigrations, MigrationHarness, embed_migrations};
use duct::cmd;
use tracing::level_filters::LevelFilter;
use tracing_log::AsTrace;

const MIGRATIONS: EmbeddedMigrations = embed_migrations!("../crates/persistence/migrations");

const DIESEL_SCHEMA_PATH: &str = concat!(
    env!("CARGO_MANIFEST_DIR"),
    "/../crates/persistence/src/diesel_schema.rs"
);

/// Diesel's own bookkeeping table, never declared in the schema module.
const MIGRATION_LEDGER: &str = "__diesel_schema_migrations";

fn main() -> Result<()> {
    color_eyre::install()?;
    let args = Args::parse();
    tracing_subscriber::fmt()
        .with_max_level(args.log_level())
        .without_time()
        .init();

    if let Err(err) = args.command.run() {
        tracing::error!("{err}");
        std::process::exit(1);
    }
    Ok(())
}

#[derive(Debug, Parser)]
#[command(bin_name = "cargo xtask", styles = clap_cargo::style::CLAP_STYLING)]
struct Args {
    #[command(subcommand)]
    command: Command,

    #[command(flatten)]
    verbosity: Verbosity<InfoLevel>,
}

impl Args {
    fn log_level(&self) -> LevelFilter {
        self.verbosity.log_level_filter().as_trace()
    }
}

#[derive(Clone, Copy, Debug, Subcommand)]
enum Command {
    /// Lint, build, test and verify the migrations
    CI,

    /// Build every crate and target
    #[command(visible_alias = "b")]
    Build,

    /// Type-check every crate and target
    #[command(visible_alias = "c")]
    Check,

    /// Run clippy and the formatting check
    #[command(visible_alias = "l")]
    Lint,

    /// Run clippy with warnings denied
    #[command(visible_alias = "cl")]
    LintClippy,

    /// Check formatting without rewriting files
    #[command(visible_alias = "lf")]
    LintFormatting,

    /// Run the unit and integration tests
    #[command(visible_alias = "t")]
    Test,

    /// Compare the migrations with the diesel schema and check they revert
    #[command(visible_alias = "vm")]
    VerifyMigrations,
}

impl Command {
    fn run(self) -> Result<()> {
        match self {
            Self::CI => {
                for step in [
                    Self::Lint,
                    Self::Build,
                    Self::Test,
                    Self::VerifyMigrations,
                ] {
                    step.run()?;
                }
                Ok(())
            }
            Self::Build => cargo(&["build", "--workspace", "--all-targets"]),
            Self::Check => cargo(&["check", "--workspace", "--all-targets"]),
            Self::Lint => {
                Self::LintClippy.run()?;
                Self::LintFormatting.run()
            }
            Self::LintClippy => cargo(&[
                "clippy",
                "--workspace",
                "--all-targets",
                "--",
                "-D",
                "warnings",
            ]),
            Self::LintFormatting => cargo(&["fmt", "--all", "--check"]),
            Self::Test => cargo(&["test", "--workspace"]),
            Self::VerifyMigrations => verify_migrations(),
        }
    }
}

fn cargo(args: &[&str]) -> Result<()> {
    cmd("cargo", args).run_with_trace()?;
    Ok(())
}

/// Checks the migrations against `diesel_schema.rs`.
///
/// Every mismatch is reported, not only the first. After the comparison the
/// migrations are reverted, which must leave no tables behind, and applied
/// again, which must reproduce the same schema.
fn verify_migrations() -> Result<()> {
    let source: String = std::fs::read_to_string(DIESEL_SCHEMA_PATH)
        .wrap_err_with(|| format!("Failed to read {DIESEL_SCHEMA_PATH}"))?;
    let declared: Schema = parse_diesel_schema(&source)?;
    tracing::info!(tables = declared.len(), "Parsed diesel schema");

    let mut conn: SqliteConnection =
        SqliteConnection::establish(":memory:").wrap_err("Failed to open in-memory SQLite")?;
    conn.run_pending_migrations(MIGRATIONS)
        .map_err(|e| eyre!("Failed to apply migrations: {e}"))?;
    let migrated: Schema = read_sqlite_schema(&mut conn)?;
    tracing::info!(tables = migrated.len(), "Applied migrations");

    let problems: Vec<String> = schema_differences(&declared, &migrated);
    if !problems.is_empty() {
        return Err(eyre!(
            "diesel_schema.rs and the migrations disagree:\n{}",
            problems.join("\n")
        ));
    }

    conn.revert_all_migrations(MIGRATIONS)
        .map_err(|e| eyre!("Failed to revert migrations: {e}"))?;
    let leftover: Schema = read_sqlite_schema(&mut conn)?;
    if !leftover.is_empty() {
        let names: Vec<&String> = leftover.keys().collect();
        return Err(eyre!("Tables survived a full revert: {names:?}"));
    }

    conn.run_pending_migrations(MIGRATIONS)
        .map_err(|e| eyre!("Failed to re-apply migrations: {e}"))?;
    if read_sqlite_schema(&mut conn)? != migrated {
        return Err(eyre!("Re-applied migrations produce a different schema"));
    }

    tracing::info!("Migrations match the diesel schema");
    Ok(())
}

/// Table name to table shape.
type Schema = BTreeMap<String, TableShape>;

#[derive(Debug, Clone, PartialEq, Eq, Default)]
struct TableShape {
    columns: BTreeMap<String, ColumnShape>,
    primary_key: BTreeSet<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct ColumnShape {
    affinity: Affinity,
    nullable: bool,
}

/// Storage class a column ends up with, which is all diesel and `SQLite`
/// can be compared on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Affinity {
    Integer,
    Real,
    Text,
    Blob,
}

impl Affinity {
    /// Diesel type names used in `diesel_schema.rs`.
    fn from_diesel(name: &str) -> Option<Self> {
        match name {
            "Integer" | "BigInt" | "SmallInt" | "Bool" => Some(Self::Integer),
            "Double" | "Float" => Some(Self::Real),
            "Text" | "Date" | "Timestamp" => Some(Self::Text),
            "Binary" => Some(Self::Blob),
            _ => None,
        }
    }

    /// `SQLite` declared types, following its affinity rules.
    fn from_sqlite(declared: &str) -> Self {
        let upper: String = declared.to_uppercase();
        if upper.contains("INT") || upper.contains("BOOL") {
            Self::Integer
        } else if upper.contains("BLOB") {
            Self::Blob
        } else if ["REAL", "FLOA", "DOUB"].iter().any(|k| upper.contains(k)) {
            Self::Real
        } else {
            Self::Text
        }
    }
}

/// Reads the `table!` blocks of a diesel schema module.
fn parse_diesel_schema(source: &str) -> Result<Schema> {
    let mut schema: Schema = Schema::new();
    let mut open: Option<(String, TableShape)> = None;

    for line in source.lines().map(str::trim) {
        if line == "}" {
            if let Some((name, table)) = open.take() {
                schema.insert(name, table);
            }
            continue;
        }

        if let Some((table_name, table)) = open.as_mut() {
            let Some((column, diesel_type)) = line.trim_end_matches(',').split_once(" -> ")
            else {
                continue;
            };
            let (inner, nullable) = diesel_type
                .strip_prefix("Nullable<")
                .and_then(|rest| rest.strip_suffix('>'))
                .map_or((diesel_type, false), |inner| (inner, true));
            let affinity: Affinity = Affinity::from_diesel(inner)
                .ok_or_else(|| eyre!("Unknown diesel type '{inner}' in '{table_name}'"))?;
            table.columns.insert(
                column.trim().to_string(),
                ColumnShape { affinity, nullable },
            );
            continue;
        }

        // Table headers look like `cells (id) {`.
        let Some((name, keys)) = line
            .strip_suffix('{')
            .filter(|header| !header.starts_with("diesel::"))
            .and_then(|header| header.trim().split_once(" ("))
        else {
            continue;
        };
        let primary_key: BTreeSet<String> = keys
            .trim_end_matches(')')
            .split(',')
            .map(|key| key.trim().to_string())
            .collect();
        open = Some((
            name.to_string(),
            TableShape {
                columns: BTreeMap::new(),
                primary_key,
            },
        ));
    }

    if schema.is_empty() {
        return Err(eyre!("No table! blocks found in {DIESEL_SCHEMA_PATH}"));
    }
    Ok(schema)
}

#[derive(QueryableByName)]
struct TableName {
    #[diesel(sql_type = Text)]
    name: String,
}

#[derive(QueryableByName)]
struct TableColumn {
    #[diesel(sql_type = Text)]
    name: String,
    #[diesel(sql_type = Text)]
    r#type: String,
    #[diesel(sql_type = Integer)]
    notnull: i32,
    #[diesel(sql_type = Integer)]
    pk: i32,
}

/// Reads the user tables of a live `SQLite` connection.
fn read_sqlite_schema(conn: &mut SqliteConnection) -> Result<Schema> {
    let tables: Vec<TableName> = diesel::sql_query(
        "SELECT name FROM sqlite_master \
         WHERE type = 'table' AND name NOT LIKE 'sqlite_%' \
         ORDER BY name",
    )
    .load(conn)
    .wrap_err("Failed to list SQLite tables")?;

    let mut schema: Schema = Schema::new();
    for table in tables.into_iter().filter(|t| t.name != MIGRATION_LEDGER) {
        let columns: Vec<TableColumn> =
            diesel::sql_query(format!("PRAGMA table_info({})", table.name))
                .load(conn)
                .wrap_err_with(|| format!("Failed to read columns of {}", table.name))?;

        let mut shape: TableShape = TableShape::default();
        for column in columns {
            if column.pk > 0 {
                shape.primary_key.insert(column.name.clone());
            }
            // INTEGER PRIMARY KEY reports notnull = 0 yet never holds NULL.
            let nullable: bool = column.notnull == 0 && column.pk == 0;
            shape.columns.insert(
                column.name,
                ColumnShape {
                    affinity: Affinity::from_sqlite(&column.r#type),
                    nullable,
                },
            );
        }
        schema.insert(table.name, shape);
    }
    Ok(schema)
}

/// Lists every difference between the declared and the migrated schema.
fn schema_differences(declared: &Schema, migrated: &Schema) -> Vec<String> {
    let mut problems: Vec<String> = Vec::new();

    for name in declared.keys().filter(|name| !migrated.contains_key(*name)) {
        problems.push(format!("  table '{name}' is declared but never created"));
    }
    for name in migrated.keys().filter(|name| !declared.contains_key(*name)) {
        problems.push(format!("  table '{name}' is created but not declared"));
    }

    for (name, want) in declared {
        let Some(have) = migrated.get(name) else {
            continue;
        };
        for (column, want_column) in &want.columns {
            match have.columns.get(column) {
                None => problems.push(format!("  column '{name}.{column}' is never created")),
                Some(have_column) if have_column != want_column => problems.push(format!(
                    "  column '{name}.{column}': diesel {want_column:?}, SQLite {have_column:?}"
                )),
                Some(_) => {}
            }
        }
        for column in have.columns.keys() {
            if !want.columns.contains_key(column) {
                problems.push(format!("  column '{name}.{column}' is not declared"));
            }
        }
        if want.primary_key != have.primary_key {
            problems.push(format!(
                "  primary key of '{name}': diesel {:?}, SQLite {:?}",
                want.primary_key, have.primary_key
            ));
        }
    }

    problems
}

/// Logs a `duct` command before running it.
trait ExpressionExt {
    fn run_with_trace(&self) -> io::Result<Output>;
}

impl ExpressionExt for duct::Expression {
    fn run_with_trace(&self) -> io::Result<Output> {
        tracing::info!("running command: {:?}", self);
        self.run().inspect_err(|_| {
            tracing::error!("failed to run command: {:?}", self);
        })
    }
}
