use anyhow::Result;
use clap::{Parser, Subcommand};
use colored::Colorize;
use std::path::{Path, PathBuf};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};
use walkdir::WalkDir;

use erdviz_core::{Config, DatabaseModel, LayoutDirection, ParseResult, RelationType, ViewMode};
use erdviz_engine::RelationInferenceEngine;
use erdviz_render::{ErDiagramRenderer, MermaidErRenderer};
use erdviz_sql::CompositeSqlParser;

/// ErdViz - ER diagrams from SQL DDL
#[derive(Parser)]
#[command(name = "erdviz")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Path to config file (default: erdviz.toml)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Parse DDL and summarize the schema
    Parse {
        /// SQL file or directory of .sql files
        path: PathBuf,

        /// SQL dialect: mysql, postgres, generic or auto
        #[arg(short, long)]
        dialect: Option<String>,

        /// Print the full parse result as JSON
        #[arg(long)]
        json: bool,
    },

    /// Render a Mermaid ER diagram
    Render {
        /// SQL file or directory of .sql files
        path: PathBuf,

        /// SQL dialect: mysql, postgres, generic or auto
        #[arg(short, long)]
        dialect: Option<String>,

        /// View mode: physical, logical or conceptual
        #[arg(long)]
        view: Option<ViewMode>,

        /// Layout direction: TB or LR
        #[arg(long)]
        direction: Option<LayoutDirection>,

        /// Only render these tables
        #[arg(long, value_delimiter = ',')]
        include: Vec<String>,

        /// Leave out these tables
        #[arg(long, value_delimiter = ',')]
        exclude: Vec<String>,

        /// Do not render column comments
        #[arg(long)]
        no_comments: bool,

        /// Output file (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// List foreign keys with their inferred cardinality
    Relations {
        /// SQL file or directory of .sql files
        path: PathBuf,

        /// SQL dialect: mysql, postgres, generic or auto
        #[arg(short, long)]
        dialect: Option<String>,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    init_tracing(cli.verbose);

    let config = if let Some(config_path) = &cli.config {
        Config::from_file(config_path)?
    } else if Path::new("erdviz.toml").exists() {
        Config::from_file(Path::new("erdviz.toml"))?
    } else {
        if cli.verbose {
            eprintln!("{}", "No config file found, using defaults".yellow());
        }
        Config::default()
    };

    match cli.command {
        Commands::Parse { path, dialect, json } => {
            parse_command(&config, &path, dialect.as_deref(), json, cli.verbose)
        }
        Commands::Render {
            path,
            dialect,
            view,
            direction,
            include,
            exclude,
            no_comments,
            output,
        } => {
            let overrides = RenderOverrides {
                view,
                direction,
                include,
                exclude,
                no_comments,
            };
            render_command(&config, &path, dialect.as_deref(), overrides, output.as_deref(), cli.verbose)
        }
        Commands::Relations { path, dialect } => {
            relations_command(&config, &path, dialect.as_deref(), cli.verbose)
        }
    }
}

/// Logs go to stderr so diagrams on stdout stay clean
fn init_tracing(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();
}

/// Command-line render settings layered over the config file
struct RenderOverrides {
    view: Option<ViewMode>,
    direction: Option<LayoutDirection>,
    include: Vec<String>,
    exclude: Vec<String>,
    no_comments: bool,
}

/// Read a .sql file, or every .sql file under a directory in path order
fn read_sql(path: &Path) -> Result<String> {
    if !path.is_dir() {
        return Ok(std::fs::read_to_string(path)?);
    }

    let mut files: Vec<PathBuf> = WalkDir::new(path)
        .into_iter()
        .filter_map(|entry| entry.ok())
        .filter(|entry| entry.file_type().is_file())
        .map(|entry| entry.into_path())
        .filter(|p| {
            p.extension()
                .and_then(|ext| ext.to_str())
                .map(|ext| ext.eq_ignore_ascii_case("sql"))
                .unwrap_or(false)
        })
        .collect();

    if files.is_empty() {
        anyhow::bail!("No .sql files found under {}", path.display());
    }

    files.sort();

    let mut sql = String::new();
    for file in files {
        tracing::debug!("Reading {}", file.display());
        sql.push_str(&std::fs::read_to_string(&file)?);
        sql.push('\n');
    }
    Ok(sql)
}

fn parse_input(config: &Config, path: &Path, dialect: Option<&str>, verbose: bool) -> Result<ParseResult> {
    let sql = read_sql(path)?;
    let dialect = dialect.unwrap_or(config.dialect.as_str());

    if verbose {
        eprintln!("{} {} ({})", "Parsing".cyan(), path.display(), dialect);
    }

    Ok(CompositeSqlParser::new().parse(&sql, dialect))
}

/// Parse and fail loudly when no backend produced a model
fn load_model(config: &Config, path: &Path, dialect: Option<&str>, verbose: bool) -> Result<DatabaseModel> {
    let result = parse_input(config, path, dialect, verbose)?;

    if verbose {
        for warning in &result.warnings {
            eprintln!("  {} {}", "note:".yellow(), warning);
        }
    }

    if !result.success {
        print_failure(&result);
        anyhow::bail!("{}", result.message);
    }

    result
        .into_model()
        .ok_or_else(|| anyhow::anyhow!("Parse succeeded without a model"))
}

fn print_failure(result: &ParseResult) {
    eprintln!("{} {}", "✗".red(), result.message.red().bold());
    for error in &result.errors {
        eprintln!("    {}", error);
    }
}

fn infer(config: &Config, model: &mut DatabaseModel) {
    RelationInferenceEngine::new(config.inference.clone()).infer_relations(model);
}

/// Parse command - summarize tables and foreign keys
fn parse_command(config: &Config, path: &Path, dialect: Option<&str>, json: bool, verbose: bool) -> Result<()> {
    let result = parse_input(config, path, dialect, verbose)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&result)?);
        if !result.success {
            anyhow::bail!("{}", result.message);
        }
        return Ok(());
    }

    let Some(model) = result.database_model.as_ref() else {
        print_failure(&result);
        anyhow::bail!("{}", result.message);
    };

    println!();
    println!("{}", "Schema Summary".bold().bright_blue());
    println!("{}", "=".repeat(60).bright_blue());
    println!();
    println!("{} {}", "Dialect:".bold(), model.db_type);
    if let Some(parser) = model.metadata.get("parser") {
        println!("{} {}", "Parser:".bold(), parser);
    }
    println!("{} {}", "Tables:".bold(), model.table_count());
    println!("{} {}", "Foreign keys:".bold(), model.foreign_key_count());
    println!();

    for table in &model.tables {
        let pk = table
            .primary_key
            .as_ref()
            .map(|pk| pk.columns.join(", "))
            .unwrap_or_else(|| "-".to_string());

        println!(
            "  {} ({} columns, PK: {}, {} FKs)",
            table.name.green(),
            table.columns.len(),
            pk,
            table.foreign_keys.len()
        );
        if let Some(comment) = &table.comment {
            println!("      {}", comment.dimmed());
        }
    }

    if !model.views.is_empty() {
        println!();
        println!("{} {}", "Views:".bold(), model.views.len());
        for view in &model.views {
            println!("  {}", view.name.cyan());
        }
    }

    if result.warnings.len() > 1 {
        println!();
        println!("{}", "Warnings:".bold());
        for warning in result.warnings.iter().skip(1) {
            println!("  {} {}", "WARN".yellow().bold(), warning);
        }
    }

    println!();
    Ok(())
}

/// Render command - parse, infer and write Mermaid text
fn render_command(
    config: &Config,
    path: &Path,
    dialect: Option<&str>,
    overrides: RenderOverrides,
    output: Option<&Path>,
    verbose: bool,
) -> Result<()> {
    let mut model = load_model(config, path, dialect, verbose)?;
    infer(config, &mut model);

    let mut options = config.render.to_render_options();
    if let Some(view) = overrides.view {
        options.view_mode = view;
    }
    if let Some(direction) = overrides.direction {
        options.direction = direction;
    }
    if overrides.no_comments {
        options.show_comments = false;
    }
    options = options.include(overrides.include).exclude(overrides.exclude);
    options.dialect = Some(model.db_type.clone());

    let renderer = MermaidErRenderer::new().with_key_suffix(config.inference.naming_convention_suffix.clone());
    let diagram = renderer.render(&model, &options);

    match output {
        Some(output) => {
            std::fs::write(output, &diagram)?;
            eprintln!("{} {}", "Diagram saved to:".green(), output.display());
        }
        None => print!("{}", diagram),
    }

    Ok(())
}

/// Relations command - list each foreign key with its cardinality
fn relations_command(config: &Config, path: &Path, dialect: Option<&str>, verbose: bool) -> Result<()> {
    let mut model = load_model(config, path, dialect, verbose)?;
    infer(config, &mut model);

    println!();
    println!("{}", "Relationships".bold().bright_blue());
    println!("{}", "=".repeat(60).bright_blue());
    println!();

    if model.foreign_key_count() == 0 {
        println!("{}", "No foreign keys found".yellow());
        println!();
        return Ok(());
    }

    for table in &model.tables {
        if table.foreign_keys.is_empty() {
            continue;
        }

        if table.is_junction() {
            println!("{} {}", table.name.bold(), "[junction]".magenta());
        } else {
            println!("{}", table.name.bold());
        }

        for fk in &table.foreign_keys {
            let relation = match fk.relation_type {
                Some(RelationType::OneToOne) => "1:1".green(),
                Some(RelationType::OneToMany) => "1:N".cyan(),
                Some(RelationType::ManyToMany) => "N:M".magenta(),
                None => "?".dimmed(),
            };

            println!(
                "  {}  ({}) -> {}({})",
                relation,
                fk.from_columns.join(", "),
                fk.to_table,
                fk.to_columns.join(", ")
            );
        }
    }

    println!();
    Ok(())
}
