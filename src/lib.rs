pub mod averages;
pub mod cli;
pub mod config;
pub mod data;
pub mod directory;
pub mod engine;
pub mod error;
pub mod grade_points;
pub mod input;
pub mod io_utils;
pub mod output;
pub mod partition;
pub mod rank;
pub mod records;
pub mod summary;
pub mod table;

use std::{env, sync::OnceLock};

use anyhow::{Context, Result, anyhow};
use clap::Parser;
use log::{LevelFilter, debug, info, warn};

use crate::{
    cli::{Cli, Commands, PreviewArgs, SourceArgs, StudentArgs, SummarizeArgs},
    config::{EngineConfig, FailurePolicy, ScanMode},
    data::{Value, format_number},
    engine::GradeEngine,
    input::InputOptions,
    output::OutputOptions,
    table::Align,
};

static LOGGER: OnceLock<()> = OnceLock::new();

fn init_logging() {
    LOGGER.get_or_init(|| {
        let mut builder = env_logger::Builder::from_env(env_logger::Env::default());
        if env::var("RUST_LOG").is_err() {
            builder.filter_module("grade_rank", LevelFilter::Info);
        }
        let _ = builder.format_timestamp_millis().try_init();
    });
}

pub fn run() -> Result<()> {
    init_logging();
    let cli = Cli::parse();
    match cli.command {
        Commands::Summarize(args) => handle_summarize(&args),
        Commands::Preview(args) => handle_preview(&args),
        Commands::Student(args) => handle_student(&args),
    }
}

/// Merges the YAML config (if any) with command-line overrides.
pub fn resolve_config(source: &SourceArgs) -> Result<EngineConfig> {
    let mut config = match &source.config {
        Some(path) => EngineConfig::load(path)?,
        None => EngineConfig::default(),
    };
    if !source.core.is_empty() {
        config.core_fragments = source.core.clone();
    }
    if let Some(marker) = &source.lab_marker {
        config.lab_marker = marker.clone();
    }
    if source.contiguous_scan {
        config.scan_mode = ScanMode::Contiguous;
    }
    if source.skip_invalid_students {
        config.on_unknown_grade = FailurePolicy::SkipStudent;
    }
    debug!("Engine config: {:?}", config);
    Ok(config)
}

fn load_engine(source: &SourceArgs) -> Result<GradeEngine> {
    let config = resolve_config(source)?;
    let options = InputOptions {
        delimiter: source.delimiter,
        encoding: io_utils::resolve_encoding(source.input_encoding.as_deref())?,
        header_row: source.header_row,
    };
    let records = input::read_grade_records(&source.input, &options)?;
    GradeEngine::new(records, config).context("Validating engine configuration")
}

fn handle_summarize(args: &SummarizeArgs) -> Result<()> {
    let engine = load_engine(&args.source)?;
    let ranked = engine.ranked().context("Computing student averages")?;
    let summary = engine.summary()?;
    if !summary.skipped.is_empty() {
        warn!(
            "{} student(s) left out of the ranking because of unknown letter grades",
            summary.skipped.len()
        );
    }

    let sheet = args.sheet.clone().unwrap_or_else(default_sheet_name);
    let options = OutputOptions {
        format: args.format,
        delimiter: args
            .output_delimiter
            .unwrap_or(io_utils::DEFAULT_CSV_DELIMITER),
        encoding: io_utils::resolve_encoding(args.output_encoding.as_deref())?,
    };
    let path = output::write_sheet(&args.output, &sheet, &ranked, &options)
        .with_context(|| format!("Writing sheet '{sheet}' to {:?}", args.output))?;
    info!(
        "Ranked {} student(s) over {} semester(s) -> {:?}",
        ranked.len(),
        summary.semesters.len(),
        path
    );
    Ok(())
}

fn handle_preview(args: &PreviewArgs) -> Result<()> {
    let engine = load_engine(&args.source)?;
    let ranked = engine.ranked().context("Computing student averages")?;
    print!("{}", table::render_ranked(&ranked, Some(args.rows)));
    info!(
        "Displayed {} of {} ranked student(s)",
        args.rows.min(ranked.len()),
        ranked.len()
    );
    Ok(())
}

fn handle_student(args: &StudentArgs) -> Result<()> {
    let engine = load_engine(&args.source)?;
    let profile = engine
        .profile(&args.id)
        .ok_or_else(|| anyhow!("Student '{}' not found in {:?}", args.id, args.source.input))?;
    let averages = engine.overall_average(&profile.student_id)?;
    let core = engine.core_average(&profile.student_id)?;

    let unknown = || "-".to_string();
    println!(
        "{} {} | {} | year {}",
        profile.student_id,
        profile.name.clone().unwrap_or_else(unknown),
        profile.department.clone().unwrap_or_else(unknown),
        profile.year_level.clone().unwrap_or_else(unknown)
    );
    println!();

    let headers = vec![
        "semester".to_string(),
        "average".to_string(),
        "credits".to_string(),
    ];
    let rows = averages
        .iter()
        .map(|semester| {
            vec![
                semester.key.to_string(),
                Value::Float(semester.average).as_display(),
                format_number(semester.total_credit),
            ]
        })
        .collect::<Vec<_>>();
    print!(
        "{}",
        table::render_table(&headers, &rows, &[Align::Left, Align::Right, Align::Right])
    );
    println!();

    let headers = vec!["core course".to_string(), "grade point credit".to_string()];
    let rows = core
        .courses
        .iter()
        .map(|course| vec![course.course_name.clone(), course.detail.clone()])
        .collect::<Vec<_>>();
    print!("{}", table::render_table(&headers, &rows, &[]));
    println!("core average: {}", Value::Float(core.average));
    Ok(())
}

fn default_sheet_name() -> String {
    chrono::Local::now().format("ranking_%Y%m%d").to_string()
}
