//! PL/CSQL CLI - Command line interface for the PL/CSQL translator

use std::fs;
use std::path::{Path, PathBuf};

use ariadne::{Color, Label, Report, ReportKind, Source};
use clap::{Parser, Subcommand};
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

use plcsql::{collect_unit_files, load_unit, translate, TranslateError};
use plcsql_ast::printer::ToPlcsql;
use plcsql_ast::{DeclKind, RoutineKind, Unit};
use plcsql_checker::{check, RejectingOracle, SqlSemanticsOracle, StaticOracle};
use plcsql_codegen::CodegenOptions;
use plcsql_symbols::{resolve, OperatorTable};

#[derive(Parser)]
#[command(name = "plcsql")]
#[command(about = "PL/CSQL to Java translator", long_about = None)]
struct Cli {
    /// Log every pass at debug level
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Resolve and type check units
    Check {
        /// Unit files or directories of them
        #[arg(required = true)]
        inputs: Vec<PathBuf>,
        /// JSON table of SQL semantics
        #[arg(long)]
        oracle: Option<PathBuf>,
        /// PL/CSQL source the units were parsed from, for diagnostics
        #[arg(long)]
        source: Option<PathBuf>,
    },
    /// Translate units to Java classes
    Compile {
        /// Unit files or directories of them
        #[arg(required = true)]
        inputs: Vec<PathBuf>,
        /// JSON table of SQL semantics
        #[arg(long)]
        oracle: Option<PathBuf>,
        /// JSON code generation options
        #[arg(long)]
        config: Option<PathBuf>,
        /// Output directory, defaults to the directory of each input
        #[arg(short, long)]
        output: Option<PathBuf>,
        /// Also write the code range markers of each class
        #[arg(long)]
        markers: bool,
    },
    /// Print a unit as PL/CSQL text
    Print {
        /// Unit file
        input: PathBuf,
    },
    /// Show a summary of a unit
    Info {
        /// Unit file
        input: PathBuf,
    },
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let ok = match cli.command {
        Commands::Check {
            inputs,
            oracle,
            source,
        } => cmd_check(&inputs, oracle.as_deref(), source.as_deref()),
        Commands::Compile {
            inputs,
            oracle,
            config,
            output,
            markers,
        } => cmd_compile(
            &inputs,
            oracle.as_deref(),
            config.as_deref(),
            output.as_deref(),
            markers,
        ),
        Commands::Print { input } => cmd_print(&input),
        Commands::Info { input } => cmd_info(&input),
    };

    if !ok {
        std::process::exit(1);
    }
}

fn init_logging(verbose: bool) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(if verbose { "debug" } else { "info" }));
    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .finish();
    if let Err(e) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("Cannot install logger: {}", e);
    }
}

fn cmd_check(inputs: &[PathBuf], oracle: Option<&Path>, source: Option<&Path>) -> bool {
    let Some(oracle) = load_oracle(oracle) else {
        return false;
    };
    let source = match source.map(|path| read(path).map(|text| (path, text))) {
        Some(None) => return false,
        Some(Some(source)) => Some(source),
        None => None,
    };
    let Some(files) = unit_files(inputs) else {
        return false;
    };

    let mut all_ok = true;
    for file in &files {
        let Some(unit) = load(file) else {
            all_ok = false;
            continue;
        };
        let checked = resolve(&unit)
            .map_err(TranslateError::from)
            .and_then(|resolution| {
                check(&unit, &resolution, OperatorTable::shared(), oracle.as_ref())
                    .map(|decorations| (resolution, decorations))
                    .map_err(TranslateError::from)
            });
        match checked {
            Ok((resolution, decorations)) => {
                println!(
                    "✓ {} - {} {} ({} symbols{})",
                    file.display(),
                    unit.routine.kind.keyword().to_ascii_lowercase(),
                    unit.routine.name,
                    resolution.len(),
                    if decorations.uses_connection() { ", uses SQL" } else { "" }
                );
            }
            Err(e) => {
                report_error(file, source.as_ref().map(|(p, t)| (*p, t.as_str())), &e);
                all_ok = false;
            }
        }
    }
    all_ok
}

fn cmd_compile(
    inputs: &[PathBuf],
    oracle: Option<&Path>,
    config: Option<&Path>,
    output: Option<&Path>,
    markers: bool,
) -> bool {
    let Some(oracle) = load_oracle(oracle) else {
        return false;
    };
    let options = match config {
        Some(path) => {
            let Some(text) = read(path) else {
                return false;
            };
            match serde_json::from_str::<CodegenOptions>(&text) {
                Ok(options) => options,
                Err(e) => {
                    eprintln!("Invalid config {}: {}", path.display(), e);
                    return false;
                }
            }
        }
        None => CodegenOptions::default(),
    };
    debug!(?options, "code generation options");
    let Some(files) = unit_files(inputs) else {
        return false;
    };

    let mut all_ok = true;
    for file in &files {
        let Some(unit) = load(file) else {
            all_ok = false;
            continue;
        };
        let translation = match translate(unit, oracle.as_ref(), &options) {
            Ok(t) => t,
            Err(e) => {
                report_error(file, None, &e);
                all_ok = false;
                continue;
            }
        };

        let dir = match output {
            Some(dir) => dir.to_path_buf(),
            None => file.parent().map(Path::to_path_buf).unwrap_or_default(),
        };
        if let Err(e) = fs::create_dir_all(&dir) {
            eprintln!("Error creating {}: {}", dir.display(), e);
            all_ok = false;
            continue;
        }

        let java = &translation.java;
        let out_path = dir.join(format!("{}.java", java.class_name));
        if let Err(e) = fs::write(&out_path, java.source()) {
            eprintln!("Error writing {}: {}", out_path.display(), e);
            all_ok = false;
            continue;
        }
        if markers {
            let markers_path = dir.join(format!("{}.markers", java.class_name));
            if let Err(e) = fs::write(&markers_path, &java.markers) {
                eprintln!("Error writing {}: {}", markers_path.display(), e);
                all_ok = false;
                continue;
            }
        }
        info!(
            "Compiled {} to {} ({} lines)",
            file.display(),
            out_path.display(),
            java.lines.len()
        );
    }
    all_ok
}

fn cmd_print(input: &Path) -> bool {
    match load(input) {
        Some(unit) => {
            print!("{}", unit.to_plcsql(0));
            true
        }
        None => false,
    }
}

fn cmd_info(input: &Path) -> bool {
    let Some(unit) = load(input) else {
        return false;
    };
    let routine = &unit.routine;

    println!("File: {}", input.display());
    println!();
    println!("{} {}", routine.kind.keyword(), routine.name);
    println!("  class: {}", unit.class_name());
    if routine.params.is_empty() {
        println!("  parameters: none");
    } else {
        println!("  parameters:");
        for param in &routine.params {
            println!("    {}", param.to_plcsql(0));
        }
    }
    if let Some(ret) = &routine.ret_type {
        println!("  returns: {}", ret.to_plcsql(0));
    }
    if unit.autonomous_transaction {
        println!("  autonomous transaction");
    }

    let locals: Vec<_> = routine
        .decls
        .iter()
        .filter_map(|d| match &d.kind {
            DeclKind::Procedure(r) | DeclKind::Function(r) => Some(r.name.as_str()),
            _ => None,
        })
        .collect();
    println!(
        "  declarations: {} ({} local routines)",
        routine.decls.len(),
        locals.len()
    );
    if !locals.is_empty() {
        println!("    local: {}", locals.join(", "));
    }
    if !unit.external_routines.is_empty() {
        let externals: Vec<_> = unit
            .external_routines
            .iter()
            .map(|r| match r.kind {
                RoutineKind::Procedure => format!("{} (procedure)", r.name),
                RoutineKind::Function => format!("{} (function)", r.name),
            })
            .collect();
        println!("  external: {}", externals.join(", "));
    }

    match resolve(&unit) {
        Ok(resolution) => {
            println!("  symbols: {}", resolution.len());
            true
        }
        Err(e) => {
            report_error(input, None, &TranslateError::from(e));
            false
        }
    }
}

fn read(path: &Path) -> Option<String> {
    match fs::read_to_string(path) {
        Ok(s) => Some(s),
        Err(e) => {
            eprintln!("Error reading {}: {}", path.display(), e);
            None
        }
    }
}

fn load(file: &Path) -> Option<Unit> {
    match load_unit(file) {
        Ok(unit) => Some(unit),
        Err(e) => {
            eprintln!("{}", e);
            None
        }
    }
}

fn unit_files(inputs: &[PathBuf]) -> Option<Vec<PathBuf>> {
    match collect_unit_files(inputs) {
        Ok(files) if files.is_empty() => {
            eprintln!("No unit files found");
            None
        }
        Ok(files) => {
            debug!(count = files.len(), "unit files");
            Some(files)
        }
        Err(e) => {
            eprintln!("{}", e);
            None
        }
    }
}

fn load_oracle(path: Option<&Path>) -> Option<Box<dyn SqlSemanticsOracle>> {
    let Some(path) = path else {
        return Some(Box::new(RejectingOracle));
    };
    let text = read(path)?;
    match StaticOracle::from_json(&text) {
        Ok(oracle) => Some(Box::new(oracle)),
        Err(e) => {
            eprintln!("Invalid oracle table {}: {}", path.display(), e);
            None
        }
    }
}

fn report_error(file: &Path, source: Option<(&Path, &str)>, error: &TranslateError) {
    let pos = error.pos();
    let (Some((src_path, text)), false) = (source, pos.is_ignored()) else {
        eprintln!(
            "{}:{}:{}: error[{}]: {}",
            file.display(),
            pos.line,
            pos.column,
            error.code(),
            error
        );
        return;
    };

    let name = src_path.to_string_lossy().to_string();
    let offset = char_offset(text, pos.line as usize, pos.column as usize);
    let printed = Report::build(ReportKind::Error, name.clone(), offset)
        .with_code(error.code())
        .with_message(error.to_string())
        .with_label(
            Label::new((name.clone(), offset..offset + 1))
                .with_message(error.to_string())
                .with_color(Color::Red),
        )
        .finish()
        .eprint((name, Source::from(text)));
    if let Err(e) = printed {
        eprintln!("Cannot print diagnostic: {}", e);
    }
}

/// Character offset of a 1-based line and column, clamped to the text.
fn char_offset(text: &str, line: usize, column: usize) -> usize {
    let mut offset = 0;
    for (i, l) in text.split_inclusive('\n').enumerate() {
        if i + 1 == line {
            return offset + (column - 1).min(l.chars().count());
        }
        offset += l.chars().count();
    }
    offset
}
