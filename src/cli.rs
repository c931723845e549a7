use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};
use colored::Colorize;
use tracing::{debug, info};

use crate::config::Config;
use crate::filer::FsFiler;
use crate::lexer::{LexerError, tokenize};
use crate::parser::{ParserError, parse};
use crate::processor::{MarkerTable, Processor, Round, SignatureCollector, SourceUnit};
use crate::stub::StubFormat;
use crate::utils::errors::{Diagnostic, emit_diagnostic, emit_diagnostics};
use crate::utils::logger;
use crate::utils::profiler::{PhaseTiming, Profiler};
use crate::version::VERSION;

#[derive(Parser, Debug)]
#[command(name = "rmistub", version = VERSION, about = "HTTP-RMI client stub generator")]
pub struct RmiStubCli {
    #[arg(long, global = true)]
    /// Configuration file; defaults to ./rmistub.yaml when present.
    config: Option<PathBuf>,

    #[arg(long, global = true)]
    /// Dump the token stream of every source before parsing.
    dump_tokens: bool,

    #[arg(long, global = true)]
    /// Dump the parsed declarations of every source.
    dump_ast: bool,

    #[arg(long, global = true)]
    /// Display phase timing information.
    time: bool,

    #[command(subcommand)]
    command: Command,
}

impl RmiStubCli {
    pub fn command(&self) -> &Command {
        &self.command
    }
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Generates one stub per remote class found in the given sources or directories.
    Generate {
        #[arg(required = true)]
        inputs: Vec<PathBuf>,
        #[arg(short, long)]
        /// Output directory, overriding the configured one.
        output: Option<PathBuf>,
        #[arg(long, value_enum)]
        format: Option<StubFormat>,
        #[arg(long)]
        /// File extension for generated stubs.
        extension: Option<String>,
        #[arg(long)]
        /// Skip writing the dependency manifest.
        no_manifest: bool,
    },
    /// Prints the collected remote classes without writing anything.
    Inspect {
        #[arg(required = true)]
        inputs: Vec<PathBuf>,
    },
}

pub fn run() -> Result<()> {
    logger::init_logging();
    let cli = RmiStubCli::parse();
    let config = Config::load(cli.config.as_deref())?;
    debug!(?config, "resolved configuration");

    match &cli.command {
        Command::Generate {
            inputs,
            output,
            format,
            extension,
            no_manifest,
        } => {
            let options = GenerateOptions {
                output_dir: output.clone().unwrap_or_else(|| config.output_dir.clone()),
                format: format.unwrap_or(config.format),
                extension: extension.clone().or_else(|| config.extension.clone()),
                manifest: config.manifest && !no_manifest,
            };
            handle_generate(&cli, &config, inputs, &options)
        }
        Command::Inspect { inputs } => handle_inspect(&cli, &config, inputs),
    }
}

struct GenerateOptions {
    output_dir: PathBuf,
    format: StubFormat,
    extension: Option<String>,
    manifest: bool,
}

fn handle_generate(
    cli: &RmiStubCli,
    config: &Config,
    inputs: &[PathBuf],
    options: &GenerateOptions,
) -> Result<()> {
    let mut profiler = Profiler::new();
    let round = load_round(cli, inputs, &mut profiler)?;

    let serializer = options.format.serializer(options.extension.as_deref());
    let markers = MarkerTable::from_config(&config.markers);
    let mut filer = FsFiler::new(&options.output_dir);

    let report = profiler.record_phase("Processing", || {
        Processor::new(markers, &mut filer, serializer.as_ref()).process(&round)
    });
    emit_round_diagnostics(&round, &report.diagnostics);

    for class in &report.classes {
        match (&class.location, class.is_ok()) {
            (Some(location), true) => println!(
                "{} {} ({} methods)",
                "generated".green().bold(),
                location.display(),
                class.methods
            ),
            _ => {
                println!("{} {}", "failed".red().bold(), class.qualified_name);
                for err in &class.errors {
                    println!("    {err}");
                }
            }
        }
    }

    if options.manifest && !filer.generated().is_empty() {
        let manifest = profiler.record_phase("Manifest", || filer.write_manifest(VERSION))?;
        info!(manifest = %manifest.display(), "wrote dependency manifest");
    }

    let emitted = report.emitted().count();
    let failed = report.failed().count();
    println!(
        "{} {emitted} stub(s) into {} from {} source(s)",
        "done".bold(),
        options.output_dir.display(),
        round.units().len()
    );

    if cli.time {
        print_timings(&profiler);
    }

    if failed > 0 {
        bail!("{failed} stub(s) failed to generate");
    }
    Ok(())
}

fn handle_inspect(cli: &RmiStubCli, config: &Config, inputs: &[PathBuf]) -> Result<()> {
    let mut profiler = Profiler::new();
    let round = load_round(cli, inputs, &mut profiler)?;

    let markers = MarkerTable::from_config(&config.markers);
    let collection =
        profiler.record_phase("Collecting", || SignatureCollector::new(&markers).collect(&round));
    emit_round_diagnostics(&round, &collection.diagnostics);

    if collection.classes.is_empty() {
        println!("{}", "no remote classes found".yellow());
    }
    for collected in &collection.classes {
        println!(
            "{} {}",
            collected.class.qualified_name().bold(),
            format!("({})", collected.origin.source.display()).dimmed()
        );
        for method in collected.class.methods() {
            let params: Vec<String> = method
                .parameters()
                .iter()
                .map(|param| format!("{} {}", param.ty, param.name))
                .collect();
            let mut line = format!(
                "    {}({}) -> {}",
                method.name().cyan(),
                params.join(", "),
                method.return_type()
            );
            if !method.exceptions().is_empty() {
                line.push_str(&format!(" throws {}", method.exceptions().join(", ")));
            }
            println!("{line}");
        }
    }

    if cli.time {
        print_timings(&profiler);
    }
    Ok(())
}

fn load_round(cli: &RmiStubCli, inputs: &[PathBuf], profiler: &mut Profiler) -> Result<Round> {
    let paths = profiler.record_phase("Discovery", || discover_sources(inputs))?;
    let mut units = Vec::with_capacity(paths.len());
    let mut lexing_failed = false;
    let mut parsing_failed = false;

    for path in paths {
        let source = read_source(&path)?;
        let source_id = path.display().to_string();

        let tokens = match profiler.record_phase("Lexing", || tokenize(&source)) {
            Ok(tokens) => tokens,
            Err(errors) => {
                emit_lexer_errors(&source_id, &source, &errors);
                lexing_failed = true;
                continue;
            }
        };

        if cli.dump_tokens {
            println!("{} {}", "== Tokens ==".bold(), source_id);
            for token in &tokens {
                println!("{:?} @ {:?}", token.kind, token.span);
            }
        }

        let unit = match profiler.record_phase("Parsing", || parse(&tokens)) {
            Ok(unit) => unit,
            Err(errors) => {
                emit_parser_errors(&source_id, &source, &errors);
                parsing_failed = true;
                continue;
            }
        };

        if cli.dump_ast {
            println!("{} {}", "== AST ==".bold(), source_id);
            println!("{unit:#?}");
        }

        units.push(SourceUnit::new(path, source, unit));
    }

    if lexing_failed {
        bail!("lexing failed");
    }
    if parsing_failed {
        bail!("parsing failed");
    }

    debug!(units = units.len(), "round loaded");
    Ok(Round::new(units))
}

/// Expands directories to the `.java` files below them. Module descriptors
/// declare no types and are left out.
pub fn discover_sources(inputs: &[PathBuf]) -> Result<Vec<PathBuf>> {
    let mut sources = Vec::new();
    for input in inputs {
        if input.is_dir() {
            let pattern = input.join("**").join("*.java");
            let pattern = pattern.to_string_lossy();
            for entry in glob::glob(&pattern)
                .with_context(|| format!("invalid source pattern {pattern}"))?
            {
                let path = entry.context("failed to read source directory entry")?;
                sources.push(path);
            }
        } else if input.is_file() {
            sources.push(input.clone());
        } else {
            bail!("input {} does not exist", input.display());
        }
    }

    sources.retain(|path| path.file_name().is_none_or(|name| name != "module-info.java"));
    sources.sort();
    sources.dedup();
    Ok(sources)
}

fn read_source(path: &Path) -> Result<String> {
    fs::read_to_string(path).with_context(|| format!("failed to read {}", path.display()))
}

fn print_timings(profiler: &Profiler) {
    println!("{}", "[Timing]".bold());
    for PhaseTiming { name, duration } in profiler.phases() {
        println!("{name:>16}: {:>8.2} ms", duration.as_secs_f64() * 1000.0);
    }
    println!(
        "{:>16}: {:>8.2} ms",
        "Total",
        profiler.total().as_secs_f64() * 1000.0
    );
}

fn emit_round_diagnostics(round: &Round, diagnostics: &[Diagnostic]) {
    for diagnostic in diagnostics {
        if let Some(unit) = round.unit_for(diagnostic.source_id()) {
            emit_diagnostic(diagnostic, &unit.source);
        }
    }
}

fn emit_lexer_errors(source_id: &str, source: &str, errors: &[LexerError]) {
    let diagnostics: Vec<Diagnostic> = errors
        .iter()
        .map(|err| err.to_diagnostic(source_id))
        .collect();
    emit_diagnostics(&diagnostics, source);
}

fn emit_parser_errors(source_id: &str, source: &str, errors: &[ParserError]) {
    let diagnostics: Vec<Diagnostic> = errors
        .iter()
        .map(|err| err.to_diagnostic(source_id))
        .collect();
    emit_diagnostics(&diagnostics, source);
}
