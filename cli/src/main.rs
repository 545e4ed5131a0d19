mod config;

use std::fs;
use std::path::{Path, PathBuf};

use argview_core::{ArgumentList, ArgumentViewer, FsLoader, expand, tokenize};
use clap::{Args, Parser, Subcommand};
use tracing::debug;
use tracing_subscriber::EnvFilter;

use crate::config::{CliConfig, OutputFormat};

#[derive(Debug, Parser)]
#[command(name = "argview")]
#[command(about = "Tokenize, check and document argument lists")]
struct Cli {
    /// YAML config file (default: .argview.yml when present).
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    /// Log debug output to stderr.
    #[arg(short, long, global = true)]
    verbose: bool,
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Expand `< file` includes and print the resulting tokens.
    Tokens(TokensArgs),
    /// Print the raw tokens of one argument file.
    Lex(LexArgs),
    /// Validate an argument list against a schema file.
    Check(CheckArgs),
    /// Print the usage listing of a schema file.
    Usage(UsageArgs),
}

#[derive(Debug, Args)]
struct TokensArgs {
    /// Output format (default: text, or the config's `format`).
    #[arg(long)]
    format: Option<OutputFormat>,
    /// Base directory for relative includes.
    #[arg(long)]
    include_dir: Option<PathBuf>,
    /// Arguments to expand; put them after `--`.
    #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
    args: Vec<String>,
}

#[derive(Debug, Args)]
struct LexArgs {
    /// Argument file to tokenize.
    input: PathBuf,
    /// Output format (default: text, or the config's `format`).
    #[arg(long)]
    format: Option<OutputFormat>,
}

#[derive(Debug, Args)]
struct CheckArgs {
    /// Schema file (JSON, or YAML by `.yaml`/`.yml` extension).
    #[arg(long)]
    schema: Option<PathBuf>,
    /// Base directory for relative includes.
    #[arg(long)]
    include_dir: Option<PathBuf>,
    /// Arguments to check; put them after `--`.
    #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
    args: Vec<String>,
}

#[derive(Debug, Args)]
struct UsageArgs {
    /// Schema file (JSON, or YAML by `.yaml`/`.yml` extension).
    #[arg(long)]
    schema: Option<PathBuf>,
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let result = CliConfig::resolve(cli.config.as_deref())
        .map_err(|err| err.to_string())
        .inspect(|config| debug!(version = %config.version, "loaded config"))
        .and_then(|config| match cli.command {
            Command::Tokens(args) => run_tokens(args, &config),
            Command::Lex(args) => run_lex(args, &config),
            Command::Check(args) => run_check(args, &config),
            Command::Usage(args) => run_usage(args, &config),
        });

    if let Err(err) = result {
        eprintln!("error: {err}");
        std::process::exit(1);
    }
}

fn init_tracing(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn loader_for(include_dir: Option<PathBuf>, config: &CliConfig) -> FsLoader {
    match include_dir.or_else(|| config.include_dir.clone()) {
        Some(dir) => FsLoader::with_base_dir(dir),
        None => FsLoader::new(),
    }
}

fn print_tokens(tokens: &[String], format: OutputFormat) -> Result<(), String> {
    match format {
        OutputFormat::Text => {
            for token in tokens {
                println!("{token}");
            }
        }
        OutputFormat::Json => {
            let raw = serde_json::to_string_pretty(tokens)
                .map_err(|err| format!("Failed to serialize tokens: {err}"))?;
            println!("{raw}");
        }
        OutputFormat::Yaml => {
            let raw = serde_yaml::to_string(tokens)
                .map_err(|err| format!("Failed to serialize tokens: {err}"))?;
            print!("{raw}");
        }
    }
    Ok(())
}

fn load_schema(path: &Path) -> Result<ArgumentList, String> {
    let raw = fs::read_to_string(path)
        .map_err(|err| format!("Failed to read '{}': {err}", path.display()))?;
    let is_yaml = matches!(
        path.extension().and_then(|ext| ext.to_str()),
        Some("yaml" | "yml")
    );
    let schema = if is_yaml {
        serde_yaml::from_str(&raw).map_err(|err| err.to_string())
    } else {
        ArgumentList::from_json(&raw).map_err(|err| err.to_string())
    };
    schema.map_err(|err| format!("Invalid schema '{}': {err}", path.display()))
}

fn schema_path(explicit: Option<PathBuf>, config: &CliConfig) -> Result<PathBuf, String> {
    explicit
        .or_else(|| config.schema.clone())
        .ok_or_else(|| "no schema given (use --schema or set `schema` in the config)".to_string())
}

fn run_tokens(args: TokensArgs, config: &CliConfig) -> Result<(), String> {
    let loader = loader_for(args.include_dir, config);
    let tokens = expand(args.args, &loader).map_err(|err| err.to_string())?;
    print_tokens(&tokens, args.format.unwrap_or(config.format))
}

fn run_lex(args: LexArgs, config: &CliConfig) -> Result<(), String> {
    let text = fs::read_to_string(&args.input)
        .map_err(|err| format!("Failed to read '{}': {err}", args.input.display()))?;
    let tokens = tokenize(&text);
    debug!(file = %args.input.display(), tokens = tokens.len(), "tokenized file");
    print_tokens(&tokens, args.format.unwrap_or(config.format))
}

fn run_check(args: CheckArgs, config: &CliConfig) -> Result<(), String> {
    let path = schema_path(args.schema, config)?;
    let schema = load_schema(&path)?;
    let loader = loader_for(args.include_dir, config);
    let tokens = expand(args.args, &loader).map_err(|err| err.to_string())?;

    let viewer = ArgumentViewer::with_schema("argview", tokens, schema);
    viewer.validate().map_err(|err| err.to_string())?;
    println!("ok: {} argument(s) matched", viewer.len());
    Ok(())
}

fn run_usage(args: UsageArgs, config: &CliConfig) -> Result<(), String> {
    let path = schema_path(args.schema, config)?;
    let schema = load_schema(&path)?;
    print!("{}", schema.usage());
    Ok(())
}
