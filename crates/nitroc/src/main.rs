//! The Nitro compiler CLI.
//!
//! Provides the `nitroc` command with the following subcommands:
//!
//! - `nitroc build <file>` - Compile a Nitro file to a Go program
//! - `nitroc check <file>` - Report errors without writing anything
//! - `nitroc emit <file>` - Print the generated Go source to stdout
//!
//! Options:
//! - `--out-dir` - Where `build` writes `main.go` and `go.mod`
//! - `--addr` - Listen address of the generated server
//! - `--database-url` - Postgres connection string of the generated server
//! - `--run` - Run the built program with the Go toolchain
//! - `--json` - Output diagnostics as JSON (one object per line)
//! - `--no-color` - Disable colorized output
//! - `-v` - More logging (repeatable); `NITRO_LOG` takes a filter directive

mod diagnostics;

use std::fs;
use std::path::{Path, PathBuf};
use std::process::{self, Command};

use clap::{ArgAction, Args, Parser, Subcommand};
use nitro_codegen::{GoOptions, GO_MOD};
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

use diagnostics::DiagnosticOptions;

#[derive(Parser)]
#[command(name = "nitroc", version, about = "The Nitro compiler")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Increase logging (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,
}

#[derive(Subcommand)]
enum Commands {
    /// Compile a Nitro file to a Go program
    Build {
        #[command(flatten)]
        input: Input,

        /// Output directory (default: `out` next to the input file)
        #[arg(long = "out-dir")]
        out_dir: Option<PathBuf>,

        /// Run `go mod tidy` and `go run .` in the output directory
        #[arg(long)]
        run: bool,
    },
    /// Parse and lower a Nitro file, reporting errors only
    Check {
        #[command(flatten)]
        input: Input,
    },
    /// Print the generated Go source to stdout
    Emit {
        #[command(flatten)]
        input: Input,
    },
}

#[derive(Args)]
struct Input {
    /// Path to the Nitro source file
    file: PathBuf,

    /// Listen address baked into the generated server
    #[arg(long, env = "NITRO_ADDR")]
    addr: Option<String>,

    /// Postgres connection string baked into the generated server
    #[arg(long = "database-url", env = "NITRO_DATABASE_URL")]
    database_url: Option<String>,

    /// Output diagnostics as JSON (one object per line) instead of human-readable format
    #[arg(long)]
    json: bool,

    /// Disable colorized output
    #[arg(long = "no-color")]
    no_color: bool,
}

impl Input {
    fn go_options(&self) -> GoOptions {
        let defaults = GoOptions::default();
        GoOptions {
            listen_addr: self.addr.clone().unwrap_or(defaults.listen_addr),
            database_url: self.database_url.clone().unwrap_or(defaults.database_url),
        }
    }

    fn diagnostic_options(&self) -> DiagnosticOptions {
        DiagnosticOptions {
            color: !self.no_color && !self.json,
            json: self.json,
        }
    }
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let (input, result) = match &cli.command {
        Commands::Build {
            input,
            out_dir,
            run,
        } => (input, build(input, out_dir.as_deref(), *run)),
        Commands::Check { input } => (input, check(input)),
        Commands::Emit { input } => (input, emit(input)),
    };

    match result {
        Ok(0) => {}
        Ok(status) => process::exit(status),
        Err(e) => {
            if input.json {
                // In JSON mode, emit the final error as JSON too.
                let msg = serde_json::json!({
                    "code": "C0001",
                    "severity": "error",
                    "message": e,
                    "file": input.file.display().to_string(),
                    "spans": [],
                });
                eprintln!("{}", msg);
            } else {
                eprintln!("error: {}", e);
            }
            process::exit(1);
        }
    }
}

/// `-v` flags win over `NITRO_LOG`; without either only warnings show.
fn init_logging(verbose: u8) {
    let filter = match verbose {
        0 => EnvFilter::try_from_env("NITRO_LOG").unwrap_or_else(|_| EnvFilter::new("warn")),
        1 => EnvFilter::new("info"),
        2 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"),
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .without_time()
        .init();
}

fn read_source(path: &Path) -> Result<String, String> {
    fs::read_to_string(path).map_err(|e| format!("Failed to read '{}': {}", path.display(), e))
}

/// Run the pipeline, reporting any failure before turning it into the
/// summary error `main` prints.
fn compile(input: &Input, source: &str) -> Result<String, String> {
    nitro_codegen::compile(source, &input.go_options()).map_err(|err| {
        diagnostics::report(source, &input.file, &err, &input.diagnostic_options());
        "Compilation failed due to errors above.".to_string()
    })
}

/// Execute the build pipeline: read -> compile -> write `main.go` and
/// `go.mod` -> optionally run.
fn build(input: &Input, out_dir: Option<&Path>, run: bool) -> Result<i32, String> {
    let source = read_source(&input.file)?;
    let go = compile(input, &source)?;

    let out_dir = match out_dir {
        Some(dir) => dir.to_path_buf(),
        None => input
            .file
            .parent()
            .unwrap_or_else(|| Path::new("."))
            .join("out"),
    };
    fs::create_dir_all(&out_dir)
        .map_err(|e| format!("Failed to create '{}': {}", out_dir.display(), e))?;

    let main_go = out_dir.join("main.go");
    for (path, contents) in [(&main_go, go.as_str()), (&out_dir.join("go.mod"), GO_MOD)] {
        fs::write(path, contents)
            .map_err(|e| format!("Failed to write '{}': {}", path.display(), e))?;
        debug!(path = %path.display(), bytes = contents.len(), "wrote file");
    }
    eprintln!("  Compiled: {}", main_go.display());

    if run {
        return run_go(&out_dir);
    }
    Ok(0)
}

fn check(input: &Input) -> Result<i32, String> {
    let source = read_source(&input.file)?;
    let lowered = nitro_codegen::parse_module(&source)
        .and_then(|module| Ok(nitro_codegen::lower(&module)?));
    if let Err(err) = lowered {
        diagnostics::report(&source, &input.file, &err, &input.diagnostic_options());
        return Err("Compilation failed due to errors above.".to_string());
    }
    eprintln!("  Checked: {}", input.file.display());
    Ok(0)
}

fn emit(input: &Input) -> Result<i32, String> {
    let source = read_source(&input.file)?;
    print!("{}", compile(input, &source)?);
    Ok(0)
}

/// `go mod tidy`, then `go run .` with inherited stdio. A failing step's
/// exit status is returned for `main` to exit with.
fn run_go(dir: &Path) -> Result<i32, String> {
    for args in [&["mod", "tidy"][..], &["run", "."][..]] {
        info!(dir = %dir.display(), "go {}", args.join(" "));
        let status = Command::new("go")
            .args(args)
            .current_dir(dir)
            .status()
            .map_err(|e| format!("Failed to run `go {}`: {}", args.join(" "), e))?;
        if !status.success() {
            return Ok(status.code().unwrap_or(1));
        }
    }
    Ok(0)
}
