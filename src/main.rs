use anyhow::{Context as _, Result};
use clap::Parser;
use esparse::{Options, ParseError, Program};
use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "esparse", version, about = "Parse JavaScript and print its ESTree AST as JSON")]
struct Cli {
    /// JavaScript file to parse
    file: Option<PathBuf>,

    /// Parse inline source
    #[arg(short = 'e', long = "eval")]
    eval: Option<String>,

    /// Parse with the module goal
    #[arg(long)]
    module: bool,

    /// Attach line/column locations
    #[arg(long)]
    loc: bool,

    /// Attach `range` arrays
    #[arg(long)]
    ranges: bool,

    /// Attach raw literal text
    #[arg(long)]
    raw: bool,

    /// Attach `directive` to directive prologues
    #[arg(long)]
    directives: bool,

    /// Enable the opt-in web-compatibility extensions
    #[arg(long)]
    web_compat: bool,

    /// Disable every web-compatibility allowance
    #[arg(long)]
    disable_web_compat: bool,

    /// Start in strict mode
    #[arg(long)]
    implied_strict: bool,

    /// Print JSON on a single line
    #[arg(long)]
    compact: bool,
}

impl Cli {
    fn options(&self) -> Options {
        Options {
            module: self.module,
            loc: self.loc,
            ranges: self.ranges,
            raw: self.raw,
            directives: self.directives,
            web_compat: self.web_compat,
            disable_web_compat: self.disable_web_compat,
            implied_strict: self.implied_strict,
            ..Options::default()
        }
    }
}

fn init_logging() {
    let filter = std::env::var("ESPARSE_LOG").or_else(|_| std::env::var("RUST_LOG"));
    if let Ok(filter) = filter {
        tracing_subscriber::fmt()
            .with_env_filter(EnvFilter::new(filter))
            .with_writer(io::stderr)
            .init();
    }
}

fn to_json(program: &Program, compact: bool) -> Result<String> {
    let json = if compact {
        serde_json::to_string(program)?
    } else {
        serde_json::to_string_pretty(program)?
    };
    Ok(json)
}

/// Prints the tree, or the error on stderr.
fn print_result(result: std::result::Result<Program, ParseError>, compact: bool) -> Result<bool> {
    match result {
        Ok(program) => {
            println!("{}", to_json(&program, compact)?);
            Ok(true)
        }
        Err(err) => {
            eprintln!("{err}");
            Ok(false)
        }
    }
}

fn run_repl(cli: &Cli) -> Result<()> {
    let stdin = io::stdin();
    let mut stdout = io::stdout();

    println!("esparse v{}", env!("CARGO_PKG_VERSION"));
    println!("Type JavaScript to see its syntax tree. Press Ctrl-D to exit.");

    loop {
        print!("> ");
        stdout.flush()?;

        let mut line = String::new();
        if stdin.lock().read_line(&mut line)? == 0 {
            break;
        }
        let trimmed = line.trim();
        if !trimmed.is_empty() {
            print_result(esparse::parse(trimmed, cli.options()), cli.compact)?;
        }
    }
    Ok(())
}

fn run(cli: &Cli) -> Result<bool> {
    let source = if let Some(code) = &cli.eval {
        code.clone()
    } else if let Some(path) = &cli.file {
        std::fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?
    } else {
        run_repl(cli)?;
        return Ok(true);
    };
    print_result(esparse::parse(&source, cli.options()), cli.compact)
}

/// Stack for the parsing thread, enough for the deepest nesting the parser
/// accepts in an unoptimized build.
const PARSER_STACK_SIZE: usize = 64 * 1024 * 1024;

fn main() -> ExitCode {
    init_logging();
    let cli = Cli::parse();
    let outcome = std::thread::Builder::new()
        .name("parser".into())
        .stack_size(PARSER_STACK_SIZE)
        .spawn(move || run(&cli))
        .context("spawning parser thread")
        .and_then(|handle| {
            handle
                .join()
                .map_err(|_| anyhow::anyhow!("parser thread panicked"))?
        });
    match outcome {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::from(1),
        Err(err) => {
            eprintln!("Error: {err:#}");
            ExitCode::from(1)
        }
    }
}
