use anyhow::Result;
use argh::FromArgs;
use log::{Level, Log, Metadata, Record};
use stack_shell::config::{DEFAULT_CELL_SIZE, DEFAULT_SLOTS};
use stack_shell::{Config, EditorSource, Environment, ExternalRunner, Interpreter, ReaderSource};
use std::io::{self, IsTerminal};
use std::process::ExitCode;

#[derive(FromArgs)]
/// A stack calculator that runs programs.
///
/// Words are read from standard input a line at a time.
struct Args {
    #[argh(option, default = "DEFAULT_SLOTS")]
    /// number of cells the stack holds
    slots: usize,

    #[argh(option, default = "DEFAULT_CELL_SIZE")]
    /// size of a cell in bytes; one byte is reserved, so a value holds one less
    cell_size: usize,

    #[argh(switch)]
    /// read standard input without line editing
    plain: bool,

    #[argh(switch)]
    /// do not print the stack depth prompt
    no_prompt: bool,

    #[argh(switch, short = 'v')]
    /// log more, repeat for even more
    verbose: u8,
}

struct StderrLogger;

impl Log for StderrLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= log::max_level()
    }

    fn log(&self, record: &Record) {
        if self.enabled(record.metadata()) {
            eprintln!("[{}] {}", record.level(), record.args());
        }
    }

    fn flush(&self) {}
}

static LOGGER: StderrLogger = StderrLogger;

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => Level::Warn,
        1 => Level::Info,
        2 => Level::Debug,
        _ => Level::Trace,
    };
    if log::set_logger(&LOGGER).is_ok() {
        log::set_max_level(level.to_level_filter());
    }
}

fn main() -> ExitCode {
    let args: Args = argh::from_env();
    init_logging(args.verbose);

    let config = match Config::new(args.slots, args.cell_size) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("stacksh: {:#}", e);
            return ExitCode::from(2);
        }
    };

    match run(&args, config) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("stacksh: {:#}", e);
            ExitCode::FAILURE
        }
    }
}

fn run(args: &Args, config: Config) -> Result<()> {
    let mut sh = Interpreter::new(config, Environment::new(), Box::new(ExternalRunner));
    let prompt = !args.no_prompt;
    let mut out = io::stdout();
    let mut diag = io::stderr();

    if args.plain || !io::stdin().is_terminal() {
        log::debug!("reading plain lines from stdin");
        let mut source = ReaderSource::new(io::stdin().lock(), io::stdout(), prompt);
        sh.repl(&mut source, &mut out, &mut diag)
    } else {
        let mut source = EditorSource::new(prompt)?;
        sh.repl(&mut source, &mut out, &mut diag)
    }
}
