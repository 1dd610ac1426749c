mod cli;
mod history;
mod terminal_prompter;
mod text_buffer;

use std::io::BufRead;
use std::io::IsTerminal;
use std::io::Write;

pub use cli::Cli;
pub use cli::Color;
pub use cli::HistoryCommand;
pub use cli::Subcommand;
use owo_colors::OwoColorize;
use shell_filter_core::CommandHistory;
use shell_filter_core::CommandPicker;
use shell_filter_core::FilterErr;
use shell_filter_core::HistoryEntry;
use shell_filter_core::PromptPicker;
use shell_filter_core::config::Config;
use shell_filter_core::config::ConfigOverrides;
use shell_filter_core::config_types::HistoryPersistence;
use shell_filter_core::run_shell_filter;
pub use terminal_prompter::TerminalPrompter;
pub use text_buffer::LineRange;
pub use text_buffer::TextBuffer;
use tracing::debug;
use tracing_subscriber::EnvFilter;

/// Initialize the global logger once at startup based on the `--verbose` flag.
fn init_logger(verbose: u8, allow_ansi: bool) {
    // Map -v occurrences to explicit log levels:
    //   0 → error (default)
    //   1 → info
    //   2 → debug
    //   ≥3 → trace
    let default_level = match verbose {
        0 => "error",
        1 => "info",
        2 => "shell_filter_core=debug,shell_filter_cli=debug",
        _ => "shell_filter_core=trace,shell_filter_cli=trace",
    };

    // Logs go to stderr so they never mix with the filtered text on stdout.
    // `try_init` fails if something else installed a subscriber first, which
    // we can safely ignore.
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(default_level))
        .unwrap_or_else(|_| EnvFilter::new("error"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_ansi(allow_ansi)
        .with_writer(std::io::stderr)
        .try_init();
}

pub async fn run_main(mut cli: Cli) -> anyhow::Result<()> {
    // Initialize logging before any other work so early errors are captured.
    init_logger(cli.verbose, !cli.no_ansi);

    let color = match cli.color {
        Color::Always => true,
        Color::Never => false,
        Color::Auto => std::io::stderr().is_terminal(),
    };

    let config = Config::load_with_overrides(config_overrides(&cli)?)?;
    debug!("history file: {}", config.history_file.display());

    match cli.subcommand.take() {
        Some(Subcommand::History(history_cli)) => {
            history::run_history_command(history_cli, &config)?;
        }
        None => {
            if let Err(err) = run_filter(cli, &config, color).await {
                report(&err, color);
                std::process::exit(1);
            }
        }
    }

    Ok(())
}

fn config_overrides(cli: &Cli) -> anyhow::Result<ConfigOverrides> {
    let shell = match &cli.config.shell {
        Some(raw) => {
            let parts = shlex::split(raw)
                .ok_or_else(|| anyhow::anyhow!("could not parse --shell value `{raw}`"))?;
            if parts.is_empty() {
                anyhow::bail!("--shell must name a program");
            }
            Some(parts)
        }
        None => None,
    };

    Ok(ConfigOverrides {
        history_file: cli.config.history_file.clone(),
        shell,
        history_persistence: cli.config.no_history.then_some(HistoryPersistence::None),
    })
}

/// One filter run over stdin or `--file`, printing the result or writing it
/// back in place.
async fn run_filter(cli: Cli, config: &Config, color: bool) -> anyhow::Result<()> {
    let Cli {
        command,
        file,
        lines,
        in_place,
        ..
    } = cli;

    let text = match &file {
        Some(path) => std::fs::read_to_string(path)
            .map_err(|e| anyhow::anyhow!("failed to read {}: {e}", path.display()))?,
        None => std::io::read_to_string(std::io::stdin())?,
    };
    let mut buffer = match lines {
        Some(range) => TextBuffer::select_lines(text, range)?,
        None => TextBuffer::select_all(text),
    };

    let mut history = CommandHistory::load(config);
    let mut picker: Box<dyn CommandPicker> = match command {
        Some(command) => Box::new(PresetCommand(Some(command))),
        None => {
            // stdin already carries the text unless it came from --file.
            let reader = if file.is_some() {
                Box::new(std::io::stdin().lock()) as Box<dyn BufRead>
            } else {
                open_terminal()?
            };
            Box::new(PromptPicker::new(TerminalPrompter::new(
                reader,
                std::io::stderr(),
                color,
            )))
        }
    };

    let outcome = run_shell_filter(&mut buffer, picker.as_mut(), &mut history, config).await?;
    debug!("replaced selection using {:?}", outcome.command);

    match (in_place, &file) {
        (true, Some(path)) => std::fs::write(path, buffer.text())
            .map_err(|e| anyhow::anyhow!("failed to write {}: {e}", path.display()))?,
        _ => {
            let mut stdout = std::io::stdout().lock();
            stdout.write_all(buffer.text().as_bytes())?;
            stdout.flush()?;
        }
    }

    Ok(())
}

/// Picker that always answers with the command given on the command line.
struct PresetCommand(Option<String>);

impl CommandPicker for PresetCommand {
    fn pick_command(&mut self, _history: &[HistoryEntry]) -> Option<String> {
        self.0.take()
    }
}

#[cfg(unix)]
fn open_terminal() -> anyhow::Result<Box<dyn BufRead>> {
    use std::io::BufReader;

    let tty = std::fs::File::open("/dev/tty").map_err(|e| {
        anyhow::anyhow!("no terminal available to pick a command ({e}); pass COMMAND instead")
    })?;
    Ok(Box::new(BufReader::new(tty)))
}

#[cfg(not(unix))]
fn open_terminal() -> anyhow::Result<Box<dyn BufRead>> {
    anyhow::bail!("reading text from stdin requires COMMAND on this platform; or use --file")
}

fn report(err: &anyhow::Error, color: bool) {
    let message = err.to_string();
    let cancelled = err
        .downcast_ref::<FilterErr>()
        .is_some_and(FilterErr::is_cancellation);
    match (color, cancelled) {
        (false, _) => eprintln!("{message}"),
        (true, true) => eprintln!("{}", message.yellow()),
        (true, false) => eprintln!("{}", message.red()),
    }
}
