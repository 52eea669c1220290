use std::io::IsTerminal;

use env_logger::Env;
use log::warn;
use structopt::StructOpt;
use termcolor::ColorChoice;

use blame_todo::{
    clock::SystemClock,
    config::{ColorMode, Config, Opt},
    console_emitter::ColoredWriter,
};

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(Env::default().default_filter_or("warn")).init();

    let config = Config::from_opt(Opt::from_args())?;

    let choice = match config.color {
        ColorMode::Always => ColorChoice::Always,
        ColorMode::Never => ColorChoice::Never,
        ColorMode::Auto if std::io::stdout().is_terminal() => ColorChoice::Auto,
        ColorMode::Auto => ColorChoice::Never,
    };
    let mut stdout = ColoredWriter::stdout(choice);

    let summary = blame_todo::run(&config, &SystemClock, &mut stdout)?;
    if summary.skipped > 0 {
        warn!(
            "{} TODO(s) had no blame data and were left out (use --strict to fail instead)",
            summary.skipped
        );
    }

    Ok(())
}
