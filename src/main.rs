use std::io::{self, BufRead, IsTerminal, Write};
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

use calcline::calculator::{CalcResult, calculate};
use calcline::config::Config;
use calcline::editor::Symbol;
use calcline::history::Direction;
use calcline::session::Calculator;
use calcline::ui::{Style, render_display, render_history};

#[derive(Parser, Debug)]
#[command(name = "calcline", version, about = "Keyboard-driven calculator")]
struct Args {
    /// Config file to use instead of the default location.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Decimal places results are rounded to.
    #[arg(long)]
    precision: Option<usize>,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Evaluate an expression and print the result.
    Eval {
        #[arg(required = true)]
        expression: Vec<String>,
    },
    /// Press keys by label on a fresh calculator and print the display.
    Keys {
        #[arg(required = true, allow_hyphen_values = true)]
        labels: Vec<String>,
    },
    /// Interactive session (the default).
    Repl,
}

fn main() -> Result<()> {
    let args = Args::parse();
    let config = Config::load(args.config.as_deref())?.with_precision(args.precision)?;
    init_logging(&config);
    debug!(?config, "loaded config");

    let style = Style {
        show_cursor: config.repl.show_cursor,
        color: io::stdout().is_terminal(),
    };

    match args.command.unwrap_or(Command::Repl) {
        Command::Eval { expression } => eval(&expression.join(" "), config.precision),
        Command::Keys { labels } => {
            let mut calc = Calculator::with_precision(config.precision);
            for label in &labels {
                calc.apply_symbol(parse_label(label)?);
            }
            println!("{}", render_display(&calc.render(), style));
            Ok(())
        }
        Command::Repl => repl(&config, style),
    }
}

fn init_logging(config: &Config) {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.log_level))
        .unwrap_or_else(|_| EnvFilter::new("warn"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

fn eval(expression: &str, precision: usize) -> Result<()> {
    match calculate(expression, precision) {
        CalcResult::Success { display_result, .. } => {
            println!("{display_result}");
            Ok(())
        }
        CalcResult::Error { error, .. } => Err(error.into()),
    }
}

fn parse_label(label: &str) -> Result<Symbol> {
    label
        .parse::<Symbol>()
        .with_context(|| format!("Cannot press '{label}'"))
}

/// One line of REPL input.
#[derive(Debug, PartialEq)]
enum ReplLine<'a> {
    Keys(Vec<&'a str>),
    Up,
    Down,
    History,
    List,
    ClearHistory,
    Paste(&'a str),
    Cursor(usize),
    Quit,
}

fn parse_line(line: &str) -> Result<ReplLine<'_>> {
    let line = line.trim();
    let Some(command) = line.strip_prefix(':') else {
        return Ok(ReplLine::Keys(line.split_whitespace().collect()));
    };

    let (name, rest) = command.split_once(' ').unwrap_or((command, ""));
    let parsed = match name {
        "up" => ReplLine::Up,
        "down" => ReplLine::Down,
        "history" => ReplLine::History,
        "list" => ReplLine::List,
        "clear-history" => ReplLine::ClearHistory,
        "paste" => ReplLine::Paste(rest.trim()),
        "cursor" => ReplLine::Cursor(
            rest.trim()
                .parse()
                .with_context(|| format!("Invalid cursor offset '{}'", rest.trim()))?,
        ),
        "quit" | "q" => ReplLine::Quit,
        other => anyhow::bail!("Unknown command ':{other}'"),
    };
    Ok(parsed)
}

fn repl(config: &Config, style: Style) -> Result<()> {
    let mut calc = Calculator::with_precision(config.precision);
    let stdin = io::stdin();
    let mut stdout = io::stdout();

    info!("starting repl");
    println!("{}", render_display(&calc.render(), style));

    loop {
        print!("{}", config.repl.prompt);
        stdout.flush().context("Failed to flush stdout")?;

        let mut line = String::new();
        if stdin.lock().read_line(&mut line).context("Failed to read input")? == 0 {
            break;
        }

        let parsed = match parse_line(&line) {
            Ok(parsed) => parsed,
            Err(err) => {
                eprintln!("{err:#}");
                continue;
            }
        };

        let render = match parsed {
            ReplLine::Keys(labels) => {
                let symbols: Result<Vec<_>> = labels.iter().map(|label| parse_label(label)).collect();
                let symbols = match symbols {
                    Ok(symbols) => symbols,
                    Err(err) => {
                        eprintln!("{err:#}");
                        continue;
                    }
                };
                for symbol in symbols {
                    calc.apply_symbol(symbol);
                }
                calc.render()
            }
            ReplLine::Up => calc.navigate_history(Direction::Back),
            ReplLine::Down => calc.navigate_history(Direction::Forward),
            ReplLine::History => {
                println!("{}", serde_json::to_string_pretty(calc.history())?);
                continue;
            }
            ReplLine::List => {
                if !calc.history().is_empty() {
                    println!("{}", render_history(calc.history(), style));
                }
                continue;
            }
            ReplLine::ClearHistory => {
                calc.clear_history();
                calc.render()
            }
            ReplLine::Paste(text) => calc.paste(text),
            ReplLine::Cursor(offset) => calc.move_cursor(offset),
            ReplLine::Quit => break,
        };

        println!("{}", render_display(&render, style));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_key_line() {
        assert_eq!(
            parse_line("2 + 3 =\n").unwrap(),
            ReplLine::Keys(vec!["2", "+", "3", "="])
        );
        assert_eq!(parse_line("").unwrap(), ReplLine::Keys(vec![]));
    }

    #[test]
    fn test_parse_commands() {
        assert_eq!(parse_line(":up").unwrap(), ReplLine::Up);
        assert_eq!(parse_line(":down").unwrap(), ReplLine::Down);
        assert_eq!(parse_line(":history").unwrap(), ReplLine::History);
        assert_eq!(parse_line(":list").unwrap(), ReplLine::List);
        assert_eq!(parse_line(":clear-history").unwrap(), ReplLine::ClearHistory);
        assert_eq!(parse_line(":paste 12 + 3").unwrap(), ReplLine::Paste("12 + 3"));
        assert_eq!(parse_line(":cursor 4").unwrap(), ReplLine::Cursor(4));
        assert_eq!(parse_line(":quit").unwrap(), ReplLine::Quit);
    }

    #[test]
    fn test_parse_bad_commands() {
        assert!(parse_line(":cursor x").is_err());
        assert!(parse_line(":undo").is_err());
    }

    #[test]
    fn test_eval_error_message() {
        let err = eval("5/0", 10).unwrap_err();
        assert_eq!(err.to_string(), "Division by zero");
        assert!(eval("2+3", 10).is_ok());
    }

    #[test]
    fn test_args_parse() {
        let args = Args::try_parse_from(["calcline", "--precision", "4", "keys", "5", "+/-"]).unwrap();
        assert_eq!(args.precision, Some(4));
        assert!(matches!(args.command, Some(Command::Keys { labels }) if labels == ["5", "+/-"]));
    }
}
