use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{anyhow, Context, Result};
use clap::{Args, Parser, Subcommand};
use tracing::{error, info};

use spellbook::config::{self, Config};
use spellbook::error::SpellbookError;
use spellbook::logging::{self, LogOptions};
use spellbook::template::{self, TokenKind};
use spellbook::{executor, search, ui};

#[derive(Parser)]
#[command(name = "spellbook", version, about = "Easy access to your best shell commands")]
struct Cli {
    /// Extra config file, read after the home and working directory configs
    #[arg(short, long = "config", value_name = "PATH", global = true)]
    config: Vec<String>,

    /// Also log to stderr (ignored by the interactive launcher)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Interactive launcher (default)
    Ui,
    /// Print the commands matching QUERY, best first
    List(ListArgs),
    /// Fill in the best match for QUERY and run it
    Run(RunArgs),
    /// Print the tokens of a command template
    Parse(ParseArgs),
    /// Print the merged configuration as YAML
    Config,
}

#[derive(Args)]
struct ListArgs {
    /// Fuzzy query; lists everything when omitted
    query: Option<String>,
}

#[derive(Args)]
struct RunArgs {
    /// Fuzzy query selecting the command
    query: String,
    /// Value for a placeholder
    #[arg(short, long = "set", value_name = "NAME=VALUE", value_parser = parse_assignment)]
    set: Vec<(String, String)>,
}

#[derive(Args)]
struct ParseArgs {
    /// Template such as "git log %(branch)"
    template: String,
}

fn main() {
    let cli = Cli::parse();
    let interactive = matches!(cli.command, None | Some(Command::Ui));

    let exit_code = {
        let _guard = logging::init(LogOptions {
            stderr: cli.verbose && !interactive,
        });
        match run(cli) {
            Ok(code) => code,
            Err(err) => {
                error!(error = %format!("{:#}", err), "Command failed");
                eprintln!("spellbook: {}", user_message(&err));
                1
            }
        }
    };

    std::process::exit(exit_code);
}

fn user_message(err: &anyhow::Error) -> String {
    match err.downcast_ref::<SpellbookError>() {
        Some(e) => e.user_message(),
        None => format!("{:#}", err),
    }
}

fn run(cli: Cli) -> Result<i32> {
    let extra_files: Vec<PathBuf> = cli.config.iter().map(|p| config::expand_path(p)).collect();
    let load = || -> Result<Config> {
        let config = config::load_config(&config::default_search_dirs(), &extra_files)?;
        logging::log_config_event(config.commands.len(), config.get_search_field().as_str());
        Ok(config)
    };

    match cli.command {
        None | Some(Command::Ui) => ui_cmd(&load()?),
        Some(Command::List(args)) => list_cmd(&load()?, &args),
        Some(Command::Run(args)) => run_cmd(&load()?, &args),
        Some(Command::Parse(args)) => parse_cmd(&args),
        Some(Command::Config) => config_cmd(&load()?),
    }
}

fn ui_cmd(config: &Config) -> Result<i32> {
    match ui::run(config)? {
        Some(command) => Ok(executor::run_resolved(&command)?),
        None => {
            info!("Launcher closed without running a command");
            Ok(0)
        }
    }
}

fn list_cmd(config: &Config, args: &ListArgs) -> Result<i32> {
    let commands: Vec<Arc<config::Command>> =
        config.commands.iter().cloned().map(Arc::new).collect();
    let query = args.query.as_deref().unwrap_or("");
    let matches = search::filter(query, &commands, config.get_search_field());

    let width = matches
        .iter()
        .map(|c| c.command.chars().count())
        .max()
        .unwrap_or(0);

    for command in &matches {
        let vars = match template::parse_template(&command.command) {
            Ok(tokens) => template::variables(&tokens).join(", "),
            Err(_) => "invalid template".to_string(),
        };
        let mut line = format!("{:<width$}  {}", command.command, command.description);
        if !vars.is_empty() {
            line.push_str(&format!("  [{}]", vars));
        }
        println!("{}", line.trim_end());
    }
    Ok(0)
}

fn run_cmd(config: &Config, args: &RunArgs) -> Result<i32> {
    let commands: Vec<Arc<config::Command>> =
        config.commands.iter().cloned().map(Arc::new).collect();
    let best = search::filter(&args.query, &commands, config.get_search_field())
        .into_iter()
        .next()
        .ok_or_else(|| anyhow!("no command matches '{}'", args.query))?;

    let tokens = template::parse_template(&best.command).map_err(SpellbookError::from)?;
    let values: HashMap<String, String> = args.set.iter().cloned().collect();
    let command = template::render(&tokens, &values)
        .map_err(SpellbookError::from)
        .with_context(|| format!("cannot fill in '{}'", best.command))?;

    Ok(executor::run_resolved(&command)?)
}

fn parse_cmd(args: &ParseArgs) -> Result<i32> {
    let tokens = template::parse_template(&args.template).map_err(SpellbookError::from)?;
    for token in &tokens {
        match token.kind {
            TokenKind::Literal => println!("literal   {:?}", token.text),
            TokenKind::Variable => println!("variable  {}", token.text),
        }
    }
    Ok(0)
}

fn config_cmd(config: &Config) -> Result<i32> {
    let yaml = config.to_yaml().context("cannot serialize config")?;
    print!("{}", yaml);
    Ok(0)
}

fn parse_assignment(s: &str) -> std::result::Result<(String, String), String> {
    let (name, value) = s
        .split_once('=')
        .ok_or_else(|| format!("expected NAME=VALUE, got '{}'", s))?;
    if name.is_empty() {
        return Err(format!("empty variable name in '{}'", s));
    }
    Ok((name.to_string(), value.to_string()))
}
