mod commands;
mod examples;
mod output;
mod theme;

use std::fmt::Write;

use anyhow::Result;
use clap::builder::{Styles, styling::AnsiColor};
use clap::{Command, CommandFactory, FromArgMatches, Parser, Subcommand};

use commands::{
    inspect::{InspectArgs, handle_inspect},
    validate::{ValidateArgs, handle_validate},
};
use examples::{ExampleGroup, command_examples};
use output::{GlobalOptions, OutputFormat, OutputManager};
use theme::ICONS;

#[derive(Parser)]
#[command(name = "enum-fields")]
#[command(version)]
#[command(
    about = "Inspect and check enum field declarations",
    long_about = r#"Loads enum field declarations from TOML, defines them on in-memory models and:

• Prints the resulting registry (keys, values, properties, validation per field)
• Validates JSON records against the declared fields

Commands:
  inspect   Show every registered enum field
  validate  Run a model's validations against a record
"#
)]
#[command(subcommand_required = true, arg_required_else_help = true)]
struct Cli {
    /// Output format
    #[arg(long, value_enum, default_value = "table", global = true)]
    output: OutputFormat,

    /// Suppress output (only errors will be shown)
    #[arg(short = 'q', long, global = true)]
    quiet: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    no_color: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show every enum field registered from a declarations file
    Inspect(InspectArgs),

    /// Validate a JSON record against a declared model
    Validate(ValidateArgs),
}

impl Cli {
    fn parse_with_styles() -> Self {
        let matches = build_cli_command().get_matches();
        Cli::from_arg_matches(&matches).unwrap_or_else(|err| err.exit())
    }
}

fn build_cli_command() -> Command {
    let mut command = Cli::command()
        .styles(help_styles())
        .after_long_help("Environment Variables:\n  RUST_LOG  Log filter, e.g. enum_fields=debug");
    for example in command_examples() {
        if let Some(subcommand) = command.find_subcommand_mut(example.name) {
            *subcommand = subcommand.clone().after_long_help(render_examples(example.groups));
        }
    }
    command
}

fn render_examples(groups: &[ExampleGroup]) -> String {
    let mut buffer = String::from("Examples:\n");
    for group in groups {
        let _ = writeln!(buffer, "  {}", group.title);
        for command in group.commands {
            let _ = writeln!(buffer, "    {} {command}", ICONS.arrow);
        }
    }
    buffer
}

fn help_styles() -> Styles {
    Styles::styled()
        .usage(AnsiColor::BrightBlue.on_default().bold())
        .header(AnsiColor::Cyan.on_default().bold())
        .literal(AnsiColor::Magenta.on_default())
        .placeholder(AnsiColor::BrightBlack.on_default())
}

fn main() {
    env_logger::init();

    let cli = Cli::parse_with_styles();
    if cli.no_color {
        colored::control::set_override(false);
    }

    let output = OutputManager::new(GlobalOptions {
        output_format: cli.output,
        quiet: cli.quiet,
        no_color: cli.no_color,
    });

    if let Err(err) = execute(cli.command, &output) {
        output.error(&format!("{err:#}"));
        std::process::exit(1);
    }
}

fn execute(command: Commands, output: &OutputManager) -> Result<()> {
    match command {
        Commands::Inspect(args) => handle_inspect(args, output),
        Commands::Validate(args) => handle_validate(args, output),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn command_definition_is_consistent() {
        build_cli_command().debug_assert();
    }

    #[test]
    fn subcommands_carry_their_examples() {
        let mut command = build_cli_command();
        for example in command_examples() {
            let subcommand = command.find_subcommand_mut(example.name).unwrap();
            let help = subcommand.render_long_help().to_string();
            assert!(help.contains("Examples:"), "{}", example.name);
            assert!(help.contains(example.groups[0].title), "{}", example.name);
        }
    }
}
