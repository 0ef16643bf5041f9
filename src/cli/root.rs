//! Root command assembly
//!
//! Builds the command tree from the derive definitions and adapts the help
//! output to plugin conventions: subcommands are grouped and every usage
//! line carries the `kubectl ` prefix, matching how users invoke the plugin
//! (`kubectl history ...`) rather than the binary name (`kubectl-history`).

use crate::cli::args::Cli;
use crate::cluster::warnings::{self, allows_color_output, WarningWriter, WarningWriterOptions};
use clap::{Command, CommandFactory, FromArgMatches};
use clap_complete::Shell;
use std::ffi::OsString;
use std::io::{self, Write};
use std::sync::Arc;

/// Host tool the plugin is invoked through
pub const COMMAND_PREFIX: &str = "kubectl";

/// Binary name kubectl discovers the plugin by
pub const PLUGIN_BINARY: &str = "kubectl-history";

const HELP_ABOUT: &str = "Print this message or the help of the given subcommand(s)";

/// Help section a subcommand is listed under
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandGroup {
    /// History commands, "Available Commands:"
    Default,
    /// Housekeeping commands, "Other Commands:"
    Other,
}

impl CommandGroup {
    pub fn of(name: &str) -> Self {
        match name {
            "diff" | "get" => CommandGroup::Default,
            _ => CommandGroup::Other,
        }
    }

    pub const fn title(&self) -> &'static str {
        match self {
            CommandGroup::Default => "Available Commands:",
            CommandGroup::Other => "Other Commands:",
        }
    }
}

/// Build the customized root command
pub fn command() -> Command {
    customize_usage(Cli::command())
}

/// Prefix usage lines with `kubectl` and render grouped subcommand help
///
/// Default output would be `Usage: kubectl-history [OPTIONS] <COMMAND>`;
/// this yields `Usage: kubectl history [OPTIONS] <COMMAND>` and
/// `kubectl history get ...` for subcommands. The command name itself stays
/// `history`.
pub fn customize_usage(cmd: Command) -> Command {
    let bin_name = format!("{} {}", COMMAND_PREFIX, cmd.get_name());
    let template = help_template(&cmd);
    let after_help = format!(
        "Use \"{} [command] --help\" for more information about a command.",
        bin_name
    );

    cmd.bin_name(bin_name)
        .help_template(template)
        .after_help(after_help)
}

fn help_template(cmd: &Command) -> String {
    let mut entries: Vec<(String, String, CommandGroup)> = cmd
        .get_subcommands()
        .map(|sc| {
            let name = sc.get_name().to_string();
            let about = sc.get_about().map(|a| a.to_string()).unwrap_or_default();
            let group = CommandGroup::of(&name);
            (name, about, group)
        })
        .collect();

    if !cmd.is_disable_help_subcommand_set() {
        entries.push((
            "help".to_string(),
            HELP_ABOUT.to_string(),
            CommandGroup::of("help"),
        ));
    }
    entries.sort_by(|a, b| a.0.cmp(&b.0));

    let width = entries.iter().map(|e| e.0.len()).max().unwrap_or(0) + 2;

    let mut template = String::from("{about-with-newline}\n{usage-heading} {usage}\n");
    for group in [CommandGroup::Default, CommandGroup::Other] {
        let lines: Vec<String> = entries
            .iter()
            .filter(|e| e.2 == group)
            .map(|(name, about, _)| format!("  {:<width$}{}", name, about, width = width))
            .collect();

        if lines.is_empty() {
            continue;
        }

        template.push('\n');
        template.push_str(group.title());
        template.push('\n');
        for line in lines {
            template.push_str(&line);
            template.push('\n');
        }
    }

    template.push_str("\nOptions:\n{options}{after-help}");
    template
}

/// Parse arguments through the customized command
pub fn try_parse_from<I, T>(args: I) -> Result<Cli, clap::Error>
where
    I: IntoIterator<Item = T>,
    T: Into<OsString> + Clone,
{
    let mut cmd = command();
    let matches = cmd.try_get_matches_from_mut(args)?;
    Cli::from_arg_matches(&matches).map_err(|e| e.format(&mut cmd))
}

/// Parse process arguments, exiting with usage on error
pub fn parse() -> Cli {
    try_parse_from(std::env::args_os()).unwrap_or_else(|e| e.exit())
}

/// Route API server warnings to stderr for the rest of the process
///
/// Must run before the first client is built. Repeated warnings are printed
/// once.
pub fn install_warning_handler() {
    let stderr = io::stderr();
    let color = allows_color_output(&stderr);
    warnings::set_default_handler(Arc::new(WarningWriter::new(
        stderr,
        WarningWriterOptions {
            deduplicate: true,
            color,
        },
    )));
}

/// Generate shell completions
pub fn generate_completions<W: Write>(shell: Shell, out: &mut W) {
    let mut cmd = command();
    clap_complete::generate(shell, &mut cmd, PLUGIN_BINARY, out);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::args::Commands;
    use clap::error::ErrorKind;

    #[test]
    fn test_root_usage_has_kubectl_prefix() {
        let help = command().render_help().to_string();
        assert!(help.contains("kubectl history [OPTIONS] <COMMAND>"), "{}", help);
        assert!(!help.contains("Usage: kubectl-history"));
    }

    #[test]
    fn test_root_help_groups_commands() {
        let help = command().render_help().to_string();
        let available = help.find("Available Commands:").unwrap();
        let other = help.find("Other Commands:").unwrap();
        let diff = help.find("  diff ").unwrap();
        let get = help.find("  get ").unwrap();
        let version = help.find("  version ").unwrap();
        let completion = help.find("  completion ").unwrap();
        let help_cmd = help.find("  help ").unwrap();

        assert!(available < diff && diff < get && get < other);
        assert!(other < completion && completion < help_cmd && help_cmd < version);
        assert!(help.starts_with("Time-travel through your cluster"));
    }

    #[test]
    fn test_subcommand_usage_has_kubectl_prefix() {
        let err = try_parse_from([PLUGIN_BINARY, "get", "--help"]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::DisplayHelp);
        assert!(err.to_string().contains("kubectl history get"));
    }

    #[test]
    fn test_usage_error_has_kubectl_prefix() {
        let err = try_parse_from([PLUGIN_BINARY, "diff"]).unwrap_err();
        assert!(err.to_string().contains("kubectl history diff"));
    }

    #[test]
    fn test_try_parse_from() {
        let cli = try_parse_from([PLUGIN_BINARY, "diff", "deploy", "web"]).unwrap();
        assert!(matches!(cli.command, Commands::Diff(_)));
    }

    #[test]
    fn test_command_group() {
        assert_eq!(CommandGroup::of("get"), CommandGroup::Default);
        assert_eq!(CommandGroup::of("version"), CommandGroup::Other);
    }

    #[test]
    fn test_generate_completions() {
        let mut out = Vec::new();
        generate_completions(Shell::Bash, &mut out);
        let script = String::from_utf8(out).unwrap();
        assert!(script.contains(PLUGIN_BINARY));
    }

    #[test]
    fn test_install_warning_handler() {
        install_warning_handler();

        // The fallback is created per call; an installed handler is shared.
        let first = warnings::default_handler();
        let second = warnings::default_handler();
        assert!(Arc::ptr_eq(&first, &second));
    }

    #[test]
    fn test_command_debug_assert() {
        command().debug_assert();
    }
}
