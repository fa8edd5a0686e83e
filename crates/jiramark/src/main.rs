use crate::prelude::*;
use clap::Parser;
use env_logger::Env;
use jiramark_core::ConvertOptions;

mod clip;
mod clipboard;
mod convert;
mod error;
mod prelude;

#[derive(Debug, clap::Parser)]
#[command(
    author,
    version,
    about,
    long_about = "Convert the Markdown on the clipboard to Jira Wiki Markup and copy it back"
)]
pub struct App {
    #[command(subcommand)]
    pub command: Option<SubCommands>,

    #[clap(flatten)]
    clip: clip::Options,

    #[clap(flatten)]
    global: Global,
}

#[derive(Debug, Clone, clap::Args)]
pub struct Global {
    /// Leave Jira emoticon tokens such as (y) unescaped
    #[clap(
        long,
        env = "JIRAMARK_NO_ESCAPE_EMOTICONS",
        global = true,
        default_value = "false"
    )]
    no_escape_emoticons: bool,

    /// Drop blank lines between list items
    #[clap(
        long,
        env = "JIRAMARK_COMPACT_LISTS",
        global = true,
        default_value = "false"
    )]
    compact_lists: bool,

    /// Whether to display additional information.
    #[clap(long, env = "JIRAMARK_VERBOSE", global = true, default_value = "false")]
    verbose: bool,
}

impl Global {
    pub fn convert_options(&self) -> ConvertOptions {
        ConvertOptions {
            escape_emoticons: !self.no_escape_emoticons,
            compact_lists: self.compact_lists,
        }
    }
}

#[derive(Debug, clap::Parser)]
pub enum SubCommands {
    /// Convert a file or stdin and print the result
    Convert(crate::convert::App),
}

fn init_logging(verbose: bool) {
    let default_filter = if verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(Env::default().default_filter_or(default_filter)).init();
}

fn main() -> Result<()> {
    color_eyre::install()?;

    let app = App::parse();
    init_logging(app.global.verbose);

    match app.command {
        Some(SubCommands::Convert(sub_app)) => crate::convert::run(sub_app, app.global),
        None => crate::clip::run(app.clip, app.global),
    }
    .map_err(|err: color_eyre::eyre::Report| eyre!(err))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_definition_is_valid() {
        use clap::CommandFactory;
        App::command().debug_assert();
    }

    #[test]
    fn test_no_arguments_runs_clipboard_flow() {
        let app = App::try_parse_from(["jiramark"]).unwrap();

        assert!(app.command.is_none());
        assert!(!app.clip.stdin);
        assert!(!app.clip.print_only);
        assert_eq!(app.global.convert_options(), ConvertOptions::default());
    }

    #[test]
    fn test_global_flags_map_to_options() {
        let app =
            App::try_parse_from(["jiramark", "--no-escape-emoticons", "--compact-lists"]).unwrap();
        let options = app.global.convert_options();

        assert!(!options.escape_emoticons);
        assert!(options.compact_lists);
    }

    #[test]
    fn test_convert_subcommand() {
        let app = App::try_parse_from(["jiramark", "convert", "notes.md", "--json"]).unwrap();
        assert!(matches!(app.command, Some(SubCommands::Convert(_))));
    }
}
