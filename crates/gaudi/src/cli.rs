use std::path::PathBuf;

use clap::{Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(
    name = "gaudi",
    author,
    version,
    about = "Replay gesture scripts against a GAUDÍ in Motion show",
    arg_required_else_help = false
)]
pub struct Cli {
    #[command(flatten)]
    pub run: RunArgs,
    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Parser, Debug)]
pub struct RunArgs {
    /// Gesture script to replay (`-` or omitted reads stdin). Bare names are
    /// also looked up in the scripts data directory.
    #[arg(value_name = "SCRIPT")]
    pub script: Option<PathBuf>,

    /// Show configuration to load instead of the user or bundled show.
    #[arg(long, short = 'c', value_name = "FILE", global = true)]
    pub config: Option<PathBuf>,

    /// Simulated frame length in milliseconds (1-1000).
    #[arg(
        long,
        value_name = "MILLISECONDS",
        default_value_t = 16,
        value_parser = parse_frame_ms
    )]
    pub frame_ms: u64,

    /// Emit one JSON object per event instead of text.
    #[arg(long)]
    pub json: bool,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Validate the resolved show configuration and summarise its panels.
    Check,
    /// Manage the bundled show and sample scripts.
    Defaults(DefaultsCommand),
}

#[derive(Parser, Debug)]
pub struct DefaultsCommand {
    #[command(subcommand)]
    pub action: DefaultsAction,
}

#[derive(Subcommand, Debug)]
pub enum DefaultsAction {
    /// Print resolved config and data directories.
    Where,
    /// Print the bundled show configuration.
    Print,
    /// Copy the bundled show and sample script into the user directories.
    Install(InstallArgs),
}

#[derive(Parser, Debug)]
pub struct InstallArgs {
    /// Report what would be written without touching the filesystem.
    #[arg(long)]
    pub dry_run: bool,
    /// Overwrite files that already exist.
    #[arg(long)]
    pub force: bool,
}

pub fn parse() -> Cli {
    Cli::parse()
}

pub fn parse_frame_ms(value: &str) -> Result<u64, String> {
    let trimmed = value.trim().trim_end_matches("ms");
    let ms: u64 = trimmed
        .parse()
        .map_err(|_| format!("invalid frame length '{value}'; expected milliseconds"))?;
    if !(1..=1000).contains(&ms) {
        return Err(format!("frame length {ms}ms out of range; expected 1-1000"));
    }
    Ok(ms)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_frame_ms() {
        assert_eq!(parse_frame_ms("16").unwrap(), 16);
        assert_eq!(parse_frame_ms("33ms").unwrap(), 33);
        assert!(parse_frame_ms("0").is_err());
        assert!(parse_frame_ms("5000").is_err());
        assert!(parse_frame_ms("fast").is_err());
    }

    #[test]
    fn script_and_subcommands_share_global_config() {
        let cli = Cli::try_parse_from(["gaudi", "tour.gaudi", "--json"]).unwrap();
        assert!(cli.command.is_none());
        assert_eq!(cli.run.script, Some(PathBuf::from("tour.gaudi")));
        assert!(cli.run.json);
        assert_eq!(cli.run.frame_ms, 16);

        let cli = Cli::try_parse_from(["gaudi", "check", "--config", "show.toml"]).unwrap();
        assert!(matches!(cli.command, Some(Command::Check)));
        assert_eq!(cli.run.config, Some(PathBuf::from("show.toml")));

        let cli = Cli::try_parse_from(["gaudi", "defaults", "install", "--dry-run"]).unwrap();
        let Some(Command::Defaults(DefaultsCommand {
            action: DefaultsAction::Install(args),
        })) = cli.command
        else {
            panic!("expected defaults install");
        };
        assert!(args.dry_run);
        assert!(!args.force);
    }
}
