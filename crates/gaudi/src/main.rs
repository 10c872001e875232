mod cli;
mod defaults;
mod paths;
mod run;
mod script;
mod session;

use anyhow::Result;
use cli::{Command, DefaultsAction};
use defaults::{describe_paths, install_defaults, InstallOptions, BUILTIN_SHOW};
use paths::AppPaths;

fn main() -> Result<()> {
    let cli = cli::parse();
    run::initialise_tracing();

    match cli.command {
        Some(Command::Check) => run::check(cli.run.config.as_deref()),
        Some(Command::Defaults(defaults_cmd)) => handle_defaults_command(defaults_cmd.action),
        None => run::run(cli.run),
    }
}

fn handle_defaults_command(action: DefaultsAction) -> Result<()> {
    match action {
        DefaultsAction::Where => run_defaults_where(&AppPaths::discover()?),
        DefaultsAction::Print => {
            print!("{BUILTIN_SHOW}");
            Ok(())
        }
        DefaultsAction::Install(args) => run_defaults_install(
            &AppPaths::discover()?,
            InstallOptions {
                dry_run: args.dry_run,
                force: args.force,
            },
        ),
    }
}

fn run_defaults_install(paths: &AppPaths, options: InstallOptions) -> Result<()> {
    let report = install_defaults(paths, options)?;

    if report.copied.is_empty() {
        if options.dry_run {
            println!("Dry-run: no defaults would be installed.");
        } else {
            println!("All bundled defaults already installed.");
        }
    } else {
        if options.dry_run {
            println!("Dry-run: the following defaults would be installed:");
        } else {
            println!("Installed bundled defaults:");
        }
        for copy in &report.copied {
            let note = if copy.replaced { " (replaced)" } else { "" };
            println!("  {:<8} {}{note}", copy.name, copy.target.display());
        }
    }

    for skipped in &report.skipped {
        println!("  skipped  {} (already present)", skipped.display());
    }

    Ok(())
}

fn run_defaults_where(paths: &AppPaths) -> Result<()> {
    let overview = describe_paths(paths);
    println!("Configuration directories:");
    println!("  config:     {}", overview.config_dir.display());
    println!("  data:       {}", overview.data_dir.display());
    println!("  scripts:    {}", overview.scripts_dir.display());
    println!(
        "  show:       {}{}",
        overview.show_file.display(),
        if overview.show_present {
            ""
        } else {
            " (missing; bundled show in use)"
        }
    );
    Ok(())
}
