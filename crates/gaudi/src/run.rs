use std::fs;
use std::io::{self, BufWriter, Read, Write};
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use deckconfig::ShowConfig;
use tracing_subscriber::EnvFilter;

use crate::cli::RunArgs;
use crate::defaults::{resolve_show, LoadedShow};
use crate::paths::AppPaths;
use crate::script;
use crate::session::{Record, Session};

const SCRIPT_EXTENSION: &str = "gaudi";

pub fn run(args: RunArgs) -> Result<()> {
    let paths = AppPaths::discover()?;
    tracing::debug!(
        config = %paths.config_dir().display(),
        data = %paths.data_dir().display(),
        "resolved gaudi paths"
    );
    let LoadedShow { config, source } = resolve_show(args.config.as_deref(), &paths)?;
    tracing::info!(
        %source,
        panels = config.panels.len(),
        title = config.title.as_deref().unwrap_or("untitled"),
        "loaded show"
    );

    let (origin, raw) = read_script(args.script.as_deref(), &paths)?;
    let script = script::parse(&raw).with_context(|| format!("failed to parse {origin}"))?;
    tracing::debug!(commands = script.len(), %origin, "parsed script");

    let mut session = Session::new(&config, Duration::from_millis(args.frame_ms));
    let stdout = io::stdout();
    let mut out = BufWriter::new(stdout.lock());
    let json = args.json;
    let summary = session.replay(&script, |record| write_record(&mut out, record, json))?;
    out.flush().context("failed to flush replay output")?;

    tracing::info!(
        commands = summary.commands,
        simulated_ms = summary.simulated.as_millis() as u64,
        active = summary.active_index,
        "replay finished"
    );
    Ok(())
}

pub fn check(explicit: Option<&Path>) -> Result<()> {
    let paths = AppPaths::discover()?;
    let LoadedShow { config, source } = resolve_show(explicit, &paths)?;
    print_summary(&config, &source.to_string());
    Ok(())
}

fn print_summary(config: &ShowConfig, source: &str) {
    let nav = &config.navigation;
    println!(
        "Show: {} ({source})",
        config.title.as_deref().unwrap_or("untitled")
    );
    println!(
        "  transition {} {:?}, cooldown {}, wheel tolerance {}, swipe threshold {}",
        humantime::format_duration(nav.transition_duration),
        nav.ease,
        humantime::format_duration(nav.cooldown),
        nav.wheel_tolerance,
        nav.swipe_threshold
    );
    println!(
        "  viewport {}x{}, exempt markers: {}",
        config.viewport.width,
        config.viewport.height,
        config.exempt_markers.join(", ")
    );
    let self_handling = config
        .panels
        .iter()
        .filter(|panel| panel.is_self_handling())
        .count();
    println!(
        "Panels: {} ({self_handling} self-handling)",
        config.panels.len()
    );
    for (index, panel) in config.panels.iter().enumerate() {
        let mut line = format!("  {index:>2} {:<14}", panel.name);
        if panel.is_self_handling() {
            let chain = match (panel.chain_backward, panel.chain_forward) {
                (true, true) => "both",
                (true, false) => "backward",
                (false, true) => "forward",
                (false, false) => "none",
            };
            line.push_str(&format!(
                " steps={} chain={chain}",
                panel.steps.len().max(1)
            ));
        }
        if !panel.cards.is_empty() {
            line.push_str(&format!(" cards={}", panel.cards.len()));
        }
        println!("{line}");
    }
}

fn write_record<W: Write>(out: &mut W, record: &Record, json: bool) -> Result<()> {
    if json {
        serde_json::to_writer(&mut *out, record).context("failed to encode replay event")?;
        writeln!(out)?;
    } else {
        let line = record
            .line
            .map_or_else(|| "end".to_string(), |line| format!("L{line}"));
        writeln!(out, "{:>7}ms {line:>5}  {}", record.t_ms, record.event)?;
    }
    Ok(())
}

/// Reads the script from stdin, a path, or a bare name under the scripts
/// directory (with or without the `.gaudi` extension).
fn read_script(script: Option<&Path>, paths: &AppPaths) -> Result<(String, String)> {
    let Some(path) = script.filter(|path| *path != Path::new("-")) else {
        let mut raw = String::new();
        io::stdin()
            .read_to_string(&mut raw)
            .context("failed to read script from stdin")?;
        return Ok(("<stdin>".to_string(), raw));
    };

    let resolved = resolve_script_path(path, paths);
    let raw = fs::read_to_string(&resolved)
        .with_context(|| format!("failed to read script {}", resolved.display()))?;
    Ok((resolved.display().to_string(), raw))
}

fn resolve_script_path(path: &Path, paths: &AppPaths) -> PathBuf {
    if path.exists() || path.components().count() > 1 {
        return path.to_path_buf();
    }
    let dir = paths.scripts_dir();
    let candidate = dir.join(path);
    if candidate.exists() {
        return candidate;
    }
    let with_extension = dir.join(path.with_extension(SCRIPT_EXTENSION));
    if with_extension.exists() {
        return with_extension;
    }
    path.to_path_buf()
}

pub fn initialise_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(io::stderr)
        .init();
}
