mod app;
mod config;
mod discovery;
mod input;
mod lyrics;
mod player;
mod queue;
mod tui;

use anyhow::Context;
use clap::{Parser, Subcommand};
use discovery::DiscoverySource;
use lyrics::{LyricsClient, LyricsFetch, Timeline};

#[derive(Debug, Parser)]
#[command(name = "lrc-radio", version, about = "Folder-watching radio with synced LRC lyrics")]
struct Cli {
    /// Override config file path.
    #[arg(long)]
    config: Option<std::path::PathBuf>,

    /// Folder to watch, overriding `source.folder`.
    #[arg(long)]
    folder: Option<String>,

    /// Scan endpoint base URL, overriding `source.endpoint`.
    #[arg(long)]
    endpoint: Option<String>,

    /// Log at debug level.
    #[arg(long, short)]
    verbose: bool,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Run the interactive TUI (default).
    Tui,
    /// Scan the folder once and print the queue order (headless).
    Scan {
        /// Folder to scan instead of the configured one.
        folder: Option<String>,
    },
    /// Print the lyric timeline of an LRC file or URL (headless).
    Lyrics {
        source: String,
        /// Show which line is active at this many seconds.
        #[arg(long)]
        at: Option<f64>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let mut cfg = config::load(cli.config.as_deref()).context("load config")?;
    cfg.apply_overrides(cli.folder.clone(), cli.endpoint.clone());

    let command = cli.command.unwrap_or(Command::Tui);
    let level = if cli.verbose {
        tracing::Level::DEBUG
    } else {
        tracing::Level::INFO
    };

    match command {
        Command::Tui => {
            // The terminal belongs to the UI, so logs go to a file.
            let log_path = cfg.paths.data_dir.join("lrc-radio.log");
            std::fs::create_dir_all(&cfg.paths.data_dir)
                .with_context(|| format!("create dir {}", cfg.paths.data_dir.display()))?;
            let log_file = std::fs::File::create(&log_path)
                .with_context(|| format!("create {}", log_path.display()))?;
            tracing_subscriber::fmt()
                .with_writer(std::sync::Mutex::new(log_file))
                .with_ansi(false)
                .with_target(false)
                .with_max_level(level)
                .init();

            let mut terminal = tui::TerminalGuard::enter(cfg.input.mouse).context("init terminal")?;
            let mut app = app::App::new(cfg)?;
            app.run(terminal.terminal_mut()).await?;
        }
        Command::Scan { folder } => {
            init_stdout_logging(level);
            let folder = folder.unwrap_or_else(|| cfg.source.folder.clone());
            let source = discovery::Source::from_config(&cfg.source)?;
            let mut controller = queue::QueueController::default();
            let found = source.scan(&folder).await?;
            controller.discover(found);
            print_queue(&controller);
        }
        Command::Lyrics { source, at } => {
            init_stdout_logging(level);
            let client = LyricsClient::new(cfg.source.endpoint.clone())?;
            let document = match client.fetch(&source).await {
                LyricsFetch::Document(text) => text,
                LyricsFetch::NotFound => anyhow::bail!("Lyrics not found: {source}"),
                LyricsFetch::Failed(e) => anyhow::bail!("Error loading lyrics: {e}"),
            };
            let mut timeline = Timeline::parse(&document, cfg.lyrics.padding);
            if let Some(at) = at {
                timeline.move_to(at);
            }
            print_timeline(&timeline, at.map(|_| cfg.lyrics.context_lines));
        }
    }

    Ok(())
}

fn init_stdout_logging(level: tracing::Level) {
    tracing_subscriber::fmt()
        .with_target(false)
        .with_level(true)
        .with_max_level(level)
        .init();
}

fn print_queue(controller: &queue::QueueController) {
    if controller.is_empty() {
        println!("No tracks.");
        return;
    }
    for (i, t) in controller.tracks().iter().enumerate() {
        let lyrics = if t.lyric_url.is_some() { "  [lrc]" } else { "" };
        println!("{:02}. {}{}", i + 1, t.display_name, lyrics);
    }
}

/// One line per range; with `context`, mark the active line and its window.
fn print_timeline(timeline: &Timeline, context: Option<usize>) {
    for (key, value) in timeline.tags() {
        println!("[{key}] {value}");
    }
    println!("{} cue(s), padding {}", timeline.cue_count(), timeline.padding());

    let window = context.map(|c| timeline.visible(c));
    for (i, range) in timeline.ranges().iter().enumerate() {
        if range.is_padding() {
            continue;
        }
        let marker = if context.is_some() && i == timeline.active() {
            ">"
        } else if window.as_ref().is_some_and(|w| w.contains(&i)) {
            "*"
        } else {
            " "
        };
        println!(
            "{marker} {:>4} {:>8.2} - {:<8.2} {}",
            i, range.start, range.end, range.text
        );
    }
}
