//! Binary entry point for the Palimpsest operational CLI.
#![forbid(unsafe_code)]

use std::error::Error;
use std::path::PathBuf;
use std::process::ExitCode;

use clap::{ArgAction, Parser, Subcommand, ValueEnum};
use palimpsest::{
    bootstrap,
    collapse::auto_collapse,
    config::{Backend, Config},
    model::PageIndex,
    render::render,
};

#[derive(Parser, Debug)]
#[command(
    name = "palimpsest",
    version,
    about = "Operational CLI for the Palimpsest context store",
    disable_help_subcommand = true
)]
struct Cli {
    #[arg(long, value_name = "DIR", help = "Store directory (omit for an in-memory store)")]
    store: Option<PathBuf>,

    #[arg(long, help = "Gzip-compress page files written to DIR")]
    compress: bool,

    #[arg(
        long,
        global = true,
        value_enum,
        default_value_t = OutputFormat::Text,
        help = "Output format for structured responses"
    )]
    format: OutputFormat,

    #[arg(long, global = true, action = ArgAction::SetTrue, help = "Suppress informational log output")]
    quiet: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, ValueEnum)]
enum OutputFormat {
    Text,
    Json,
}

#[derive(Subcommand, Debug)]
enum Command {
    #[command(about = "Render the current prompt and print its token estimate")]
    Render,

    #[command(about = "Expand a page's detail or children")]
    Expand {
        #[arg(value_name = "INDEX")]
        index: String,
    },

    #[command(about = "Hide a page's detail or children")]
    Hide {
        #[arg(value_name = "INDEX")]
        index: String,
    },

    #[command(about = "Create a DetailPage under a parent ContentsPage")]
    CreateDetail {
        #[arg(long)]
        parent: String,
        #[arg(long)]
        name: String,
        #[arg(long, default_value = "")]
        description: String,
        #[arg(long)]
        detail: String,
    },

    #[command(about = "Create a ContentsPage under a parent, adopting existing children")]
    CreateContents {
        #[arg(long)]
        parent: String,
        #[arg(long)]
        name: String,
        #[arg(long, default_value = "")]
        description: String,
        #[arg(long = "child", value_name = "INDEX", action = ArgAction::Append)]
        children: Vec<String>,
    },

    #[command(about = "Move a page to a new parent within its segment")]
    Move {
        #[arg(value_name = "SRC")]
        src: String,
        #[arg(value_name = "DST")]
        dst: String,
    },

    #[command(about = "Remove a page and its descendants")]
    Remove {
        #[arg(value_name = "INDEX")]
        index: String,
    },

    #[command(about = "Run the auto-collapse policy against a token ceiling")]
    Stats {
        #[arg(long, help = "Override the configured token ceiling for this run")]
        ceiling: Option<usize>,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    let filter = if cli.quiet { "warn" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::new(filter))
        .init();

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {err}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<(), Box<dyn Error>> {
    let mut config = Config::default();
    config.backend = match &cli.store {
        Some(dir) => Backend::File {
            dir: dir.clone(),
            compress: cli.compress,
        },
        None => Backend::Memory,
    };
    let store = bootstrap::open(&config)?;

    match cli.command {
        Command::Render => {
            let messages = render(&store.pages, &store.segments);
            emit_render(&cli.format, &messages);
        }
        Command::Expand { index } => {
            store.auth.expand_details(&PageIndex::from(index))?;
            store.save_segments()?;
            println!("expanded");
        }
        Command::Hide { index } => {
            store.auth.hide_details(&PageIndex::from(index))?;
            store.save_segments()?;
            println!("hidden");
        }
        Command::CreateDetail {
            parent,
            name,
            description,
            detail,
        } => {
            let index = store.auth.create_detail_page(name, description, detail, &PageIndex::from(parent))?;
            store.save_segments()?;
            println!("{index}");
        }
        Command::CreateContents {
            parent,
            name,
            description,
            children,
        } => {
            let children = children.into_iter().map(PageIndex::from).collect();
            let index = store
                .auth
                .create_contents_page(name, description, &PageIndex::from(parent), children)?;
            store.save_segments()?;
            println!("{index}");
        }
        Command::Move { src, dst } => {
            store.auth.move_page(&PageIndex::from(src), &PageIndex::from(dst))?;
            store.save_segments()?;
            println!("moved");
        }
        Command::Remove { index } => {
            store.auth.remove_page(&PageIndex::from(index))?;
            store.save_segments()?;
            println!("removed");
        }
        Command::Stats { ceiling } => {
            let ceiling = ceiling.unwrap_or(config.token_ceiling);
            let report = auto_collapse(&store.pages, &store.segments, ceiling);
            store.save_segments()?;
            match cli.format {
                OutputFormat::Json => {
                    println!(
                        "{{\"tokens_before\":{},\"tokens_after\":{},\"reached_ceiling\":{},\"collapsed\":{}}}",
                        report.tokens_before,
                        report.tokens_after,
                        report.reached_ceiling,
                        report.collapsed.len()
                    );
                }
                OutputFormat::Text => {
                    println!(
                        "tokens: {} -> {} (ceiling {}, reached={}), collapsed {} page(s)",
                        report.tokens_before,
                        report.tokens_after,
                        ceiling,
                        report.reached_ceiling,
                        report.collapsed.len()
                    );
                }
            }
        }
    }

    Ok(())
}

fn emit_render(format: &OutputFormat, messages: &[palimpsest::render::RenderedMessage]) {
    match format {
        OutputFormat::Json => {
            for message in messages {
                println!(
                    "{{\"role\":\"{}\",\"content\":{}}}",
                    message.role.as_str(),
                    serde_json::to_string(&message.content).unwrap_or_default()
                );
            }
        }
        OutputFormat::Text => {
            for message in messages {
                println!("--- {} ---", message.role.as_str());
                println!("{}", message.content);
            }
        }
    }
}
