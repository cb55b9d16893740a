//! braindrop command-line front end
//!
//! Capture, browse, and manage ideas from the terminal.

use std::path::PathBuf;

use chrono::{NaiveDate, Utc};
use clap::{Args, Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use braindrop_core::{
    distinct_tags, export_json, filter, parse_backup, sort_by_created_at, BraindropConfig, Idea,
    IdeaFilter, IdeaId, IdeaKind, IdeaMutation, IdeaStats, IdeaStore, IdeaType, ImportMode,
    NewIdea,
};

#[derive(Parser)]
#[command(name = "braindrop", version, about = "Capture and browse ideas")]
struct Cli {
    /// Config file (defaults to the platform config directory)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Override the data directory
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Capture a new idea
    Add(AddArgs),
    /// List ideas, newest first
    List(ListArgs),
    /// Show one idea as JSON
    Show { id: String },
    /// Change fields of an idea
    Edit(EditArgs),
    /// Delete an idea
    Delete { id: String },
    /// Toggle the favorite flag
    Fav { id: String },
    /// All tags in use
    Tags,
    /// Collection statistics
    Stats,
    /// Write a JSON backup
    Export {
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Restore ideas from a JSON backup
    Import {
        path: PathBuf,
        /// Replace the collection instead of merging
        #[arg(long)]
        replace: bool,
    },
    /// Delete every idea
    Clear {
        #[arg(long)]
        yes: bool,
    },
}

#[derive(Args)]
struct AddArgs {
    #[arg(long = "type", default_value = "text")]
    idea_type: IdeaType,
    #[arg(long)]
    title: String,
    #[arg(long)]
    content: Option<String>,
    #[arg(long)]
    description: Option<String>,
    /// Image location
    #[arg(long)]
    uri: Option<String>,
    /// Voice recording location
    #[arg(long)]
    recording: Option<String>,
    #[arg(long = "tag")]
    tags: Vec<String>,
    #[arg(long)]
    favorite: bool,
}

#[derive(Args)]
struct ListArgs {
    #[arg(long = "type")]
    idea_type: Option<IdeaType>,
    #[arg(long)]
    favorites: bool,
    #[arg(long = "tag")]
    tags: Vec<String>,
    #[arg(long)]
    search: Option<String>,
    /// Only ideas created on this day (YYYY-MM-DD)
    #[arg(long)]
    on: Option<NaiveDate>,
    #[arg(long)]
    oldest_first: bool,
    #[arg(long)]
    json: bool,
}

#[derive(Args)]
struct EditArgs {
    id: String,
    #[arg(long)]
    title: Option<String>,
    #[arg(long)]
    content: Option<String>,
    #[arg(long)]
    description: Option<String>,
    #[arg(long)]
    uri: Option<String>,
    #[arg(long)]
    recording: Option<String>,
    /// Replace the tag list
    #[arg(long = "tag")]
    tags: Vec<String>,
    #[arg(long, conflicts_with = "tags")]
    clear_tags: bool,
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    if let Err(err) = run(cli) {
        eprintln!("Error: {err}");
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    let mut config = match cli.config.or_else(BraindropConfig::default_path) {
        Some(path) => BraindropConfig::load(&path)?,
        None => BraindropConfig::default(),
    };
    if let Some(dir) = cli.data_dir {
        config.storage.data_dir = Some(dir);
    }

    let store = config.open_store()?;
    store.initialize()?;

    match cli.command {
        Command::Add(args) => {
            let idea = store.create(new_idea(args))?;
            println!("{}", idea.id);
        }
        Command::List(args) => list(&store, args)?,
        Command::Show { id } => {
            let idea = store
                .get(&IdeaId::from(id.clone()))?
                .ok_or_else(|| format!("no idea with id {id}"))?;
            println!("{}", serde_json::to_string_pretty(&idea)?);
        }
        Command::Edit(args) => {
            let id = IdeaId::from(args.id.clone());
            let idea = store.update(&id, mutations(args))?;
            print_line(&idea);
        }
        Command::Delete { id } => store.delete(&IdeaId::from(id))?,
        Command::Fav { id } => {
            let idea = store.toggle_favorite(&IdeaId::from(id))?;
            print_line(&idea);
        }
        Command::Tags => {
            for tag in distinct_tags(&store.list()?) {
                println!("{tag}");
            }
        }
        Command::Stats => {
            let stats = IdeaStats::compute(&store.list()?, Utc::now().date_naive());
            println!("total      {}", stats.total);
            for t in IdeaType::ALL {
                println!("{:<10} {}", t.as_str(), stats.count_of(t));
            }
            println!("favorites  {}", stats.favorites);
            println!("today      {}", stats.created_today);
        }
        Command::Export { output } => {
            let json = export_json(&store.list()?)?;
            match output {
                Some(path) => std::fs::write(&path, json)?,
                None => println!("{json}"),
            }
        }
        Command::Import { path, replace } => {
            let ideas = parse_backup(&std::fs::read_to_string(&path)?)?;
            let mode = if replace {
                ImportMode::Replace
            } else {
                ImportMode::Merge
            };
            let summary = store.import(ideas, mode)?;
            println!(
                "imported {}, skipped {}",
                summary.imported, summary.skipped
            );
        }
        Command::Clear { yes } => {
            if !yes {
                return Err("refusing to delete all ideas without --yes".into());
            }
            store.clear_all()?;
        }
    }
    Ok(())
}

fn new_idea(args: AddArgs) -> NewIdea {
    let kind = match args.idea_type {
        IdeaType::Text => IdeaKind::Text {
            content: args.content.unwrap_or_default(),
        },
        IdeaType::Voice => IdeaKind::Voice {
            recording_uri: args.recording,
            description: args.description,
        },
        IdeaType::Image => IdeaKind::Image {
            uri: args.uri,
            description: args.description,
        },
    };
    let mut idea = NewIdea::new(args.title, kind).with_tags(args.tags);
    idea.is_favorite = args.favorite;
    idea
}

fn mutations(args: EditArgs) -> Vec<IdeaMutation> {
    let mut out = Vec::new();
    if let Some(title) = args.title {
        out.push(IdeaMutation::SetTitle(title));
    }
    if let Some(content) = args.content {
        out.push(IdeaMutation::SetContent(content));
    }
    if let Some(description) = args.description {
        out.push(IdeaMutation::SetDescription(Some(description)));
    }
    if let Some(uri) = args.uri {
        out.push(IdeaMutation::SetUri(Some(uri)));
    }
    if let Some(recording) = args.recording {
        out.push(IdeaMutation::SetRecordingUri(Some(recording)));
    }
    if args.clear_tags {
        out.push(IdeaMutation::SetTags(Vec::new()));
    } else if !args.tags.is_empty() {
        out.push(IdeaMutation::SetTags(args.tags));
    }
    out
}

fn list(store: &IdeaStore, args: ListArgs) -> Result<(), Box<dyn std::error::Error>> {
    let criteria = IdeaFilter {
        idea_type: args.idea_type,
        favorites_only: args.favorites,
        tags: args.tags,
        search_query: args.search,
        created_on: args.on,
    };
    let all = store.list()?;
    let ideas = sort_by_created_at(&filter(&all, &criteria), args.oldest_first);

    if args.json {
        println!("{}", export_json(&ideas)?);
        return Ok(());
    }
    for idea in &ideas {
        print_line(idea);
    }
    if !criteria.is_empty() {
        eprintln!("{} of {} ideas", ideas.len(), all.len());
    }
    Ok(())
}

fn print_line(idea: &Idea) {
    let star = if idea.is_favorite { "*" } else { " " };
    let tags = if idea.tags.is_empty() {
        String::new()
    } else {
        format!("  #{}", idea.tags.join(" #"))
    };
    println!(
        "{} {} {:<5} {}  {}{}",
        star,
        idea.id,
        idea.idea_type(),
        idea.created_at.format("%Y-%m-%d %H:%M"),
        idea.title,
        tags
    );
}
