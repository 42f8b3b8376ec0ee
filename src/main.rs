use anyhow::{Context, Result, bail};
use clap::Parser;
use gw2_render::fetch::attach_wiki_link;
use gw2_render::{
    Character, DisplayRecord, DocumentStore, GameMode, HttpImageSource, JsonCatalog,
    RenderConfig, Settings, TooltipBuilder, TraitlineComposer, dedupe_skills, logging,
    render_traitlines,
};
use std::path::PathBuf;
use tokio::time::Duration;

// Largest block of tooltip lines printed together.
const CHUNK_LIMIT: usize = 1024;

/// Guild Wars 2 skill tooltips and trait-line images
#[derive(Parser)]
#[command(name = "gw2_render")]
#[command(about = "Render skill tooltips and specialization images", long_about = None)]
#[command(version)]
struct Cli {
    /// Directory holding skills.json, traits.json and specializations.json
    #[arg(long, default_value = "./data")]
    data_dir: PathBuf,

    /// Settings file, defaults are used when it does not exist
    #[arg(long)]
    settings: Option<PathBuf>,

    /// Log debug messages
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Parser)]
enum Command {
    /// Print the tooltip of a skill
    Skill {
        name: String,
        /// Check the wiki and print its link when the page exists
        #[arg(long)]
        link: bool,
    },

    /// Print the tooltip of a trait
    Trait {
        name: String,
        #[arg(long)]
        link: bool,
    },

    /// Render a character's specializations into a PNG
    Traitlines {
        /// Character document (JSON)
        character: PathBuf,
        #[arg(long, default_value = "pve")]
        mode: GameMode,
        #[arg(long, default_value = "specializations.png")]
        out: PathBuf,
    },
}

fn print_record(record: &DisplayRecord) {
    println!("{}", record.title);
    if let Some(url) = &record.url {
        println!("{}", url);
    }
    if let Some(description) = &record.description {
        println!("{}", description);
    }
    for chunk in record.chunk_lines(CHUNK_LIMIT) {
        println!("\n{}", chunk);
    }
    if let Some(footer) = &record.footer {
        println!("\n{}", footer.text);
    }
}

async fn show(mut records: Vec<DisplayRecord>, link: bool, config: &RenderConfig) {
    let client = reqwest::Client::new();
    if records.len() > 1 {
        println!("{} matches:\n", records.len());
    }
    for record in records.iter_mut() {
        if link {
            attach_wiki_link(record, &client, &config.wiki_base_url).await;
        }
        print_record(record);
        println!();
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let _ = logging::init(logging::default_log_dir(), cli.verbose);

    let settings = match &cli.settings {
        Some(path) => Settings::load_settings_from_file(path)
            .with_context(|| format!("Failed to read settings from {}", path.display()))?,
        None => Settings::load().context("Failed to read settings")?,
    };
    let config = settings.render_config();
    let catalog = JsonCatalog::load_dir(&cli.data_dir)?;
    let builder = TooltipBuilder::new(&config);

    match cli.command {
        Command::Skill { name, link } => {
            let skills = dedupe_skills(catalog.find_skills(&name).await?);
            if skills.is_empty() {
                bail!("No skill named {}", name);
            }
            let records = skills.iter().map(|skill| builder.skill(skill)).collect();
            show(records, link, &config).await;
        }
        Command::Trait { name, link } => {
            let traits = catalog.find_traits(&name).await?;
            if traits.is_empty() {
                bail!("No trait named {}", name);
            }
            let records = traits.iter().map(|t| builder.build_trait(t)).collect();
            show(records, link, &config).await;
        }
        Command::Traitlines {
            character,
            mode,
            out,
        } => {
            let data = std::fs::read_to_string(&character)
                .with_context(|| format!("Failed to read {}", character.display()))?;
            let character: Character = serde_json::from_str(&data)?;

            let font = match &settings.font_path {
                Some(path) => Some(TraitlineComposer::load_font(path)?),
                None => None,
            };
            let composer = TraitlineComposer::new(font);
            let png = render_traitlines(
                &catalog,
                &HttpImageSource::default(),
                &composer,
                &character,
                mode,
                Duration::from_secs(settings.fetch_timeout_secs),
            )
            .await?;
            std::fs::write(&out, png)?;
            println!("Wrote {}", out.display());
        }
    }
    Ok(())
}
