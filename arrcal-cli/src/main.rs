use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use tracing::info;

use arrcal_core::calendar::{MediaCalendar, DEFAULT_SPAN_DAYS};
use arrcal_core::config::Config;
use arrcal_core::models::{InstanceKind, Movie};
use arrcal_core::paths::ArrcalPaths;
use arrcal_core::sort::{MovieFilter, MovieSort, SortOption};
use arrcal_core::sources::SourceRegistry;
use arrcal_source_radarr::RadarrClient;

#[derive(Parser)]
#[command(name = "arrcal", about = "Release calendar for Radarr/Sonarr instances")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Aggregate upcoming releases across all instances
    Calendar {
        /// Days to load on either side of today
        #[arg(long)]
        days: Option<u32>,
        /// Print the merged calendar as JSON
        #[arg(long)]
        json: bool,
    },
    /// List a Radarr instance's movie library
    Movies {
        /// Instance name (defaults to the first Radarr instance)
        #[arg(long)]
        instance: Option<String>,
        /// Sort criterion: title, year, added, rating, grabbed, size, release
        #[arg(long, default_value = "added")]
        sort: String,
        /// Filter: all, monitored, unmonitored, downloaded, wanted, missing, dangling
        #[arg(long, default_value = "all")]
        filter: String,
        /// Sort ascending instead of descending
        #[arg(long)]
        ascending: bool,
        #[arg(long)]
        json: bool,
    },
    /// List configured instances
    Instances,
    /// Manage the config file
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand)]
enum ConfigAction {
    /// Print the config file path
    Path,
    /// Write a default config file if none exists
    Init,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "arrcal=info".into()),
        )
        .init();

    let cli = Cli::parse();
    let paths = ArrcalPaths::new()?;

    match cli.command {
        Commands::Calendar { days, json } => {
            let config = Config::load(&paths).context("no usable config; run: arrcal config init")?;
            let registry = build_registry(&config)?;
            if registry.is_empty() {
                bail!("no enabled instances configured");
            }

            let days = days.unwrap_or(config.calendar.days.max(1)).max(1);
            let mut calendar = MediaCalendar::new(registry.snapshot(), days);
            calendar.load().await;

            if let Some(err) = calendar.error() {
                bail!("calendar load failed: {err}");
            }
            if json {
                print_calendar_json(&calendar)?;
            } else {
                print_calendar(&calendar);
            }
        }
        Commands::Movies {
            instance,
            sort,
            filter,
            ascending,
            json,
        } => {
            let config = Config::load(&paths).context("no usable config; run: arrcal config init")?;
            let sort = MovieSort {
                ascending,
                option: sort.parse::<SortOption>().map_err(anyhow::Error::msg)?,
                filter: filter.parse::<MovieFilter>().map_err(anyhow::Error::msg)?,
            };

            let target = match instance {
                Some(name) => config
                    .instance(&name)
                    .with_context(|| format!("no instance named {name}"))?
                    .clone(),
                None => config
                    .instances
                    .iter()
                    .find(|i| i.enabled && i.kind == InstanceKind::Radarr)
                    .context("no enabled Radarr instance configured")?
                    .clone(),
            };
            if target.kind != InstanceKind::Radarr {
                bail!("{} is not a Radarr instance", target.name);
            }

            let client = RadarrClient::new(target.to_instance()?, reqwest::Client::new());
            let mut movies = client.movie_catalog().await?;
            info!(count = movies.len(), instance = %target.name, "fetched movie library");
            sort.apply(&mut movies);

            if json {
                println!("{}", serde_json::to_string_pretty(&movies)?);
            } else {
                for movie in &movies {
                    print_movie(movie);
                }
                println!("{} movies", movies.len());
            }
        }
        Commands::Instances => {
            let config = Config::load_or_default(&paths);
            if config.instances.is_empty() {
                println!("no instances configured ({})", paths.config_file().display());
            }
            for instance in &config.instances {
                println!(
                    "{}\t{}\t{}\t{}",
                    instance.name,
                    instance.kind,
                    instance.url,
                    if instance.enabled { "enabled" } else { "disabled" }
                );
            }
        }
        Commands::Config { action } => match action {
            ConfigAction::Path => {
                println!("{}", paths.config_file().display());
            }
            ConfigAction::Init => {
                paths.ensure_dirs()?;
                let path = paths.config_file();
                if path.exists() {
                    bail!("config already exists at {}", path.display());
                }
                let mut config = Config::default();
                config.calendar.days = DEFAULT_SPAN_DAYS;
                config.save(&paths)?;
                println!("wrote {}", path.display());
            }
        },
    }

    Ok(())
}

fn build_registry(config: &Config) -> Result<SourceRegistry> {
    let client = reqwest::Client::new();
    let mut registry = SourceRegistry::new();

    for entry in config.instances.iter().filter(|i| i.enabled) {
        let instance = entry.to_instance()?;
        let source = match instance.kind {
            InstanceKind::Radarr => arrcal_source_radarr::create_source(instance, client.clone()),
            InstanceKind::Sonarr => arrcal_source_sonarr::create_source(instance, client.clone()),
        };
        registry.register(source);
    }

    Ok(registry)
}

fn print_calendar(calendar: &MediaCalendar) {
    let today = calendar.today();
    let store = calendar.store();

    for day in calendar.sorted_dates() {
        let movies = store.movies_on(day);
        let episodes = store.episodes_on(day);
        if movies.is_empty() && episodes.is_empty() {
            continue;
        }

        let marker = if day == today { "  <- today" } else { "" };
        println!("{day}{marker}");

        for movie in movies {
            println!("  {} ({})", movie.title, movie.year);
        }
        for episode in episodes {
            let series = episode.series_title.as_deref().unwrap_or("?");
            let title = episode.title.as_deref().unwrap_or("TBA");
            println!(
                "  {series} {}x{:02} {title}",
                episode.season_number, episode.episode_number
            );
        }
    }
}

fn print_calendar_json(calendar: &MediaCalendar) -> Result<()> {
    let store = calendar.store();
    let mut days = serde_json::Map::new();

    for day in calendar.sorted_dates() {
        let movies = store.movies_on(day);
        let episodes = store.episodes_on(day);
        if movies.is_empty() && episodes.is_empty() {
            continue;
        }
        days.insert(
            day.to_string(),
            serde_json::json!({
                "movies": movies,
                "episodes": episodes,
            }),
        );
    }

    println!("{}", serde_json::to_string_pretty(&days)?);
    Ok(())
}

fn print_movie(movie: &Movie) {
    let state = if movie.has_file {
        "downloaded"
    } else if movie.monitored {
        "wanted"
    } else {
        "unmonitored"
    };
    println!("{} ({})\t{state}", movie.title, movie.year);
}
