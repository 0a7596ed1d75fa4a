use anyhow::{Context, Result};
use chrono::{Local, NaiveDate};
use clap::{Parser, Subcommand};
use serde::de::DeserializeOwned;
use serde_json::json;
use storage::{
    Database,
    dto::{
        location::{CreateLocationRequest, UpdateLocationRequest},
        organizer::{CreateOrganizerRequest, UpdateOrganizerRequest},
        race::{CreateRaceRequest, UpdateRaceRequest},
        season::{CreateSeasonRequest, UpdateSeasonRequest},
        story::{CreateStoryRequest, UpdateStoryRequest},
    },
    models::{Geocodable, NewLocation},
    repository::{LocationRepository, OrganizerRepository},
    services::{
        geocoding::{NominatimGeocoder, geocode_location},
        locations, news, organizers,
        race_windows::RaceWindow,
        races, schedule, seasons,
    },
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod config;

use config::Config;

#[derive(Parser)]
#[command(name = "racemanager")]
#[command(about = "Race schedule and location tools for the club database", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    #[arg(long, env = "DATABASE_URL", global = true)]
    database_url: Option<String>,

    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Look up the coordinates of an address without saving anything
    Geocode {
        #[arg(long)]
        address: String,

        #[arg(long)]
        zip: i32,
    },

    #[command(flatten)]
    Database(DatabaseCommand),
}

/// Commands that need `DATABASE_URL`. Payload arguments are JSON request bodies.
#[derive(Subcommand)]
enum DatabaseCommand {
    /// Create or upgrade the database schema
    Migrate,
    /// List every season, latest first
    Seasons,
    /// Show the season currently flagged as current
    CurrentSeason,
    /// Add a season, e.g. '{"opening_year": 2014, "closing_year": 2015}'
    AddSeason { payload: String },
    /// Change fields of a season
    UpdateSeason { id: i32, payload: String },
    /// Make a season the only current season
    SetCurrentSeason { id: i32 },
    /// Delete a season that has no races
    DeleteSeason { id: i32 },
    /// List the races of one date window
    Races {
        /// Season slug, e.g. 2014-2015. Defaults to the current season
        #[arg(long)]
        season: Option<String>,

        /// upcoming, past, weekend, this-month or next-month
        #[arg(long, default_value = "upcoming")]
        window: RaceWindow,

        /// Reference date (YYYY-MM-DD). Defaults to today
        #[arg(long)]
        today: Option<NaiveDate>,
    },
    /// Upcoming and past races of a season
    Schedule {
        slug: String,

        #[arg(long)]
        today: Option<NaiveDate>,
    },
    /// Weekend, rest-of-month and next-month races of the current season
    Home {
        #[arg(long)]
        today: Option<NaiveDate>,
    },
    /// Show a single race of a season
    Race {
        season: String,

        id: i32,

        #[arg(long)]
        today: Option<NaiveDate>,
    },
    /// Add a race. Flyer and results uploads must be png, jpg, jpeg or pdf
    AddRace { payload: String },
    /// Change fields of a race
    UpdateRace { id: i32, payload: String },
    DeleteRace { id: i32 },
    /// List organizers by name
    Organizers,
    AddOrganizer { payload: String },
    UpdateOrganizer { id: i32, payload: String },
    /// Delete an organizer that no race references
    DeleteOrganizer { id: i32 },
    /// List locations
    Locations {
        /// Only locations that have not been geocoded
        #[arg(long)]
        missing_coordinates: bool,
    },
    /// Save a new location, geocoding its address
    AddLocation {
        #[arg(long)]
        city: String,

        #[arg(long, default_value = "NC")]
        state: String,

        #[arg(long)]
        zip: i32,

        #[arg(long)]
        address: String,

        #[arg(long)]
        description: Option<String>,
    },
    /// Change fields of a location, geocoding it again if it has no coordinates
    UpdateLocation { id: i32, payload: String },
    /// Delete a location that no race uses
    DeleteLocation { id: i32 },
    /// List news stories, newest first
    News {
        /// Include drafts
        #[arg(long)]
        drafts: bool,
    },
    /// Show a published story by its permalink, e.g. 2015 jan 3 season-opener
    Story {
        year: i32,

        month: String,

        day: u32,

        slug: String,
    },
    /// Add a story, e.g. '{"headline": "Season opener", "status": "published"}'
    AddStory { payload: String },
    UpdateStory { id: i32, payload: String },
    DeleteStory { id: i32 },
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    let log_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                format!("racemanager={},storage={}", log_level, log_level).into()
            }),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let config = Config::from_env().context("Failed to load configuration")?;

    match cli.command {
        Commands::Geocode { address, zip } => {
            handle_geocode(&config, address, zip).await?;
        }
        Commands::Database(command) => {
            let database_url = cli
                .database_url
                .as_deref()
                .context("DATABASE_URL must be set for this command")?;
            let db = connect(database_url).await?;
            handle_database_command(&db, &config, command).await?;
        }
    }

    Ok(())
}

async fn connect(database_url: &str) -> Result<Database> {
    tracing::info!(
        "Connecting to database at: {}",
        database_url.split('@').next_back().unwrap_or("unknown")
    );
    let db = Database::new(database_url)
        .await
        .context("Failed to initialize database")?;
    tracing::debug!("Database connection established");

    Ok(db)
}

async fn handle_database_command(
    db: &Database,
    config: &Config,
    command: DatabaseCommand,
) -> Result<()> {
    let pool = db.pool();

    match command {
        DatabaseCommand::Migrate => {
            tracing::info!("Running database migrations");
            db.run_migrations()
                .await
                .context("Failed to run migrations")?;
            tracing::info!("Database migrations completed successfully");
        }
        DatabaseCommand::Seasons => {
            print_json(&schedule::list_seasons(pool).await?)?;
        }
        DatabaseCommand::CurrentSeason => {
            let season = schedule::current_season(pool)
                .await
                .context("No current season")?;
            print_json(&season)?;
        }
        DatabaseCommand::AddSeason { payload } => {
            let request: CreateSeasonRequest = parse_payload(&payload, "season")?;
            print_json(&seasons::create_season(pool, &request).await?)?;
        }
        DatabaseCommand::UpdateSeason { id, payload } => {
            let request: UpdateSeasonRequest = parse_payload(&payload, "season")?;
            print_json(&seasons::update_season(pool, id, &request).await?)?;
        }
        DatabaseCommand::SetCurrentSeason { id } => {
            print_json(&seasons::set_current_season(pool, id).await?)?;
        }
        DatabaseCommand::DeleteSeason { id } => {
            seasons::delete_season(pool, id).await?;
            tracing::info!("Deleted season {}", id);
        }
        DatabaseCommand::Races {
            season,
            window,
            today,
        } => {
            let today = today.unwrap_or_else(local_today);
            tracing::info!("Listing {} races as of {}", window, today);
            let races = schedule::season_races(pool, season.as_deref(), window, today).await?;
            print_json(&races)?;
        }
        DatabaseCommand::Schedule { slug, today } => {
            let today = today.unwrap_or_else(local_today);
            print_json(&schedule::season_schedule(pool, &slug, today).await?)?;
        }
        DatabaseCommand::Home { today } => {
            let today = today.unwrap_or_else(local_today);
            print_json(&schedule::home_page(pool, today).await?)?;
        }
        DatabaseCommand::Race { season, id, today } => {
            let today = today.unwrap_or_else(local_today);
            print_json(&schedule::race_detail(pool, &season, id, today).await?)?;
        }
        DatabaseCommand::AddRace { payload } => {
            let request: CreateRaceRequest = parse_payload(&payload, "race")?;
            print_json(&races::create_race(pool, &request).await?)?;
        }
        DatabaseCommand::UpdateRace { id, payload } => {
            let request: UpdateRaceRequest = parse_payload(&payload, "race")?;
            print_json(&races::update_race(pool, id, &request).await?)?;
        }
        DatabaseCommand::DeleteRace { id } => {
            races::delete_race(pool, id).await?;
            tracing::info!("Deleted race {}", id);
        }
        DatabaseCommand::Organizers => {
            print_json(&OrganizerRepository::new(pool).list().await?)?;
        }
        DatabaseCommand::AddOrganizer { payload } => {
            let request: CreateOrganizerRequest = parse_payload(&payload, "organizer")?;
            print_json(&organizers::create_organizer(pool, &request).await?)?;
        }
        DatabaseCommand::UpdateOrganizer { id, payload } => {
            let request: UpdateOrganizerRequest = parse_payload(&payload, "organizer")?;
            print_json(&organizers::update_organizer(pool, id, &request).await?)?;
        }
        DatabaseCommand::DeleteOrganizer { id } => {
            organizers::delete_organizer(pool, id).await?;
            tracing::info!("Deleted organizer {}", id);
        }
        DatabaseCommand::Locations {
            missing_coordinates,
        } => {
            let repo = LocationRepository::new(pool);
            let locations = if missing_coordinates {
                repo.list_missing_coordinates().await?
            } else {
                repo.list().await?
            };
            print_json(&locations)?;
        }
        DatabaseCommand::AddLocation {
            city,
            state,
            zip,
            address,
            description,
        } => {
            let geocoder = NominatimGeocoder::new(&config.geocoder)
                .context("Failed to build geocoding client")?;
            let request = CreateLocationRequest {
                city,
                state,
                zip_code: zip,
                address,
                description,
            };

            let location =
                locations::create_location(&LocationRepository::new(pool), &geocoder, &request)
                    .await?;
            warn_if_not_geocoded(&location);
            print_json(&location)?;
        }
        DatabaseCommand::UpdateLocation { id, payload } => {
            let geocoder = NominatimGeocoder::new(&config.geocoder)
                .context("Failed to build geocoding client")?;
            let request: UpdateLocationRequest = parse_payload(&payload, "location")?;

            let location = locations::update_location(
                &LocationRepository::new(pool),
                &geocoder,
                id,
                &request,
            )
            .await?;
            warn_if_not_geocoded(&location);
            print_json(&location)?;
        }
        DatabaseCommand::DeleteLocation { id } => {
            LocationRepository::new(pool).delete(id).await?;
            tracing::info!("Deleted location {}", id);
        }
        DatabaseCommand::News { drafts } => {
            let stories = news::list_stories(pool, drafts).await?;
            let listing: Vec<_> = stories
                .iter()
                .map(|story| {
                    json!({
                        "story": story,
                        "permalink": story.permalink(),
                        "excerpt": story.excerpt(),
                        "has_more": story.has_more(),
                    })
                })
                .collect();
            print_json(&listing)?;
        }
        DatabaseCommand::Story {
            year,
            month,
            day,
            slug,
        } => {
            let story = news::story_by_permalink(pool, year, &month, day, &slug).await?;
            print_json(&json!({
                "story": story,
                "permalink": story.permalink(),
            }))?;
        }
        DatabaseCommand::AddStory { payload } => {
            let request: CreateStoryRequest = parse_payload(&payload, "story")?;
            print_json(&news::create_story(pool, &request).await?)?;
        }
        DatabaseCommand::UpdateStory { id, payload } => {
            let request: UpdateStoryRequest = parse_payload(&payload, "story")?;
            print_json(&news::update_story(pool, id, &request).await?)?;
        }
        DatabaseCommand::DeleteStory { id } => {
            news::delete_story(pool, id).await?;
            tracing::info!("Deleted story {}", id);
        }
    }

    Ok(())
}

async fn handle_geocode(config: &Config, address: String, zip: i32) -> Result<()> {
    let geocoder =
        NominatimGeocoder::new(&config.geocoder).context("Failed to build geocoding client")?;

    let mut location = NewLocation {
        city: String::new(),
        state: String::new(),
        zip_code: zip,
        address,
        description: None,
        latitude: None,
        longitude: None,
    };
    let query = location.geocode_query();

    let outcome = geocode_location(&geocoder, &mut location).await;
    tracing::debug!("Geocode outcome: {:?}", outcome);

    print_json(&json!({
        "query": query,
        "coordinates": location.coordinates(),
    }))
}

fn warn_if_not_geocoded(location: &impl Geocodable) {
    if !location.has_coordinates() {
        tracing::warn!("Location saved without coordinates");
    }
}

fn parse_payload<T: DeserializeOwned>(payload: &str, kind: &str) -> Result<T> {
    serde_json::from_str(payload).with_context(|| format!("Invalid {} JSON", kind))
}

fn local_today() -> NaiveDate {
    Local::now().date_naive()
}

fn print_json<T: serde::Serialize + ?Sized>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
