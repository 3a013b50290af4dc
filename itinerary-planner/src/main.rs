use std::error::Error;
use std::net::SocketAddr;

use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use itinerary_planner::dataset::Dataset;
use itinerary_planner::itinerary::{
    ItineraryStore, ItineraryWriter, JsonFileStore, manual_transport_needs,
};
use itinerary_planner::planner::{PlanInputs, PlannerConfig, plan_all};
use itinerary_planner::timetable::{CacheConfig, CachedTimetable};
use itinerary_planner::web::{AppState, create_router};

const DEFAULT_DATA_DIR: &str = "data";
const DEFAULT_OUTPUT: &str = "output/itineraries.json";
const DEFAULT_ADDR: &str = "127.0.0.1:3000";

fn env_or(name: &str, default: &str) -> String {
    std::env::var(name).unwrap_or_else(|_| default.to_string())
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let data_dir = env_or("PLANNER_DATA_DIR", DEFAULT_DATA_DIR);
    let output = env_or("PLANNER_OUTPUT", DEFAULT_OUTPUT);
    let addr: SocketAddr = env_or("PLANNER_ADDR", DEFAULT_ADDR).parse()?;

    let dataset = Dataset::load_dir(&data_dir)?;
    let timetable = CachedTimetable::new(dataset.timetable, &CacheConfig::default());

    let config = PlannerConfig::default();
    let run = plan_all(
        &PlanInputs {
            timetable: &timetable,
            links: &dataset.links,
            calendar: &dataset.calendar,
            squads: &dataset.squads,
        },
        &config,
    );
    info!(cached_boards = timetable.cache_entry_count(), "timetable cache");

    let itineraries = ItineraryWriter::write(&run);
    let manual = manual_transport_needs(&itineraries);
    if !manual.is_empty() {
        warn!(segments = manual.len(), "segments need manual transport");
    }
    for failure in &itineraries.failures {
        warn!(squad = %failure.squad, name = %failure.name, error = %failure.error, "unplanned squad");
    }

    let mut store = JsonFileStore::new(&output);
    store.replace_all(&itineraries)?;

    let state = AppState::with_timetable(itineraries, timetable.inner());
    let app = create_router(state);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!(%addr, "serving itineraries");
    axum::serve(listener, app).await?;
    Ok(())
}
