use std::error::Error;
use std::path::PathBuf;

use dotenv::dotenv;
use slog::info;
use structopt::StructOpt;
use time::OffsetDateTime;

use ethicsline::log::initialize_logger;
use ethicsline::store::{JsonStore, ReportStore};

#[derive(Debug, StructOpt)]
#[structopt(
    name = "seed-reports",
    about = "Populate an empty report store with the demo records"
)]
struct Opt {
    /// The blob file to seed (defaults to ETHICSLINE_STORE_FILE)
    #[structopt(long, parse(from_os_str))]
    path: Option<PathBuf>,

    /// Empty the store first, discarding any existing reports
    #[structopt(long)]
    reset: bool,
}

fn main() -> Result<(), Box<dyn Error>> {
    dotenv().ok();

    let opt = Opt::from_args();

    let logger = initialize_logger();

    let store = match opt.path {
        Some(path) => JsonStore::new(path, logger.clone()),
        None => JsonStore::from_env(logger.clone())?,
    };

    if opt.reset {
        info!(logger, "Resetting store...");
        store.save(&[])?;
    }

    let inserted = store.seed_if_empty(OffsetDateTime::now_utc())?;

    if inserted == 0 {
        info!(logger, "Store already has reports; nothing to do");
    } else {
        info!(logger, "Seeded demo reports"; "inserted" => inserted);
    }

    Ok(())
}
