use std::error::Error;
use std::sync::Arc;

use futures::future::FutureExt;
use slog::info;
use time::OffsetDateTime;
use tokio::sync::mpsc;
use warp::Filter;

use ethicsline::config::{get_variable, get_variable_or};
use ethicsline::environment::{Config, Environment};
use ethicsline::log::initialize_logger;
use ethicsline::routes;
use ethicsline::store::{JsonStore, ReportStore};
use ethicsline::urls::Urls;

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    dotenv::dotenv().ok();

    let logger = initialize_logger();

    let main_port: u16 = get_variable("ETHICSLINE_PORT")
        .parse()
        .expect("parse ETHICSLINE_PORT as u16");
    let admin_port: u16 = get_variable("ETHICSLINE_ADMIN_PORT")
        .parse()
        .expect("parse ETHICSLINE_ADMIN_PORT as u16");

    info!(logger, "Starting..."; "main_port" => main_port, "admin_port" => admin_port);

    let store = Arc::new(
        JsonStore::from_env(logger.clone()).expect("initialize report store from environment"),
    );

    if get_variable_or("ETHICSLINE_SEED_DEMO_DATA", "0") == "1" {
        let inserted = store
            .seed_if_empty(OffsetDateTime::now_utc())
            .expect("seed report store");
        info!(logger, "Seeded demo data"; "inserted" => inserted);
    }

    let logger = Arc::new(logger);

    let urls = Arc::new(Urls::new(
        get_variable("ETHICSLINE_BASE_URL"),
        get_variable_or("ETHICSLINE_REPORTS_PATH", "reports"),
    ));

    let config = Config::new(
        get_variable_or("ETHICSLINE_RECENT_LIMIT", "5")
            .parse()
            .expect("parse ETHICSLINE_RECENT_LIMIT as usize"),
    );
    let environment = Environment::new(logger.clone(), store, urls, config);

    let (termination_sender, mut termination_receiver) = mpsc::channel::<()>(1);

    let terminate = Arc::new(move || {
        let termination_sender = termination_sender.clone();

        async move {
            let termination_sender = termination_sender.clone();
            termination_sender.send(()).await.unwrap();
        }
        .boxed()
    });

    let should_terminate = async move {
        termination_receiver.recv().await;
    }
    .shared();

    let ctrlc = {
        let should_terminate = should_terminate.clone();
        let terminate = terminate.clone();

        let signal = tokio::signal::ctrl_c();

        async move {
            let terminate = terminate.clone();

            tokio::select! {
                _ = should_terminate => {},
                _ = signal => {
                    terminate().await;
                }
            }
        }
    };

    let main_server = {
        let should_terminate = should_terminate.clone();

        let logger2 = logger.clone();

        let submit_route = routes::make_submit_route(environment.clone());
        let list_route = routes::make_list_route(environment.clone());
        let retrieve_route = routes::make_retrieve_route(environment.clone());
        let count_route = routes::make_count_route(environment.clone());
        let recent_route = routes::make_recent_route(environment.clone());
        let summary_route = routes::make_summary_route(environment.clone());
        let kpis_route = routes::make_kpis_route(environment.clone());
        let categories_route = routes::make_categories_route(environment.clone());

        let routes = submit_route
            .or(retrieve_route)
            .or(count_route)
            .or(recent_route)
            .or(summary_route)
            .or(kpis_route)
            .or(categories_route)
            .or(list_route)
            .recover(move |r| routes::format_rejection(logger2.clone(), r));

        let (_, main_server) =
            warp::serve(routes).bind_with_graceful_shutdown(([0, 0, 0, 0], main_port), async {
                should_terminate.await;
            });

        main_server
    };

    let admin_server = {
        let should_terminate = should_terminate.clone();
        let terminate = terminate.clone();

        let routes = routes::admin::make_healthz_route(environment.clone()).or(
            routes::admin::make_termination_route(environment.clone(), terminate),
        );

        let (_, admin_server) =
            warp::serve(routes).bind_with_graceful_shutdown(([0, 0, 0, 0], admin_port), async {
                should_terminate.await;
            });

        admin_server
    };

    tokio::join!(ctrlc, main_server, admin_server);

    info!(logger, "Exiting gracefully...");

    Ok(())
}
