pub mod commands;
pub mod config;
pub mod coordinator;
pub mod reply;
pub mod routes;

use crate::config::Config;
use crate::coordinator::Coordinator;
use actix_web::dev::Server;
use actix_web::middleware::Logger;
use actix_web::{web, App, HttpServer};
use std::net::TcpListener;
use std::sync::Arc;
use stockbot::data::{Client as DataClient, Interface as DataInterface};
use stockbot::resolver::{Interface as ResolverInterface, Resolver};
use stockbot::watchlist::{Interface as WatchlistInterface, Watchlist};
use tracing::{info, warn};

pub fn run(listener: TcpListener, config: Config) -> Result<Server, std::io::Error> {
    let resolver: Option<Arc<dyn ResolverInterface>> = match config.api_key {
        Some(api_key) => {
            info!(base_url = %config.base_url, "using quote provider");
            let data_client: Arc<dyn DataInterface> =
                Arc::new(DataClient::new(config.base_url, api_key));
            let resolver: Arc<dyn ResolverInterface> = Arc::new(Resolver::new(data_client));
            Some(resolver)
        }
        None => {
            warn!("ALPHA_VANTAGE_API_KEY is not set, quotes are disabled");
            None
        }
    };

    let coordinator = web::Data::new(Coordinator::new(resolver, config.timing));

    let watchlist: Arc<dyn WatchlistInterface> = Arc::new(Watchlist::new());
    let watchlist = web::Data::new(watchlist);

    let server = HttpServer::new(move || {
        App::new()
            .wrap(Logger::default())
            .app_data(coordinator.clone())
            .app_data(watchlist.clone())
            .service(routes::home::banner)
            .service(routes::health::check)
            .service(routes::price::quote)
            .service(routes::watchlist::dispatch)
    })
    .listen(listener)?
    .run();

    Ok(server)
}
