mod auth;
mod config;
mod error;
mod models;
mod routes;

use actix_files::Files;
use actix_web::{
    middleware::Logger,
    web::{self, Data},
    App, HttpResponse, HttpServer,
};
use env_logger::Env;
use hostel_shared::{
    seed::default_rooms, MemoryStore, MongoStore, RoomInventory, RoomStore, SystemClock,
};
use log::{info, warn};
use std::{io, sync::Arc};

use crate::{auth::AdminToken, config::Config};

#[actix_web::main]
async fn main() -> Result<(), io::Error> {
    dotenv::dotenv().ok();
    env_logger::init_from_env(Env::default().default_filter_or("info"));

    let config = Config::from_env().map_err(|e| io::Error::new(io::ErrorKind::InvalidInput, e))?;

    let store: Arc<dyn RoomStore> = match &config.database_url {
        Some(url) => {
            info!("Connecting to database {}...", config.database_name);
            let store = MongoStore::connect(url, &config.database_name)
                .await
                .map_err(|e| io::Error::new(io::ErrorKind::Other, e))?;
            Arc::new(store)
        }
        None => {
            warn!("DATABASE_URL not set, rooms are kept in memory");
            Arc::new(MemoryStore::new())
        }
    };

    let inventory = RoomInventory::new(store, Arc::new(SystemClock));

    if config.seed_rooms {
        let report = inventory
            .seed(default_rooms(inventory.clock()))
            .await
            .map_err(|e| io::Error::new(io::ErrorKind::Other, e))?;
        info!(
            "Seeded {} rooms ({} already present)",
            report.created, report.skipped
        );
    }

    if config.admin_token.is_none() {
        warn!("ADMIN_TOKEN not set, admin routes are open");
    }

    let inventory = Data::new(inventory);
    let admin_token = Data::new(AdminToken(config.admin_token.clone()));
    let front_path = config.front_path.clone();

    info!("Starting server at http://{}:{}", config.host, config.port);

    HttpServer::new(move || {
        let app = App::new()
            .app_data(inventory.clone())
            .app_data(admin_token.clone())
            .wrap(Logger::default())
            .configure(routes::configure)
            .default_service(web::route().to(HttpResponse::NotFound));

        match &front_path {
            Some(path) => app.service(Files::new("/", path).index_file("index.html")),
            None => app,
        }
    })
    .bind((config.host.as_str(), config.port))?
    .run()
    .await
}
