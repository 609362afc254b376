mod api;
mod models;


use log::{error, info, LevelFilter};
use models::config::Config;
use models::context::{Context, ContextPointer};
use rocket::{Build, Rocket};
use simplelog::{ColorChoice, TermLogger, TerminalMode};
use std::sync::Arc;

fn init_logging(level: LevelFilter) {
    let config = simplelog::Config::default();
    if let Err(err) = TermLogger::init(level, config, TerminalMode::Mixed, ColorChoice::Auto) {
        eprintln!("Logger already initialized: {}", err);
    }
}

pub fn build_rocket(context: ContextPointer) -> Rocket<Build> {
    let figment = rocket::Config::figment()
        .merge(("port", *context.config().port()))
        .merge(("address", context.config().address().clone()));

    rocket::custom(figment)
        .manage(context)
        .attach(api::cors())
        .mount("/", api::routes())
        .register("/", api::catchers())
}

#[rocket::main]
async fn main() {
    dotenvy::dotenv().ok();

    let config = match Config::load() {
        Ok(config) => config,
        Err(err) => {
            init_logging(LevelFilter::Info);
            error!("{}", err);
            std::process::exit(1);
        }
    };
    init_logging(config.level_filter().unwrap_or(LevelFilter::Info));

    let port = *config.port();
    let context = Arc::new(Context::new(config));
    info!("Starting movie proxy on port {}", port);

    if let Err(err) = build_rocket(context).launch().await {
        error!("Server stopped: {}", err);
        std::process::exit(1);
    }
}
