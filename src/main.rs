use std::env;

use config::{Config, Environment, File};
use dotenvy::dotenv;

use pushkind_listing::models::config::ServerConfig;
use pushkind_listing::repository::memory::UserDirectory;

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    dotenv().ok(); // Load .env file
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let app_env = env::var("APP_ENV").unwrap_or_else(|_| "local".into());

    let settings = Config::builder()
        .add_source(File::with_name("config/default"))
        .add_source(File::with_name(&format!("config/{app_env}")).required(false))
        .add_source(
            Environment::with_prefix("APP")
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        )
        .build();

    let settings = match settings {
        Ok(settings) => settings,
        Err(err) => {
            log::error!("Error loading settings: {err}");
            std::process::exit(1);
        }
    };

    let server_config = match settings.try_deserialize::<ServerConfig>() {
        Ok(server_config) => server_config,
        Err(err) => {
            log::error!("Error loading server config: {err}");
            std::process::exit(1);
        }
    };

    if let Err(err) = server_config.list.check() {
        log::error!("Invalid list settings: {err}");
        std::process::exit(1);
    }

    let directory = match UserDirectory::from_csv_path(&server_config.users_csv) {
        Ok(directory) => directory,
        Err(err) => {
            log::error!("Failed to load users from {}: {err}", server_config.users_csv);
            std::process::exit(1);
        }
    };

    pushkind_listing::run(server_config, directory).await
}
