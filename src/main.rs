use config::Config;
use dotenvy::dotenv;

use masdar_portal::models::config::ServerConfig;
use masdar_portal::run;

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    dotenv().ok();
    env_logger::init();

    let server_config = Config::builder()
        .add_source(config::File::with_name("config").required(false))
        .add_source(config::Environment::default().try_parsing(true))
        .build()
        .and_then(|config| config.try_deserialize::<ServerConfig>())
        .map_err(|e| std::io::Error::other(format!("Failed to load configuration: {e}")))?;

    run(server_config).await
}
