use bota::{
    api::{self, AppState},
    init, AppContext, BotaError,
};
use bota_config::ConfigManager;

#[tokio::main]
async fn main() {
    init();

    if let Err(err) = run().await {
        eprintln!("Error: {err}");
        std::process::exit(1);
    }
}

async fn run() -> Result<(), BotaError> {
    let config = ConfigManager::from_env()?.load()?;
    let addr = config.server_addr.clone();
    let context = AppContext::open(config)?;
    api::serve(&addr, AppState::from(&context)).await
}
