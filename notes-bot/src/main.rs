//! Notes bot: register and serve named links from Discord.
//!
//! Links live in JSON note-files, on local disk or in an S3 bucket.

mod channels;
mod commands;
mod config;
mod http;
mod notes;
mod storage;

use config::Config;
use notes::NoteStore;

#[tokio::main]
async fn main() {
    dotenv::dotenv().ok();
    env_logger::init();

    let config = Config::from_env();

    let storage = match storage::from_config(&config.storage) {
        Ok(storage) => storage,
        Err(e) => {
            log::error!("Failed to initialize note storage: {}", e);
            std::process::exit(1);
        }
    };
    log::info!("Note files stored in {}", storage.describe());

    let store = NoteStore::new(storage);

    if let Err(e) = channels::start_discord_listener(&config.bot_token, store, config.notes).await {
        log::error!("{}", e);
        std::process::exit(1);
    }
}
