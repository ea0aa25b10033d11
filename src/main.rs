use log::{error, info};

mod chat_gpt;
mod storages;
mod telegram;
mod utils;

#[tokio::main]
async fn main() {
    pretty_env_logger::init();
    info!("Starting name suggestion telegram bot...");

    if let Err(e) = telegram::startup().await {
        error!("Bot stopped: {e:#}");
    }
}
