//! TempVoice bot server.
//!
//! Waits for a gateway bridge on `/gateway`, creates a room when a member joins
//! the lobby, and removes it once it is empty.
//!
//! Run with:
//! ```not_rust
//! cargo run --bin tempvoice-bot
//! cargo run --bin tempvoice-bot -- --config ./config.json --data ./data/tempvoice.json --port 3000
//! ```

use std::sync::Arc;

use clap::Parser;
use tempvoice_bot::{
    config::BotConfig,
    domain::RoomRepository,
    infrastructure::{
        gateway::WebSocketGateway, repository::InMemoryRoomRepository, store::JsonFileRoomStore,
    },
    ui::Server,
    usecase::{
        ControlRoomUseCase, DispatchControlUseCase, InputCollector, ListRoomsUseCase,
        ManageLifecycleUseCase, OperatorLog,
    },
};
use tempvoice_shared::{logger::setup_logger, time::SystemClock};

#[derive(Parser, Debug)]
#[command(name = "tempvoice-bot")]
#[command(about = "Temporary voice room manager driven by a gateway bridge", long_about = None)]
struct Args {
    /// Host address to bind the server to
    #[arg(short = 'H', long, default_value = "127.0.0.1")]
    host: String,

    /// Port number to bind the server to
    #[arg(short = 'p', long, default_value = "8080")]
    port: u16,

    /// Bot configuration file
    #[arg(short = 'c', long, default_value = "./config.json")]
    config: String,

    /// Room registry file
    #[arg(short = 'd', long, default_value = "./data/tempvoice.json")]
    data: String,

    /// Default log level (overridden by RUST_LOG)
    #[arg(short = 'l', long, default_value = "info")]
    log_level: String,
}

#[tokio::main]
async fn main() {
    let args = Args::parse();

    // Initialize tracing
    setup_logger(env!("CARGO_BIN_NAME"), &args.log_level);

    let config = match BotConfig::load(&args.config) {
        Ok(config) => Arc::new(config),
        Err(e) => {
            tracing::error!("{}", e);
            std::process::exit(1);
        }
    };

    // Initialize dependencies in order:
    // 1. Store / Repository
    // 2. Gateway
    // 3. UseCases
    // 4. Server

    // 1. Load the persisted registry once; memory is authoritative afterwards
    let store = Arc::new(JsonFileRoomStore::new(&args.data));
    let repository = Arc::new(InMemoryRoomRepository::load(store).await);
    tracing::info!(
        "Loaded room registry from {} ({} room(s))",
        args.data,
        repository.count_rooms().await
    );

    // 2. Gateway bridge (connected later over /gateway)
    let gateway = Arc::new(WebSocketGateway::new(config.gateway_command_timeout));

    // 3. UseCases
    let operator_log = OperatorLog::new(gateway.clone(), config.log_channel.clone());
    let collector = Arc::new(InputCollector::new(config.collector_window));
    let lifecycle_usecase = Arc::new(ManageLifecycleUseCase::new(
        repository.clone(),
        gateway.clone(),
        operator_log.clone(),
        config.clone(),
        Arc::new(SystemClock),
    ));
    let control_usecase = Arc::new(ControlRoomUseCase::new(
        repository.clone(),
        gateway.clone(),
        collector.clone(),
        operator_log,
        config.app_owner.clone(),
    ));
    let dispatch_usecase = Arc::new(DispatchControlUseCase::new(
        repository.clone(),
        gateway.clone(),
        control_usecase,
    ));
    let list_rooms_usecase = Arc::new(ListRoomsUseCase::new(repository));

    // 4. Create and run the server
    let server = Server::new(
        gateway,
        lifecycle_usecase,
        dispatch_usecase,
        collector,
        list_rooms_usecase,
    );
    if let Err(e) = server.run(args.host, args.port).await {
        tracing::error!("Server error: {}", e);
        std::process::exit(1);
    }
}
