//! Real-time presence and room messaging server.
//!
//! Accepts WebSocket sessions, tracks who is online and typing, and
//! fans room events out to the right connections.
//!
//! Run with:
//! ```not_rust
//! cargo run --bin atelier-server
//! cargo run --bin atelier-server -- --host 0.0.0.0 --port 3000
//! ```

use std::{sync::Arc, time::Duration};

use atelier_server::{
    config::EngineConfig,
    infrastructure::{
        ConnectionRegistry, DevTokenVerifier, InMemoryMessageStore, RoomDirectory, TypingTracker,
        WebSocketMessagePusher,
    },
    ui::{Server, state::AppState},
    usecase::{
        AuthenticateUseCase, DeleteMessageUseCase, DisconnectUseCase, Dispatcher,
        EditMessageUseCase, JoinRoomUseCase, LeaveRoomUseCase, LivenessMonitor,
        LoadHistoryUseCase, MarkReadUseCase, SendMessageUseCase, SetTypingUseCase,
        ToggleReactionUseCase,
    },
};
use atelier_shared::{logger::setup_logger, time::SystemClock};
use clap::Parser;

#[derive(Parser, Debug)]
#[command(name = "atelier-server")]
#[command(about = "Real-time presence and room messaging server", long_about = None)]
struct Args {
    /// Host address to bind the server to
    #[arg(short = 'H', long, default_value = "127.0.0.1")]
    host: String,

    /// Port number to bind the server to
    #[arg(short = 'p', long, default_value = "8080")]
    port: u16,

    /// Seconds between liveness probe sweeps
    #[arg(long, default_value = "30")]
    ping_interval_secs: u64,

    /// Seconds a typing indicator survives without a refresh
    #[arg(long, default_value = "10")]
    typing_ttl_secs: u64,

    /// Maximum messages per history page
    #[arg(long, default_value = "50")]
    history_page_limit: usize,
}

#[tokio::main]
async fn main() {
    // Initialize tracing
    setup_logger(env!("CARGO_BIN_NAME"), "debug");

    let args = Args::parse();
    let config = EngineConfig {
        ping_interval: Duration::from_secs(args.ping_interval_secs),
        typing_ttl: Duration::from_secs(args.typing_ttl_secs),
        history_page_limit: args.history_page_limit,
    };

    // Initialize dependencies in order:
    // 1. Shared state and collaborators
    // 2. UseCases
    // 3. Dispatcher and background monitors
    // 4. AppState and Server

    // 1. Shared state and collaborators
    let registry = Arc::new(ConnectionRegistry::new());
    let rooms = Arc::new(RoomDirectory::new());
    let typing = Arc::new(TypingTracker::new());
    let pusher = Arc::new(WebSocketMessagePusher::new());
    let store = Arc::new(InMemoryMessageStore::new());
    let verifier = Arc::new(DevTokenVerifier::new());
    let clock = Arc::new(SystemClock);

    // 2. UseCases
    let authenticate = Arc::new(AuthenticateUseCase::new(
        registry.clone(),
        verifier,
        pusher.clone(),
    ));
    let join_room = Arc::new(JoinRoomUseCase::new(
        registry.clone(),
        rooms.clone(),
        store.clone(),
        pusher.clone(),
        config,
    ));
    let leave_room = Arc::new(LeaveRoomUseCase::new(
        registry.clone(),
        rooms.clone(),
        typing.clone(),
        pusher.clone(),
    ));
    let send_message = Arc::new(SendMessageUseCase::new(
        rooms.clone(),
        typing.clone(),
        store.clone(),
        pusher.clone(),
        clock.clone(),
    ));
    let edit_message = Arc::new(EditMessageUseCase::new(
        rooms.clone(),
        store.clone(),
        pusher.clone(),
        clock.clone(),
    ));
    let delete_message = Arc::new(DeleteMessageUseCase::new(
        rooms.clone(),
        store.clone(),
        pusher.clone(),
    ));
    let set_typing = Arc::new(SetTypingUseCase::new(
        rooms.clone(),
        typing.clone(),
        pusher.clone(),
        clock.clone(),
        config,
    ));
    let toggle_reaction = Arc::new(ToggleReactionUseCase::new(
        rooms.clone(),
        store.clone(),
        pusher.clone(),
    ));
    let mark_read = Arc::new(MarkReadUseCase::new(
        rooms.clone(),
        store.clone(),
        pusher.clone(),
        clock.clone(),
    ));
    let load_history = Arc::new(LoadHistoryUseCase::new(store, pusher.clone(), config));
    let disconnect = Arc::new(DisconnectUseCase::new(
        registry.clone(),
        rooms.clone(),
        typing,
        pusher.clone(),
    ));

    // 3. Dispatcher and background monitors
    let dispatcher = Arc::new(Dispatcher::new(
        registry.clone(),
        pusher.clone(),
        clock.clone(),
        authenticate,
        join_room,
        leave_room,
        send_message,
        edit_message,
        delete_message,
        set_typing.clone(),
        toggle_reaction,
        mark_read,
        load_history,
    ));

    let monitor = Arc::new(LivenessMonitor::new(
        registry.clone(),
        pusher.clone(),
        disconnect.clone(),
        clock.clone(),
        config.ping_interval,
    ));
    let _monitor_task = monitor.spawn();
    let _sweeper_task = set_typing.spawn_sweeper(Duration::from_secs(1));

    // 4. Create and run the server
    let state = Arc::new(AppState {
        dispatcher,
        registry,
        rooms,
        pusher,
        disconnect,
        clock,
    });
    let server = Server::new(state);
    if let Err(e) = server.run(args.host, args.port).await {
        tracing::error!("Server error: {}", e);
        std::process::exit(1);
    }
}
