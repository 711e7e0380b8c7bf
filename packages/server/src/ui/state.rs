//! Shared handler state.

use std::sync::Arc;

use atelier_shared::time::Clock;

use crate::domain::MessagePusher;
use crate::infrastructure::{ConnectionRegistry, RoomDirectory};
use crate::usecase::{DisconnectUseCase, Dispatcher};

/// Shared application state
pub struct AppState {
    pub dispatcher: Arc<Dispatcher>,
    pub registry: Arc<ConnectionRegistry>,
    pub rooms: Arc<RoomDirectory>,
    pub pusher: Arc<dyn MessagePusher>,
    pub disconnect: Arc<DisconnectUseCase>,
    pub clock: Arc<dyn Clock>,
}
