//! UseCase layer: one struct per engine operation, plus the dispatcher
//! and the background monitors. Each usecase owns `Arc`s to the state and
//! ports it needs and exposes a single `execute` entry point.

pub mod authenticate;
pub mod delete_message;
pub mod disconnect;
pub mod dispatcher;
pub mod edit_message;
pub mod error;
pub mod join_room;
pub mod leave_room;
pub mod liveness;
pub mod load_history;
pub mod mark_read;
pub mod send_message;
pub mod set_typing;
pub mod toggle_reaction;

pub use authenticate::AuthenticateUseCase;
pub use delete_message::DeleteMessageUseCase;
pub use disconnect::DisconnectUseCase;
pub use dispatcher::Dispatcher;
pub use edit_message::EditMessageUseCase;
pub use error::EventError;
pub use join_room::JoinRoomUseCase;
pub use leave_room::LeaveRoomUseCase;
pub use liveness::LivenessMonitor;
pub use load_history::LoadHistoryUseCase;
pub use mark_read::MarkReadUseCase;
pub use send_message::SendMessageUseCase;
pub use set_typing::SetTypingUseCase;
pub use toggle_reaction::ToggleReactionUseCase;
