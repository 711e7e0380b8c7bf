//! Infrastructure layer: concrete in-memory state behind the domain's
//! contracts, plus the in-process stand-ins for the external identity and
//! persistence collaborators.

pub mod identity;
pub mod pusher;
pub mod registry;
pub mod rooms;
pub mod store;
pub mod typing;

pub use identity::DevTokenVerifier;
pub use pusher::WebSocketMessagePusher;
pub use registry::{ConnectionRegistry, ProbeSweep};
pub use rooms::{LeaveOutcome, RoomDirectory};
pub use store::InMemoryMessageStore;
pub use typing::{TypingEntry, TypingTracker};
