pub mod server;
pub mod types;

pub use server::{router, AppState, GatewayServer};
pub use types::{ErrorBody, GenerateBody, TargetOption, TargetsResponse, TtsBody};
