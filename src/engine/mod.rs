pub mod clash;
pub mod penalty;
pub mod state;
pub mod token;

pub use penalty::PenaltyStore;
pub use state::{EngineState, Tuning};
pub use token::Token;
