pub mod input;
pub mod matcher;
pub mod queue;
pub mod worker;

pub use input::{KeyPhase, RawKeyEvent};
pub use matcher::{Matcher, Step};
pub use queue::CancelToken;
pub use worker::{DrillUpdate, FeedbackSink, Session, Worker};
