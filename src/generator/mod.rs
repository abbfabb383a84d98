pub mod question;
pub mod source;

pub use question::{Question, QuestionBuilder};
pub use source::TokenSource;
