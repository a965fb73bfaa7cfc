//! Application services orchestrating the domain and its ports.

mod completion;

pub use completion::{CompletionOutput, CompletionService};
