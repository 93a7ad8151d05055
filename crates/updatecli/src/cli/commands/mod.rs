//! CLI commands

mod completions;
mod filter;
mod guess;
mod step;
mod validate;

pub use completions::CompletionsCommand;
pub use filter::FilterCommand;
pub use guess::GuessCommand;
pub use step::StepArgs;
pub use validate::ValidateCommand;
