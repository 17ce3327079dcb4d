//! Question answering over the transcript corpus.
//!
//! Retrieval feeds a small number of chunks into a generative backend, and
//! every answer carries its token usage and estimated cost.

mod answer;
mod engine;
mod generator;
pub mod pricing;

pub use answer::{format_context, Answerer, QueryResult, Usage};
pub use engine::{AskResponse, QueryEngine, QuerySession};
pub use generator::{Generation, Generator, OpenAIGenerator};
