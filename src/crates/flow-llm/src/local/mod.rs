//! Local, Ollama-compatible provider.

pub mod ollama;

pub use ollama::OllamaClient;
