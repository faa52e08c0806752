#![doc = include_str!(concat!(env!("OUT_DIR"), "/README_GENERATED.md"))]
#![deny(unsafe_code)]
#![deny(unused_crate_dependencies)]

pub mod chat;
pub mod error;
pub mod model;
pub mod settings;

// Re-export commonly used types for convenience
pub use chat::{ChatMessage, ChatRequest, GenerationParams};
pub use error::GatewayError;
pub use model::{DEFAULT_CONTEXT_WINDOW, DEFAULT_TAG, ResolvedModel, resolve};
pub use settings::Settings;
