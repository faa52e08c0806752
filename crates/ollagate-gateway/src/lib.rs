#![doc = include_str!(concat!(env!("OUT_DIR"), "/README_GENERATED.md"))]
#![deny(unsafe_code)]

pub mod ollama;
pub mod openai;
pub mod server;
pub mod upstream;

mod embeddings;
mod handlers;
mod stream;
mod translate;

pub use server::{build_router, serve};
