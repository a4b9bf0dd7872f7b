//! Infrastructure Adapters
//!
//! Implementations of domain ports for the upstream HTTP APIs.
//! Each adapter owns one `reqwest::Client`, built once at boot.

mod http;
pub mod openai;
pub mod pims;
pub mod xano;

// Re-exports
pub use openai::OpenAiProvider;
pub use pims::PimsHttpGateway;
pub use xano::XanoStoryStore;
