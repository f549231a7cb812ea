//! Model provider implementation.

pub mod gemini;
pub mod shared;

pub use shared::{
    PromptPart, ProviderError, ProviderErrorKind, ProviderResult, ProviderStream, StreamEvent,
    Usage, resolve_api_key, resolve_base_url,
};
