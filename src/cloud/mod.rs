// ABOUTME: Cloud provider access: capability traits, client construction, AWS backend.
// ABOUTME: Higher layers borrow a provider per call and never build their own handles.

mod aws;
mod client;
mod error;
pub mod traits;

pub use aws::AwsClientSet;
pub use client::{ClientCache, ClientConfig, DEFAULT_MAX_WAIT};
pub use error::ProviderError;
pub use traits::*;
