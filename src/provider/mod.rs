//! Data access gateway
//!
//! - [`gateway`]: the synchronous [`FruitProvider`] (query/insert/update/delete)
//! - [`validate`]: field rules shared by insert and update
//! - [`handle`]: [`ProviderHandle`], the async face used by servers and UIs

pub mod gateway;
pub mod handle;
pub mod validate;

pub use gateway::FruitProvider;
pub use handle::{ProviderHandle, QueryArgs};
