//! Infrastructure Layer
//!
//! HTTP implementations of the identity gateway and the shared API client.

pub mod api_client;
#[cfg(target_arch = "wasm32")]
pub mod browser;
pub mod http;

#[cfg(test)]
pub(crate) mod test_server;
