//! Public surface for the `jsonapi-node` crate.
//!
//! Exposes the router builder, the JSON:API response middleware and the
//! config types so that external crates (e.g. the conformance test suite)
//! can spin up an in-process node without spawning a subprocess.

pub mod config;
pub mod error;
pub mod handlers;
pub mod inventory;
pub mod middleware;
pub mod pagination;
pub mod response;
pub mod router;
pub mod routing;
pub mod storage;

pub use config::{JsonApiConfig, NodeConfig};
pub use error::{ApiError, HttpException, UnclassifiedError};
pub use middleware::jsonapi::{jsonapi_middleware, panic_response, JsonApiMiddleware};
pub use response::JsonApiResponse;
pub use router::build_router;
pub use routing::RouteTable;
pub use storage::{memory::MemoryStorage, Storage};
