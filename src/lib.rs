pub mod aggregate;
pub mod app;
pub mod chain;
pub mod config;
pub mod error;
pub mod fetch;
pub mod html;
pub mod logging;
pub mod models;
pub mod normalize;
pub mod quality;
pub mod rank;
pub mod reference;
pub mod resolver;
pub mod routes;
pub mod strategies;

pub use app::{AppState, build_app};
pub use error::ErrorKind;
pub use fetch::{HttpFetcher, PageFetcher};
pub use models::{MediaAsset, MediaKind, ResolutionResult};
pub use resolver::{Resolver, ResolverSettings};
