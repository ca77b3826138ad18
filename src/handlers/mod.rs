pub mod api;
pub mod health;
pub mod metrics;
pub mod router;

pub use api::*;
pub use health::*;
pub use metrics::*;
pub use router::create_app;
