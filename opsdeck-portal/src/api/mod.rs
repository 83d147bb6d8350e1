//! HTTP API handlers for opsdeck-portal

pub mod accomplishments;
pub mod applications;
pub mod health;
pub mod projects;
pub mod servers;
pub mod summarize;
pub mod users;

pub use accomplishments::accomplishment_routes;
pub use applications::application_routes;
pub use health::health_routes;
pub use projects::project_routes;
pub use servers::server_routes;
pub use summarize::summarize_routes;
pub use users::user_routes;
