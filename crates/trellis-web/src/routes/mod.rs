pub mod health;
pub mod view;

pub use health::health_routes;
pub use view::{raw_request, view_route, ViewRequest};
