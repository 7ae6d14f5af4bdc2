pub mod health_response;
pub mod health_route;
pub mod upstream_health_route;
