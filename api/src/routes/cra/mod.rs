pub mod cra_query_route;
pub mod cra_request;
pub mod cra_status_route;
