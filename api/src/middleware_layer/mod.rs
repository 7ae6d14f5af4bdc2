pub mod json_error_mapper;
pub mod request_context;
