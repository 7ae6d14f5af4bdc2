pub mod cra;
pub mod health;
pub mod landing_route;
