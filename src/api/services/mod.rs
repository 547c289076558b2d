pub mod admin;
pub mod health;
pub mod pages;
pub mod redirect;

pub use health::health_routes;
pub use redirect::redirect_routes;
