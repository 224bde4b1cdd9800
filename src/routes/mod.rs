// Route exports
pub mod auth;
pub mod health;
pub mod internships;
pub mod profile;
pub mod wishlist;

use actix_web::web;

pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.configure(health::configure).service(
        web::scope("/api")
            .configure(auth::configure)
            .configure(profile::configure)
            .configure(internships::configure)
            .configure(wishlist::configure),
    );
}
