// Route exports
pub mod admin;
pub mod participants;

use actix_web::web;

pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api/v1")
            .configure(participants::configure)
            .configure(admin::configure),
    );
}
