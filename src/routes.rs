use crate::{
    api::{leave_request, user},
    config::Config,
};
use actix_governor::{Governor, GovernorConfigBuilder, PeerIpKeyExtractor};
use actix_web::web;

pub fn configure(cfg: &mut web::ServiceConfig, config: Config) {
    let per_ms = if config.rate_protected_per_min == 0 {
        1
    } else {
        60_000 / config.rate_protected_per_min as u64
    };
    let limiter_conf = GovernorConfigBuilder::default()
        .per_millisecond(per_ms)
        .burst_size(config.rate_protected_per_min)
        .key_extractor(PeerIpKeyExtractor)
        .finish()
        .unwrap();

    // Identity extraction and role checks happen per handler via AuthUser;
    // the scope only adds rate limiting.
    cfg.service(
        web::scope(&config.api_prefix)
            .wrap(Governor::new(&limiter_conf))
            .service(
                web::scope("/leave")
                    .service(
                        web::resource("/request")
                            .route(web::post().to(leave_request::create_leave)),
                    )
                    .service(
                        web::resource("/my-requests")
                            .route(web::get().to(leave_request::my_leave_requests)),
                    )
                    .service(
                        web::resource("/update-leave/{id}")
                            .route(web::put().to(leave_request::update_leave)),
                    )
                    .service(
                        web::resource("/delete-leave/{id}")
                            .route(web::delete().to(leave_request::delete_leave)),
                    )
                    .service(
                        web::resource("/balance")
                            .route(web::get().to(leave_request::leave_balance)),
                    )
                    .service(
                        web::resource("/pending")
                            .route(web::get().to(leave_request::pending_leaves)),
                    )
                    .service(
                        web::resource("/calendar")
                            .route(web::get().to(leave_request::leave_calendar)),
                    )
                    // /leave/{id}/approve handles both approve and reject
                    .service(
                        web::resource("/{id}/approve")
                            .route(web::patch().to(leave_request::approve_or_reject_leave)),
                    ),
            )
            .service(
                web::scope("/user")
                    .service(
                        web::resource("/managers").route(web::get().to(user::list_managers)),
                    )
                    .service(
                        web::resource("/managed-employees")
                            .route(web::get().to(user::managed_employees)),
                    )
                    .service(
                        web::resource("/reset-balance/{employee_id}")
                            .route(web::put().to(user::reset_balance)),
                    ),
            ),
    );
}
