use crate::{
    api::{attendance, holiday, reconcile, reminders, scan, schedule, user},
    auth::{handlers, middleware::auth_middleware},
    config::Config,
};
use actix_governor::{
    Governor, GovernorConfigBuilder, PeerIpKeyExtractor, governor::middleware::NoOpMiddleware,
};
use actix_web::{middleware::from_fn, web};
use std::sync::Arc;

pub fn configure(cfg: &mut web::ServiceConfig, config: Config) {
    // Helper to build per-route limiter
    fn build_limiter(requests_per_min: u32) -> Governor<PeerIpKeyExtractor, NoOpMiddleware> {
        let per_ms = if requests_per_min == 0 {
            1
        } else {
            60_000 / requests_per_min as u64
        };
        let cfg = GovernorConfigBuilder::default()
            .per_millisecond(per_ms)
            .burst_size(requests_per_min)
            .key_extractor(PeerIpKeyExtractor)
            .finish()
            .unwrap();
        Governor::new(&cfg)
    }

    let login_limiter = Arc::new(build_limiter(config.rate_login_per_min));
    let scan_limiter = Arc::new(build_limiter(config.rate_scan_per_min));
    let protected_limiter = Arc::new(build_limiter(config.rate_protected_per_min));

    // Public routes
    cfg.service(
        web::scope("/auth").service(
            web::resource("/login")
                .wrap(login_limiter.clone())
                .route(web::post().to(handlers::login)),
        ),
    );

    // Protected routes
    cfg.service(
        web::scope(&config.api_prefix)
            .wrap(from_fn(auth_middleware)) // authentication
            .wrap(protected_limiter) // rate limiting
            .service(
                // scan devices poll this; its own tighter limiter
                web::resource("/scan")
                    .wrap(scan_limiter)
                    .route(web::post().to(scan::scan)),
            )
            .service(web::resource("/attendance").route(web::get().to(attendance::list_attendance)))
            // cron-like external schedulers hit these two
            .service(
                web::resource("/reconcile").route(web::post().to(reconcile::run_reconciliation)),
            )
            .service(
                web::resource("/reminders/run").route(web::post().to(reminders::run_reminders)),
            )
            .service(
                web::scope("/users")
                    // /users
                    .service(
                        web::resource("")
                            .route(web::post().to(user::create_user))
                            .route(web::get().to(user::list_users)),
                    )
                    // /users/{id}/token
                    .service(
                        web::resource("/{id}/token")
                            .route(web::post().to(user::regenerate_token)),
                    ),
            )
            .service(
                web::scope("/schedules")
                    // /schedules
                    .service(web::resource("").route(web::put().to(schedule::upsert_schedule)))
                    // /schedules/user/{user_id}
                    .service(
                        web::resource("/user/{user_id}")
                            .route(web::get().to(schedule::list_schedules)),
                    )
                    // /schedules/{id}
                    .service(
                        web::resource("/{id}").route(web::delete().to(schedule::delete_schedule)),
                    ),
            )
            .service(
                web::scope("/holidays")
                    // /holidays
                    .service(
                        web::resource("")
                            .route(web::post().to(holiday::create_holiday))
                            .route(web::get().to(holiday::list_holidays)),
                    )
                    // /holidays/{id}
                    .service(
                        web::resource("/{id}").route(web::delete().to(holiday::delete_holiday)),
                    ),
            ),
    );
}
