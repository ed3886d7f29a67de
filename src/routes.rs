use crate::{
    api::{attendance, employee, land, leave, leave_balance, loan, payroll, training},
    auth::{handlers, middleware::auth_middleware},
    config::Config,
};
use actix_governor::{
    Governor, GovernorConfig, GovernorConfigBuilder, PeerIpKeyExtractor,
    governor::middleware::NoOpMiddleware,
};
use actix_web::{middleware::from_fn, web};

pub fn configure(cfg: &mut web::ServiceConfig, config: Config) {
    // Helper to build per-route limiter config
    fn build_limiter(requests_per_min: u32) -> GovernorConfig<PeerIpKeyExtractor, NoOpMiddleware> {
        let per_ms = if requests_per_min == 0 {
            1
        } else {
            60_000 / requests_per_min as u64
        };
        GovernorConfigBuilder::default()
            .per_millisecond(per_ms)
            .burst_size(requests_per_min)
            .key_extractor(PeerIpKeyExtractor)
            .finish()
            .unwrap()
    }

    let login_limiter = build_limiter(config.rate_login_per_min);
    let register_limiter = build_limiter(config.rate_register_per_min);
    let refresh_limiter = build_limiter(config.rate_refresh_per_min);
    let protected_limiter = build_limiter(config.rate_protected_per_min);

    // Public routes
    cfg.service(
        web::scope("/auth")
            .service(
                web::resource("/login")
                    .wrap(Governor::new(&login_limiter))
                    .route(web::post().to(handlers::login)),
            )
            .service(
                web::resource("/register")
                    .wrap(Governor::new(&register_limiter))
                    .route(web::post().to(handlers::register)),
            )
            .service(
                web::resource("/refresh")
                    .wrap(Governor::new(&refresh_limiter))
                    .route(web::post().to(handlers::refresh_token)),
            )
            .service(
                web::resource("/logout")
                    .wrap(Governor::new(&login_limiter))
                    .route(web::post().to(handlers::logout)),
            ),
    );

    // Protected routes
    cfg.service(
        web::scope(&config.api_prefix)
            .wrap(from_fn(auth_middleware)) // authentication
            .wrap(Governor::new(&protected_limiter)) // rate limiting
            .service(handlers::protected)
            .service(
                web::scope("/employees")
                    .service(
                        web::resource("")
                            .route(web::post().to(employee::create_employee))
                            .route(web::get().to(employee::list_employees)),
                    )
                    .service(
                        web::resource("/{id}")
                            .route(web::put().to(employee::update_employee))
                            .route(web::get().to(employee::get_employee))
                            .route(web::delete().to(employee::delete_employee)),
                    ),
            )
            .service(
                web::scope("/leave")
                    // /leave/balance must register ahead of /leave/{id}
                    .service(
                        web::resource("/balance/{employee_id}")
                            .route(web::get().to(leave_balance::get_balance)),
                    )
                    .service(
                        web::resource("/balance/{employee_id}/summary")
                            .route(web::get().to(leave_balance::balance_summary)),
                    )
                    .service(
                        web::resource("/balance/{employee_id}/recalculate")
                            .route(web::post().to(leave_balance::recalculate)),
                    )
                    .service(
                        web::resource("")
                            .route(web::get().to(leave::leave_list))
                            .route(web::post().to(leave::create_leave)),
                    )
                    .service(web::resource("/{id}").route(web::get().to(leave::get_leave)))
                    .service(
                        web::resource("/{id}/approve").route(web::put().to(leave::approve_leave)),
                    )
                    .service(
                        web::resource("/{id}/reject").route(web::put().to(leave::reject_leave)),
                    ),
            )
            .service(
                web::scope("/attendance")
                    .service(
                        web::resource("/check-in").route(web::post().to(attendance::check_in)),
                    )
                    .service(
                        web::resource("/check-out").route(web::post().to(attendance::check_out)),
                    )
                    .service(
                        web::resource("/summary")
                            .route(web::get().to(attendance::monthly_summary)),
                    )
                    .service(
                        web::resource("").route(web::get().to(attendance::list_attendance)),
                    ),
            )
            .service(
                web::scope("/payroll")
                    .service(
                        web::resource("/generate")
                            .route(web::post().to(payroll::generate_payrolls)),
                    )
                    .service(web::resource("").route(web::get().to(payroll::list_payrolls)))
                    .service(
                        web::resource("/{id}")
                            .route(web::get().to(payroll::get_payroll))
                            .route(web::put().to(payroll::update_payroll))
                            .route(web::delete().to(payroll::delete_payroll)),
                    )
                    .service(
                        web::resource("/{id}/approve")
                            .route(web::patch().to(payroll::approve_payroll)),
                    )
                    .service(
                        web::resource("/{id}/mark-paid")
                            .route(web::patch().to(payroll::mark_payroll_paid)),
                    )
                    .service(
                        web::resource("/{id}/cancel")
                            .route(web::patch().to(payroll::cancel_payroll)),
                    ),
            )
            .service(
                web::scope("/training")
                    .service(
                        web::resource("/courses/top").route(web::get().to(training::top_courses)),
                    )
                    .service(
                        web::resource("/courses")
                            .route(web::post().to(training::create_course))
                            .route(web::get().to(training::list_courses)),
                    )
                    .service(
                        web::resource("/enrollments")
                            .route(web::post().to(training::create_enrollment))
                            .route(web::get().to(training::list_enrollments)),
                    )
                    .service(
                        web::resource("/enrollments/{id}/progress")
                            .route(web::post().to(training::update_progress)),
                    )
                    .service(
                        web::resource("/enrollments/{id}/assessment")
                            .route(web::post().to(training::submit_assessment)),
                    )
                    .service(
                        web::resource("/enrollments/{id}/rating")
                            .route(web::post().to(training::submit_rating)),
                    )
                    .service(
                        web::resource("/programs")
                            .route(web::post().to(training::create_program))
                            .route(web::get().to(training::list_programs)),
                    ),
            )
            .service(
                web::resource("/departments").route(web::get().to(employee::list_departments)),
            )
            .service(
                web::resource("/job-titles").route(web::get().to(employee::list_job_titles)),
            )
            .service(
                web::scope("/loans").service(
                    web::resource("")
                        .route(web::post().to(loan::create_loan))
                        .route(web::get().to(loan::list_loans)),
                ),
            )
            .service(web::scope("/land").configure(land::configure)),
    );
}
