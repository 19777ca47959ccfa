use std::sync::Arc;

use axum::routing::{get, post};
use axum::Router;

use crate::handlers;
use crate::state::AppState;

/// The full route table; shared by `main` and the integration tests.
pub fn build_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(handlers::health::health))
        // Authentication
        .route("/api/auth/admin/login", post(handlers::auth::admin_login))
        .route("/api/auth/shop/login", post(handlers::auth::shop_login))
        .route("/api/auth/barber/login", post(handlers::auth::barber_login))
        .route("/api/auth/barber/switch", post(handlers::auth::barber_switch))
        .route("/api/auth/customer/login", post(handlers::auth::customer_login))
        .route(
            "/api/auth/customer/register",
            post(handlers::auth::customer_register),
        )
        // Barbershops (central admin)
        .route(
            "/api/barbershops",
            get(handlers::barbershops::list_barbershops)
                .post(handlers::barbershops::create_barbershop),
        )
        .route(
            "/api/barbershops/:id",
            get(handlers::barbershops::get_barbershop)
                .put(handlers::barbershops::update_barbershop)
                .delete(handlers::barbershops::delete_barbershop),
        )
        // Barbers
        .route(
            "/api/barbers",
            get(handlers::barbers::list_barbers).post(handlers::barbers::create_barber),
        )
        .route(
            "/api/barbers/:id",
            get(handlers::barbers::get_barber)
                .put(handlers::barbers::update_barber)
                .delete(handlers::barbers::delete_barber),
        )
        // Services
        .route(
            "/api/services",
            get(handlers::services::list_services).post(handlers::services::create_service),
        )
        .route(
            "/api/services/:id",
            get(handlers::services::get_service)
                .put(handlers::services::update_service)
                .delete(handlers::services::delete_service),
        )
        // Customers
        .route(
            "/api/customers",
            get(handlers::customers::list_customers).post(handlers::customers::create_customer),
        )
        .route(
            "/api/customers/:id",
            get(handlers::customers::get_customer)
                .put(handlers::customers::update_customer)
                .delete(handlers::customers::delete_customer),
        )
        // Appointments
        .route(
            "/api/appointments",
            get(handlers::appointments::list_appointments)
                .post(handlers::appointments::create_appointment),
        )
        .route(
            "/api/appointments/:id",
            get(handlers::appointments::get_appointment)
                .put(handlers::appointments::update_appointment),
        )
        .route(
            "/api/appointments/:id/confirm",
            post(handlers::appointments::confirm_appointment),
        )
        .route(
            "/api/appointments/:id/cancel",
            post(handlers::appointments::cancel_appointment),
        )
        .route(
            "/api/appointments/:id/complete",
            post(handlers::appointments::complete_appointment),
        )
        // Availability
        .route("/api/availability", get(handlers::availability::get_availability))
        // Landing page management
        .route(
            "/api/landing",
            get(handlers::landing::get_landing).put(handlers::landing::update_landing),
        )
        .route("/api/landing/publish", post(handlers::landing::publish_landing))
        .route(
            "/api/landing/unpublish",
            post(handlers::landing::unpublish_landing),
        )
        .route("/api/landing/logo", post(handlers::landing::upload_logo))
        // Public landing pages
        .route("/p/:slug", get(handlers::public::landing_page))
        .route("/p/:slug/logo", get(handlers::public::landing_logo))
        .with_state(state)
}
