//! HTTP router.

use axum::{
    Router,
    routing::{get, post},
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::{
    handlers::{accounts, appointments, customers, health, partners, reminders, transactions},
    state::AppState,
};

/// Build the application router over `state`.
///
/// The customer directory route is only mounted when a directory is
/// configured.
pub fn router(state: AppState) -> Router {
    let mut router = Router::new()
        .route("/health", get(health::health_check))
        // Partners and availability
        .route("/partner", get(partners::list_partners))
        .route(
            "/partner/availability/{partner_id}",
            get(partners::get_availability),
        )
        .route(
            "/partner/availability/{partner_id}/{date}",
            get(partners::get_availability_on_date),
        )
        // Appointments
        .route("/appointments", get(appointments::list_appointments))
        .route(
            "/appointments/booked_slots",
            get(appointments::booked_slots),
        )
        .route(
            "/appointments/{provider_id}/{date}",
            get(appointments::booked_times),
        )
        .route("/send-reminder", post(reminders::send_reminder))
        .route("/send-reminder/", post(reminders::send_reminder))
        // Banking
        .route("/customers", get(customers::list_customers))
        .route("/customers/lookup", get(customers::lookup_customer))
        .route(
            "/accounts",
            get(accounts::list_accounts).post(accounts::create_account),
        )
        .route("/accounts/{id}", get(accounts::get_account))
        .route(
            "/transactions",
            get(transactions::list_transactions).post(transactions::create_transaction),
        )
        .route(
            "/transactions/budget",
            get(transactions::budget_transactions),
        )
        .route(
            "/transactions/budget/summary",
            get(transactions::budget_summary),
        );

    if state.directory.is_some() {
        router = router.route("/api/customers", get(customers::directory_lookup));
    }

    router
        .layer(TraceLayer::new_for_http())
        // Browser clients are served from other origins
        .layer(CorsLayer::permissive())
        .with_state(state)
}
