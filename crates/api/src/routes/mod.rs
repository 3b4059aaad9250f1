pub mod health;

use axum::routing::{delete, get, post, put};
use axum::Router;

use crate::handlers;
use crate::state::AppState;

/// Build the `/api/v1` route tree.
///
/// Route hierarchy:
///
/// ```text
/// /auth/login                          login (public)
/// /auth/refresh                        refresh (public)
/// /auth/logout                         logout
///
/// /admin/users                         list, create (admin only)
/// /admin/users/{id}                    get, update, deactivate
///
/// /mailboxes                           folder list with unread counts
///
/// /emails                              list, manual intake
/// /emails/unread-count                 total unread counter
/// /emails/analysis                     start AI batch (POST)
/// /emails/analysis/status              batch descriptor poll (GET)
/// /emails/analysis/stream              batch SSE feed (GET, ?token=)
/// /emails/{id}                         get, update read flag, delete
/// /emails/{id}/move                    move between mailboxes (POST)
/// /emails/{id}/lock                    take advisory lock (POST)
/// /emails/{id}/unlock                  release advisory lock (POST)
/// /emails/{id}/reply                   send SMTP reply (POST)
///
/// /booking-slots                       list (public), create
/// /booking-slots/series                generate recurring series (POST)
/// /booking-slots/{id}                  delete unbooked slot
///
/// /bookings                            list, create (create is public)
/// /bookings/{id}/cancel                cancel and free the slot (POST)
///
/// /contact-requests                    create (public), list
/// /contact-requests/{id}               get, restricted patch, delete
///
/// /invoices                            list, create
/// /invoices/{id}                       get, update, delete draft
/// /invoices/{id}/mark-paid             settle an invoice (POST)
///
/// /faq                                 published list (public), create
/// /faq/all                             admin list including drafts
/// /faq/{id}                            update, delete
///
/// /services                            public catalog tree
/// /services/categories                 list, create (admin only)
/// /services/categories/{id}            update, delete
/// /services/items                      create (admin only)
/// /services/items/{id}                 update, delete
///
/// /newsletter/subscribe                public signup (POST)
/// /newsletter/unsubscribe/{token}      public opt-out (DELETE)
/// /newsletter/subscribers              admin list
/// /newsletter/send                     campaign fan-out (POST, admin)
///
/// /logs                                admin list
/// /logs/trim                           retention trim (POST, admin)
///
/// /ai-usage                            admin list
/// /ai-usage/totals                     aggregate token totals
///
/// /ai-config                           get, store model override
///
/// /settings                            admin list
/// /settings/{key}                      get, upsert
///
/// /system/health                       DB ping, uptime, version
/// /system/stats                        dashboard counters
///
/// /events/stream                       global notification SSE feed
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new()
        // -- Auth --
        .route("/auth/login", post(handlers::auth::login))
        .route("/auth/refresh", post(handlers::auth::refresh))
        .route("/auth/logout", post(handlers::auth::logout))
        // -- User administration --
        .route(
            "/admin/users",
            get(handlers::users::list_users).post(handlers::users::create_user),
        )
        .route(
            "/admin/users/{id}",
            get(handlers::users::get_user)
                .put(handlers::users::update_user)
                .delete(handlers::users::deactivate_user),
        )
        // -- Mail --
        .route("/mailboxes", get(handlers::mailboxes::list_mailboxes))
        .route(
            "/emails",
            get(handlers::emails::list_emails).post(handlers::emails::create_email),
        )
        .route("/emails/unread-count", get(handlers::emails::unread_count))
        .route("/emails/analysis", post(handlers::analysis::start_analysis))
        .route(
            "/emails/analysis/status",
            get(handlers::analysis::analysis_status),
        )
        .route(
            "/emails/analysis/stream",
            get(handlers::analysis::stream_analysis),
        )
        .route(
            "/emails/{id}",
            get(handlers::emails::get_email)
                .patch(handlers::emails::update_email)
                .delete(handlers::emails::delete_email),
        )
        .route("/emails/{id}/move", post(handlers::emails::move_email))
        .route("/emails/{id}/lock", post(handlers::emails::lock_email))
        .route("/emails/{id}/unlock", post(handlers::emails::unlock_email))
        .route("/emails/{id}/reply", post(handlers::emails::reply_email))
        // -- Booking slots --
        .route(
            "/booking-slots",
            get(handlers::slots::list_slots).post(handlers::slots::create_slot),
        )
        .route(
            "/booking-slots/series",
            post(handlers::slots::create_slot_series),
        )
        .route("/booking-slots/{id}", delete(handlers::slots::delete_slot))
        // -- Bookings --
        .route(
            "/bookings",
            get(handlers::bookings::list_bookings).post(handlers::bookings::create_booking),
        )
        .route(
            "/bookings/{id}/cancel",
            post(handlers::bookings::cancel_booking),
        )
        // -- Contact requests --
        .route(
            "/contact-requests",
            get(handlers::contact_requests::list_contact_requests)
                .post(handlers::contact_requests::create_contact_request),
        )
        .route(
            "/contact-requests/{id}",
            get(handlers::contact_requests::get_contact_request)
                .patch(handlers::contact_requests::update_contact_request)
                .delete(handlers::contact_requests::delete_contact_request),
        )
        // -- Invoices --
        .route(
            "/invoices",
            get(handlers::invoices::list_invoices).post(handlers::invoices::create_invoice),
        )
        .route(
            "/invoices/{id}",
            get(handlers::invoices::get_invoice)
                .put(handlers::invoices::update_invoice)
                .delete(handlers::invoices::delete_invoice),
        )
        .route(
            "/invoices/{id}/mark-paid",
            post(handlers::invoices::mark_invoice_paid),
        )
        // -- FAQ --
        .route(
            "/faq",
            get(handlers::faq::list_published).post(handlers::faq::create_entry),
        )
        .route("/faq/all", get(handlers::faq::list_all))
        .route(
            "/faq/{id}",
            put(handlers::faq::update_entry).delete(handlers::faq::delete_entry),
        )
        // -- Service catalog --
        .route("/services", get(handlers::services::catalog))
        .route(
            "/services/categories",
            get(handlers::services::list_categories).post(handlers::services::create_category),
        )
        .route(
            "/services/categories/{id}",
            put(handlers::services::update_category).delete(handlers::services::delete_category),
        )
        .route("/services/items", post(handlers::services::create_item))
        .route(
            "/services/items/{id}",
            put(handlers::services::update_item).delete(handlers::services::delete_item),
        )
        // -- Newsletter --
        .route(
            "/newsletter/subscribe",
            post(handlers::newsletter::subscribe),
        )
        .route(
            "/newsletter/unsubscribe/{token}",
            delete(handlers::newsletter::unsubscribe),
        )
        .route(
            "/newsletter/subscribers",
            get(handlers::newsletter::list_subscribers),
        )
        .route(
            "/newsletter/send",
            post(handlers::newsletter::send_newsletter),
        )
        // -- Logs / usage / settings --
        .route("/logs", get(handlers::logs::list_logs))
        .route("/logs/trim", post(handlers::logs::trim_logs))
        .route("/ai-usage", get(handlers::ai_usage::list_usage))
        .route("/ai-usage/totals", get(handlers::ai_usage::usage_totals))
        .route(
            "/ai-config",
            get(handlers::ai_config::get_ai_config).put(handlers::ai_config::put_ai_config),
        )
        .route("/settings", get(handlers::settings::list_settings))
        .route(
            "/settings/{key}",
            get(handlers::settings::get_setting).put(handlers::settings::put_setting),
        )
        // -- System --
        .route("/system/health", get(handlers::system::system_health))
        .route("/system/stats", get(handlers::system::system_stats))
        // -- Global notification stream --
        .route("/events/stream", get(handlers::events::stream_events))
}
