use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::handlers;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Shopfront Admin API",
        version = "0.1.0",
        description = "Back-office API for a small e-commerce shop: catalog with \
            per-language translations and variants, orders, delivery assignment \
            with balance accrual, an append-only cash ledger, exchange tracking \
            and a proxied shipping-carrier fee lookup."
    ),
    paths(
        handlers::orders::list_orders,
        handlers::orders::get_order,
        handlers::orders::get_order_by_number,
        handlers::orders::update_order_status,
        handlers::delivery::assign_delivery,
        handlers::delivery::list_personnel,
        handlers::delivery::pending_balance,
        handlers::cash_register::record_entry,
        handlers::cash_register::list_entries,
        handlers::cash_register::get_stats,
        handlers::catalog::list_products,
        handlers::catalog::list_additions,
        handlers::catalog::get_product,
        handlers::catalog::create_variants,
        handlers::exchanges::list_exchanges,
        handlers::exchanges::create_exchange,
        handlers::exchanges::has_exchange,
        handlers::exchanges::approve_exchange,
        handlers::exchanges::reject_exchange,
        handlers::employees::list_users,
        handlers::employees::get_user,
        handlers::employees::create_user,
        handlers::carrier::delivery_fees,
    ),
    tags(
        (name = "orders", description = "Order listing, detail and status updates"),
        (name = "delivery", description = "Delivery assignment and balance accrual"),
        (name = "cash-register", description = "Append-only cash ledger"),
        (name = "catalog", description = "Products, translations and variants"),
        (name = "exchanges", description = "Product exchange requests"),
        (name = "employees", description = "User accounts"),
        (name = "carrier", description = "Third-party shipping carrier proxy"),
    )
)]
pub struct ApiDoc;

/// Swagger UI mounted at `/docs`, serving the generated document.
pub fn swagger_ui() -> SwaggerUi {
    SwaggerUi::new("/docs").url("/api-docs/openapi.json", ApiDoc::openapi())
}
