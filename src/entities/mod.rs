pub mod exchange;
pub mod exchange_item;
pub mod ledger_entry;
pub mod order;
pub mod order_item;
pub mod order_item_addon;
pub mod product;
pub mod product_translation;
pub mod product_variant;
pub mod user;
