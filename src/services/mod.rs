pub mod carrier;
pub mod cash_register;
pub mod catalog;
pub mod delivery;
pub mod exchanges;
pub mod orders;
pub mod users;
