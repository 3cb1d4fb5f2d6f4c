//! Shared domain enums. Entities persist these as plain strings; the service
//! layer parses on the way in so handlers only ever see the typed form.

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};
use utoipa::ToSchema;

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumString, ToSchema,
)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
    Pending,
    Confirmed,
    Shipped,
    Delivered,
    Cancelled,
}

/// Ledger entry classification: inbound or outbound cash flow.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumString, ToSchema,
)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum LedgerDirection {
    Inbound,
    Outbound,
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumString, ToSchema,
)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum UserRole {
    Customer,
    Delivery,
    Admin,
    Staff,
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumString, ToSchema,
)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum ExchangeStatus {
    Pending,
    Approved,
    Rejected,
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use std::str::FromStr;

    #[rstest]
    #[case(OrderStatus::Pending, "pending")]
    #[case(OrderStatus::Confirmed, "confirmed")]
    #[case(OrderStatus::Shipped, "shipped")]
    #[case(OrderStatus::Delivered, "delivered")]
    #[case(OrderStatus::Cancelled, "cancelled")]
    fn order_statuses_round_trip_through_strings(
        #[case] status: OrderStatus,
        #[case] text: &str,
    ) {
        assert_eq!(status.to_string(), text);
        assert_eq!(OrderStatus::from_str(text).unwrap(), status);
    }

    #[test]
    fn unknown_values_fail_to_parse() {
        assert!(OrderStatus::from_str("teleported").is_err());
        assert!(LedgerDirection::from_str("sideways").is_err());
        assert!(UserRole::from_str("wizard").is_err());
        assert!(ExchangeStatus::from_str("maybe").is_err());
    }

    #[test]
    fn other_enums_round_trip_through_strings() {
        assert_eq!(LedgerDirection::from_str("inbound").unwrap(), LedgerDirection::Inbound);
        assert_eq!(LedgerDirection::Outbound.to_string(), "outbound");
        assert_eq!(UserRole::from_str("delivery").unwrap(), UserRole::Delivery);
        assert_eq!(ExchangeStatus::Approved.to_string(), "approved");
    }
}
