use chrono::Utc;
use uuid::Uuid;

use crate::domain::ports::OrderNumberSource;

/// Order numbers of the form `ORD-20260805-9F3A21C4`: the date makes them
/// human-sortable on a packing slip, the random suffix keeps concurrent
/// checkouts from colliding. The unique constraint on `orders.order_number`
/// is the final guarantee.
pub struct UuidOrderNumbers;

impl OrderNumberSource for UuidOrderNumbers {
    fn next_order_number(&self) -> String {
        let date = Utc::now().format("%Y%m%d");
        let suffix = Uuid::new_v4().simple().to_string();
        format!("ORD-{date}-{}", suffix[..8].to_uppercase())
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::*;

    #[test]
    fn numbers_carry_the_expected_shape() {
        let number = UuidOrderNumbers.next_order_number();
        let parts: Vec<&str> = number.split('-').collect();
        assert_eq!(parts.len(), 3);
        assert_eq!(parts[0], "ORD");
        assert_eq!(parts[1].len(), 8);
        assert!(parts[1].chars().all(|c| c.is_ascii_digit()));
        assert_eq!(parts[2].len(), 8);
        assert!(parts[2].chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn consecutive_numbers_differ() {
        let numbers: HashSet<String> = (0..100)
            .map(|_| UuidOrderNumbers.next_order_number())
            .collect();
        assert_eq!(numbers.len(), 100);
    }
}
