use std::collections::HashMap;

use uuid::Uuid;

use super::checkout::CartLine;

/// The subset of a cart's lines belonging to one seller. Each partition
/// becomes exactly one order.
#[derive(Debug, Clone)]
pub struct SellerPartition {
    pub seller_id: Uuid,
    pub lines: Vec<CartLine>,
}

/// Group cart lines by seller.
///
/// Partitions come out in first-seen seller order and lines keep their
/// relative order within a partition. Lines without a seller reference are
/// dropped; the caller decides how loudly to report them.
pub fn partition_by_seller(lines: Vec<CartLine>) -> Vec<SellerPartition> {
    let mut partitions: Vec<SellerPartition> = Vec::new();
    let mut index: HashMap<Uuid, usize> = HashMap::new();

    for line in lines {
        let Some(seller_id) = line.seller_id else {
            continue;
        };
        match index.get(&seller_id) {
            Some(&i) => partitions[i].lines.push(line),
            None => {
                index.insert(seller_id, partitions.len());
                partitions.push(SellerPartition {
                    seller_id,
                    lines: vec![line],
                });
            }
        }
    }

    partitions
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use bigdecimal::BigDecimal;
    use uuid::Uuid;

    use super::*;
    use crate::domain::checkout::DEFAULT_CURRENCY;

    fn line(seller_id: Option<Uuid>, name: &str, quantity: i32) -> CartLine {
        CartLine {
            item_id: Uuid::new_v4(),
            product_id: Uuid::new_v4(),
            variant_id: None,
            seller_id,
            product_name: name.to_string(),
            product_sku: None,
            price: BigDecimal::from_str("10.00").expect("valid decimal"),
            currency: DEFAULT_CURRENCY.to_string(),
            quantity,
        }
    }

    #[test]
    fn empty_input_yields_no_partitions() {
        assert!(partition_by_seller(vec![]).is_empty());
    }

    #[test]
    fn groups_lines_by_seller() {
        let seller_a = Uuid::new_v4();
        let seller_b = Uuid::new_v4();
        let lines = vec![
            line(Some(seller_a), "p1", 1),
            line(Some(seller_b), "p2", 1),
            line(Some(seller_a), "p3", 1),
        ];

        let partitions = partition_by_seller(lines);

        assert_eq!(partitions.len(), 2);
        assert_eq!(partitions[0].seller_id, seller_a);
        assert_eq!(partitions[0].lines.len(), 2);
        assert_eq!(partitions[1].seller_id, seller_b);
        assert_eq!(partitions[1].lines.len(), 1);
    }

    #[test]
    fn partitions_follow_first_seen_seller_order() {
        let seller_a = Uuid::new_v4();
        let seller_b = Uuid::new_v4();
        let seller_c = Uuid::new_v4();
        let lines = vec![
            line(Some(seller_b), "p1", 1),
            line(Some(seller_c), "p2", 1),
            line(Some(seller_a), "p3", 1),
            line(Some(seller_b), "p4", 1),
        ];

        let partitions = partition_by_seller(lines);

        let order: Vec<Uuid> = partitions.iter().map(|p| p.seller_id).collect();
        assert_eq!(order, vec![seller_b, seller_c, seller_a]);
    }

    #[test]
    fn lines_keep_their_order_within_a_partition() {
        let seller = Uuid::new_v4();
        let lines = vec![
            line(Some(seller), "first", 1),
            line(Some(seller), "second", 2),
            line(Some(seller), "third", 3),
        ];

        let partitions = partition_by_seller(lines);

        let names: Vec<&str> = partitions[0]
            .lines
            .iter()
            .map(|l| l.product_name.as_str())
            .collect();
        assert_eq!(names, vec!["first", "second", "third"]);
    }

    #[test]
    fn lines_without_a_seller_are_excluded() {
        let seller = Uuid::new_v4();
        let lines = vec![
            line(None, "orphan", 1),
            line(Some(seller), "kept", 1),
            line(None, "orphan2", 1),
        ];

        let partitions = partition_by_seller(lines);

        assert_eq!(partitions.len(), 1);
        assert_eq!(partitions[0].lines.len(), 1);
        assert_eq!(partitions[0].lines[0].product_name, "kept");
    }

    #[test]
    fn all_orphan_lines_yield_no_partitions() {
        let lines = vec![line(None, "a", 1), line(None, "b", 1)];
        assert!(partition_by_seller(lines).is_empty());
    }
}
