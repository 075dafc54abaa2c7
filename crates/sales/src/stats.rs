//! Sales statistics (recomputed on every request).

use std::collections::HashMap;

use rust_decimal::Decimal;
use serde::Serialize;

use crate::sale::Sale;

/// Per-category revenue.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryStat {
    pub category: String,
    pub total_sales: Decimal,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SalesSummary {
    pub total_sales: Decimal,
    pub total_quantity: i64,
    pub sale_count: usize,
    pub average_sale: Decimal,
}

/// Group by category, highest total first. Ties break on category name so
/// the ordering is stable.
pub fn category_stats(sales: &[Sale]) -> Vec<CategoryStat> {
    let mut by_category: HashMap<&str, (Decimal, usize)> = HashMap::new();
    for sale in sales {
        let entry = by_category.entry(sale.category.as_str()).or_default();
        entry.0 = entry.0.saturating_add(sale.amount);
        entry.1 += 1;
    }

    let mut stats: Vec<CategoryStat> = by_category
        .into_iter()
        .map(|(category, (total_sales, count))| CategoryStat {
            category: category.to_string(),
            total_sales,
            count,
        })
        .collect();
    stats.sort_by(|a, b| {
        b.total_sales
            .cmp(&a.total_sales)
            .then_with(|| a.category.cmp(&b.category))
    });
    stats
}

pub fn summarize(sales: &[Sale]) -> SalesSummary {
    let (total_sales, total_quantity) = sales
        .iter()
        .fold((Decimal::ZERO, 0i64), |(amount, quantity), s| {
            (amount.saturating_add(s.amount), quantity.saturating_add(s.quantity))
        });
    let sale_count = sales.len();
    let average_sale = if sale_count == 0 {
        Decimal::ZERO
    } else {
        total_sales / Decimal::from(sale_count as u64)
    };

    SalesSummary {
        total_sales,
        total_quantity,
        sale_count,
        average_sale,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sale::CreateSale;
    use chrono::{TimeZone, Utc};
    use proptest::prelude::*;
    use soil_core::DocumentId;

    fn sale(category: Option<&str>, amount: i64, quantity: i64) -> Sale {
        Sale::create(
            DocumentId::new(),
            CreateSale {
                product_name: Some("Item".to_string()),
                quantity,
                amount: Decimal::from(amount),
                category: category.map(str::to_string),
                ..Default::default()
            },
            Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap(),
        )
        .unwrap()
    }

    #[test]
    fn groups_and_sorts_descending() {
        let stats = category_stats(&[
            sale(Some("Drinks"), 40, 1),
            sale(None, 100, 1),
            sale(Some("Drinks"), 30, 2),
            sale(Some("Snacks"), 5, 1),
        ]);
        let flat: Vec<_> = stats
            .iter()
            .map(|s| (s.category.as_str(), s.total_sales, s.count))
            .collect();
        assert_eq!(
            flat,
            vec![
                ("Other", Decimal::from(100), 1),
                ("Drinks", Decimal::from(70), 2),
                ("Snacks", Decimal::from(5), 1),
            ]
        );
    }

    #[test]
    fn summary_of_nothing_is_zero() {
        let s = summarize(&[]);
        assert_eq!(s.sale_count, 0);
        assert_eq!(s.average_sale, Decimal::ZERO);
    }

    #[test]
    fn oversized_stored_values_saturate_instead_of_panicking() {
        let huge = Decimal::from_i128_with_scale(5 * 10i128.pow(28), 0);
        let rows: Vec<_> = (0..2)
            .map(|_| Sale { amount: huge, quantity: i64::MAX, ..sale(Some("Drinks"), 1, 1) })
            .collect();

        assert_eq!(category_stats(&rows)[0].total_sales, Decimal::MAX);
        let s = summarize(&rows);
        assert_eq!(s.total_sales, Decimal::MAX);
        assert_eq!(s.total_quantity, i64::MAX);
    }

    proptest! {
        #[test]
        fn category_totals_add_up_to_summary_total(
            rows in proptest::collection::vec((0usize..4, 1i64..100_000, 1i64..50), 0..60)
        ) {
            let categories = ["Drinks", "Snacks", "Merch", "Other"];
            let sales: Vec<_> = rows
                .iter()
                .map(|(c, amt, qty)| sale(Some(categories[*c]), *amt, *qty))
                .collect();

            let stats = category_stats(&sales);
            let summary = summarize(&sales);

            let stats_total: Decimal = stats.iter().map(|s| s.total_sales).sum();
            let stats_count: usize = stats.iter().map(|s| s.count).sum();
            prop_assert_eq!(stats_total, summary.total_sales);
            prop_assert_eq!(stats_count, summary.sale_count);
            prop_assert!(stats.windows(2).all(|w| w[0].total_sales >= w[1].total_sales));
        }
    }
}
