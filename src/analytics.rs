//! Sales analytics over already-loaded invoices and products
//!
//! Every function is a single pass over its inputs; nothing is cached.

use crate::models::{Invoice, InvoiceStatus, Product};
use crate::types::{Amount, RecordId};
use hashbrown::HashMap;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Half-open price band `[min, max)` in the base currency
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PriceRange {
    pub min: Amount,
    pub max: Amount,
}

impl PriceRange {
    pub fn new(min: Amount, max: Amount) -> Self {
        Self { min, max }
    }

    /// Every non-negative price
    pub fn any() -> Self {
        Self {
            min: 0.0,
            max: f64::INFINITY,
        }
    }

    pub fn contains(&self, price: Amount) -> bool {
        price >= self.min && price < self.max
    }

    /// Budget, mid-range and premium bands shown on the dashboard
    pub fn dashboard_bands() -> [PriceRange; 3] {
        [
            PriceRange::new(0.0, 50.0),
            PriceRange::new(50.0, 150.0),
            PriceRange::new(150.0, f64::INFINITY),
        ]
    }
}

impl fmt::Display for PriceRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.max.is_infinite() {
            write!(f, "{}+", self.min)
        } else {
            write!(f, "{}-{}", self.min, self.max)
        }
    }
}

/// Product with the most units sold on paid invoices
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BestSeller {
    pub product: Product,
    pub units_sold: u64,
}

fn catalogue(products: &[Product]) -> HashMap<&str, &Product> {
    let mut by_id = HashMap::with_capacity(products.len());
    for product in products {
        // First record wins when the API returns duplicates
        by_id.entry(product.id.as_str()).or_insert(product);
    }
    by_id
}

/// Units sold per product on paid invoices, in first-sold order
///
/// Items whose product is not in `products` are skipped, as are items
/// whose catalogue price falls outside `range`.
pub fn units_sold_by_product(
    invoices: &[Invoice],
    products: &[Product],
    range: Option<PriceRange>,
) -> Vec<(RecordId, u64)> {
    let by_id = catalogue(products);
    let mut totals: Vec<(RecordId, u64)> = Vec::new();
    let mut index: HashMap<&str, usize> = HashMap::new();

    for invoice in invoices.iter().filter(|inv| inv.is_paid()) {
        for item in &invoice.items {
            let Some(&product) = by_id.get(item.product_id.as_str()) else {
                continue;
            };
            if let Some(range) = range {
                if !range.contains(product.price) {
                    continue;
                }
            }

            match index.get(item.product_id.as_str()) {
                Some(&i) => totals[i].1 += u64::from(item.quantity),
                None => {
                    index.insert(product.id.as_str(), totals.len());
                    totals.push((product.id.clone(), u64::from(item.quantity)));
                }
            }
        }
    }

    totals
}

/// Best-selling product on paid invoices, optionally within a price band
///
/// Ties go to the product that sold first. Returns `None` when nothing
/// qualifying was sold.
pub fn best_seller(
    invoices: &[Invoice],
    products: &[Product],
    range: Option<PriceRange>,
) -> Option<BestSeller> {
    let totals = units_sold_by_product(invoices, products, range);

    let mut best: Option<&(RecordId, u64)> = None;
    for entry in &totals {
        if best.map_or(true, |current| entry.1 > current.1) {
            best = Some(entry);
        }
    }

    let (product_id, units_sold) = best.filter(|(_, units)| *units > 0)?;
    let product = products.iter().find(|p| &p.id == product_id)?;

    Some(BestSeller {
        product: product.clone(),
        units_sold: *units_sold,
    })
}

/// Best seller for each band, in the order given
pub fn best_sellers_by_range(
    invoices: &[Invoice],
    products: &[Product],
    ranges: &[PriceRange],
) -> Vec<(PriceRange, Option<BestSeller>)> {
    ranges
        .iter()
        .map(|range| (*range, best_seller(invoices, products, Some(*range))))
        .collect()
}

/// Invoiced amount per status
///
/// The server's recorded invoice total is used when present. Otherwise lines
/// are priced at their unit price, or the catalogue price when the line has
/// none, and the invoice discount is applied. Statuses with no invoices are
/// omitted.
pub fn revenue_by_status(invoices: &[Invoice], products: &[Product]) -> Vec<(InvoiceStatus, Amount)> {
    let by_id = catalogue(products);
    let order = [
        InvoiceStatus::Paid,
        InvoiceStatus::Partial,
        InvoiceStatus::Unpaid,
        InvoiceStatus::Cancelled,
        InvoiceStatus::Unknown,
    ];
    let mut sums: HashMap<InvoiceStatus, Amount> = HashMap::new();

    for invoice in invoices {
        let amount = match invoice.total {
            Some(total) if total.is_finite() => total,
            _ => {
                let gross = invoice
                    .items
                    .iter()
                    .map(|item| {
                        let price = item
                            .unit_price
                            .or_else(|| by_id.get(item.product_id.as_str()).map(|p| p.price))
                            .unwrap_or(0.0);
                        price * item.quantity as f64
                    })
                    .fold(0.0, |acc, line| acc + line);
                (gross - invoice.discount).max(0.0)
            }
        };
        *sums.entry(invoice.status).or_insert(0.0) += amount;
    }

    order
        .iter()
        .filter_map(|status| sums.get(status).map(|sum| (*status, *sum)))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::InvoiceItem;

    fn products() -> Vec<Product> {
        vec![
            Product::new("A", "Round frame", 30.0),
            Product::new("B", "Cat-eye frame", 30.0),
            Product::new("C", "Progressive lens", 200.0),
        ]
    }

    fn paid(id: &str, items: Vec<InvoiceItem>) -> Invoice {
        Invoice::new(id, InvoiceStatus::Paid, items)
    }

    #[test]
    fn test_unpaid_invoices_excluded() {
        let invoices = vec![
            paid("1", vec![InvoiceItem::new("A", 5)]),
            Invoice::new("2", InvoiceStatus::Unpaid, vec![InvoiceItem::new("B", 100)]),
        ];

        let best = best_seller(&invoices, &products(), Some(PriceRange::new(0.0, 50.0))).unwrap();
        assert_eq!(best.product.id, "A");
        assert_eq!(best.units_sold, 5);
    }

    #[test]
    fn test_no_sales_returns_none() {
        assert!(best_seller(&[], &products(), None).is_none());

        let unpaid = vec![Invoice::new("1", InvoiceStatus::Partial, vec![InvoiceItem::new("A", 3)])];
        assert!(best_seller(&unpaid, &products(), None).is_none());
    }

    #[test]
    fn test_zero_quantity_is_not_a_sale() {
        let invoices = vec![paid("1", vec![InvoiceItem::new("A", 0)])];
        assert!(best_seller(&invoices, &products(), None).is_none());
    }

    #[test]
    fn test_range_is_half_open() {
        let invoices = vec![paid("1", vec![InvoiceItem::new("A", 2), InvoiceItem::new("C", 9)])];

        let best = best_seller(&invoices, &products(), Some(PriceRange::new(30.0, 200.0))).unwrap();
        assert_eq!(best.product.id, "A");

        assert!(best_seller(&invoices, &products(), Some(PriceRange::new(0.0, 30.0))).is_none());
    }

    #[test]
    fn test_tie_goes_to_first_sold() {
        let invoices = vec![
            paid("1", vec![InvoiceItem::new("B", 3)]),
            paid("2", vec![InvoiceItem::new("A", 3)]),
        ];
        let best = best_seller(&invoices, &products(), None).unwrap();
        assert_eq!(best.product.id, "B");
    }

    #[test]
    fn test_quantities_accumulate_across_invoices() {
        let invoices = vec![
            paid("1", vec![InvoiceItem::new("A", 2), InvoiceItem::new("B", 3)]),
            paid("2", vec![InvoiceItem::new("A", 2)]),
            paid("3", vec![InvoiceItem::new("ghost", 50)]),
        ];

        let totals = units_sold_by_product(&invoices, &products(), None);
        assert_eq!(totals, vec![("A".to_string(), 4), ("B".to_string(), 3)]);

        let best = best_seller(&invoices, &products(), None).unwrap();
        assert_eq!(best.units_sold, 4);
    }

    #[test]
    fn test_best_sellers_by_band() {
        let invoices = vec![paid("1", vec![InvoiceItem::new("A", 1), InvoiceItem::new("C", 1)])];
        let results = best_sellers_by_range(&invoices, &products(), &PriceRange::dashboard_bands());

        assert_eq!(results.len(), 3);
        assert_eq!(results[0].1.as_ref().unwrap().product.id, "A");
        assert!(results[1].1.is_none());
        assert_eq!(results[2].1.as_ref().unwrap().product.id, "C");
    }

    #[test]
    fn test_revenue_by_status() {
        let mut discounted = paid(
            "1",
            vec![InvoiceItem {
                product_id: "A".into(),
                quantity: 2,
                unit_price: Some(25.0),
            }],
        );
        discounted.discount = 10.0;
        let invoices = vec![
            discounted,
            paid("2", vec![InvoiceItem::new("C", 1)]),
            Invoice::new("3", InvoiceStatus::Unpaid, vec![InvoiceItem::new("B", 2)]),
        ];

        let revenue = revenue_by_status(&invoices, &products());
        assert_eq!(
            revenue,
            vec![(InvoiceStatus::Paid, 240.0), (InvoiceStatus::Unpaid, 60.0)]
        );
    }

    #[test]
    fn test_revenue_prefers_recorded_total() {
        let mut recorded = paid("1", vec![InvoiceItem::new("A", 2)]);
        recorded.total = Some(500.0);
        let invoices = vec![recorded, paid("2", vec![InvoiceItem::new("B", 1)])];

        let revenue = revenue_by_status(&invoices, &products());
        assert_eq!(revenue, vec![(InvoiceStatus::Paid, 530.0)]);
    }

    #[test]
    fn test_price_range_display() {
        assert_eq!(PriceRange::new(0.0, 50.0).to_string(), "0-50");
        assert_eq!(PriceRange::new(150.0, f64::INFINITY).to_string(), "150+");
        assert!(PriceRange::any().contains(1e9));
    }
}
