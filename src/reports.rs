use crate::aggregate::{
    counts_by_category, least_popular, monthly_revenue_by_source, monthly_revenue_combined,
    most_popular, quantity_by_category, ranked_counts, revenue_by_category, total_revenue,
    year_to_date_revenue,
};
use crate::colors::{color_for, source_color};
use crate::filter::{filter_by_month, filter_by_range};
use crate::types::{Dataset, DateWindow, Datasets, Source, YearMonth};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Serialize;
use tracing::debug;

/// Shown on popularity cards when the window holds no transactions.
pub const NO_DATA: &str = "No data";

/// One pie slice.
#[derive(Debug, Clone, Serialize)]
pub struct RevenueSlice {
    pub category: String,
    #[serde(with = "rust_decimal::serde::float")]
    pub revenue: Decimal,
    /// Percent of the view total, one decimal place.
    #[serde(with = "rust_decimal::serde::float")]
    pub share: Decimal,
    pub color: &'static str,
}

#[derive(Debug, Clone, Serialize)]
pub struct CategoryCount {
    pub category: String,
    pub count: usize,
    pub color: &'static str,
}

#[derive(Debug, Clone, Serialize)]
pub struct CategoryQuantity {
    pub category: String,
    pub quantity: i64,
    pub color: &'static str,
}

/// Services or products tab for one date window.
#[derive(Debug, Clone, Serialize)]
pub struct CategoryView {
    pub source: Source,
    pub window: DateWindow,
    pub revenue_title: String,
    pub sales_title: String,
    pub revenue: Vec<RevenueSlice>,
    #[serde(with = "rust_decimal::serde::float")]
    pub total_revenue: Decimal,
    pub most_popular: Option<String>,
    pub least_popular: Option<String>,
    /// Transaction counts, highest first.
    pub counts: Vec<CategoryCount>,
    /// Units sold per product; `None` for services.
    pub quantities: Option<Vec<CategoryQuantity>>,
}

impl CategoryView {
    pub fn most_popular_label(&self) -> &str {
        self.most_popular.as_deref().unwrap_or(NO_DATA)
    }

    pub fn least_popular_label(&self) -> &str {
        self.least_popular.as_deref().unwrap_or(NO_DATA)
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct MonthlySourcePoint {
    pub month: YearMonth,
    pub source: Source,
    #[serde(with = "rust_decimal::serde::float")]
    pub revenue: Decimal,
    pub color: &'static str,
}

#[derive(Debug, Clone, Serialize)]
pub struct MonthlyPoint {
    pub month: YearMonth,
    #[serde(with = "rust_decimal::serde::float")]
    pub revenue: Decimal,
}

/// "Total Revenue by Month" tab.
#[derive(Debug, Clone, Serialize)]
pub struct MonthlyView {
    pub month: YearMonth,
    pub today: NaiveDate,
    pub title: String,
    #[serde(with = "rust_decimal::serde::float")]
    pub service_total: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub product_total: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub combined_total: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub year_to_date_total: Decimal,
    /// Grouped bars: one point per month and source, across all data.
    pub by_source: Vec<MonthlySourcePoint>,
    /// Line over the bars: combined revenue per month.
    pub combined: Vec<MonthlyPoint>,
}

/// Earliest to latest date in `dataset`, or just `today` when it is empty.
pub fn default_window(dataset: &Dataset, today: NaiveDate) -> DateWindow {
    let (start, end) = dataset.date_span().unwrap_or((today, today));
    DateWindow::new(start, end)
}

pub fn build_services_view(data: &Datasets, window: DateWindow) -> CategoryView {
    build_category_view(&data.services, window)
}

pub fn build_products_view(data: &Datasets, window: DateWindow) -> CategoryView {
    build_category_view(&data.products, window)
}

fn build_category_view(dataset: &Dataset, window: DateWindow) -> CategoryView {
    let source = dataset.source;
    let filtered = filter_by_range(&dataset.records, window);
    debug!(source = %source, %window, rows = filtered.len(), "building category view");

    let total = total_revenue(filtered.iter().copied());
    let revenue = revenue_by_category(filtered.iter().copied())
        .into_iter()
        .map(|(category, revenue)| RevenueSlice {
            share: share_of(revenue, total),
            color: color_for(source, &category),
            category,
            revenue,
        })
        .collect();

    let counts_map = counts_by_category(filtered.iter().copied());
    let counts = ranked_counts(&counts_map)
        .into_iter()
        .map(|(category, count)| CategoryCount {
            category: category.to_string(),
            count,
            color: color_for(source, category),
        })
        .collect();

    let quantities = match source {
        Source::Service => None,
        Source::Product => Some(
            quantity_by_category(filtered.iter().copied())
                .into_iter()
                .map(|(category, quantity)| CategoryQuantity {
                    color: color_for(source, &category),
                    category,
                    quantity,
                })
                .collect(),
        ),
    };

    CategoryView {
        source,
        window,
        revenue_title: format!("Total Revenue by {} from {}", source, window),
        sales_title: format!("{} Sales from {}", source, window),
        revenue,
        total_revenue: total,
        most_popular: most_popular(&counts_map).map(str::to_string),
        least_popular: least_popular(&counts_map).map(str::to_string),
        counts,
        quantities,
    }
}

/// Month tab. `today` anchors the year-to-date figure.
pub fn build_monthly_view(data: &Datasets, month: YearMonth, today: NaiveDate) -> MonthlyView {
    debug!(%month, %today, "building monthly view");
    let service_total = total_revenue(filter_by_month(&data.services.records, month));
    let product_total = total_revenue(filter_by_month(&data.products.records, month));
    let year_to_date_total = year_to_date_revenue(&data.services.records, today)
        + year_to_date_revenue(&data.products.records, today);

    let by_source = monthly_revenue_by_source(data)
        .into_iter()
        .map(|((month, source), revenue)| MonthlySourcePoint {
            month,
            source,
            revenue,
            color: source_color(source),
        })
        .collect();
    let combined = monthly_revenue_combined(data)
        .into_iter()
        .map(|(month, revenue)| MonthlyPoint { month, revenue })
        .collect();

    MonthlyView {
        month,
        today,
        title: "Total Revenue by Month from Services and Products".to_string(),
        service_total,
        product_total,
        combined_total: service_total + product_total,
        year_to_date_total,
        by_source,
        combined,
    }
}

fn share_of(part: Decimal, total: Decimal) -> Decimal {
    if total.is_zero() {
        return Decimal::ZERO;
    }
    (part * Decimal::ONE_HUNDRED / total).round_dp(1)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::colors::DEFAULT_COLOR;
    use crate::types::Transaction;
    use rust_decimal_macros::dec;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    fn service(date: NaiveDate, name: &str, revenue: Decimal) -> Transaction {
        Transaction {
            date,
            category: name.to_string(),
            revenue,
            quantity: None,
        }
    }

    fn product(date: NaiveDate, name: &str, revenue: Decimal, qty: i64) -> Transaction {
        Transaction {
            date,
            category: name.to_string(),
            revenue,
            quantity: Some(qty),
        }
    }

    fn sample() -> Datasets {
        Datasets {
            services: Dataset::new(
                Source::Service,
                vec![
                    service(d(2024, 1, 5), "Haircut (Men)", dec!(30)),
                    service(d(2024, 1, 20), "Color", dec!(100)),
                    service(d(2024, 2, 1), "Haircut (Men)", dec!(35)),
                    service(d(2024, 2, 14), "Haircut (Men)", dec!(35)),
                ],
            ),
            products: Dataset::new(
                Source::Product,
                vec![
                    product(d(2023, 12, 31), "Shampoo", dec!(15), 1),
                    product(d(2024, 1, 10), "Shampoo", dec!(30), 2),
                    product(d(2024, 1, 11), "Serum", dec!(60), 3),
                    product(d(2024, 1, 12), "Shampoo", dec!(15), 1),
                ],
            ),
        }
    }

    #[test]
    fn services_view_for_january() {
        let data = sample();
        let view = build_services_view(&data, DateWindow::new(d(2024, 1, 1), d(2024, 1, 31)));

        assert_eq!(view.total_revenue, dec!(130));
        let slices: Vec<(&str, Decimal)> =
            view.revenue.iter().map(|s| (s.category.as_str(), s.revenue)).collect();
        assert_eq!(slices, vec![("Color", dec!(100)), ("Haircut (Men)", dec!(30))]);
        assert_eq!(view.revenue[0].share, dec!(76.9));
        assert_eq!(view.revenue[0].color, "#F9C74F");
        assert_eq!(view.most_popular_label(), "Color");
        assert!(view.quantities.is_none());
        assert_eq!(
            view.revenue_title,
            "Total Revenue by Service from 2024-01-01 to 2024-01-31"
        );
        assert_eq!(view.sales_title, "Service Sales from 2024-01-01 to 2024-01-31");
    }

    #[test]
    fn slices_sum_to_total() {
        let data = sample();
        let window = default_window(&data.services, d(2024, 6, 1));
        let view = build_services_view(&data, window);
        let sum: Decimal = view.revenue.iter().map(|s| s.revenue).sum();
        assert_eq!(sum, view.total_revenue);
        assert_eq!(view.total_revenue, dec!(200));
        assert_eq!(view.most_popular_label(), "Haircut (Men)");
        assert_eq!(view.least_popular_label(), "Color");
        assert_eq!(view.counts[0].category, "Haircut (Men)");
        assert_eq!(view.counts[0].count, 3);
    }

    #[test]
    fn empty_window_degrades_to_no_data() {
        let data = sample();
        let view = build_products_view(&data, DateWindow::new(d(2024, 1, 31), d(2024, 1, 1)));
        assert!(view.revenue.is_empty());
        assert!(view.counts.is_empty());
        assert_eq!(view.total_revenue, Decimal::ZERO);
        assert_eq!(view.most_popular, None);
        assert_eq!(view.most_popular_label(), NO_DATA);
        assert_eq!(view.least_popular_label(), NO_DATA);
        assert_eq!(view.quantities.as_deref().map(<[_]>::len), Some(0));
    }

    #[test]
    fn products_view_reports_quantities() {
        let data = sample();
        let view = build_products_view(&data, DateWindow::new(d(2024, 1, 1), d(2024, 1, 31)));
        let qty: Vec<(&str, i64)> = view
            .quantities
            .as_ref()
            .unwrap()
            .iter()
            .map(|q| (q.category.as_str(), q.quantity))
            .collect();
        assert_eq!(qty, vec![("Serum", 3), ("Shampoo", 3)]);
        assert_eq!(view.total_revenue, dec!(105));
        assert_eq!(view.most_popular_label(), "Shampoo");
        assert_eq!(view.least_popular_label(), "Serum");
        assert_eq!(view.sales_title, "Product Sales from 2024-01-01 to 2024-01-31");
    }

    #[test]
    fn unknown_category_gets_default_color() {
        let data = Datasets {
            services: Dataset::new(Source::Service, vec![service(d(2024, 1, 1), "Beard Trim", dec!(20))]),
            products: Dataset::new(Source::Product, vec![]),
        };
        let view = build_services_view(&data, default_window(&data.services, d(2024, 1, 1)));
        assert_eq!(view.revenue[0].color, DEFAULT_COLOR);
        assert_eq!(view.counts[0].color, DEFAULT_COLOR);
    }

    #[test]
    fn default_window_of_empty_dataset_is_today() {
        let today = d(2024, 6, 1);
        let window = default_window(&Dataset::new(Source::Product, vec![]), today);
        assert_eq!(window, DateWindow::new(today, today));
    }

    #[test]
    fn monthly_view_totals() {
        let data = sample();
        let view = build_monthly_view(&data, YearMonth::new(2024, 1).unwrap(), d(2024, 6, 1));

        assert_eq!(view.service_total, dec!(130));
        assert_eq!(view.product_total, dec!(105));
        assert_eq!(view.combined_total, dec!(235));
        // The 2023-12-31 product sale is outside the year.
        assert_eq!(view.year_to_date_total, dec!(305));

        let months: Vec<String> = view.combined.iter().map(|p| p.month.to_string()).collect();
        assert_eq!(months, vec!["2023-12", "2024-01", "2024-02"]);
        for point in &view.combined {
            let per_source: Decimal = view
                .by_source
                .iter()
                .filter(|p| p.month == point.month)
                .map(|p| p.revenue)
                .sum();
            assert_eq!(per_source, point.revenue);
        }
        let jan_service = view
            .by_source
            .iter()
            .find(|p| p.month.to_string() == "2024-01" && p.source == Source::Service)
            .unwrap();
        assert_eq!(jan_service.revenue, dec!(130));
        assert_eq!(jan_service.color, "#F3722C");
    }

    #[test]
    fn monthly_view_for_month_without_data() {
        let data = sample();
        let view = build_monthly_view(&data, YearMonth::new(2022, 5).unwrap(), d(2024, 6, 1));
        assert_eq!(view.combined_total, Decimal::ZERO);
        assert!(!view.combined.is_empty());
    }

    #[test]
    fn views_serialize_as_numbers() {
        let data = sample();
        let view = build_monthly_view(&data, YearMonth::new(2024, 2).unwrap(), d(2024, 6, 1));
        let json = serde_json::to_value(&view).unwrap();
        assert_eq!(json["month"], "2024-02");
        assert_eq!(json["service_total"], 70.0);
        assert_eq!(json["by_source"][0]["source"], "Product");
    }
}
