// Rendering boundary: console previews, CSV tables and JSON chart payloads.
//
// Nothing here computes figures; every value comes from a finished view.
use crate::reports::{CategoryView, MonthlyView};
use crate::types::{
    CountRow, MetricRow, MonthlySourceRow, MonthlyTotalRow, QuantityRow, RevenueRow, Source,
};
use crate::util::{format_money, format_number};
use anyhow::{Context, Result};
use serde::Serialize;
use std::path::{Path, PathBuf};
use tabled::{settings::Style, Table, Tabled};
use tracing::info;

pub fn write_csv<T: Serialize>(path: &Path, rows: &[T]) -> Result<()> {
    let mut wtr = csv::Writer::from_path(path)
        .with_context(|| format!("Failed to create {}", path.display()))?;
    for r in rows {
        wtr.serialize(r)?;
    }
    wtr.flush()?;
    Ok(())
}

pub fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    let s = serde_json::to_string_pretty(value)?;
    std::fs::write(path, s).with_context(|| format!("Failed to write {}", path.display()))?;
    Ok(())
}

pub fn preview_table<T>(title: &str, rows: &[T], max_rows: usize)
where
    T: Tabled + Clone,
{
    println!("{}\n", title);
    let slice: Vec<T> = rows.iter().take(max_rows).cloned().collect();
    if slice.is_empty() {
        println!("(no rows)\n");
        return;
    }
    let table_str = Table::new(slice).with(Style::markdown()).to_string();
    println!("{}", table_str);
    if rows.len() > max_rows {
        println!("({} of {} rows shown)", max_rows, rows.len());
    }
    println!();
}

fn metric(label: impl Into<String>, value: impl Into<String>) -> MetricRow {
    MetricRow {
        metric: label.into(),
        value: value.into(),
    }
}

fn print_metrics(rows: Vec<MetricRow>) {
    let table_str = Table::new(rows).with(Style::rounded()).to_string();
    println!("{}\n", table_str);
}

pub fn revenue_rows(view: &CategoryView) -> Vec<RevenueRow> {
    view.revenue
        .iter()
        .map(|s| RevenueRow {
            category: s.category.clone(),
            revenue: format_number(s.revenue, 2),
            share: format!("{:.1}%", s.share),
            color: s.color.to_string(),
        })
        .collect()
}

pub fn count_rows(view: &CategoryView) -> Vec<CountRow> {
    view.counts
        .iter()
        .map(|c| CountRow {
            category: c.category.clone(),
            count: c.count,
            color: c.color.to_string(),
        })
        .collect()
}

pub fn quantity_rows(view: &CategoryView) -> Vec<QuantityRow> {
    view.quantities
        .iter()
        .flatten()
        .map(|q| QuantityRow {
            product: q.category.clone(),
            quantity_sold: q.quantity,
            color: q.color.to_string(),
        })
        .collect()
}

pub fn monthly_source_rows(view: &MonthlyView) -> Vec<MonthlySourceRow> {
    view.by_source
        .iter()
        .map(|p| MonthlySourceRow {
            month: p.month.to_string(),
            source: p.source.to_string(),
            revenue: format_number(p.revenue, 2),
            color: p.color.to_string(),
        })
        .collect()
}

pub fn monthly_total_rows(view: &MonthlyView) -> Vec<MonthlyTotalRow> {
    view.combined
        .iter()
        .map(|p| MonthlyTotalRow {
            month: p.month.to_string(),
            revenue: format_number(p.revenue, 2),
        })
        .collect()
}

/// Console rendering of a services or products view.
pub fn print_category_view(view: &CategoryView, max_rows: usize) {
    let noun = view.source.label();
    let (heading, total_label) = match view.source {
        Source::Service => ("Services Overview", "Total Service Revenue"),
        Source::Product => ("Products Overview", "Total Revenue"),
    };
    println!("{}\n", heading);
    print_metrics(vec![
        metric(total_label, format_money(view.total_revenue)),
        metric(format!("Most Popular {}", noun), view.most_popular_label()),
        metric(format!("Least Popular {}", noun), view.least_popular_label()),
    ]);
    preview_table(&view.revenue_title, &revenue_rows(view), max_rows);
    match view.source {
        Source::Service => preview_table(&view.sales_title, &count_rows(view), max_rows),
        Source::Product => {
            preview_table(&format!("Most Popular Products from {}", view.window), &count_rows(view), max_rows);
            preview_table(&view.sales_title, &quantity_rows(view), max_rows);
        }
    }
}

pub fn print_monthly_view(view: &MonthlyView, max_rows: usize) {
    println!("Total Revenue by Month ({})\n", view.month);
    print_metrics(vec![
        metric("Total Service Revenue", format_money(view.service_total)),
        metric("Total Product Revenue", format_money(view.product_total)),
        metric("Total Revenue", format_money(view.combined_total)),
        metric("Total Revenue So Far This Year", format_money(view.year_to_date_total)),
    ]);
    preview_table(&view.title, &monthly_source_rows(view), max_rows);
    preview_table("Combined Revenue by Month", &monthly_total_rows(view), max_rows);
}

/// Write the CSV tables and JSON payload of a services/products view.
/// Returns the files written.
pub fn export_category_view(dir: &Path, view: &CategoryView) -> Result<Vec<PathBuf>> {
    let prefix = match view.source {
        Source::Service => "services",
        Source::Product => "products",
    };
    let mut written = Vec::new();

    let path = dir.join(format!("{}_revenue.csv", prefix));
    write_csv(&path, &revenue_rows(view))?;
    written.push(path);

    let path = dir.join(format!("{}_counts.csv", prefix));
    write_csv(&path, &count_rows(view))?;
    written.push(path);

    if view.quantities.is_some() {
        let path = dir.join(format!("{}_quantity.csv", prefix));
        write_csv(&path, &quantity_rows(view))?;
        written.push(path);
    }

    let path = dir.join(format!("{}_view.json", prefix));
    write_json(&path, view)?;
    written.push(path);

    info!(view = prefix, files = written.len(), dir = %dir.display(), "exported view");
    Ok(written)
}

pub fn export_monthly_view(dir: &Path, view: &MonthlyView) -> Result<Vec<PathBuf>> {
    let mut written = Vec::new();

    let path = dir.join("monthly_by_source.csv");
    write_csv(&path, &monthly_source_rows(view))?;
    written.push(path);

    let path = dir.join("monthly_combined.csv");
    write_csv(&path, &monthly_total_rows(view))?;
    written.push(path);

    let path = dir.join("monthly_view.json");
    write_json(&path, view)?;
    written.push(path);

    info!(view = "monthly", files = written.len(), dir = %dir.display(), "exported view");
    Ok(written)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reports::{build_monthly_view, build_products_view};
    use crate::types::{Dataset, DateWindow, Datasets, Transaction, YearMonth};
    use chrono::NaiveDate;
    use rust_decimal_macros::dec;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    fn data() -> Datasets {
        let sale = |date, name: &str, revenue, qty| Transaction {
            date,
            category: name.to_string(),
            revenue,
            quantity: Some(qty),
        };
        Datasets {
            services: Dataset::new(
                Source::Service,
                vec![Transaction {
                    date: d(2024, 1, 2),
                    category: "Color".to_string(),
                    revenue: dec!(1200),
                    quantity: None,
                }],
            ),
            products: Dataset::new(
                Source::Product,
                vec![
                    sale(d(2024, 1, 3), "Shampoo", dec!(30), 2),
                    sale(d(2024, 1, 4), "Serum", dec!(90), 3),
                ],
            ),
        }
    }

    #[test]
    fn rows_are_formatted_for_display() {
        let data = data();
        let view = build_products_view(&data, DateWindow::new(d(2024, 1, 1), d(2024, 1, 31)));
        let rows = revenue_rows(&view);
        assert_eq!(rows[0].category, "Serum");
        assert_eq!(rows[0].revenue, "90.00");
        assert_eq!(rows[0].share, "75.0%");
        assert_eq!(quantity_rows(&view)[1].quantity_sold, 2);

        let monthly = build_monthly_view(&data, YearMonth::new(2024, 1).unwrap(), d(2024, 2, 1));
        let totals = monthly_total_rows(&monthly);
        assert_eq!(totals[0].month, "2024-01");
        assert_eq!(totals[0].revenue, "1,320.00");
    }

    #[test]
    fn exports_products_files() {
        let dir = tempfile::tempdir().unwrap();
        let data = data();
        let view = build_products_view(&data, DateWindow::new(d(2024, 1, 1), d(2024, 1, 31)));
        let files = export_category_view(dir.path(), &view).unwrap();
        assert_eq!(files.len(), 4);
        for f in &files {
            assert!(f.exists(), "{} missing", f.display());
        }

        let csv = std::fs::read_to_string(dir.path().join("products_quantity.csv")).unwrap();
        assert!(csv.starts_with("Product,Quantity_Sold,Color"));
        assert!(csv.contains("Serum,3,#43AA8B"));

        let json: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(dir.path().join("products_view.json")).unwrap())
                .unwrap();
        assert_eq!(json["total_revenue"], 120.0);
        assert_eq!(json["most_popular"], "Serum");
    }

    #[test]
    fn exports_monthly_files() {
        let dir = tempfile::tempdir().unwrap();
        let view = build_monthly_view(&data(), YearMonth::new(2024, 1).unwrap(), d(2024, 2, 1));
        let files = export_monthly_view(dir.path(), &view).unwrap();
        assert_eq!(files.len(), 3);
        let csv = std::fs::read_to_string(dir.path().join("monthly_by_source.csv")).unwrap();
        assert!(csv.contains("2024-01,Product,120.00,#577590"));
        assert!(csv.contains("\"1,200.00\""));
    }
}
