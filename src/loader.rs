use crate::error::LoadError;
use crate::types::{Dataset, Datasets, RawRow, Source, Transaction};
use crate::util::{parse_date_safe, parse_decimal_safe, parse_i64_safe};
use csv::{ReaderBuilder, Trim};
use std::fs::File;
use std::io::Read;
use std::path::Path;
use tracing::{debug, info};

const DATE: &str = "Date";
const REVENUE: &str = "Revenue";
const QUANTITY: &str = "Quantity_Sold";

/// Load the services and products files into the report context.
///
/// Either file failing aborts the whole load.
pub fn load_datasets(services: &Path, products: &Path) -> Result<Datasets, LoadError> {
    let services = load_dataset(services, Source::Service)?;
    let products = load_dataset(products, Source::Product)?;
    Ok(Datasets { services, products })
}

pub fn load_dataset(path: &Path, source: Source) -> Result<Dataset, LoadError> {
    let file = File::open(path).map_err(|source| LoadError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let dataset = read_dataset(file, path, source)?;
    info!(
        path = %path.display(),
        source = %source,
        rows = dataset.records.len(),
        "dataset loaded"
    );
    Ok(dataset)
}

/// Parse a dataset from any CSV reader. `path` is only used in error messages.
pub fn read_dataset<R: Read>(reader: R, path: &Path, source: Source) -> Result<Dataset, LoadError> {
    let csv_err = |source: csv::Error| LoadError::Csv {
        path: path.to_path_buf(),
        source,
    };
    let mut rdr = ReaderBuilder::new()
        .flexible(true)
        .trim(Trim::Headers)
        .from_reader(reader);

    let headers = rdr.headers().map_err(csv_err)?.clone();
    let mut required = vec![DATE, source.category_column(), REVENUE];
    if source == Source::Product {
        required.push(QUANTITY);
    }
    for column in required {
        if !headers.iter().any(|h| h == column) {
            return Err(LoadError::MissingColumn {
                path: path.to_path_buf(),
                column,
            });
        }
    }

    let mut records = Vec::new();
    for (idx, result) in rdr.deserialize::<RawRow>().enumerate() {
        let row = idx + 1;
        let raw = result.map_err(csv_err)?;
        records.push(coerce_row(raw, row, path, source)?);
    }
    debug!(source = %source, rows = records.len(), "parsed rows");
    Ok(Dataset::new(source, records))
}

fn coerce_row(raw: RawRow, row: usize, path: &Path, source: Source) -> Result<Transaction, LoadError> {
    let missing = |column: &'static str| LoadError::MissingField {
        path: path.to_path_buf(),
        row,
        column,
    };
    let invalid = |column: &'static str, value: &str| LoadError::InvalidField {
        path: path.to_path_buf(),
        row,
        column,
        value: value.to_string(),
    };

    let date_raw = non_blank(raw.date.as_deref()).ok_or_else(|| missing(DATE))?;
    let date = parse_date_safe(Some(date_raw)).ok_or_else(|| invalid(DATE, date_raw))?;

    let category_column = source.category_column();
    let category = match source {
        Source::Service => raw.service.as_deref(),
        Source::Product => raw.product.as_deref(),
    };
    let category = non_blank(category)
        .ok_or_else(|| missing(category_column))?
        .to_string();

    let revenue_raw = non_blank(raw.revenue.as_deref()).ok_or_else(|| missing(REVENUE))?;
    let revenue = parse_decimal_safe(Some(revenue_raw)).ok_or_else(|| invalid(REVENUE, revenue_raw))?;

    let quantity = match source {
        Source::Service => None,
        Source::Product => {
            let qty_raw = non_blank(raw.quantity_sold.as_deref()).ok_or_else(|| missing(QUANTITY))?;
            Some(parse_i64_safe(Some(qty_raw)).ok_or_else(|| invalid(QUANTITY, qty_raw))?)
        }
    };

    Ok(Transaction {
        date,
        category,
        revenue,
        quantity,
    })
}

fn non_blank(s: Option<&str>) -> Option<&str> {
    s.map(str::trim).filter(|s| !s.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use rust_decimal_macros::dec;
    use std::io::Write;

    fn read(csv: &str, source: Source) -> Result<Dataset, LoadError> {
        read_dataset(csv.as_bytes(), Path::new("test.csv"), source)
    }

    #[test]
    fn reads_services() {
        let ds = read(
            "Date,Service,Revenue\n2024-01-05,Haircut (Men),30\n2024-01-20,Color,100.50\n",
            Source::Service,
        )
        .unwrap();
        assert_eq!(ds.source, Source::Service);
        assert_eq!(ds.records.len(), 2);
        assert_eq!(ds.records[0].category, "Haircut (Men)");
        assert_eq!(ds.records[0].date, NaiveDate::from_ymd_opt(2024, 1, 5).unwrap());
        assert_eq!(ds.records[1].revenue, dec!(100.50));
        assert_eq!(ds.records[1].quantity, None);
    }

    #[test]
    fn reads_products_with_quantity_and_extra_columns() {
        let ds = read(
            "Date,Product,Quantity_Sold,Revenue,Staff\n2024-02-01 10:15:00,Shampoo,3,45,Ana\n",
            Source::Product,
        )
        .unwrap();
        let rec = &ds.records[0];
        assert_eq!(rec.date, NaiveDate::from_ymd_opt(2024, 2, 1).unwrap());
        assert_eq!(rec.quantity, Some(3));
        assert_eq!(rec.revenue, dec!(45));
    }

    #[test]
    fn header_only_file_is_empty_dataset() {
        let ds = read("Date,Service,Revenue\n", Source::Service).unwrap();
        assert!(ds.records.is_empty());
    }

    #[test]
    fn missing_column_is_fatal() {
        let err = read("Date,Product,Revenue\n2024-01-01,Serum,10\n", Source::Product).unwrap_err();
        assert!(matches!(err, LoadError::MissingColumn { column: "Quantity_Sold", .. }));
    }

    #[test]
    fn missing_field_reports_row() {
        let err = read(
            "Date,Service,Revenue\n2024-01-01,Color,10\n2024-01-02,,20\n",
            Source::Service,
        )
        .unwrap_err();
        assert!(matches!(err, LoadError::MissingField { row: 2, column: "Service", .. }));
    }

    #[test]
    fn unparseable_date_is_fatal() {
        let err = read("Date,Service,Revenue\nsoon,Color,10\n", Source::Service).unwrap_err();
        match err {
            LoadError::InvalidField { row, column, value, .. } => {
                assert_eq!(row, 1);
                assert_eq!(column, "Date");
                assert_eq!(value, "soon");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn unreadable_file_is_io_error() {
        let err = load_dataset(Path::new("/definitely/not/here.csv"), Source::Service).unwrap_err();
        assert!(matches!(err, LoadError::Io { .. }));
    }

    #[test]
    fn loads_both_files_from_disk() {
        let dir = tempfile::tempdir().unwrap();
        let services = dir.path().join("services_data.csv");
        let products = dir.path().join("products_data.csv");
        let mut f = File::create(&services).unwrap();
        writeln!(f, "Date,Service,Revenue\n2024-03-01,Styling,55").unwrap();
        let mut f = File::create(&products).unwrap();
        writeln!(f, "Date,Product,Quantity_Sold,Revenue\n2024-03-02,Serum,2,40").unwrap();

        let data = load_datasets(&services, &products).unwrap();
        assert_eq!(data.services.records.len(), 1);
        assert_eq!(data.products.records[0].quantity, Some(2));
    }

    #[test]
    fn bundled_sample_data_loads() {
        let root = Path::new(env!("CARGO_MANIFEST_DIR")).join("data");
        let data = load_datasets(&root.join("services_data.csv"), &root.join("products_data.csv")).unwrap();
        assert_eq!(data.services.records.len(), 11);
        assert_eq!(data.products.records.len(), 8);
        assert!(data.products.records.iter().all(|r| r.quantity.is_some()));
    }

    #[test]
    fn second_file_failure_aborts_load() {
        let dir = tempfile::tempdir().unwrap();
        let services = dir.path().join("services_data.csv");
        std::fs::write(&services, "Date,Service,Revenue\n2024-03-01,Styling,55\n").unwrap();
        let products = dir.path().join("missing.csv");

        assert!(load_datasets(&services, &products).is_err());
    }
}
