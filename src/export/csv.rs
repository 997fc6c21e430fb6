//! CSV transaction import and export
//!
//! Columns: `Date,Category,Amount,Description,Source`. Export always writes
//! all five; import requires `Date`, `Category` and `Amount` and accepts the
//! rest in any order.

use std::io::{Read, Write};

use csv::{ReaderBuilder, StringRecord, Trim, WriterBuilder};
use tracing::{info, warn};

use crate::error::{LensError, LensResult};
use crate::models::{parse_date, Money, Transaction, TransactionId, TransactionSource};
use crate::services::categorize::{Categorizer, UNCATEGORIZED};
use crate::storage::{TransactionFilter, TransactionStore};

/// Header written by [`export_transactions_csv`]
pub const CSV_HEADER: [&str; 5] = ["Date", "Category", "Amount", "Description", "Source"];

/// Write transactions as CSV, returning the number of rows written
pub fn export_transactions_csv<'t, W, I>(transactions: I, writer: W) -> LensResult<usize>
where
    W: Write,
    I: IntoIterator<Item = &'t Transaction>,
{
    let mut csv = WriterBuilder::new().from_writer(writer);
    let export_err = |e: csv::Error| LensError::Export(e.to_string());

    csv.write_record(CSV_HEADER).map_err(export_err)?;

    let mut rows = 0;
    for txn in transactions {
        csv.write_record([
            txn.date.format("%Y-%m-%d").to_string(),
            txn.category.clone(),
            txn.amount.to_decimal_string(),
            txn.description.clone(),
            txn.source.as_str().to_string(),
        ])
        .map_err(export_err)?;
        rows += 1;
    }

    csv.flush()
        .map_err(|e| LensError::Export(e.to_string()))?;
    Ok(rows)
}

/// Export the transactions matching `filter`, in store order
pub fn export_store_csv<W: Write>(
    store: &TransactionStore,
    filter: TransactionFilter,
    writer: W,
) -> LensResult<usize> {
    let query = store.query(filter)?;
    export_transactions_csv(query.iter(), writer)
}

/// Header cell without surrounding whitespace or a spreadsheet byte-order mark
fn header_name(cell: &str) -> &str {
    cell.trim_start_matches('\u{feff}').trim()
}

/// Positions of the recognized columns in a header row
#[derive(Debug, Clone, PartialEq, Eq)]
struct ColumnMap {
    date: usize,
    category: usize,
    amount: usize,
    description: Option<usize>,
    source: Option<usize>,
}

impl ColumnMap {
    fn from_headers(headers: &StringRecord) -> LensResult<Self> {
        let find = |name: &str| {
            headers
                .iter()
                .position(|h| header_name(h).eq_ignore_ascii_case(name))
        };
        let require = |name: &str| {
            find(name).ok_or_else(|| LensError::Parse(format!("Missing required column '{}'", name)))
        };

        Ok(Self {
            date: require("Date")?,
            category: require("Category")?,
            amount: require("Amount")?,
            description: find("Description"),
            source: find("Source"),
        })
    }
}

/// A parsed CSV file, not yet stored
#[derive(Debug, Clone, Default)]
pub struct ParsedCsv {
    pub transactions: Vec<Transaction>,
    /// Rows whose blank category was filled in from the description
    pub auto_categorized: usize,
}

/// Parse a transaction CSV
///
/// Any malformed row fails the whole file with a `Parse` error. Header names
/// are trimmed; `Category` and `Description` cells are kept exactly as written
/// so that an exported file imports back to the same transactions.
pub fn parse_transactions_csv<R: Read>(
    reader: R,
    categorizer: &Categorizer,
) -> LensResult<ParsedCsv> {
    let mut rdr = ReaderBuilder::new()
        .has_headers(true)
        .trim(Trim::Headers)
        .from_reader(reader);

    let columns = ColumnMap::from_headers(rdr.headers()?)?;
    let mut parsed = ParsedCsv::default();

    for (index, result) in rdr.records().enumerate() {
        // Header is line 1
        let line = index + 2;
        let record = result.map_err(|e| LensError::Parse(format!("line {}: {}", line, e)))?;
        let (txn, auto) = parse_record(&record, &columns, categorizer)
            .map_err(|msg| LensError::Parse(format!("line {}: {}", line, msg)))?;
        if auto {
            parsed.auto_categorized += 1;
        }
        parsed.transactions.push(txn);
    }

    Ok(parsed)
}

fn parse_record(
    record: &StringRecord,
    columns: &ColumnMap,
    categorizer: &Categorizer,
) -> Result<(Transaction, bool), String> {
    let field = |index: usize| record.get(index).unwrap_or("");
    let optional = |index: Option<usize>| index.map(field).unwrap_or("");

    let date = parse_date(field(columns.date)).map_err(|e| e.to_string())?;
    let amount = Money::parse(field(columns.amount)).map_err(|e| e.to_string())?;
    let description = optional(columns.description).to_string();

    let source = match optional(columns.source).trim() {
        "" => TransactionSource::Imported,
        value => value
            .parse::<TransactionSource>()
            .map_err(|e| e.to_string())?,
    };

    let (category, auto) = match field(columns.category) {
        blank if blank.trim().is_empty() => {
            let category = categorizer.categorize_or_default(&description);
            if category == UNCATEGORIZED {
                warn!(%date, description = %description, "no category rule matched, using {}", UNCATEGORIZED);
            }
            (category, true)
        }
        category => (category.to_string(), false),
    };

    let txn = Transaction::new(date, category, amount)
        .with_description(description)
        .with_source(source);
    Ok((txn, auto))
}

/// Outcome of a committed import
#[derive(Debug, Clone, Default)]
pub struct ImportSummary {
    pub imported: usize,
    pub auto_categorized: usize,
    pub ids: Vec<TransactionId>,
}

/// Parse a CSV and commit every row, or nothing
pub fn import_transactions_csv<R: Read>(
    store: &TransactionStore,
    reader: R,
    categorizer: &Categorizer,
) -> LensResult<ImportSummary> {
    let parsed = parse_transactions_csv(reader, categorizer)?;
    let ids = store.insert_many(parsed.transactions)?;

    info!(
        imported = ids.len(),
        auto_categorized = parsed.auto_categorized,
        "imported transactions from CSV"
    );

    Ok(ImportSummary {
        imported: ids.len(),
        auto_categorized: parsed.auto_categorized,
        ids,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::settings::default_category_keywords;
    use chrono::NaiveDate;
    use tempfile::TempDir;

    fn create_test_store() -> (TempDir, TransactionStore) {
        let temp_dir = TempDir::new().unwrap();
        let store = TransactionStore::new(temp_dir.path().join("transactions.json"));
        (temp_dir, store)
    }

    fn categorizer() -> Categorizer {
        Categorizer::new(&default_category_keywords())
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_export_format() {
        let txns = vec![
            Transaction::new(date(2025, 8, 15), "Food", Money::from_cents(125_050))
                .with_description("Dinner, with friends"),
            Transaction::new(date(2025, 8, 16), "Shopping", Money::from_units(-40))
                .with_source(TransactionSource::Imported),
        ];

        let mut out = Vec::new();
        let rows = export_transactions_csv(&txns, &mut out).unwrap();
        assert_eq!(rows, 2);

        let text = String::from_utf8(out).unwrap();
        let lines: Vec<_> = text.lines().collect();
        assert_eq!(lines[0], "Date,Category,Amount,Description,Source");
        assert_eq!(lines[1], "2025-08-15,Food,1250.50,\"Dinner, with friends\",manual");
        assert_eq!(lines[2], "2025-08-16,Shopping,-40.00,,imported");
    }

    #[test]
    fn test_export_import_reproduces_set() {
        let (_dir, source) = create_test_store();
        source
            .add(
                Transaction::new(date(2025, 8, 15), "Food", Money::from_cents(125_050))
                    .with_description("Dinner, \"fancy\""),
            )
            .unwrap();
        source
            .add(
                Transaction::new(date(2025, 8, 1), "Shopping", Money::from_units(-40))
                    .with_source(TransactionSource::Imported),
            )
            .unwrap();

        let mut out = Vec::new();
        export_store_csv(&source, TransactionFilter::new(), &mut out).unwrap();

        let (_dir2, target) = create_test_store();
        let summary = import_transactions_csv(&target, out.as_slice(), &categorizer()).unwrap();
        assert_eq!(summary.imported, 2);
        assert_eq!(summary.auto_categorized, 0);

        let strip = |txns: Vec<Transaction>| -> Vec<_> {
            txns.into_iter()
                .map(|t| (t.date, t.category, t.amount, t.description, t.source))
                .collect()
        };
        assert_eq!(
            strip(source.get_all().unwrap()),
            strip(target.get_all().unwrap())
        );
    }

    #[test]
    fn test_padded_values_survive_export_import() {
        let (_dir, source) = create_test_store();
        source
            .add(
                Transaction::new(date(2025, 8, 15), " Food ", Money::from_units(120))
                    .with_description("  lunch  "),
            )
            .unwrap();

        let mut out = Vec::new();
        export_store_csv(&source, TransactionFilter::new(), &mut out).unwrap();

        let (_dir2, target) = create_test_store();
        import_transactions_csv(&target, out.as_slice(), &categorizer()).unwrap();

        let txn = &target.get_all().unwrap()[0];
        assert_eq!(txn.category, " Food ");
        assert_eq!(txn.description, "  lunch  ");
        assert_eq!(txn.amount, Money::from_units(120));
    }

    #[test]
    fn test_import_tolerates_padding_and_bom() {
        let (_dir, store) = create_test_store();
        let data = "\u{feff}Date , Category,Amount ,Source\n 2025-08-03 ,Food, 12.50 , imported \n";
        import_transactions_csv(&store, data.as_bytes(), &categorizer()).unwrap();

        let txn = &store.get_all().unwrap()[0];
        assert_eq!(txn.date, date(2025, 8, 3));
        assert_eq!(txn.amount, Money::from_cents(1250));
        assert_eq!(txn.source, TransactionSource::Imported);
    }

    #[test]
    fn test_import_rejects_bare_decimal_point() {
        let (_dir, store) = create_test_store();
        let data = "Date,Category,Amount\n2025-08-03,Food,.\n";
        let err = import_transactions_csv(&store, data.as_bytes(), &categorizer()).unwrap_err();
        assert!(err.is_parse());
        assert!(err.to_string().contains("line 2"));
        assert_eq!(store.count().unwrap(), 0);
    }

    #[test]
    fn test_import_optional_columns_and_order() {
        let (_dir, store) = create_test_store();
        let data = "Amount,Date,Category\n12.5,2025-08-03,Food\n";
        import_transactions_csv(&store, data.as_bytes(), &categorizer()).unwrap();

        let txn = &store.get_all().unwrap()[0];
        assert_eq!(txn.amount, Money::from_cents(1250));
        assert_eq!(txn.source, TransactionSource::Imported);
        assert!(txn.description.is_empty());
    }

    #[test]
    fn test_import_missing_column_fails() {
        let (_dir, store) = create_test_store();
        let data = "Date,Amount\n2025-08-03,12.50\n";
        let err = import_transactions_csv(&store, data.as_bytes(), &categorizer()).unwrap_err();
        assert!(err.is_parse());
        assert!(err.to_string().contains("Category"));
    }

    #[test]
    fn test_import_bad_row_commits_nothing() {
        let (_dir, store) = create_test_store();
        let data = "Date,Category,Amount\n\
                    2025-08-03,Food,12.50\n\
                    2025-08-04,Food,twelve\n";
        let err = import_transactions_csv(&store, data.as_bytes(), &categorizer()).unwrap_err();
        assert!(err.is_parse());
        assert!(err.to_string().contains("line 3"));
        assert_eq!(store.count().unwrap(), 0);
    }

    #[test]
    fn test_import_bad_date_and_source() {
        let (_dir, store) = create_test_store();
        let bad_date = "Date,Category,Amount\n08/03/2025,Food,1\n";
        assert!(import_transactions_csv(&store, bad_date.as_bytes(), &categorizer())
            .unwrap_err()
            .is_parse());

        let bad_source = "Date,Category,Amount,Source\n2025-08-03,Food,1,bank\n";
        assert!(import_transactions_csv(&store, bad_source.as_bytes(), &categorizer())
            .unwrap_err()
            .is_parse());
    }

    #[test]
    fn test_import_auto_categorizes_blank_category() {
        let (_dir, store) = create_test_store();
        let data = "Date,Category,Amount,Description\n\
                    2025-08-03,  ,450,Shell PETROL PUMP\n\
                    2025-08-04,,99,mystery\n";
        let summary = import_transactions_csv(&store, data.as_bytes(), &categorizer()).unwrap();
        assert_eq!(summary.auto_categorized, 2);

        let categories: Vec<_> = store
            .get_all()
            .unwrap()
            .into_iter()
            .map(|t| t.category)
            .collect();
        assert_eq!(categories, vec!["Petrol", UNCATEGORIZED]);
    }
}
