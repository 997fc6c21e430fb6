//! Import/export adapters for budget-lens
//!
//! - CSV: transactions (spreadsheet-compatible)
//! - JSON: analytics payloads, monthly reports, template and scenario files

pub mod csv;
pub mod json;

pub use self::csv::{
    export_store_csv, export_transactions_csv, import_transactions_csv, parse_transactions_csv,
    ImportSummary, CSV_HEADER,
};
pub use self::json::{
    load_templates_json, parse_templates_json, read_scenario_json, to_json_string, write_json,
    MonthlyReport, EXPORT_SCHEMA_VERSION,
};
