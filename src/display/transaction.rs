//! Transaction display formatting

use crate::models::Transaction;

/// Format a single transaction as a register row
pub fn format_transaction_row(txn: &Transaction) -> String {
    format!(
        "{} {} {:16} {:>12} {}",
        txn.id.short(),
        txn.date.format("%Y-%m-%d"),
        truncate(&txn.category, 16),
        txn.amount,
        txn.description
    )
}

/// Format a list of transactions as a register
pub fn format_transaction_register(transactions: &[Transaction]) -> String {
    if transactions.is_empty() {
        return "No transactions found.\n".to_string();
    }

    let mut output = String::new();
    output.push_str(&format!(
        "{:12} {:10} {:16} {:>12} {}\n",
        "ID", "Date", "Category", "Amount", "Description"
    ));
    output.push_str(&"-".repeat(66));
    output.push('\n');

    for txn in transactions {
        output.push_str(&format_transaction_row(txn));
        output.push('\n');
    }

    let total: crate::models::Money = transactions.iter().map(|t| t.amount).sum();
    output.push_str(&"-".repeat(66));
    output.push('\n');
    output.push_str(&format!(
        "{:>40} {:>12}\n",
        format!("Total ({}):", transactions.len()),
        total
    ));

    output
}

/// Format transaction details for display
pub fn format_transaction_details(txn: &Transaction) -> String {
    let mut output = String::new();

    output.push_str(&format!("Transaction: {}\n", txn.id));
    output.push_str(&format!("Date:        {}\n", txn.date.format("%Y-%m-%d")));
    output.push_str(&format!("Category:    {}\n", txn.category));
    output.push_str(&format!("Amount:      {}\n", txn.amount));

    if !txn.description.is_empty() {
        output.push_str(&format!("Description: {}\n", txn.description));
    }

    output.push_str(&format!("Source:      {}\n", txn.source));

    if txn.is_refund() {
        output.push_str("Type:        Refund/credit\n");
    }

    output
}

/// Pad or truncate a string to exactly `max_len` characters
pub(crate) fn truncate(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        format!("{:width$}", s, width = max_len)
    } else {
        let kept: String = s.chars().take(max_len.saturating_sub(3)).collect();
        format!("{}...", kept)
    }
}
