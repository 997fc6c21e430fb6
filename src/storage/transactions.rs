//! Transaction store
//!
//! Holds every transaction in a single ordered table keyed by
//! `(date, insertion sequence)`, so iteration is date ascending with ties in
//! insertion order. Snapshots to `transactions.json`.

use std::collections::hash_map::DefaultHasher;
use std::collections::{BTreeMap, HashMap};
use std::hash::{Hash, Hasher};
use std::ops::Bound;
use std::path::PathBuf;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use chrono::NaiveDate;
use tracing::debug;

use crate::error::{LensError, LensResult};
use crate::models::{Money, Transaction, TransactionId, TransactionPatch, YearMonth};

use super::file_io::{read_json, write_json_atomic};

/// Serializable transaction data structure
#[derive(Debug, Clone, Default, serde::Serialize, serde::Deserialize)]
struct TransactionData {
    transactions: Vec<Transaction>,
}

type RowKey = (NaiveDate, u64);

#[derive(Debug, Default)]
struct TransactionTable {
    rows: BTreeMap<RowKey, Transaction>,
    keys: HashMap<TransactionId, RowKey>,
    next_seq: u64,
}

impl TransactionTable {
    fn clear(&mut self) {
        self.rows.clear();
        self.keys.clear();
        self.next_seq = 0;
    }

    fn push(&mut self, txn: Transaction) {
        let key = (txn.date, self.next_seq);
        self.next_seq += 1;
        self.keys.insert(txn.id, key);
        self.rows.insert(key, txn);
    }
}

/// Criteria for [`TransactionStore::query`]
///
/// Unset fields impose no restriction.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TransactionFilter {
    pub month: Option<YearMonth>,
    /// Exact category match
    pub category: Option<String>,
    /// Inclusive `[from, to]` date range
    pub date_range: Option<(NaiveDate, NaiveDate)>,
}

impl TransactionFilter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn month(mut self, month: YearMonth) -> Self {
        self.month = Some(month);
        self
    }

    pub fn category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }

    pub fn between(mut self, from: NaiveDate, to: NaiveDate) -> Self {
        self.date_range = Some((from, to));
        self
    }

    /// Check whether a transaction satisfies every set criterion
    pub fn matches(&self, txn: &Transaction) -> bool {
        if let Some(month) = self.month {
            if !month.contains(txn.date) {
                return false;
            }
        }
        if let Some((from, to)) = self.date_range {
            if txn.date < from || txn.date > to {
                return false;
            }
        }
        match &self.category {
            Some(category) => &txn.category == category,
            None => true,
        }
    }

    /// Date window implied by month and range together.
    ///
    /// `Some(None)` means the criteria can never match.
    fn window(&self) -> Option<Option<(NaiveDate, NaiveDate)>> {
        let mut window = self.month.map(|m| (m.first_day(), m.last_day()));
        if let Some((from, to)) = self.date_range {
            window = Some(match window {
                Some((lo, hi)) => (lo.max(from), hi.min(to)),
                None => (from, to),
            });
        }
        match window {
            Some((from, to)) if from > to => Some(None),
            Some(bounds) => Some(Some(bounds)),
            None => None,
        }
    }
}

/// A filtered, read-only view over the store
///
/// Holds the store's read lock for as long as it lives. [`iter`] walks the
/// ordered table lazily and may be called any number of times.
///
/// [`iter`]: TransactionQuery::iter
pub struct TransactionQuery<'a> {
    table: RwLockReadGuard<'a, TransactionTable>,
    filter: TransactionFilter,
}

impl<'a> TransactionQuery<'a> {
    /// Iterate matching transactions, date ascending
    pub fn iter(&self) -> impl Iterator<Item = &Transaction> + '_ {
        let rows = match self.filter.window() {
            Some(None) => None,
            Some(Some((from, to))) => Some(self.table.rows.range((
                Bound::Included((from, 0)),
                Bound::Included((to, u64::MAX)),
            ))),
            None => Some(self.table.rows.range::<RowKey, _>(..)),
        };

        rows.into_iter()
            .flatten()
            .map(|(_, txn)| txn)
            .filter(move |txn| self.filter.matches(txn))
    }

    /// Number of matching transactions
    pub fn count(&self) -> usize {
        self.iter().count()
    }

    /// Sum of matching amounts
    pub fn total(&self) -> Money {
        self.iter().map(|txn| txn.amount).sum()
    }

    /// Check if nothing matched
    pub fn is_empty(&self) -> bool {
        self.iter().next().is_none()
    }

    /// Clone the matching transactions out of the store
    pub fn to_vec(&self) -> Vec<Transaction> {
        self.iter().cloned().collect()
    }

    pub fn filter(&self) -> &TransactionFilter {
        &self.filter
    }
}

/// Owner of all real transactions
pub struct TransactionStore {
    path: PathBuf,
    table: RwLock<TransactionTable>,
}

impl TransactionStore {
    /// Create an empty store that snapshots to `path`
    pub fn new(path: PathBuf) -> Self {
        Self {
            path,
            table: RwLock::new(TransactionTable::default()),
        }
    }

    fn read(&self) -> LensResult<RwLockReadGuard<'_, TransactionTable>> {
        self.table
            .read()
            .map_err(|e| LensError::Storage(format!("Failed to acquire read lock: {}", e)))
    }

    fn write(&self) -> LensResult<RwLockWriteGuard<'_, TransactionTable>> {
        self.table
            .write()
            .map_err(|e| LensError::Storage(format!("Failed to acquire write lock: {}", e)))
    }

    /// Load transactions from disk, replacing the current contents
    pub fn load(&self) -> LensResult<()> {
        let file_data: TransactionData = read_json(&self.path)?;
        let mut table = self.write()?;

        table.clear();
        for txn in file_data.transactions {
            table.push(txn);
        }

        debug!(count = table.rows.len(), path = %self.path.display(), "loaded transactions");
        Ok(())
    }

    /// Save transactions to disk in store order
    pub fn save(&self) -> LensResult<()> {
        let table = self.read()?;
        let file_data = TransactionData {
            transactions: table.rows.values().cloned().collect(),
        };
        write_json_atomic(&self.path, &file_data)
    }

    /// Add a transaction under a fresh id
    pub fn add(&self, mut txn: Transaction) -> LensResult<TransactionId> {
        txn.validate()
            .map_err(|e| LensError::Validation(e.to_string()))?;

        txn.id = TransactionId::new();
        let id = txn.id;

        let mut table = self.write()?;
        debug!(id = %id.short(), date = %txn.date, category = %txn.category, "adding transaction");
        table.push(txn);
        Ok(id)
    }

    /// Add many transactions; nothing is stored unless every one is valid
    pub fn insert_many(&self, txns: Vec<Transaction>) -> LensResult<Vec<TransactionId>> {
        for (index, txn) in txns.iter().enumerate() {
            txn.validate().map_err(|e| {
                LensError::Validation(format!("transaction {}: {}", index + 1, e))
            })?;
        }

        let mut table = self.write()?;
        let mut ids = Vec::with_capacity(txns.len());
        for mut txn in txns {
            txn.id = TransactionId::new();
            ids.push(txn.id);
            table.push(txn);
        }

        debug!(count = ids.len(), "inserted transactions");
        Ok(ids)
    }

    /// Replace fields of an existing transaction
    ///
    /// The edited transaction keeps its place among same-day entries.
    pub fn update(&self, id: TransactionId, patch: &TransactionPatch) -> LensResult<Transaction> {
        let mut table = self.write()?;

        let key = *table
            .keys
            .get(&id)
            .ok_or_else(|| LensError::transaction_not_found(id.to_string()))?;

        let mut edited = table
            .rows
            .get(&key)
            .cloned()
            .ok_or_else(|| LensError::transaction_not_found(id.to_string()))?;
        edited.apply(patch);
        edited
            .validate()
            .map_err(|e| LensError::Validation(e.to_string()))?;

        table.rows.remove(&key);
        let new_key = (edited.date, key.1);
        table.keys.insert(id, new_key);
        table.rows.insert(new_key, edited.clone());

        debug!(id = %id.short(), "updated transaction");
        Ok(edited)
    }

    /// Remove a transaction
    pub fn remove(&self, id: TransactionId) -> LensResult<Transaction> {
        let mut table = self.write()?;

        let key = table
            .keys
            .remove(&id)
            .ok_or_else(|| LensError::transaction_not_found(id.to_string()))?;

        let removed = table
            .rows
            .remove(&key)
            .ok_or_else(|| LensError::transaction_not_found(id.to_string()))?;

        debug!(id = %id.short(), "removed transaction");
        Ok(removed)
    }

    /// Get a transaction by ID
    pub fn get(&self, id: TransactionId) -> LensResult<Option<Transaction>> {
        let table = self.read()?;
        Ok(table
            .keys
            .get(&id)
            .and_then(|key| table.rows.get(key))
            .cloned())
    }

    /// Find a transaction whose id starts with the given hex prefix
    ///
    /// Used by the CLI so short ids (`txn-1a2b3c4d`) can be typed.
    pub fn find_by_prefix(&self, prefix: &str) -> LensResult<Option<Transaction>> {
        let prefix = prefix.trim().trim_start_matches("txn-").to_ascii_lowercase();
        if prefix.is_empty() {
            return Ok(None);
        }

        let table = self.read()?;
        let mut found = table
            .rows
            .values()
            .filter(|txn| txn.id.to_string().starts_with(&prefix));

        match (found.next(), found.next()) {
            (Some(txn), None) => Ok(Some(txn.clone())),
            (None, _) => Ok(None),
            (Some(_), Some(_)) => Err(LensError::Validation(format!(
                "Ambiguous transaction id prefix '{}'",
                prefix
            ))),
        }
    }

    /// All transactions, date ascending
    pub fn get_all(&self) -> LensResult<Vec<Transaction>> {
        let table = self.read()?;
        Ok(table.rows.values().cloned().collect())
    }

    /// Open a filtered view over the store
    pub fn query(&self, filter: TransactionFilter) -> LensResult<TransactionQuery<'_>> {
        Ok(TransactionQuery {
            table: self.read()?,
            filter,
        })
    }

    /// Number of stored transactions
    pub fn count(&self) -> LensResult<usize> {
        Ok(self.read()?.rows.len())
    }

    /// Hash of the full store content, in order
    pub fn fingerprint(&self) -> LensResult<u64> {
        let table = self.read()?;
        let mut hasher = DefaultHasher::new();
        table.rows.len().hash(&mut hasher);
        for txn in table.rows.values() {
            txn.id.hash(&mut hasher);
            txn.date.hash(&mut hasher);
            txn.category.hash(&mut hasher);
            txn.amount.hash(&mut hasher);
            txn.description.hash(&mut hasher);
            txn.source.hash(&mut hasher);
            txn.created_at.hash(&mut hasher);
            txn.updated_at.hash(&mut hasher);
        }
        Ok(hasher.finish())
    }
}
