//! Persisted registry state

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::model::{ModelId, ModelRecord};
use crate::domain::DomainError;

/// Current snapshot document version
pub const SNAPSHOT_VERSION: u32 = 1;

fn current_version() -> u32 {
    SNAPSHOT_VERSION
}

/// Whole registry state: records by model id plus the per-symbol active index
///
/// Every mutation keeps two invariants: each active-index value keys an existing
/// record of the same symbol, and a record's `is_active` flag is true exactly
/// when the index points at it.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RegistrySnapshot {
    #[serde(default = "current_version")]
    version: u32,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    updated_at: Option<DateTime<Utc>>,

    #[serde(default)]
    models: BTreeMap<ModelId, ModelRecord>,

    #[serde(default)]
    active_models: BTreeMap<String, ModelId>,
}

impl RegistrySnapshot {
    pub fn new() -> Self {
        Self {
            version: SNAPSHOT_VERSION,
            ..Default::default()
        }
    }

    pub fn version(&self) -> u32 {
        self.version
    }

    pub fn updated_at(&self) -> Option<DateTime<Utc>> {
        self.updated_at
    }

    pub fn len(&self) -> usize {
        self.models.len()
    }

    pub fn is_empty(&self) -> bool {
        self.models.is_empty()
    }

    pub fn get(&self, model_id: &ModelId) -> Option<&ModelRecord> {
        self.models.get(model_id)
    }

    pub fn contains(&self, model_id: &ModelId) -> bool {
        self.models.contains_key(model_id)
    }

    pub fn records(&self) -> impl Iterator<Item = &ModelRecord> {
        self.models.values()
    }

    /// Active model id for an already-normalized symbol
    pub fn active_id(&self, symbol: &str) -> Option<&ModelId> {
        self.active_models.get(symbol)
    }

    /// Active record for an already-normalized symbol
    pub fn active(&self, symbol: &str) -> Option<&ModelRecord> {
        self.active_id(symbol).and_then(|id| self.models.get(id))
    }

    /// Records for an already-normalized symbol, newest first
    pub fn for_symbol(&self, symbol: &str) -> Vec<&ModelRecord> {
        let mut records: Vec<&ModelRecord> = self
            .models
            .values()
            .filter(|r| r.crypto_symbol() == symbol)
            .collect();

        records.sort_by(|a, b| {
            b.created_at()
                .cmp(&a.created_at())
                .then_with(|| a.model_id().cmp(b.model_id()))
        });
        records
    }

    /// Distinct symbols with at least one record
    pub fn symbols(&self) -> Vec<String> {
        let mut symbols: Vec<String> = self
            .models
            .values()
            .map(|r| r.crypto_symbol().to_string())
            .collect();
        symbols.sort();
        symbols.dedup();
        symbols
    }

    /// Inserts or replaces a record by id
    ///
    /// The incoming `is_active` flag is ignored; activation only changes through
    /// [`RegistrySnapshot::activate`]. Replacing an active record with one for a
    /// different symbol drops the old symbol's index entry.
    pub fn upsert(&mut self, mut record: ModelRecord) -> Option<ModelRecord> {
        let id = record.model_id().clone();

        if let Some(previous) = self.models.get(&id) {
            if previous.crypto_symbol() != record.crypto_symbol()
                && self.active_models.get(previous.crypto_symbol()) == Some(&id)
            {
                let old_symbol = previous.crypto_symbol().to_string();
                self.active_models.remove(&old_symbol);
            }
        }

        let indexed = self.active_models.get(record.crypto_symbol()) == Some(&id);
        record.set_active(indexed);
        self.models.insert(id, record)
    }

    /// Makes `model_id` the single active record for `symbol`
    pub fn activate(&mut self, symbol: &str, model_id: &ModelId) -> Result<(), DomainError> {
        match self.models.get(model_id) {
            None => {
                return Err(DomainError::not_found(format!(
                    "Model '{}' not found",
                    model_id
                )));
            }
            Some(record) if record.crypto_symbol() != symbol => {
                return Err(DomainError::not_found(format!(
                    "Model '{}' belongs to symbol '{}', not '{}'",
                    model_id,
                    record.crypto_symbol(),
                    symbol
                )));
            }
            Some(_) => {}
        }

        if let Some(previous) = self.active_models.insert(symbol.to_string(), model_id.clone()) {
            if let Some(record) = self.models.get_mut(&previous) {
                record.set_active(false);
            }
        }

        if let Some(record) = self.models.get_mut(model_id) {
            record.set_active(true);
        }

        Ok(())
    }

    /// Removes a record, clearing its active index entry if it held one
    pub fn remove(&mut self, model_id: &ModelId) -> Option<ModelRecord> {
        let record = self.models.remove(model_id)?;

        if self.active_models.get(record.crypto_symbol()) == Some(model_id) {
            self.active_models.remove(record.crypto_symbol());
        }

        Some(record)
    }

    /// Removes every record matching `predicate`, returning what was removed
    pub fn remove_where(&mut self, predicate: impl Fn(&ModelRecord) -> bool) -> Vec<ModelRecord> {
        let doomed: Vec<ModelId> = self
            .models
            .values()
            .filter(|r| predicate(r))
            .map(|r| r.model_id().clone())
            .collect();

        doomed.iter().filter_map(|id| self.remove(id)).collect()
    }

    /// Repairs a snapshot read from disk, returning the number of fixes applied
    ///
    /// Drops active-index entries that point at missing records or at a record
    /// of another symbol, and realigns every record's `is_active` flag with the index.
    pub fn heal(&mut self) -> usize {
        let mut fixes = 0;

        let dangling: Vec<String> = self
            .active_models
            .iter()
            .filter(|(symbol, id)| {
                self.models
                    .get(*id)
                    .map(|r| r.crypto_symbol() != symbol.as_str())
                    .unwrap_or(true)
            })
            .map(|(symbol, _)| symbol.clone())
            .collect();

        for symbol in dangling {
            self.active_models.remove(&symbol);
            fixes += 1;
        }

        for (id, record) in self.models.iter_mut() {
            let indexed = self.active_models.get(record.crypto_symbol()) == Some(id);

            if record.is_active() != indexed {
                record.set_active(indexed);
                fixes += 1;
            }
        }

        fixes
    }

    /// Stamps the snapshot just before it is written
    pub fn touch(&mut self) {
        self.version = SNAPSHOT_VERSION;
        self.updated_at = Some(Utc::now());
    }
}
