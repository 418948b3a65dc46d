//! State store: the single owner of transactions, budgets, goals and profile
//!
//! Every mutation goes through a method here; each one bumps `version` and
//! persists the whole aggregate. Callers that share the store across tasks
//! should wrap it in a mutex.

use tracing::{info, warn};
use uuid::Uuid;

use crate::budget;
use crate::error::{Error, Result};
use crate::models::{Budget, NewTransaction, SavingsGoal, Transaction, UserProfile};
use crate::persistence::{self, KeyValueStore, StateSnapshot, STATE_KEY};

/// What `load()` found in storage
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadOutcome {
    /// A valid record replaced the in-memory state
    Restored,
    /// Nothing stored; defaults kept
    Missing,
    /// Stored record was unreadable; discarded, defaults kept
    Discarded,
}

/// Fresh transaction identifier (UUID v4)
pub fn new_id() -> String {
    Uuid::new_v4().to_string()
}

pub struct StateStore {
    state: StateSnapshot,
    storage: Box<dyn KeyValueStore>,
    key: String,
    version: u64,
}

impl StateStore {
    /// Create a store holding the starter dataset
    pub fn new(storage: Box<dyn KeyValueStore>) -> Self {
        Self::with_state(storage, StateSnapshot::seeded())
    }

    /// Create a store holding an explicit initial state
    pub fn with_state(storage: Box<dyn KeyValueStore>, state: StateSnapshot) -> Self {
        Self {
            state,
            storage,
            key: STATE_KEY.to_string(),
            version: 0,
        }
    }

    /// Persist under a different key than the default
    pub fn with_key(mut self, key: &str) -> Self {
        self.key = key.to_string();
        self
    }

    /// Create a store and immediately restore any persisted state
    pub fn open(storage: Box<dyn KeyValueStore>, key: &str) -> Self {
        let mut store = Self::new(storage).with_key(key);
        store.load();
        store
    }

    /// Restore the aggregate from storage.
    ///
    /// Never fails: missing or malformed data leaves the current state alone.
    pub fn load(&mut self) -> LoadOutcome {
        let raw = match self.storage.get(&self.key) {
            Ok(Some(raw)) => raw,
            Ok(None) => return LoadOutcome::Missing,
            Err(e) => {
                warn!(store = self.storage.name(), error = %e, "Failed to read saved state");
                return LoadOutcome::Discarded;
            }
        };

        match persistence::decode(&raw) {
            Ok(state) => {
                info!(
                    transactions = state.transactions.len(),
                    budgets = state.budgets.len(),
                    goals = state.goals.len(),
                    "Restored saved state"
                );
                self.state = state;
                self.version += 1;
                LoadOutcome::Restored
            }
            Err(e) => {
                warn!(error = %e, "Saved state is malformed, using defaults");
                LoadOutcome::Discarded
            }
        }
    }

    /// Persist the whole aggregate
    pub fn save(&self) -> Result<()> {
        let raw = persistence::encode(&self.state)?;
        self.storage.set(&self.key, &raw)
    }

    /// Record a new transaction, newest first.
    ///
    /// Expenses update the matching budget before this returns. Nothing
    /// changes in memory unless the new state was saved.
    pub fn add_transaction(&mut self, input: NewTransaction) -> Result<Transaction> {
        if !input.amount.is_finite() || input.amount <= 0.0 {
            return Err(Error::InvalidData(format!(
                "Transaction amount must be positive, got {}",
                input.amount
            )));
        }

        let tx = input.with_id(new_id());
        let mut next = self.state.clone();
        next.transactions.insert(0, tx.clone());
        budget::apply_expense(&mut next.budgets, &tx);

        self.commit(next)?;
        info!(id = %tx.id, kind = %tx.kind, category = %tx.category, amount = tx.amount, "Added transaction");
        Ok(tx)
    }

    /// Replace the user profile
    pub fn update_profile(&mut self, profile: UserProfile) -> Result<()> {
        let next = StateSnapshot {
            profile,
            ..self.state.clone()
        };
        self.commit(next)
    }

    /// Replace the entire aggregate; duplicate budget categories are rejected
    pub fn replace(&mut self, state: StateSnapshot) -> Result<()> {
        state.validate()?;
        self.commit(state)
    }

    /// Save `next`, then make it current
    fn commit(&mut self, next: StateSnapshot) -> Result<()> {
        let raw = persistence::encode(&next)?;
        self.storage.set(&self.key, &raw)?;
        self.state = next;
        self.version += 1;
        Ok(())
    }

    pub fn transactions(&self) -> &[Transaction] {
        &self.state.transactions
    }

    pub fn budgets(&self) -> &[Budget] {
        &self.state.budgets
    }

    pub fn goals(&self) -> &[SavingsGoal] {
        &self.state.goals
    }

    pub fn profile(&self) -> &UserProfile {
        &self.state.profile
    }

    /// Borrow the current aggregate
    pub fn state(&self) -> &StateSnapshot {
        &self.state
    }

    /// Owned copy of the current aggregate
    pub fn snapshot(&self) -> StateSnapshot {
        self.state.clone()
    }

    /// Monotonic counter bumped on every change to the aggregate
    pub fn version(&self) -> u64 {
        self.version
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Category, Currency};
    use crate::persistence::MemoryStore;
    use chrono::NaiveDate;
    use std::collections::HashSet;

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2023, 11, d).unwrap()
    }

    fn memory_store() -> (StateStore, MemoryStore) {
        let storage = MemoryStore::new();
        (StateStore::new(Box::new(storage.clone())), storage)
    }

    #[test]
    fn test_add_expense_updates_food_budget() {
        let (mut store, _) = memory_store();
        store
            .add_transaction(NewTransaction::expense(100.0, Category::Food, "Dinner", day(7)))
            .unwrap();

        let food = store
            .budgets()
            .iter()
            .find(|b| b.category == Category::Food)
            .unwrap();
        assert_eq!(food.spent, 150.0);
        assert_eq!(food.limit, 400.0);
    }

    #[test]
    fn test_add_prepends_and_keeps_existing_ids() {
        let (mut store, _) = memory_store();
        let before: Vec<String> = store.transactions().iter().map(|t| t.id.clone()).collect();

        let tx = store
            .add_transaction(NewTransaction::income(20.0, Category::Other, "Gift", day(8)))
            .unwrap();

        assert_eq!(store.transactions()[0], tx);
        let after: Vec<String> = store.transactions()[1..].iter().map(|t| t.id.clone()).collect();
        assert_eq!(before, after);
    }

    #[test]
    fn test_add_rejects_non_positive_amount() {
        let (mut store, _) = memory_store();
        let version = store.version();

        for amount in [0.0, -5.0, f64::NAN, f64::INFINITY] {
            let result =
                store.add_transaction(NewTransaction::expense(amount, Category::Food, "Bad", day(7)));
            assert!(matches!(result, Err(Error::InvalidData(_))));
        }
        assert_eq!(store.transactions().len(), 6);
        assert_eq!(store.version(), version);
    }

    #[test]
    fn test_generated_ids_are_distinct() {
        let ids: HashSet<String> = (0..10_000).map(|_| new_id()).collect();
        assert_eq!(ids.len(), 10_000);
    }

    #[test]
    fn test_added_transactions_get_distinct_ids() {
        let mut store = StateStore::with_state(Box::new(MemoryStore::new()), StateSnapshot::empty());
        let mut ids = HashSet::new();
        for i in 0..200u32 {
            let tx = store
                .add_transaction(NewTransaction::expense(1.0, Category::Other, "x", day(1 + i % 28)))
                .unwrap();
            assert!(ids.insert(tx.id));
        }
        assert_eq!(store.transactions().len(), 200);
    }

    #[test]
    fn test_every_mutation_saves() {
        let (mut store, storage) = memory_store();
        assert_eq!(storage.get(STATE_KEY).unwrap(), None);

        store
            .update_profile(UserProfile {
                name: "Ana".to_string(),
                currency: Currency::Eur,
            })
            .unwrap();
        let saved = persistence::decode(&storage.get(STATE_KEY).unwrap().unwrap()).unwrap();
        assert_eq!(saved.profile.name, "Ana");
        assert_eq!(store.version(), 1);
    }

    #[test]
    fn test_load_missing_keeps_defaults() {
        let (mut store, _) = memory_store();
        assert_eq!(store.load(), LoadOutcome::Missing);
        assert_eq!(store.snapshot(), StateSnapshot::seeded());
    }

    #[test]
    fn test_load_malformed_discards() {
        let storage = MemoryStore::new();
        storage.set(STATE_KEY, "{ not json").unwrap();
        let mut store = StateStore::new(Box::new(storage));

        assert_eq!(store.load(), LoadOutcome::Discarded);
        assert_eq!(store.snapshot(), StateSnapshot::seeded());
    }

    #[test]
    fn test_persistence_roundtrip() {
        let (mut store, storage) = memory_store();
        store
            .add_transaction(NewTransaction::expense(100.0, Category::Food, "Dinner", day(7)))
            .unwrap();
        let expected = store.snapshot();
        drop(store);

        let mut restored = StateStore::with_state(Box::new(storage), StateSnapshot::empty());
        assert_eq!(restored.load(), LoadOutcome::Restored);
        assert_eq!(restored.snapshot(), expected);
    }

    /// Storage whose writes always fail
    struct ReadOnlyStore;

    impl KeyValueStore for ReadOnlyStore {
        fn name(&self) -> &str {
            "read-only"
        }

        fn get(&self, _key: &str) -> Result<Option<String>> {
            Ok(None)
        }

        fn set(&self, _key: &str, _value: &str) -> Result<()> {
            Err(Error::Io(std::io::Error::new(
                std::io::ErrorKind::PermissionDenied,
                "read-only",
            )))
        }
    }

    fn food_spent(store: &StateStore) -> f64 {
        store
            .budgets()
            .iter()
            .find(|b| b.category == Category::Food)
            .map(|b| b.spent)
            .unwrap()
    }

    #[test]
    fn test_failed_save_leaves_state_untouched() {
        let mut store = StateStore::new(Box::new(ReadOnlyStore));

        for _ in 0..2 {
            let result = store
                .add_transaction(NewTransaction::expense(100.0, Category::Food, "Dinner", day(7)));
            assert!(matches!(result, Err(Error::Io(_))));
        }

        assert_eq!(store.transactions().len(), 6);
        assert_eq!(food_spent(&store), 50.0);
        assert_eq!(store.version(), 0);
        assert_eq!(store.snapshot(), StateSnapshot::seeded());
    }

    #[test]
    fn test_failed_save_keeps_profile_and_state() {
        let mut store = StateStore::new(Box::new(ReadOnlyStore));

        let profile = UserProfile {
            name: "Ana".to_string(),
            currency: Currency::Eur,
        };
        assert!(store.update_profile(profile).is_err());
        assert!(store.replace(StateSnapshot::empty()).is_err());

        assert_eq!(store.profile(), &UserProfile::default());
        assert_eq!(store.transactions().len(), 6);
        assert_eq!(store.version(), 0);
    }

    #[test]
    fn test_replace_rejects_duplicate_budget_categories() {
        let (mut store, storage) = memory_store();
        let mut state = StateSnapshot::empty();
        state.budgets = vec![
            Budget::new(Category::Food, 100.0, 0.0),
            Budget::new(Category::Food, 200.0, 0.0),
        ];

        let result = store.replace(state);
        assert!(matches!(result, Err(Error::InvalidData(_))));
        assert_eq!(store.snapshot(), StateSnapshot::seeded());
        assert_eq!(storage.get(STATE_KEY).unwrap(), None);
    }

    #[test]
    fn test_load_discards_duplicate_budget_categories() {
        let storage = MemoryStore::new();
        storage
            .set(
                STATE_KEY,
                r#"{"transactions": [], "goals": [], "budgets": [
                    {"category": "Food", "limit": 100, "spent": 0},
                    {"category": "Food", "limit": 200, "spent": 0}
                ]}"#,
            )
            .unwrap();
        let mut store = StateStore::new(Box::new(storage));

        assert_eq!(store.load(), LoadOutcome::Discarded);
        assert_eq!(store.snapshot(), StateSnapshot::seeded());
    }

    #[test]
    fn test_custom_key() {
        let storage = MemoryStore::new();
        let mut store = StateStore::new(Box::new(storage.clone())).with_key("other");
        store.save().unwrap();
        assert!(storage.get("other").unwrap().is_some());
        assert!(storage.get(STATE_KEY).unwrap().is_none());

        let reopened = StateStore::open(Box::new(storage), "other");
        assert_eq!(reopened.snapshot(), StateSnapshot::seeded());
    }
}
