//! redb-based storage layer
//!
//! # Tables
//!
//! | Table | Key | Value | Purpose |
//! |-------|-----|-------|---------|
//! | `orders` | `order_id` | `Order` | Order aggregate (items embedded) |
//! | `sessions` | `session_id` | `DiningSession` | Dining sessions |
//! | `dining_tables` | `table_id` | `DiningTable` | Physical tables |
//! | `modifications` | `modification_id` | `OrderModification` | Change proposals |
//! | `split_bills` | `split_id` | `SplitBill` | Split bills |
//! | `split_people` | `person_id` | `SplitBillPerson` | Payer shares |
//! | `employees` | `employee_id` | `Employee` | Staff identities |
//! | `menu_items` | `menu_item_id` | `MenuItem` | Catalog projection |
//! | `order_audit` | `audit_id` | `OrderAudit` | Transition audit trail |
//! | `session_orders` | `(session_id, order_id)` | `()` | Session → orders index |
//! | `order_audit_index` | `(order_id, audit_id)` | `()` | Order → audit trail index |
//! | `order_modifications` | `(order_id, modification_id)` | `()` | Order → modifications index |
//! | `open_tables` | `table_id` | `session_id` | Occupied table index |
//! | `table_numbers` | `table_number` | `table_id` | Table lookup |
//! | `employee_emails` | `email` | `employee_id` | Login lookup |
//! | `active_splits` | `session_id` | `split_id` | Active split per session |
//! | `revocations` | `jti` | `expires_at` | Revoked refresh tokens |
//! | `counters` | `name` | `u64` | Id allocation |
//!
//! # Isolation
//!
//! Every business operation runs inside one write transaction. redb admits a
//! single writer at a time, so a read-check-write sequence inside
//! [`Store::begin_write`] cannot interleave with another one.

use redb::{
    Database, ReadableDatabase, ReadableTable, ReadableTableMetadata, TableDefinition,
    WriteTransaction,
};
use serde::Serialize;
use serde::de::DeserializeOwned;
use shared::models::{
    DiningSession, DiningTable, Employee, MenuItem, Order, OrderAudit, OrderModification,
    SplitBill, SplitBillPerson,
};
use std::path::Path;
use std::sync::Arc;
use thiserror::Error;

type JsonTable = TableDefinition<'static, u64, &'static [u8]>;

const ORDERS_TABLE: JsonTable = TableDefinition::new("orders");
const SESSIONS_TABLE: JsonTable = TableDefinition::new("sessions");
const DINING_TABLES_TABLE: JsonTable = TableDefinition::new("dining_tables");
const MODIFICATIONS_TABLE: JsonTable = TableDefinition::new("modifications");
const SPLIT_BILLS_TABLE: JsonTable = TableDefinition::new("split_bills");
const SPLIT_PEOPLE_TABLE: JsonTable = TableDefinition::new("split_people");
const EMPLOYEES_TABLE: JsonTable = TableDefinition::new("employees");
const MENU_ITEMS_TABLE: JsonTable = TableDefinition::new("menu_items");
const AUDIT_TABLE: JsonTable = TableDefinition::new("order_audit");

/// Parent → child index: key = (parent_id, child_id)
type PairIndex = TableDefinition<'static, (u64, u64), ()>;

/// Session → orders index
const SESSION_ORDERS_TABLE: PairIndex = TableDefinition::new("session_orders");

/// Order → audit entries index
const ORDER_AUDIT_INDEX: PairIndex = TableDefinition::new("order_audit_index");

/// Order → modifications index
const ORDER_MODIFICATIONS_INDEX: PairIndex = TableDefinition::new("order_modifications");

/// Occupied tables: key = table_id, value = open session_id
const OPEN_TABLES_TABLE: TableDefinition<u64, u64> = TableDefinition::new("open_tables");

/// Table number lookup: key = table_number, value = table_id
const TABLE_NUMBERS_TABLE: TableDefinition<&str, u64> = TableDefinition::new("table_numbers");

/// Login lookup: key = lowercase email, value = employee_id
const EMPLOYEE_EMAILS_TABLE: TableDefinition<&str, u64> = TableDefinition::new("employee_emails");

/// Active split per session: key = session_id, value = split_id
const ACTIVE_SPLITS_TABLE: TableDefinition<u64, u64> = TableDefinition::new("active_splits");

/// Revoked refresh tokens: key = jti, value = token expiry (unix seconds)
const REVOCATIONS_TABLE: TableDefinition<&str, i64> = TableDefinition::new("revocations");

/// Id counters: key = entity name, value = last allocated id
const COUNTERS_TABLE: TableDefinition<&str, u64> = TableDefinition::new("counters");

/// Storage errors
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Database error: {0}")]
    Database(#[from] redb::DatabaseError),

    #[error("Transaction error: {0}")]
    Transaction(#[from] redb::TransactionError),

    #[error("Table error: {0}")]
    Table(#[from] redb::TableError),

    #[error("Storage error: {0}")]
    Storage(#[from] redb::StorageError),

    #[error("Commit error: {0}")]
    Commit(#[from] redb::CommitError),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

pub type StorageResult<T> = Result<T, StorageError>;

impl From<StorageError> for shared::error::AppError {
    fn from(err: StorageError) -> Self {
        tracing::error!(error = %err, "Storage error occurred");
        shared::error::AppError::database(err.to_string())
    }
}

/// A JSON document stored under a `u64` key
pub trait Record: Serialize + DeserializeOwned {
    const TABLE: JsonTable;
    /// Counter name used for id allocation
    const COUNTER: &'static str;

    fn id(&self) -> u64;
}

macro_rules! record {
    ($ty:ty, $table:expr, $counter:literal) => {
        impl Record for $ty {
            const TABLE: JsonTable = $table;
            const COUNTER: &'static str = $counter;

            fn id(&self) -> u64 {
                self.id
            }
        }
    };
}

record!(Order, ORDERS_TABLE, "orders");
record!(DiningSession, SESSIONS_TABLE, "sessions");
record!(DiningTable, DINING_TABLES_TABLE, "dining_tables");
record!(OrderModification, MODIFICATIONS_TABLE, "modifications");
record!(SplitBill, SPLIT_BILLS_TABLE, "split_bills");
record!(SplitBillPerson, SPLIT_PEOPLE_TABLE, "split_people");
record!(Employee, EMPLOYEES_TABLE, "employees");
record!(MenuItem, MENU_ITEMS_TABLE, "menu_items");
record!(OrderAudit, AUDIT_TABLE, "order_audit");

/// Restaurant storage backed by redb
#[derive(Clone)]
pub struct Store {
    db: Arc<Database>,
}

impl std::fmt::Debug for Store {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Store").finish_non_exhaustive()
    }
}

impl Store {
    /// Open or create the database at the given path
    ///
    /// redb commits with `Durability::Immediate` by default: a commit is on
    /// disk once `commit()` returns.
    pub fn open(path: impl AsRef<Path>) -> StorageResult<Self> {
        let db = Database::create(path)?;
        Self::init(db)
    }

    /// Open an in-memory database (tests, demos)
    pub fn open_in_memory() -> StorageResult<Self> {
        let db = Database::builder().create_with_backend(redb::backends::InMemoryBackend::new())?;
        Self::init(db)
    }

    fn init(db: Database) -> StorageResult<Self> {
        let write_txn = db.begin_write()?;
        {
            // Create all tables if they don't exist
            for def in [
                ORDERS_TABLE,
                SESSIONS_TABLE,
                DINING_TABLES_TABLE,
                MODIFICATIONS_TABLE,
                SPLIT_BILLS_TABLE,
                SPLIT_PEOPLE_TABLE,
                EMPLOYEES_TABLE,
                MENU_ITEMS_TABLE,
                AUDIT_TABLE,
            ] {
                let _ = write_txn.open_table(def)?;
            }
            for index in [SESSION_ORDERS_TABLE, ORDER_AUDIT_INDEX, ORDER_MODIFICATIONS_INDEX] {
                let _ = write_txn.open_table(index)?;
            }
            let _ = write_txn.open_table(OPEN_TABLES_TABLE)?;
            let _ = write_txn.open_table(TABLE_NUMBERS_TABLE)?;
            let _ = write_txn.open_table(EMPLOYEE_EMAILS_TABLE)?;
            let _ = write_txn.open_table(ACTIVE_SPLITS_TABLE)?;
            let _ = write_txn.open_table(REVOCATIONS_TABLE)?;
            let _ = write_txn.open_table(COUNTERS_TABLE)?;
        }
        write_txn.commit()?;

        Ok(Self { db: Arc::new(db) })
    }

    /// Begin a write transaction
    pub fn begin_write(&self) -> StorageResult<WriteTransaction> {
        Ok(self.db.begin_write()?)
    }

    /// Commit a write transaction
    pub fn commit(&self, txn: WriteTransaction) -> StorageResult<()> {
        txn.commit()?;
        Ok(())
    }

    // ========== Id Allocation ==========

    /// Allocate the next id for a record type (within transaction)
    pub fn next_id<T: Record>(&self, txn: &WriteTransaction) -> StorageResult<u64> {
        let mut table = txn.open_table(COUNTERS_TABLE)?;
        let current = table
            .get(T::COUNTER)?
            .map(|guard| guard.value())
            .unwrap_or(0);
        let next = current + 1;
        table.insert(T::COUNTER, next)?;
        Ok(next)
    }

    // ========== Record Operations ==========

    /// Get a record by id (read-only)
    pub fn get<T: Record>(&self, id: u64) -> StorageResult<Option<T>> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(T::TABLE)?;

        match table.get(id)? {
            Some(value) => Ok(Some(serde_json::from_slice(value.value())?)),
            None => Ok(None),
        }
    }

    /// Get a record by id (within transaction)
    pub fn get_txn<T: Record>(&self, txn: &WriteTransaction, id: u64) -> StorageResult<Option<T>> {
        let table = txn.open_table(T::TABLE)?;

        match table.get(id)? {
            Some(value) => Ok(Some(serde_json::from_slice(value.value())?)),
            None => Ok(None),
        }
    }

    /// Insert or replace a record (within transaction)
    pub fn put<T: Record>(&self, txn: &WriteTransaction, record: &T) -> StorageResult<()> {
        let mut table = txn.open_table(T::TABLE)?;
        let value = serde_json::to_vec(record)?;
        table.insert(record.id(), value.as_slice())?;
        Ok(())
    }

    /// Get all records of a type
    pub fn list<T: Record>(&self) -> StorageResult<Vec<T>> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(T::TABLE)?;

        let mut records = Vec::with_capacity(table.len()? as usize);
        for result in table.iter()? {
            let (_key, value) = result?;
            records.push(serde_json::from_slice(value.value())?);
        }
        Ok(records)
    }

    /// Insert a record in its own transaction under a freshly allocated id
    pub fn insert<T: Record>(&self, build: impl FnOnce(u64) -> T) -> StorageResult<T> {
        let txn = self.begin_write()?;
        let id = self.next_id::<T>(&txn)?;
        let record = build(id);
        self.put(&txn, &record)?;
        txn.commit()?;
        Ok(record)
    }

    // ========== Parent → Child Indexes ==========

    fn link(&self, txn: &WriteTransaction, index: PairIndex, parent: u64, child: u64) -> StorageResult<()> {
        let mut table = txn.open_table(index)?;
        table.insert((parent, child), ())?;
        Ok(())
    }

    fn child_ids_txn(&self, txn: &WriteTransaction, index: PairIndex, parent: u64) -> StorageResult<Vec<u64>> {
        let table = txn.open_table(index)?;
        let mut ids = Vec::new();
        for result in table.range((parent, 0u64)..=(parent, u64::MAX))? {
            let (key, _) = result?;
            ids.push(key.value().1);
        }
        Ok(ids)
    }

    /// Children of `parent` in id order (read-only)
    fn children<T: Record>(&self, index: PairIndex, parent: u64) -> StorageResult<Vec<T>> {
        let read_txn = self.db.begin_read()?;
        let index = read_txn.open_table(index)?;
        let records = read_txn.open_table(T::TABLE)?;

        let mut out = Vec::new();
        for result in index.range((parent, 0u64)..=(parent, u64::MAX))? {
            let (key, _) = result?;
            if let Some(value) = records.get(key.value().1)? {
                out.push(serde_json::from_slice(value.value())?);
            }
        }
        Ok(out)
    }

    pub fn link_order(&self, txn: &WriteTransaction, session_id: u64, order_id: u64) -> StorageResult<()> {
        self.link(txn, SESSION_ORDERS_TABLE, session_id, order_id)
    }

    pub fn unlink_order(&self, txn: &WriteTransaction, session_id: u64, order_id: u64) -> StorageResult<()> {
        let mut table = txn.open_table(SESSION_ORDERS_TABLE)?;
        table.remove((session_id, order_id))?;
        Ok(())
    }

    /// Order ids belonging to a session (within transaction)
    pub fn session_order_ids_txn(
        &self,
        txn: &WriteTransaction,
        session_id: u64,
    ) -> StorageResult<Vec<u64>> {
        self.child_ids_txn(txn, SESSION_ORDERS_TABLE, session_id)
    }

    /// Orders belonging to a session (within transaction)
    pub fn session_orders_txn(
        &self,
        txn: &WriteTransaction,
        session_id: u64,
    ) -> StorageResult<Vec<Order>> {
        let mut orders = Vec::new();
        for order_id in self.session_order_ids_txn(txn, session_id)? {
            if let Some(order) = self.get_txn::<Order>(txn, order_id)? {
                orders.push(order);
            }
        }
        Ok(orders)
    }

    /// Orders belonging to a session (read-only)
    pub fn session_orders(&self, session_id: u64) -> StorageResult<Vec<Order>> {
        self.children(SESSION_ORDERS_TABLE, session_id)
    }

    /// Append an audit entry to its order's trail
    pub fn put_audit(&self, txn: &WriteTransaction, audit: &OrderAudit) -> StorageResult<()> {
        self.put(txn, audit)?;
        self.link(txn, ORDER_AUDIT_INDEX, audit.order_id, audit.id)
    }

    /// Transition history of an order, oldest first
    pub fn order_audit(&self, order_id: u64) -> StorageResult<Vec<OrderAudit>> {
        self.children(ORDER_AUDIT_INDEX, order_id)
    }

    /// Store a new modification and index it under its order
    pub fn put_new_modification(
        &self,
        txn: &WriteTransaction,
        modification: &OrderModification,
    ) -> StorageResult<()> {
        self.put(txn, modification)?;
        self.link(txn, ORDER_MODIFICATIONS_INDEX, modification.order_id, modification.id)
    }

    /// Modifications proposed for an order, oldest first
    pub fn order_modifications(&self, order_id: u64) -> StorageResult<Vec<OrderModification>> {
        self.children(ORDER_MODIFICATIONS_INDEX, order_id)
    }

    // ========== Table Occupancy ==========

    /// Open session at a table, if any (within transaction)
    pub fn open_session_for_table_txn(
        &self,
        txn: &WriteTransaction,
        table_id: u64,
    ) -> StorageResult<Option<u64>> {
        let table = txn.open_table(OPEN_TABLES_TABLE)?;
        Ok(table.get(table_id)?.map(|guard| guard.value()))
    }

    pub fn occupy_table(&self, txn: &WriteTransaction, table_id: u64, session_id: u64) -> StorageResult<()> {
        let mut table = txn.open_table(OPEN_TABLES_TABLE)?;
        table.insert(table_id, session_id)?;
        Ok(())
    }

    pub fn free_table(&self, txn: &WriteTransaction, table_id: u64) -> StorageResult<()> {
        let mut table = txn.open_table(OPEN_TABLES_TABLE)?;
        table.remove(table_id)?;
        Ok(())
    }

    /// Register a dining table and its number lookup
    pub fn put_dining_table(&self, txn: &WriteTransaction, dining_table: &DiningTable) -> StorageResult<()> {
        self.put(txn, dining_table)?;
        let mut numbers = txn.open_table(TABLE_NUMBERS_TABLE)?;
        numbers.insert(dining_table.table_number.as_str(), dining_table.id)?;
        Ok(())
    }

    /// Find a dining table by its number (within transaction)
    pub fn table_by_number_txn(
        &self,
        txn: &WriteTransaction,
        table_number: &str,
    ) -> StorageResult<Option<DiningTable>> {
        let table_id = {
            let numbers = txn.open_table(TABLE_NUMBERS_TABLE)?;
            numbers.get(table_number)?.map(|guard| guard.value())
        };
        match table_id {
            Some(id) => self.get_txn(txn, id),
            None => Ok(None),
        }
    }

    // ========== Employees ==========

    /// Register an employee and its email lookup
    pub fn put_employee(&self, txn: &WriteTransaction, employee: &Employee) -> StorageResult<()> {
        self.put(txn, employee)?;
        let mut emails = txn.open_table(EMPLOYEE_EMAILS_TABLE)?;
        let email = employee.email.to_lowercase();
        emails.insert(email.as_str(), employee.id)?;
        Ok(())
    }

    /// Whether an email is already registered (within transaction)
    pub fn email_taken_txn(&self, txn: &WriteTransaction, email: &str) -> StorageResult<bool> {
        let emails = txn.open_table(EMPLOYEE_EMAILS_TABLE)?;
        Ok(emails.get(email.to_lowercase().as_str())?.is_some())
    }

    /// Find an employee by email (case-insensitive)
    pub fn employee_by_email(&self, email: &str) -> StorageResult<Option<Employee>> {
        let read_txn = self.db.begin_read()?;
        let emails = read_txn.open_table(EMPLOYEE_EMAILS_TABLE)?;
        let employees = read_txn.open_table(EMPLOYEES_TABLE)?;

        let Some(id) = emails.get(email.to_lowercase().as_str())?.map(|g| g.value()) else {
            return Ok(None);
        };
        match employees.get(id)? {
            Some(value) => Ok(Some(serde_json::from_slice(value.value())?)),
            None => Ok(None),
        }
    }

    // ========== Active Split Index ==========

    pub fn active_split_txn(&self, txn: &WriteTransaction, session_id: u64) -> StorageResult<Option<u64>> {
        let table = txn.open_table(ACTIVE_SPLITS_TABLE)?;
        Ok(table.get(session_id)?.map(|guard| guard.value()))
    }

    pub fn set_active_split(&self, txn: &WriteTransaction, session_id: u64, split_id: u64) -> StorageResult<()> {
        let mut table = txn.open_table(ACTIVE_SPLITS_TABLE)?;
        table.insert(session_id, split_id)?;
        Ok(())
    }

    pub fn clear_active_split(&self, txn: &WriteTransaction, session_id: u64) -> StorageResult<()> {
        let mut table = txn.open_table(ACTIVE_SPLITS_TABLE)?;
        table.remove(session_id)?;
        Ok(())
    }

    // ========== Revocations ==========

    /// Whether a refresh token id has been revoked
    pub fn is_revoked(&self, jti: &str) -> StorageResult<bool> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(REVOCATIONS_TABLE)?;
        Ok(table.get(jti)?.is_some())
    }

    /// Record a revoked refresh token id with its expiry
    ///
    /// Returns `false` when the id was already revoked.
    pub fn revoke(&self, jti: &str, expires_at: i64) -> StorageResult<bool> {
        let txn = self.begin_write()?;
        let newly_revoked = {
            let mut table = txn.open_table(REVOCATIONS_TABLE)?;
            table.insert(jti, expires_at)?.is_none()
        };
        txn.commit()?;
        Ok(newly_revoked)
    }

    /// Drop revocation entries whose token has expired anyway
    pub fn purge_revocations(&self, now: i64) -> StorageResult<usize> {
        let txn = self.begin_write()?;
        let removed = {
            let mut table = txn.open_table(REVOCATIONS_TABLE)?;
            let before = table.len()?;
            table.retain(|_jti, expires_at| expires_at > now)?;
            (before - table.len()?) as usize
        };
        txn.commit()?;
        Ok(removed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared::models::{MenuItem, SessionStatus};

    fn session(id: u64, table_id: u64) -> DiningSession {
        DiningSession {
            id,
            table_id,
            table_number: format!("T{}", table_id),
            status: SessionStatus::Open,
            subtotal: 0.0,
            tax_amount: 0.0,
            total_amount: 0.0,
            payment_method: None,
            payment_reference: None,
            merged_into: None,
            opened_at: 0,
            closed_at: None,
        }
    }

    #[test]
    fn test_ids_are_allocated_per_record_type() {
        let store = Store::open_in_memory().unwrap();
        let txn = store.begin_write().unwrap();
        assert_eq!(store.next_id::<Order>(&txn).unwrap(), 1);
        assert_eq!(store.next_id::<Order>(&txn).unwrap(), 2);
        assert_eq!(store.next_id::<DiningSession>(&txn).unwrap(), 1);
        txn.commit().unwrap();
    }

    #[test]
    fn test_put_get_list() {
        let store = Store::open_in_memory().unwrap();
        let txn = store.begin_write().unwrap();
        store.put(&txn, &session(1, 4)).unwrap();
        store.put(&txn, &session(2, 5)).unwrap();
        txn.commit().unwrap();

        let loaded: DiningSession = store.get(2).unwrap().unwrap();
        assert_eq!(loaded.table_id, 5);
        assert!(store.get::<DiningSession>(9).unwrap().is_none());
        assert_eq!(store.list::<DiningSession>().unwrap().len(), 2);
    }

    #[test]
    fn test_uncommitted_write_is_discarded() {
        let store = Store::open_in_memory().unwrap();
        {
            let txn = store.begin_write().unwrap();
            store.put(&txn, &session(1, 1)).unwrap();
            // dropped without commit
        }
        assert!(store.get::<DiningSession>(1).unwrap().is_none());
    }

    #[test]
    fn test_insert_allocates_id() {
        let store = Store::open_in_memory().unwrap();
        let item = store
            .insert(|id| MenuItem {
                id,
                name: "Cola".into(),
                price: 2.5,
                is_available: true,
                is_quick_serve: true,
            })
            .unwrap();
        assert_eq!(item.id, 1);
        assert_eq!(store.get::<MenuItem>(1).unwrap().unwrap().name, "Cola");
    }

    #[test]
    fn test_audit_trail_is_indexed_per_order() {
        let store = Store::open_in_memory().unwrap();
        let txn = store.begin_write().unwrap();
        for (id, order_id) in [(1, 10), (2, 11), (3, 10)] {
            let audit = OrderAudit {
                id,
                order_id,
                from_status: shared::models::OrderStatus::New,
                to_status: shared::models::OrderStatus::Queued,
                actor: "waiter:1".into(),
                justification: None,
                reason: None,
                created_at: 0,
            };
            store.put_audit(&txn, &audit).unwrap();
        }
        txn.commit().unwrap();

        let ids: Vec<u64> = store.order_audit(10).unwrap().iter().map(|a| a.id).collect();
        assert_eq!(ids, vec![1, 3]);
        assert!(store.order_audit(99).unwrap().is_empty());
    }

    #[test]
    fn test_email_lookup_inside_transaction() {
        let store = Store::open_in_memory().unwrap();
        let txn = store.begin_write().unwrap();
        let employee = Employee {
            id: 1,
            email: "Ana@Pronto.test".into(),
            display_name: "Ana".into(),
            password_hash: String::new(),
            primary_role: shared::models::Role::Waiter,
            additional_roles: Default::default(),
            is_active: true,
        };
        store.put_employee(&txn, &employee).unwrap();
        assert!(store.email_taken_txn(&txn, "ana@pronto.test").unwrap());
        assert!(!store.email_taken_txn(&txn, "bob@pronto.test").unwrap());
        txn.commit().unwrap();
    }

    #[test]
    fn test_revocations_purge() {
        let store = Store::open_in_memory().unwrap();
        store.revoke("old", 100).unwrap();
        store.revoke("live", 10_000).unwrap();
        assert!(store.is_revoked("old").unwrap());

        assert_eq!(store.purge_revocations(500).unwrap(), 1);
        assert!(!store.is_revoked("old").unwrap());
        assert!(store.is_revoked("live").unwrap());
    }

    #[test]
    fn test_file_backed_store_persists() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("pronto.redb");
        {
            let store = Store::open(&path).unwrap();
            let txn = store.begin_write().unwrap();
            store.put(&txn, &session(7, 3)).unwrap();
            txn.commit().unwrap();
        }
        let store = Store::open(&path).unwrap();
        assert!(store.get::<DiningSession>(7).unwrap().is_some());
    }
}
