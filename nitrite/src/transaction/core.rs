use crate::errors::{ErrorKind, NitriteError, NitriteResult};
use crate::store::NitriteMap;
/// Core transaction data structures
/// 
/// Defines the fundamental types for transaction management:
/// - TransactionState: Transaction lifecycle states
/// - ChangeType: Type of operations performed
/// - Command: Executable operations (commit/rollback)
/// - JournalEntry: Record of a single operation
/// - UndoEntry: Rollback information
/// - TransactionContext: Per-collection transaction state

use std::collections::VecDeque;
use std::ops::Deref;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Represents the state of a transaction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TransactionState {
    /// Transaction is actively receiving operations
    Active,
    /// Started commit process, not yet complete
    PartiallyCommitted,
    /// Successfully committed all changes
    Committed,
    /// Transaction resources released
    Closed,
    /// Commit failed during execution
    Failed,
    /// Transaction rolled back
    Aborted,
}

/// Type of change performed in a transaction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ChangeType {
    /// Document insertion
    Insert,
    /// Document update
    Update,
    /// Document removal
    Remove,
    /// Clear all documents (auto-committed)
    Clear,
    /// Create index (auto-committed)
    CreateIndex,
    /// Rebuild index (auto-committed)
    RebuildIndex,
    /// Drop index (auto-committed)
    DropIndex,
    /// Drop all indices (auto-committed)
    DropAllIndexes,
    /// Drop collection (auto-committed)
    DropCollection,
    /// Set collection attributes (transactional)
    SetAttributes,
}

/// Represents a transaction-specific error condition.
///
/// # Purpose
/// `TransactionError` encapsulates transaction-related errors with descriptive messages.
/// Implements standard Rust error traits for integration with error handling pipelines.
///
/// # Characteristics
/// - **Clone-Safe**: Can be safely cloned across thread boundaries
/// - **Display Format**: Formatted as "Transaction error: {message}"
/// - **Standard Error Trait**: Implements `std::error::Error` for compatibility
#[derive(Debug, Clone)]
pub struct TransactionError {
    message: String,
}

impl TransactionError {
    /// Creates a new `TransactionError` with the specified message.
    ///
    /// # Arguments
    /// * `message` - The error message, can be a string or string reference
    ///
    /// # Returns
    /// A new `TransactionError` instance
    pub fn new(message: impl Into<String>) -> Self {
        TransactionError {
            message: message.into(),
        }
    }

    /// Retrieves the error message.
    ///
    /// # Returns
    /// A string reference containing the error message
    pub fn message(&self) -> &str {
        &self.message
    }
}

impl std::fmt::Display for TransactionError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Transaction error: {}", self.message)
    }
}

impl std::error::Error for TransactionError {}

/// Executable command for transaction operations.
///
/// # Purpose
/// `Command` is a type alias for a thread-safe, callable that performs transaction operations
/// such as commit or rollback. Commands are wrapped in `Arc` for safe sharing across threads.
///
/// # Characteristics
/// - **Thread-Safe**: Implements `Send + Sync` for safe concurrent execution
/// - **Fallible**: Returns `NitriteResult<()>` to handle operation errors
/// - **Arc-Wrapped**: Allows sharing the same command across multiple owners
///
/// # Usage
/// Commands are used in journal entries to define forward (commit) and reverse (rollback) operations
pub type Command = Arc<dyn Fn() -> NitriteResult<()> + Send + Sync>;

/// Record of a single operation in a transaction.
///
/// # Purpose
/// Each `JournalEntry` represents one operation performed in a transaction, storing both
/// the forward operation (commit) and inverse operation (rollback) for two-phase commit protocol.
///
/// # Fields
/// - `change_type` - The type of change (Insert, Update, Remove, etc.)
/// - `commit` - Optional command to execute during commit phase
/// - `rollback` - Optional command to execute during rollback phase
///
/// # Characteristics
/// - **Reversible**: Stores both forward and backward operations
/// - **Optional Commands**: Either or both commands may be None for certain operations
/// - **Cloneable**: Cheap cloning with Arc-wrapped commands
#[derive(Clone)]
pub struct JournalEntry {
    pub change_type: ChangeType,
    pub commit: Option<Command>,
    pub rollback: Option<Command>,
}

impl JournalEntry {
    /// Creates a new `JournalEntry` with specified change type and commands.
    ///
    /// # Arguments
    /// * `change_type` - The type of change being recorded
    /// * `commit` - Optional command to execute on commit
    /// * `rollback` - Optional command to execute on rollback
    ///
    /// # Returns
    /// A new `JournalEntry` instance
    pub fn new(
        change_type: ChangeType,
        commit: Option<Command>,
        rollback: Option<Command>,
    ) -> Self {
        JournalEntry {
            change_type,
            commit,
            rollback,
        }
    }
}

impl std::fmt::Debug for JournalEntry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JournalEntry")
            .field("change_type", &self.change_type)
            .field("has_commit", &self.commit.is_some())
            .field("has_rollback", &self.rollback.is_some())
            .finish()
    }
}

/// Rollback information for a collection operation.
///
/// # Purpose
/// `UndoEntry` stores the rollback command for a single collection's operation,
/// used during the rollback phase if commit fails.
///
/// # Fields
/// - `collection_name` - Name of the collection affected by this operation
/// - `rollback` - Command to execute to undo the operation
///
/// # Characteristics
/// - **Per-Collection**: Each entry is associated with a specific collection
/// - **Arc-Wrapped**: Commands are shared efficiently across the undo registry
#[derive(Clone)]
pub struct UndoEntry {
    pub collection_name: String,
    pub rollback: Arc<Command>,
}

impl UndoEntry {
    /// Creates a new `UndoEntry` for rollback operations.
    ///
    /// # Arguments
    /// * `collection_name` - The name of the collection to undo
    /// * `rollback` - The command that undoes the operation
    ///
    /// # Returns
    /// A new `UndoEntry` instance
    pub fn new(collection_name: String, rollback: Arc<Command>) -> Self {
        UndoEntry {
            collection_name,
            rollback,
        }
    }
}

impl std::fmt::Debug for UndoEntry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UndoEntry")
            .field("collection_name", &self.collection_name)
            .field("has_rollback", &true)
            .finish()
    }
}

/// Per-collection transaction state container.
///
/// # Purpose
/// `TransactionContext` maintains transaction-specific state for a single collection,
/// including the operation journal and active status. It provides a transactional view
/// of the collection's data through a separate map.
///
/// # Characteristics
/// - **Thread-Safe**: Can be safely cloned and shared across threads
/// - **Lightweight Cloning**: Uses Arc internally for efficient sharing
/// - **Journal Management**: Maintains FIFO queue of operations
/// - **Lifecycle Tracking**: Tracks active/inactive status
///
/// # Usage
/// Created per collection when a transaction begins, used to coordinate
/// all operations on that collection within the transaction
#[derive(Clone)]
pub struct TransactionContext {
    inner: Arc<TransactionContextInner>,
}

impl TransactionContext {
    /// Creates a new transaction context for a collection.
    ///
    /// # Arguments
    /// * `collection_name` - The name of the collection this context manages
    /// * `txn_map` - The transactional map for this collection's operations
    ///
    /// # Returns
    /// A new `TransactionContext` instance
    pub fn new(collection_name: String, txn_map: crate::store::NitriteMap) -> Self {
        TransactionContext {
            inner: Arc::new(TransactionContextInner::new(collection_name, txn_map)),
        }
    }
}

impl Deref for TransactionContext {
    type Target = TransactionContextInner;

    fn deref(&self) -> &Self::Target {
        &self.inner
    }
}

pub struct TransactionContextInner {
    collection_name: String,
    pub journal: Arc<parking_lot::Mutex<VecDeque<JournalEntry>>>,
    active: Arc<AtomicBool>,
    txn_map: NitriteMap,
}

impl TransactionContextInner {
    /// Creates a new transaction context for a collection.
    ///
    /// # Arguments
    /// * `collection_name` - The name of the collection this context manages
    /// * `txn_map` - The transactional map for this collection's operations
    ///
    /// # Returns
    /// A new `TransactionContextInner` instance initialized in active state
    pub fn new(collection_name: String, txn_map: NitriteMap) -> Self {
        TransactionContextInner {
            collection_name,
            journal: Arc::new(parking_lot::Mutex::new(VecDeque::new())),
            active: Arc::new(AtomicBool::new(true)),
            txn_map,
        }
    }

    /// Checks if this context is active.
    ///
    /// # Returns
    /// `true` if the context is active and accepting operations, `false` otherwise
    pub fn is_active(&self) -> bool {
        self.active.load(Ordering::SeqCst)
    }

    /// Marks this context as inactive.
    ///
    /// After marking inactive, no new operations can be added to the journal.
    pub fn set_inactive(&self) {
        self.active.store(false, Ordering::SeqCst);
    }

    /// Adds a journal entry to the operation log.
    ///
    /// # Arguments
    /// * `entry` - The `JournalEntry` to add
    ///
    /// # Returns
    /// * `Ok(())` if the entry was added successfully
    /// * `Err(NitriteError)` if the context is inactive
    pub fn add_entry(&self, entry: JournalEntry) -> NitriteResult<()> {
        if !self.is_active() {
            return Err(NitriteError::new(
                "Cannot add entry to inactive transaction context",
                ErrorKind::InvalidOperation,
            ));
        }
        self.journal.lock().push_back(entry);
        Ok(())
    }

    /// Gets the number of pending operations in the journal.
    ///
    /// # Returns
    /// The count of `JournalEntry` items waiting to be committed
    pub fn pending_operations(&self) -> usize {
        self.journal.lock().len()
    }

    /// Clears all entries from the journal.
    ///
    /// This removes all recorded operations from the transaction journal but does not
    /// change the active state. Used during rollback operations to discard uncommitted
    /// changes.
    pub fn clear(&self) {
        self.journal.lock().clear();
    }

    /// Closes the context and releases resources.
    ///
    /// Marks the context as inactive and clears the journal, preventing further operations.
    /// This is typically called when the transaction is completed (committed or rolled back).
    pub fn close(&self) {
        self.clear();
        self.set_inactive();
    }

    /// Returns the transactional map associated with this context.
    ///
    /// # Returns
    /// A cloned reference to the `NitriteMap` used for this transaction context
    pub fn txn_map(&self) -> NitriteMap {
        self.txn_map.clone()
    }
}
