use parking_lot::Mutex;
/// Transaction-specific iterators for multi-map orchestration
///
/// These providers handle iteration over the transaction's three logical maps:
/// - Backing map: New/modified entries
/// - Primary map: Original entries (read-through)
/// - Tombstones: Deleted entries (to exclude from results)

use std::collections::HashSet;
use std::sync::Arc;

use crate::common::{Key, Value};
use crate::errors::NitriteResult;
use crate::store::{EntryIteratorProvider, KeyIteratorProvider, NitriteMap, ValueIteratorProvider};

/// Orchestrates entry iteration over backing, primary, and tombstone maps
///
/// Iteration order:
/// 1. Backing map entries (modified/new)
/// 2. Primary map entries not in backing or tombstones
/// 
/// OPTIMIZED for performance:
/// - Uses map navigation methods (higher_key, lower_key) for stateless iteration
/// - Releases locks early to reduce contention
/// - Minimizes key cloning
/// - Supports bidirectional iteration with backward state tracking
pub struct TransactionEntryProvider {
    backing_map: NitriteMap,
    primary_map: NitriteMap,
    tombstones: Arc<Mutex<HashSet<Key>>>,
    cleared: Arc<Mutex<bool>>,
    current_key: Option<Key>,
    current_phase: IterationPhase,
    // Reverse iteration state
    has_started_reverse: bool,
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum IterationPhase {
    Backing,
    Primary,
    Done,
}

impl TransactionEntryProvider {
    /// Create a new transaction entry provider
    pub fn new(
        backing_map: NitriteMap,
        primary_map: NitriteMap,
        tombstones: Arc<Mutex<HashSet<Key>>>,
        cleared: Arc<Mutex<bool>>,
    ) -> NitriteResult<Self> {
        Ok(TransactionEntryProvider {
            backing_map,
            primary_map,
            tombstones,
            cleared,
            current_key: None,
            current_phase: IterationPhase::Backing,
            has_started_reverse: false,
        })
    }
}

impl EntryIteratorProvider for TransactionEntryProvider {
    fn next_entry(&mut self) -> Option<NitriteResult<(Key, Value)>> {
        // OPTIMIZATION: Check cleared once and release lock immediately
        if *self.cleared.lock() {
            return None;
        }

        loop {
            match self.current_phase {
                IterationPhase::Backing => {
                    // Get next key from backing map
                    let next_key_result = match &self.current_key {
                        Some(key) => self.backing_map.higher_key(key),
                        None => self.backing_map.first_key(),
                    };

                    match next_key_result {
                        Ok(Some(key)) => {
                            self.current_key = Some(key.clone());
                            
                            // OPTIMIZATION: No tombstone check needed in backing phase
                            // Invariant: backing keys cannot be in tombstones
                            match self.backing_map.get(&key) {
                                Ok(Some(value)) => return Some(Ok((key, value))),
                                Ok(None) => continue,
                                Err(e) => return Some(Err(e)),
                            }
                        }
                        Ok(None) => {
                            // No more keys in backing, move to primary
                            self.current_phase = IterationPhase::Primary;
                            self.current_key = None;
                        }
                        Err(e) => return Some(Err(e)),
                    }
                }

                IterationPhase::Primary => {
                    // Get next key from primary map
                    let next_key_result = match &self.current_key {
                        Some(key) => self.primary_map.higher_key(key),
                        None => self.primary_map.first_key(),
                    };

                    match next_key_result {
                        Ok(Some(key)) => {
                            self.current_key = Some(key.clone());
                            
                            // Check if key is in backing or tombstones
                            let in_backing = self.backing_map.contains_key(&key).unwrap_or(false);
                            let is_tombstoned = {
                                let tombstones = self.tombstones.lock();
                                tombstones.contains(&key)
                            };

                            if in_backing || is_tombstoned {
                                continue;
                            }

                            match self.primary_map.get(&key) {
                                Ok(Some(value)) => return Some(Ok((key, value))),
                                Ok(None) => continue,
                                Err(e) => return Some(Err(e)),
                            }
                        }
                        Ok(None) => {
                            self.current_phase = IterationPhase::Done;
                            return None;
                        }
                        Err(e) => return Some(Err(e)),
                    }
                }

                IterationPhase::Done => {
                    return None;
                }
            }
        }
    }

    fn prev_entry(&mut self) -> Option<NitriteResult<(Key, Value)>> {
        // OPTIMIZATION: Check cleared once and release lock immediately
        if *self.cleared.lock() {
            return None;
        }

        // Initialize reverse iteration state on first call
        if !self.has_started_reverse {
            self.has_started_reverse = true;
            self.current_phase = IterationPhase::Primary;
            self.current_key = None;
        }

        loop {
            match self.current_phase {
                IterationPhase::Primary => {
                    // Get previous key from primary map
                    let prev_key_result = match &self.current_key {
                        Some(key) => self.primary_map.lower_key(key),
                        None => self.primary_map.last_key(),
                    };

                    match prev_key_result {
                        Ok(Some(key)) => {
                            self.current_key = Some(key.clone());
                            
                            // Check if key is in backing or tombstones
                            let in_backing = self.backing_map.contains_key(&key).unwrap_or(false);
                            let is_tombstoned = {
                                let tombstones = self.tombstones.lock();
                                tombstones.contains(&key)
                            };

                            if in_backing || is_tombstoned {
                                continue;
                            }

                            match self.primary_map.get(&key) {
                                Ok(Some(value)) => return Some(Ok((key, value))),
                                Ok(None) => continue,
                                Err(e) => return Some(Err(e)),
                            }
                        }
                        Ok(None) => {
                            // No more keys in primary, move to backing
                            self.current_phase = IterationPhase::Backing;
                            self.current_key = None;
                        }
                        Err(e) => return Some(Err(e)),
                    }
                }

                IterationPhase::Backing => {
                    // Get previous key from backing map
                    let prev_key_result = match &self.current_key {
                        Some(key) => self.backing_map.lower_key(key),
                        None => self.backing_map.last_key(),
                    };

                    match prev_key_result {
                        Ok(Some(key)) => {
                            self.current_key = Some(key.clone());
                            
                            // OPTIMIZATION: No tombstone check needed in backing phase
                            // Invariant: backing keys cannot be in tombstones
                            match self.backing_map.get(&key) {
                                Ok(Some(value)) => return Some(Ok((key, value))),
                                Ok(None) => continue,
                                Err(e) => return Some(Err(e)),
                            }
                        }
                        Ok(None) => {
                            self.current_phase = IterationPhase::Done;
                            return None;
                        }
                        Err(e) => return Some(Err(e)),
                    }
                }

                IterationPhase::Done => {
                    return None;
                }
            }
        }
    }
}

/// Orchestrates key iteration over backing, primary, and tombstone maps
/// 
/// OPTIMIZED: Uses map navigation methods (higher_key, lower_key) for stateless iteration
pub struct TransactionKeyProvider {
    backing_map: NitriteMap,
    primary_map: NitriteMap,
    tombstones: Arc<Mutex<HashSet<Key>>>,
    cleared: Arc<Mutex<bool>>,
    current_key: Option<Key>,
    current_phase: IterationPhase,
    has_started_reverse: bool,
}

impl TransactionKeyProvider {
    /// Create a new transaction key provider
    pub fn new(
        backing_map: NitriteMap,
        primary_map: NitriteMap,
        tombstones: Arc<Mutex<HashSet<Key>>>,
        cleared: Arc<Mutex<bool>>,
    ) -> NitriteResult<Self> {
        Ok(TransactionKeyProvider {
            backing_map,
            primary_map,
            tombstones,
            cleared,
            current_key: None,
            current_phase: IterationPhase::Backing,
            has_started_reverse: false,
        })
    }
}

impl KeyIteratorProvider for TransactionKeyProvider {
    fn next_key(&mut self) -> Option<NitriteResult<Key>> {
        // OPTIMIZATION: Check cleared once and release lock immediately
        if *self.cleared.lock() {
            return None;
        }

        loop {
            match self.current_phase {
                IterationPhase::Backing => {
                    // Get next key from backing map
                    let next_key_result = match &self.current_key {
                        Some(key) => self.backing_map.higher_key(key),
                        None => self.backing_map.first_key(),
                    };

                    match next_key_result {
                        Ok(Some(key)) => {
                            self.current_key = Some(key.clone());
                            
                            // OPTIMIZATION: No tombstone check needed in backing phase
                            // Invariant: backing keys cannot be in tombstones
                            return Some(Ok(key));
                        }
                        Ok(None) => {
                            // No more keys in backing, move to primary
                            self.current_phase = IterationPhase::Primary;
                            self.current_key = None;
                        }
                        Err(e) => return Some(Err(e)),
                    }
                }

                IterationPhase::Primary => {
                    // Get next key from primary map
                    let next_key_result = match &self.current_key {
                        Some(key) => self.primary_map.higher_key(key),
                        None => self.primary_map.first_key(),
                    };

                    match next_key_result {
                        Ok(Some(key)) => {
                            self.current_key = Some(key.clone());
                            
                            // Check if key is in backing or tombstones
                            let in_backing = self.backing_map.contains_key(&key).unwrap_or(false);
                            let is_tombstoned = {
                                let tombstones = self.tombstones.lock();
                                tombstones.contains(&key)
                            };

                            if in_backing || is_tombstoned {
                                continue;
                            }

                            return Some(Ok(key));
                        }
                        Ok(None) => {
                            self.current_phase = IterationPhase::Done;
                            return None;
                        }
                        Err(e) => return Some(Err(e)),
                    }
                }

                IterationPhase::Done => {
                    return None;
                }
            }
        }
    }

    fn prev_key(&mut self) -> Option<NitriteResult<Key>> {
        // OPTIMIZATION: Check cleared once and release lock immediately
        if *self.cleared.lock() {
            return None;
        }

        // Initialize reverse iteration state on first call
        if !self.has_started_reverse {
            self.has_started_reverse = true;
            self.current_phase = IterationPhase::Primary;
            self.current_key = None;
        }

        loop {
            match self.current_phase {
                IterationPhase::Primary => {
                    // Get previous key from primary map
                    let prev_key_result = match &self.current_key {
                        Some(key) => self.primary_map.lower_key(key),
                        None => self.primary_map.last_key(),
                    };

                    match prev_key_result {
                        Ok(Some(key)) => {
                            self.current_key = Some(key.clone());
                            
                            // Check if key is in backing or tombstones
                            let in_backing = self.backing_map.contains_key(&key).unwrap_or(false);
                            let is_tombstoned = {
                                let tombstones = self.tombstones.lock();
                                tombstones.contains(&key)
                            };

                            if in_backing || is_tombstoned {
                                continue;
                            }

                            return Some(Ok(key));
                        }
                        Ok(None) => {
                            // No more keys in primary, move to backing
                            self.current_phase = IterationPhase::Backing;
                            self.current_key = None;
                        }
                        Err(e) => return Some(Err(e)),
                    }
                }

                IterationPhase::Backing => {
                    // Get previous key from backing map
                    let prev_key_result = match &self.current_key {
                        Some(key) => self.backing_map.lower_key(key),
                        None => self.backing_map.last_key(),
                    };

                    match prev_key_result {
                        Ok(Some(key)) => {
                            self.current_key = Some(key.clone());
                            
                            // OPTIMIZATION: No tombstone check needed in backing phase
                            // Invariant: backing keys cannot be in tombstones
                            return Some(Ok(key));
                        }
                        Ok(None) => {
                            self.current_phase = IterationPhase::Done;
                            return None;
                        }
                        Err(e) => return Some(Err(e)),
                    }
                }

                IterationPhase::Done => {
                    return None;
                }
            }
        }
    }
}

/// Orchestrates value iteration over backing, primary, and tombstone maps
/// 
/// OPTIMIZED: Uses map navigation methods (higher_key, lower_key) for stateless iteration
pub struct TransactionValueProvider {
    backing_map: NitriteMap,
    primary_map: NitriteMap,
    tombstones: Arc<Mutex<HashSet<Key>>>,
    cleared: Arc<Mutex<bool>>,
    current_key: Option<Key>,
    current_phase: IterationPhase,
    has_started_reverse: bool,
}

impl TransactionValueProvider {
    /// Create a new transaction value provider
    pub fn new(
        backing_map: NitriteMap,
        primary_map: NitriteMap,
        tombstones: Arc<Mutex<HashSet<Key>>>,
        cleared: Arc<Mutex<bool>>,
    ) -> NitriteResult<Self> {
        Ok(TransactionValueProvider {
            backing_map,
            primary_map,
            tombstones,
            cleared,
            current_key: None,
            current_phase: IterationPhase::Backing,
            has_started_reverse: false,
        })
    }
}

impl ValueIteratorProvider for TransactionValueProvider {
    fn next_value(&mut self) -> Option<NitriteResult<Value>> {
        // OPTIMIZATION: Check cleared once and release lock immediately
        if *self.cleared.lock() {
            return None;
        }

        loop {
            match self.current_phase {
                IterationPhase::Backing => {
                    // Get next key from backing map
                    let next_key_result = match &self.current_key {
                        Some(key) => self.backing_map.higher_key(key),
                        None => self.backing_map.first_key(),
                    };

                    match next_key_result {
                        Ok(Some(key)) => {
                            self.current_key = Some(key.clone());
                            
                            // OPTIMIZATION: No tombstone check needed in backing phase
                            // Invariant: backing keys cannot be in tombstones
                            match self.backing_map.get(&key) {
                                Ok(Some(value)) => return Some(Ok(value)),
                                Ok(None) => continue,
                                Err(e) => return Some(Err(e)),
                            }
                        }
                        Ok(None) => {
                            // No more keys in backing, move to primary
                            self.current_phase = IterationPhase::Primary;
                            self.current_key = None;
                        }
                        Err(e) => return Some(Err(e)),
                    }
                }

                IterationPhase::Primary => {
                    // Get next key from primary map
                    let next_key_result = match &self.current_key {
                        Some(key) => self.primary_map.higher_key(key),
                        None => self.primary_map.first_key(),
                    };

                    match next_key_result {
                        Ok(Some(key)) => {
                            self.current_key = Some(key.clone());
                            
                            // Check if key is in backing or tombstones
                            let in_backing = self.backing_map.contains_key(&key).unwrap_or(false);
                            let is_tombstoned = {
                                let tombstones = self.tombstones.lock();
                                tombstones.contains(&key)
                            };

                            if in_backing || is_tombstoned {
                                continue;
                            }

                            match self.primary_map.get(&key) {
                                Ok(Some(value)) => return Some(Ok(value)),
                                Ok(None) => continue,
                                Err(e) => return Some(Err(e)),
                            }
                        }
                        Ok(None) => {
                            self.current_phase = IterationPhase::Done;
                            return None;
                        }
                        Err(e) => return Some(Err(e)),
                    }
                }

                IterationPhase::Done => {
                    return None;
                }
            }
        }
    }

    fn prev_value(&mut self) -> Option<NitriteResult<Value>> {
        // OPTIMIZATION: Check cleared once and release lock immediately
        if *self.cleared.lock() {
            return None;
        }

        // Initialize reverse iteration state on first call
        if !self.has_started_reverse {
            self.has_started_reverse = true;
            self.current_phase = IterationPhase::Primary;
            self.current_key = None;
        }

        loop {
            match self.current_phase {
                IterationPhase::Primary => {
                    // Get previous key from primary map
                    let prev_key_result = match &self.current_key {
                        Some(key) => self.primary_map.lower_key(key),
                        None => self.primary_map.last_key(),
                    };

                    match prev_key_result {
                        Ok(Some(key)) => {
                            self.current_key = Some(key.clone());
                            
                            // Check if key is in backing or tombstones
                            let in_backing = self.backing_map.contains_key(&key).unwrap_or(false);
                            let is_tombstoned = {
                                let tombstones = self.tombstones.lock();
                                tombstones.contains(&key)
                            };

                            if in_backing || is_tombstoned {
                                continue;
                            }

                            match self.primary_map.get(&key) {
                                Ok(Some(value)) => return Some(Ok(value)),
                                Ok(None) => continue,
                                Err(e) => return Some(Err(e)),
                            }
                        }
                        Ok(None) => {
                            // No more keys in primary, move to backing
                            self.current_phase = IterationPhase::Backing;
                            self.current_key = None;
                        }
                        Err(e) => return Some(Err(e)),
                    }
                }

                IterationPhase::Backing => {
                    // Get previous key from backing map
                    let prev_key_result = match &self.current_key {
                        Some(key) => self.backing_map.lower_key(key),
                        None => self.backing_map.last_key(),
                    };

                    match prev_key_result {
                        Ok(Some(key)) => {
                            self.current_key = Some(key.clone());
                            
                            // OPTIMIZATION: No tombstone check needed in backing phase
                            // Invariant: backing keys cannot be in tombstones
                            match self.backing_map.get(&key) {
                                Ok(Some(value)) => return Some(Ok(value)),
                                Ok(None) => continue,
                                Err(e) => return Some(Err(e)),
                            }
                        }
                        Ok(None) => {
                            self.current_phase = IterationPhase::Done;
                            return None;
                        }
                        Err(e) => return Some(Err(e)),
                    }
                }

                IterationPhase::Done => {
                    return None;
                }
            }
        }
    }
}
