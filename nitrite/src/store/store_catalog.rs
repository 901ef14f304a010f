use crate::collection::Document;
use crate::common::{get_key_name, get_keyed_repo_type, Key, Value, TAG_COLLECTION, TAG_KEYED_REPOSITORIES, TAG_REPOSITORIES};
use crate::errors::{ErrorKind, NitriteError, NitriteResult};
use crate::store::{MapMeta, Metadata, NitriteMap, NitriteMapProvider};
use std::collections::{HashMap, HashSet};
use std::ops::Deref;
use std::sync::Arc;

/// Manages the catalog of collections, repositories, and keyed repositories in a Nitrite store.
///
/// # Purpose
/// `StoreCatalog` maintains metadata about all stored entities in the database,
/// tracking collection names, repository types, and keyed repository configurations.
/// It provides atomic operations for registering and removing entities from the catalog.
///
/// # Characteristics
/// - **Thread-Safe**: Can be safely cloned and shared across threads
/// - **Metadata Management**: Tracks all collections, repositories, and their configurations
/// - **Atomic Operations**: Write and remove operations are atomic
/// - **Lightweight Cloning**: Uses Arc internally for efficient sharing
///
/// # Usage
/// Typically obtained via `NitriteStore::store_catalog()` and used internally
/// by Nitrite for managing collection and repository registries.
#[derive(Clone)]
pub struct StoreCatalog {
    inner: Arc<StoreCatalogInner>,
}

impl StoreCatalog {
    /// Creates a new `StoreCatalog` backed by the specified map.
    ///
    /// # Arguments
    /// * `catalog_map` - The underlying `NitriteMap` that stores catalog metadata
    ///
    /// # Returns
    /// * `Ok(StoreCatalog)` with the newly created catalog
    /// * `Err(NitriteError)` if the operation fails
    pub fn new(catalog_map: NitriteMap) -> NitriteResult<StoreCatalog> {
        Ok(StoreCatalog {
            inner: Arc::new(StoreCatalogInner { catalog_map }),
        })
    }
}

impl Deref for StoreCatalog {
    type Target = StoreCatalogInner;

    fn deref(&self) -> &Self::Target {
        &self.inner
    }
}

pub struct StoreCatalogInner {
    catalog_map: NitriteMap,
}

impl StoreCatalogInner {
    /// Checks if an entry (collection, repository, or keyed repository) exists in the catalog.
    ///
    /// # Arguments
    /// * `name` - The name of the entry to check
    ///
    /// # Returns
    /// * `Ok(true)` if the entry exists
    /// * `Ok(false)` if the entry does not exist
    /// * `Err(NitriteError)` if the operation fails
    pub fn has_entry(&self, name: &str) -> NitriteResult<bool> {
        let catalog_map = self.get_catalog_map()?;

        for entry in catalog_map.entries()? {
            match entry {
                Ok(pair) => {
                    match pair.1.as_document() {
                        Some(document) => {
                            let meta_data = MapMeta::new(document);
                            if meta_data.map_names.contains(name) {
                                return Ok(true);
                            }
                        }
                        None => {
                            // Skip corrupted entries - log warning but continue
                            log::warn!("StoreCatalog: Skipping invalid catalog entry format (expected Document, got non-Document type)");
                            continue;
                        }
                    }
                }
                Err(e) => {
                    return Err(e);
                }
            }
        }
        Ok(false)
    }

    /// Registers a collection in the catalog.
    ///
    /// # Arguments
    /// * `name` - The name of the collection to register
    ///
    /// # Returns
    /// * `Ok(())` if the collection was successfully registered
    /// * `Err(NitriteError)` if the name is empty or the operation fails
    pub fn write_collection_entry(&self, name: &str) -> NitriteResult<()> {
        if name.is_empty() {
            log::error!("Collection name cannot be empty");
            return Err(NitriteError::new(
                "Collection name cannot be empty",
                ErrorKind::ValidationError,
            ));
        }
        
        let catalog_map = self.get_catalog_map()?;

        let document = catalog_map.get(&Value::from(TAG_COLLECTION))?;
        let document = match document {
            None => Document::new(),
            Some(doc) => {
                let doc_ref = doc.as_document()
                    .ok_or_else(|| NitriteError::new(
                        "StoreCatalog: Invalid collection entry format (expected Document)",
                        ErrorKind::InvalidOperation
                    ))?;
                doc_ref.clone()
            }
        };

        let mut meta_data = MapMeta::new(&document);
        meta_data.map_names.insert(name.to_string());

        catalog_map.put(
            Key::from(TAG_COLLECTION.to_string()),
            Value::from(meta_data.get_info()),
        )?;
        Ok(())
    }

    /// Registers a repository in the catalog.
    ///
    /// # Arguments
    /// * `name` - The fully qualified type name of the repository to register
    ///
    /// # Returns
    /// * `Ok(())` if the repository was successfully registered
    /// * `Err(NitriteError)` if the name is empty or the operation fails
    pub fn write_repository_entry(&self, name: &str) -> NitriteResult<()> {
        if name.is_empty() {
            log::error!("Repository name cannot be empty");
            return Err(NitriteError::new(
                "Repository name cannot be empty",
                ErrorKind::ValidationError,
            ));
        }
        
        let catalog_map = self.get_catalog_map()?;

        let document = catalog_map.get(&Value::from(TAG_REPOSITORIES))?;
        let document = match document {
            None => Document::new(),
            Some(doc) => {
                let doc_ref = doc.as_document()
                    .ok_or_else(|| NitriteError::new(
                        "StoreCatalog: Invalid repository entry format (expected Document)",
                        ErrorKind::InvalidOperation
                    ))?;
                doc_ref.clone()
            }
        };

        let mut meta_data = MapMeta::new(&document);
        meta_data.map_names.insert(name.to_string());

        catalog_map.put(
            Key::from(TAG_REPOSITORIES.to_string()),
            Value::from(meta_data.get_info()),
        )?;
        Ok(())
    }

    /// Registers a keyed repository in the catalog.
    ///
    /// The name should include both the repository type and the key, separated by the key separator.
    ///
    /// # Arguments
    /// * `name` - The repository type and key identifier to register
    ///
    /// # Returns
    /// * `Ok(())` if the keyed repository was successfully registered
    /// * `Err(NitriteError)` if the name is empty or the operation fails
    pub fn write_keyed_repository_entry(&self, name: &str) -> NitriteResult<()> {
        if name.is_empty() {
            log::error!("Keyed repository name cannot be empty");
            return Err(NitriteError::new(
                "Keyed repository name cannot be empty",
                ErrorKind::ValidationError,
            ));
        }
        
        let catalog_map = self.get_catalog_map()?;

        let document = catalog_map.get(&Value::from(TAG_KEYED_REPOSITORIES))?;
        let document = match document {
            None => Document::new(),
            Some(doc) => {
                let doc_ref = doc.as_document()
                    .ok_or_else(|| NitriteError::new(
                        "StoreCatalog: Invalid keyed repository entry format (expected Document)",
                        ErrorKind::InvalidOperation
                    ))?;
                doc_ref.clone()
            }
        };

        let mut meta_data = MapMeta::new(&document);
        meta_data.map_names.insert(name.to_string());

        catalog_map.put(
            Key::from(TAG_KEYED_REPOSITORIES.to_string()),
            Value::from(meta_data.get_info()),
        )?;
        Ok(())
    }

    /// Retrieves all collection names registered in the catalog.
    ///
    /// # Returns
    /// * `Ok(HashSet)` with all registered collection names
    /// * `Err(NitriteError)` if the operation fails
    pub fn get_collection_names(&self) -> NitriteResult<HashSet<String>> {
        let catalog_map = self.get_catalog_map()?;

        let document = catalog_map.get(&Value::from(TAG_COLLECTION))?;
        let document = match document {
            None => Document::new(),
            Some(doc) => {
                let doc_ref = doc.as_document()
                    .ok_or_else(|| NitriteError::new(
                        "StoreCatalog: Invalid collection entry format (expected Document)",
                        ErrorKind::InvalidOperation
                    ))?;
                doc_ref.clone()
            }
        };

        let meta_data = MapMeta::new(&document);
        Ok(meta_data.map_names)
    }

    /// Retrieves all repository types registered in the catalog.
    ///
    /// # Returns
    /// * `Ok(HashSet)` with all registered repository type names
    /// * `Err(NitriteError)` if the operation fails
    pub fn get_repository_names(&self) -> NitriteResult<HashSet<String>> {
        let catalog_map = self.get_catalog_map()?;

        let document = catalog_map.get(&Value::from(TAG_REPOSITORIES))?;
        let document = match document {
            None => Document::new(),
            Some(doc) => {
                let doc_ref = doc.as_document()
                    .ok_or_else(|| NitriteError::new(
                        "StoreCatalog: Invalid repository entry format (expected Document)",
                        ErrorKind::InvalidOperation
                    ))?;
                doc_ref.clone()
            }
        };

        let meta_data = MapMeta::new(&document);
        Ok(meta_data.map_names)
    }

    /// Retrieves all keyed repositories grouped by their keys.
    ///
    /// # Returns
    /// * `Ok(HashMap)` mapping key names to sets of repository types
    /// * `Err(NitriteError)` if the operation fails
    pub fn get_keyed_repository_names(&self) -> NitriteResult<HashMap<String, HashSet<String>>> {
        let catalog_map = self.get_catalog_map()?;

        let document = catalog_map.get(&Value::from(TAG_KEYED_REPOSITORIES))?;
        let document = match document {
            None => Document::new(),
            Some(doc) => {
                let doc_ref = doc.as_document()
                    .ok_or_else(|| NitriteError::new(
                        "StoreCatalog: Invalid keyed repository entry format (expected Document)",
                        ErrorKind::InvalidOperation
                    ))?;
                doc_ref.clone()
            }
        };

        let meta_data = MapMeta::new(&document);
        let keyed_repository_names = meta_data.map_names;

        let mut result: HashMap<String, HashSet<String>> = HashMap::with_capacity(keyed_repository_names.len());
        for name in keyed_repository_names {
            let key = get_key_name(&name)?;
            let repo_type = get_keyed_repo_type(&name)?;

            let types = result.entry(key).or_default();
            types.insert(repo_type);
        }

        Ok(result)
    }

    /// Removes an entry (collection, repository, or keyed repository) from the catalog.
    ///
    /// # Arguments
    /// * `name` - The name of the entry to remove
    ///
    /// # Returns
    /// * `Ok(())` if the entry was successfully removed or did not exist
    /// * `Err(NitriteError)` if the operation fails
    pub fn remove(&self, name: &str) -> NitriteResult<()> {
        let mut updated_map = HashMap::new();

        let catalog_map = self.get_catalog_map()?;

        let entries = catalog_map.entries()?;
        for entry in entries {
            match entry {
                Ok(pair) => {
                    let catalog_name = pair.0;
                    let document = pair.1.as_document()
                        .ok_or_else(|| NitriteError::new(
                            "StoreCatalog: Invalid catalog entry format (expected Document)",
                            ErrorKind::InvalidOperation
                        ))?;
                    let mut meta_data = MapMeta::new(document);
                    if meta_data.map_names.contains(name) {
                        meta_data.map_names.remove(name);
                        updated_map.insert(catalog_name.clone(), meta_data.get_info());
                        break;
                    }
                }
                Err(e) => {
                    return Err(e);
                }
            }
        }

        for (catalog_name, meta_data) in updated_map {
            catalog_map.put(catalog_name, Value::from(meta_data))?;
        }
        Ok(())
    }

    fn get_catalog_map(&self) -> NitriteResult<NitriteMap> {
        Ok(self.catalog_map.clone())
    }
}
