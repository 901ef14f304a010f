use argon2::{password_hash::SaltString, Argon2, PasswordHash, PasswordHasher, PasswordVerifier};
use rand::rngs::OsRng;
use std::sync::Arc;

use crate::{
    doc,
    errors::{ErrorKind, NitriteError, NitriteResult},
    store::{NitriteMapProvider, NitriteStore, NitriteStoreProvider},
};

use super::{Value, USER_MAP};

/// Manages user authentication and password operations.
///
/// This struct provides user authentication, password creation, validation,
/// and password update functionality using Argon2 password hashing. It manages
/// user credentials stored in the database and enforces security constraints.
///
/// # Responsibilities
///
/// * **User Authentication**: Creates new users or validates existing ones during authentication
/// * **Password Hashing**: Uses Argon2 to securely hash and verify passwords
/// * **Credential Storage**: Manages user credentials in the database
/// * **Password Updates**: Allows users to change their passwords with verification
/// * **Validation**: Ensures both username and password are provided when required
/// * **Error Handling**: Returns detailed security errors for various failure scenarios
#[derive(Clone)]
pub(crate) struct AuthService {
    inner: Arc<AuthServiceInner>,
}

impl AuthService {
    /// Creates a new authentication service instance.
    pub(crate) fn new(store: NitriteStore) -> Self {
        AuthService {
            inner: Arc::new(AuthServiceInner::new(store.clone())),
        }
    }

    /// Authenticates a user with username and password.
    ///
    /// If both username and password are provided and no users exist, creates a new user.
    /// If users exist, validates the provided credentials against stored user.
    /// If neither username nor password are provided, succeeds only if no users exist.
    pub(crate) fn authenticate(
        &self,
        username: Option<&str>,
        password: Option<&str>,
    ) -> NitriteResult<()> {
        self.inner.authenticate(username, password)
    }

    /// Updates a user's password with verification of the old password.
    pub(crate) fn update_password(
        &self,
        username: &str,
        old_password: &str,
        new_password: &str,
    ) -> NitriteResult<()> {
        self.inner.update_password(username, old_password, new_password)
    }

    /// Adds a new user or updates an existing user's password.
    pub(crate) fn add_update_password(
        &self,
        username: &str,
        old_password: &str,
        new_password: &str,
        update: bool,
    ) -> NitriteResult<()> {
        self.inner.add_update_password(username, old_password, new_password, update)
    }
}

/// Inner implementation of the authentication service.
pub(crate) struct AuthServiceInner {
    store: NitriteStore,
}

impl AuthServiceInner {
    #[inline]
    pub(crate) fn new(store: NitriteStore) -> Self {
        AuthServiceInner { store }
    }

    #[inline]
    pub(crate) fn authenticate(
        &self,
        username: Option<&str>,
        password: Option<&str>,
    ) -> NitriteResult<()> {
        let existing_user = self.store.has_map(USER_MAP)?;

        match (username, password) {
            (Some(u), Some(p)) => {
                if !existing_user {
                    self.create_user(u, p)
                } else {
                    self.validate_user(u, p)
                }
            }
            (None, None) => {
                if existing_user {
                    log::error!("Username or password is invalid");
                    Err(NitriteError::new(
                        "Username or password is invalid",
                        ErrorKind::SecurityError,
                    ))
                } else {
                    Ok(())
                }
            }
            _ => {
                log::error!("Username or password is invalid");
                Err(NitriteError::new(
                    "Username or password is invalid",
                    ErrorKind::SecurityError,
                ))
            }
        }
    }

    pub(crate) fn add_update_password(
        &self,
        username: &str,
        old_password: &str,
        new_password: &str,
        update: bool,
    ) -> NitriteResult<()> {
        if update {
            return self.update_password(username, old_password, new_password);
        }
        self.create_user(username, new_password)
    }

    #[inline]
    fn create_user(&self, username: &str, password: &str) -> NitriteResult<()> {
        let user_map = self.store.open_map(USER_MAP)?;
        let password = password.as_bytes();

        let salt = SaltString::generate(&mut OsRng);
        let argon2 = Argon2::default();
        let hash = argon2.hash_password(password, &salt);

        match hash {
            Ok(hash) => {
                let doc = doc!{
                    "hash": (hash.to_string()),
                };

                user_map.put(Value::from(username), Value::from(doc))?;
                Ok(())
            }
            Err(e) => {
                log::error!("Failed to create user: {:?}", e);
                Err(NitriteError::new(
                    "Username or password is invalid",
                    ErrorKind::SecurityError,
                ))
            },
        }
    }

    #[inline]
    fn validate_user(&self, username: &str, password: &str) -> NitriteResult<()> {
        let user_map = self.store.open_map(USER_MAP)?;
        let credential_doc = user_map.get(&Value::from(username))?;

        if credential_doc.is_none() {
            log::error!("Username or password is invalid");
            return Err(NitriteError::new(
                "Username or password is invalid",
                ErrorKind::SecurityError,
            ));
        }

        // Validate credential is a Document before accessing
        let credential_doc = match credential_doc.unwrap().as_document() {
            Some(doc) => doc.clone(),
            None => {
                log::error!("User credential is not a valid document: {}", username);
                return Err(NitriteError::new(
                    "Invalid user credential format",
                    ErrorKind::SecurityError,
                ));
            }
        };

        let binding = credential_doc.get("hash")?;
        let expected_hash = binding.as_string().map_or("", |v| v);

        let password = password.as_bytes();
        let parsed_hash = PasswordHash::new(expected_hash);

        match parsed_hash {
            Ok(parsed_hash) => {
                let result = Argon2::default().verify_password(password, &parsed_hash);
                match result {
                    Ok(_) => Ok(()),
                    Err(e) => {
                        log::error!("Username or password is invalid: {:?}", e);
                        Err(NitriteError::new(
                            "Username or password is invalid",
                            ErrorKind::SecurityError,
                        ))
                    },
                }
            }
            Err(e) => {
                log::error!("Username or password is invalid: {:?}", e);
                Err(NitriteError::new(
                    "Username or password is invalid",
                    ErrorKind::SecurityError,
                ))
            }
        }
    }

    #[inline]
    pub(crate) fn update_password(
        &self,
        username: &str,
        old_password: &str,
        new_password: &str,
    ) -> NitriteResult<()> {
        let user_map = self.store.open_map(USER_MAP)?;
        let credential_doc = user_map.get(&Value::from(username))?;

        if credential_doc.is_none() {
            log::error!("Username or password is invalid");
            return Err(NitriteError::new(
                "Username or password is invalid",
                ErrorKind::SecurityError,
            ));
        }

        // Validate credential is a Document before accessing
        let credential_doc = match credential_doc.unwrap().as_document() {
            Some(doc) => doc.clone(),
            None => {
                log::error!("User credential is not a valid document: {}", username);
                return Err(NitriteError::new(
                    "Invalid user credential format",
                    ErrorKind::SecurityError,
                ));
            }
        };

        let binding = credential_doc.get("hash")?;
        let expected_hash = binding.as_string().map_or("", |v| v);

        let old_password = old_password.as_bytes();
        let new_password = new_password.as_bytes();
        let parsed_hash = PasswordHash::new(expected_hash);

        match parsed_hash {
            Ok(parsed_hash) => {
                let result = Argon2::default().verify_password(old_password, &parsed_hash);
                match result {
                    Ok(_) => {
                        let salt = SaltString::generate(&mut OsRng);
                        let argon2 = Argon2::default();
                        let hash = argon2.hash_password(new_password, &salt);

                        match hash {
                            Ok(hash) => {
                                let doc = doc!{
                                    "hash": (hash.to_string()),
                                };

                                user_map.put(Value::from(username), Value::from(doc))?;
                                Ok(())
                            }
                            Err(e) => {
                                log::error!("Failed to update password: {:?}", e);
                                Err(NitriteError::new(
                                    "Username or password is invalid",
                                    ErrorKind::SecurityError,
                                ))
                            },
                        }
                    }
                    Err(e) => {
                        log::error!("Failed to update password: {:?}", e);
                        Err(NitriteError::new(
                            "Username or password is invalid",
                            ErrorKind::SecurityError,
                        ))
                    },
                }
            }
            Err(e) => {
                log::error!("Failed to update password: {:?}", e);
                Err(NitriteError::new(
                    "Username or password is invalid",
                    ErrorKind::SecurityError,
                ))
            }
        }
    }
}
