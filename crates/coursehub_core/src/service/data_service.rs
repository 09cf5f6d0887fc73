//! Data-layer facade and user use-cases.
//!
//! # Responsibility
//! - Own the injected store, clock and credential hasher.
//! - Seed and upgrade persisted data when opened.
//! - Expose the user/account operations.
//!
//! # Invariants
//! - No two users share an email (case-insensitive).
//! - Passwords are hashed before any user record is written.
//! - Every public operation runs to completion synchronously.

use crate::clock::{Clock, SystemClock};
use crate::config::DataLayerConfig;
use crate::model::user::{validate_email, NewUser, Role, User, UserPatch};
use crate::model::{require_text, RecordId};
use crate::repo::{Collections, Created};
use crate::seed;
use crate::service::approval;
use crate::service::credentials::CredentialHasher;
use crate::service::error::{DataError, DataResult};
use crate::store::DurableStore;
use log::{info, warn};
use std::collections::HashMap;

pub struct DataService<S: DurableStore> {
    store: S,
    clock: Box<dyn Clock>,
    hasher: CredentialHasher,
}

impl<S: DurableStore> DataService<S> {
    /// Opens the data layer over `store` using the wall clock.
    pub fn open(store: S, config: &DataLayerConfig) -> DataResult<Self> {
        Self::open_with_clock(store, SystemClock, config)
    }

    /// Opens the data layer with an explicit time source.
    ///
    /// # Side effects
    /// - Seeds never-written collections when `seed_on_first_open` is set.
    /// - Rehashes legacy plaintext passwords.
    pub fn open_with_clock(
        store: S,
        clock: impl Clock + 'static,
        config: &DataLayerConfig,
    ) -> DataResult<Self> {
        let service = Self {
            store,
            clock: Box::new(clock),
            hasher: CredentialHasher::new(&config.password_hashing)?,
        };

        if config.seed_on_first_open {
            seed::seed_missing(&service.collections(), &service.hasher)?;
        }
        let upgraded = service.upgrade_legacy_credentials()?;
        info!(
            "event=data_open module=service status=ok namespace={} seeded={} credentials_upgraded={}",
            config.namespace, config.seed_on_first_open, upgraded
        );
        Ok(service)
    }

    pub fn collections(&self) -> Collections<'_> {
        Collections::new(&self.store, self.clock.as_ref())
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub(crate) fn now(&self) -> i64 {
        self.clock.now_ms()
    }

    pub(crate) fn hasher(&self) -> &CredentialHasher {
        &self.hasher
    }

    pub fn list_users(&self) -> DataResult<Vec<User>> {
        Ok(self.collections().users.list()?)
    }

    pub fn get_user_by_id(&self, id: RecordId) -> DataResult<Option<User>> {
        Ok(self.collections().users.get_by_id(id)?)
    }

    pub fn get_user_by_email(&self, email: &str) -> DataResult<Option<User>> {
        Ok(self.collections().users.find(|user| user.has_email(email))?)
    }

    /// Instructors awaiting admin approval.
    pub fn list_pending_instructors(&self) -> DataResult<Vec<User>> {
        Ok(self
            .collections()
            .users
            .filter(|user| user.is_instructor() && !user.approved)?)
    }

    /// Registers a user. A taken email yields `Created::AlreadyExists`.
    ///
    /// Instructors start unapproved; other roles start approved.
    pub fn create_user(&self, new_user: NewUser) -> DataResult<Created<User>> {
        require_text("name", &new_user.name)?;
        validate_email(&new_user.email)?;

        let users = self.collections().users;
        if let Some(existing) = users.find(|user| user.has_email(&new_user.email))? {
            info!("event=user_create module=service status=duplicate user_id={}", existing.id);
            return Ok(Created::AlreadyExists(existing));
        }

        let password_hash = self.hasher.hash(&new_user.password)?;
        let joined_date = self.now();
        let created = users.insert_unique(
            |user| user.has_email(&new_user.email),
            |id| User {
                id,
                name: new_user.name.trim().to_string(),
                email: new_user.email.trim().to_string(),
                password_hash,
                role: new_user.role,
                approved: new_user.role != Role::Instructor,
                avatar: new_user.avatar,
                joined_date,
            },
        )?;

        if let Created::New(user) = &created {
            info!(
                "event=user_create module=service status=ok user_id={} role={}",
                user.id,
                user.role.as_str()
            );
        }
        Ok(created)
    }

    /// Applies a profile patch. `None` when the user does not exist.
    ///
    /// Moving to an email owned by another user is a `Conflict`. Role and
    /// approval are not editable here.
    pub fn update_user(&self, id: RecordId, patch: UserPatch) -> DataResult<Option<User>> {
        let password_hash = match patch.password.as_deref() {
            Some(password) => Some(self.hasher.hash(password)?),
            None => None,
        };

        self.collections().users.transact(|users| {
            if let Some(email) = patch.email.as_deref() {
                if users.iter().any(|user| user.id != id && user.has_email(email)) {
                    let conflict = DataError::Conflict("email is already in use".to_string());
                    return (Err(conflict), false);
                }
            }
            let Some(user) = users.iter_mut().find(|user| user.id == id) else {
                return (Ok(None), false);
            };

            if let Some(name) = patch.name {
                user.name = name.trim().to_string();
            }
            if let Some(email) = patch.email {
                user.email = email.trim().to_string();
            }
            if let Some(hash) = password_hash {
                user.password_hash = hash;
            }
            if let Some(avatar) = patch.avatar {
                user.avatar = Some(avatar);
            }

            match user.validate() {
                Ok(()) => (Ok(Some(user.clone())), true),
                Err(err) => (Err(err.into()), false),
            }
        })?
    }

    /// Returns the user when `password` matches the stored hash.
    pub fn authenticate(&self, email: &str, password: &str) -> DataResult<Option<User>> {
        let user = self.get_user_by_email(email)?;
        let verified = user.filter(|user| self.hasher.verify(password, &user.password_hash));
        match &verified {
            Some(user) => info!("event=authenticate module=service status=ok user_id={}", user.id),
            None => warn!("event=authenticate module=service status=rejected"),
        }
        Ok(verified)
    }

    pub fn approve_instructor(&self, id: RecordId) -> DataResult<Option<User>> {
        let approved = approval::approve_instructor(&self.collections(), id)?;
        info!(
            "event=instructor_approve module=service user_id={id} found={}",
            approved.is_some()
        );
        Ok(approved)
    }

    /// Deletes a pending instructor. `false` when the user does not exist.
    pub fn reject_instructor(&self, id: RecordId) -> DataResult<bool> {
        let removed = approval::reject_instructor(&self.collections(), id)?;
        info!("event=instructor_reject module=service user_id={id} removed={removed}");
        Ok(removed)
    }

    /// Replaces plaintext passwords left by legacy layouts with hashes.
    pub(crate) fn upgrade_legacy_credentials(&self) -> DataResult<usize> {
        let users = self.collections().users;
        let mut rehashed = HashMap::new();
        for user in users.filter(|user| !CredentialHasher::is_hashed(&user.password_hash))? {
            rehashed.insert(user.id, self.hasher.hash(&user.password_hash)?);
        }
        if rehashed.is_empty() {
            return Ok(0);
        }

        let upgraded = users.modify_where(
            |user| rehashed.contains_key(&user.id),
            |user| match rehashed.get(&user.id) {
                Some(hash) => {
                    user.password_hash = hash.clone();
                    true
                }
                None => false,
            },
        )?;
        warn!("event=credentials_upgrade module=service status=ok users={upgraded}");
        Ok(upgraded)
    }
}
