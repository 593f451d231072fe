use std::collections::HashMap;

use crate::models::{Role, Session};

/// Key names shared with the external login flow.
pub mod keys {
    pub const ACCESS_TOKEN: &str = "access_token";
    pub const USER_ROLE: &str = "user_role";
    pub const USER_ID: &str = "user_id";
    pub const USER_GRADE: &str = "user_grade";
    pub const USER_IS_VERIFIED: &str = "user_is_verified";
}

// 1. IdentityStore Contract
/// IdentityStore
///
/// The string key-value persistence the session lives in (browser local storage on the
/// front end). Every value is a string at this boundary; `Session::load` and
/// `Session::persist` are the only places that convert to and from typed fields.
pub trait IdentityStore {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&mut self, key: &str, value: String);
    fn remove(&mut self, key: &str);
}

// 2. In-memory implementation
/// MemoryStore
///
/// HashMap-backed store. Used by the navigation service, where the front end ships its
/// store snapshot with each request, and by the tests.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MemoryStore {
    entries: HashMap<String, String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn into_map(self) -> HashMap<String, String> {
        self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl From<HashMap<String, String>> for MemoryStore {
    fn from(entries: HashMap<String, String>) -> Self {
        Self { entries }
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for MemoryStore {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            entries: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}

impl IdentityStore for MemoryStore {
    fn get(&self, key: &str) -> Option<String> {
        self.entries.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: String) {
        self.entries.insert(key.to_string(), value);
    }

    fn remove(&mut self, key: &str) {
        self.entries.remove(key);
    }
}

/// Reads a key, treating empty strings and the JS artifacts "null"/"undefined" as absent.
fn read_text<S: IdentityStore + ?Sized>(store: &S, key: &str) -> Option<String> {
    store.get(key).and_then(|value| {
        let trimmed = value.trim();
        match trimmed {
            "" | "null" | "undefined" => None,
            _ => Some(trimmed.to_string()),
        }
    })
}

fn write_text<S: IdentityStore + ?Sized>(store: &mut S, key: &str, value: Option<&str>) {
    match value {
        Some(value) => store.set(key, value.to_string()),
        None => store.remove(key),
    }
}

// 3. Boundary conversions
impl Session {
    /// load
    ///
    /// Builds a typed session from the store. An unknown role string yields no role,
    /// and only the literal "true" (any case) counts as verified.
    pub fn load<S: IdentityStore + ?Sized>(store: &S) -> Self {
        let role = read_text(store, keys::USER_ROLE).and_then(|raw| match raw.parse::<Role>() {
            Ok(role) => Some(role),
            Err(e) => {
                tracing::debug!(error = %e, "ignoring stored role");
                None
            }
        });

        Self {
            token: read_text(store, keys::ACCESS_TOKEN),
            role,
            user_id: read_text(store, keys::USER_ID),
            grade: read_text(store, keys::USER_GRADE),
            is_verified: read_text(store, keys::USER_IS_VERIFIED)
                .is_some_and(|v| v.eq_ignore_ascii_case("true")),
        }
    }

    /// persist
    ///
    /// Writes every session field back. Absent fields remove their key so the store never
    /// holds "null" strings.
    pub fn persist<S: IdentityStore + ?Sized>(&self, store: &mut S) {
        write_text(store, keys::ACCESS_TOKEN, self.token.as_deref());
        write_text(store, keys::USER_ROLE, self.role.as_ref().map(Role::as_str));
        write_text(store, keys::USER_ID, self.user_id.as_deref());
        write_text(store, keys::USER_GRADE, self.grade.as_deref());
        store.set(keys::USER_IS_VERIFIED, self.is_verified.to_string());
    }

    /// persist_changes
    ///
    /// Writes only the fields that differ from `before`. A failed refresh therefore touches
    /// nothing but `access_token`.
    pub fn persist_changes<S: IdentityStore + ?Sized>(&self, before: &Session, store: &mut S) {
        if self.token != before.token {
            write_text(store, keys::ACCESS_TOKEN, self.token.as_deref());
        }
        if self.role != before.role {
            write_text(store, keys::USER_ROLE, self.role.as_ref().map(Role::as_str));
        }
        if self.user_id != before.user_id {
            write_text(store, keys::USER_ID, self.user_id.as_deref());
        }
        if self.grade != before.grade {
            write_text(store, keys::USER_GRADE, self.grade.as_deref());
        }
        if self.is_verified != before.is_verified {
            store.set(keys::USER_IS_VERIFIED, self.is_verified.to_string());
        }
    }
}
