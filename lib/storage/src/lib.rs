//! # EstateX Storage
//!
//! Users, sessions, saved properties and listings in LMDB (via `heed`),
//! values encoded with `bincode`.

pub mod lmdb_storage;
pub mod manager;
pub mod records;

pub use lmdb_storage::LmdbStorage;
pub use manager::StorageManager;
pub use records::{
    Category, Listing, ListingType, NewListing, NewSavedProperty, OwnedView, SavedProperty,
    Session, User, UserProfile,
};

use estatex_core::Result;

/// Resolves session tokens to users. Sessions are issued elsewhere.
pub trait SessionStore: Send + Sync {
    /// User id behind a live session, `None` for unknown or expired tokens
    fn user_for_session(&self, token: &str) -> Result<Option<u64>>;

    fn get_user(&self, id: u64) -> Result<Option<User>>;
}

/// Per-user saved properties and listings.
///
/// Deletes only succeed for the owner and report `false` otherwise.
pub trait PropertyStore: Send + Sync {
    fn save_property(&self, user_id: u64, new: NewSavedProperty) -> Result<SavedProperty>;

    fn saved_properties(&self, user_id: u64) -> Result<Vec<SavedProperty>>;

    fn remove_property(&self, user_id: u64, id: u64) -> Result<bool>;

    fn create_listing(&self, user_id: u64, new: NewListing) -> Result<Listing>;

    fn listings(&self, user_id: u64) -> Result<Vec<Listing>>;

    fn delete_listing(&self, user_id: u64, id: u64) -> Result<bool>;
}
