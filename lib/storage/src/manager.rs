use crate::lmdb_storage::LmdbStorage;
use crate::records::{Listing, NewListing, NewSavedProperty, SavedProperty, Session, User};
use crate::{PropertyStore, SessionStore};
use chrono::Utc;
use estatex_core::{Error, Result};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, info};

fn storage_err(e: anyhow::Error) -> Error {
    Error::Storage(e.to_string())
}

/// Owns the LMDB environment and exposes it through the store traits.
pub struct StorageManager {
    data_dir: PathBuf,
    lmdb: Arc<LmdbStorage>,
}

impl StorageManager {
    pub fn new<P: AsRef<Path>>(data_dir: P) -> Result<Self> {
        let data_dir = data_dir.as_ref().to_path_buf();
        std::fs::create_dir_all(&data_dir)?;

        let lmdb_path = data_dir.join("lmdb");
        let lmdb = Arc::new(LmdbStorage::new(&lmdb_path).map_err(storage_err)?);
        info!(path = %lmdb_path.display(), "Relational store opened");

        Ok(Self { data_dir, lmdb })
    }

    #[inline]
    #[must_use]
    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    /// Provisioning: users are normally created by the auth service.
    pub fn put_user(&self, user: &User) -> Result<()> {
        self.lmdb.save_user(user).map_err(storage_err)
    }

    /// Provisioning: sessions are normally written by the auth service.
    pub fn put_session(&self, token: &str, session: &Session) -> Result<()> {
        self.lmdb.save_session(token, session).map_err(storage_err)
    }
}

impl SessionStore for StorageManager {
    fn user_for_session(&self, token: &str) -> Result<Option<u64>> {
        let session = self.lmdb.get_session(token).map_err(storage_err)?;
        Ok(session
            .filter(|s| !s.is_expired(Utc::now()))
            .map(|s| s.user_id))
    }

    fn get_user(&self, id: u64) -> Result<Option<User>> {
        self.lmdb.get_user(id).map_err(storage_err)
    }
}

impl PropertyStore for StorageManager {
    fn save_property(&self, user_id: u64, new: NewSavedProperty) -> Result<SavedProperty> {
        let created_at = Utc::now();
        let record = self
            .lmdb
            .insert_saved(|id| new.into_record(id, user_id, created_at))
            .map_err(storage_err)?;
        debug!(id = record.id, user_id, "Saved property");
        Ok(record)
    }

    fn saved_properties(&self, user_id: u64) -> Result<Vec<SavedProperty>> {
        self.lmdb.saved_for_user(user_id).map_err(storage_err)
    }

    fn remove_property(&self, user_id: u64, id: u64) -> Result<bool> {
        self.lmdb.delete_saved(user_id, id).map_err(storage_err)
    }

    fn create_listing(&self, user_id: u64, new: NewListing) -> Result<Listing> {
        let created_at = Utc::now();
        let record = self
            .lmdb
            .insert_listing(|id| new.into_record(id, user_id, created_at))
            .map_err(storage_err)?;
        debug!(id = record.id, user_id, "Created listing");
        Ok(record)
    }

    fn listings(&self, user_id: u64) -> Result<Vec<Listing>> {
        self.lmdb.listings_for_user(user_id).map_err(storage_err)
    }

    fn delete_listing(&self, user_id: u64, id: u64) -> Result<bool> {
        self.lmdb.delete_listing(user_id, id).map_err(storage_err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::records::{Category, ListingType};
    use serde_json::json;

    fn manager() -> (tempfile::TempDir, StorageManager) {
        let dir = tempfile::tempdir().unwrap();
        let manager = StorageManager::new(dir.path()).unwrap();
        (dir, manager)
    }

    fn saved(city: &str) -> NewSavedProperty {
        NewSavedProperty::from_json(&json!({
            "city": city, "location": "Baner", "property_type": "Apartment",
            "bedrooms": 2, "area_sqft": 900, "seller_name": "Asha", "seller_phone": "98"
        }))
        .unwrap()
    }

    #[test]
    fn test_session_lookup() {
        let (_dir, m) = manager();
        m.put_user(&User { id: 1, username: "asha".into(), email: "a@x.in".into() }).unwrap();
        m.put_session("tok", &Session { user_id: 1, expires_at: None }).unwrap();
        m.put_session(
            "old",
            &Session { user_id: 1, expires_at: Some(Utc::now() - chrono::Duration::hours(1)) },
        )
        .unwrap();

        assert_eq!(m.user_for_session("tok").unwrap(), Some(1));
        assert_eq!(m.user_for_session("old").unwrap(), None);
        assert_eq!(m.user_for_session("nope").unwrap(), None);
        assert_eq!(m.get_user(1).unwrap().unwrap().username, "asha");
    }

    #[test]
    fn test_saved_properties_are_per_user() {
        let (_dir, m) = manager();
        let a = m.save_property(1, saved("Pune")).unwrap();
        let b = m.save_property(2, saved("Mumbai")).unwrap();
        assert_ne!(a.id, b.id);

        let mine = m.saved_properties(1).unwrap();
        assert_eq!(mine.len(), 1);
        assert_eq!(mine[0].city, "Pune");

        // not owned
        assert!(!m.remove_property(1, b.id).unwrap());
        assert!(m.remove_property(1, a.id).unwrap());
        assert!(!m.remove_property(1, a.id).unwrap());
        assert!(m.saved_properties(1).unwrap().is_empty());
        assert_eq!(m.saved_properties(2).unwrap().len(), 1);
    }

    #[test]
    fn test_listings_roundtrip_and_delete() {
        let (_dir, m) = manager();
        let new = NewListing::from_json(&json!({
            "listing_type": "Sell", "category": "Residential", "city": "Pune",
            "location": "Wakad", "property_type": "Villa", "bedrooms": 4,
            "area": 2400, "price": 21000000, "phone_number": "98"
        }))
        .unwrap();
        let listing = m.create_listing(5, new).unwrap();
        assert_eq!(listing.listing_type, ListingType::Sell);

        let stored = m.listings(5).unwrap();
        assert_eq!(stored, vec![listing.clone()]);
        assert_eq!(stored[0].category, Category::Residential);

        assert!(!m.delete_listing(6, listing.id).unwrap());
        assert!(m.delete_listing(5, listing.id).unwrap());
    }

    #[test]
    fn test_data_survives_reopen() {
        let dir = tempfile::tempdir().unwrap();
        {
            let m = StorageManager::new(dir.path()).unwrap();
            m.save_property(1, saved("Pune")).unwrap();
        }
        let m = StorageManager::new(dir.path()).unwrap();
        assert_eq!(m.saved_properties(1).unwrap().len(), 1);
        let next = m.save_property(1, saved("Pune")).unwrap();
        assert_eq!(next.id, 2);
    }
}
