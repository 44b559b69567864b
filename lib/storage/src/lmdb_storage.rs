// LMDB-backed relational store: users, sessions, saved properties, listings
use crate::records::{Listing, SavedProperty, Session, User};
use anyhow::Result;
use heed::byteorder::BE;
use heed::types::{Bytes, Str, U64};
use heed::{Database, Env, EnvOpenOptions, RwTxn};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::path::Path;
use std::sync::Arc;

const DB_USERS: &str = "users";
const DB_SESSIONS: &str = "sessions";
const DB_SAVED_PROPERTIES: &str = "saved_properties";
const DB_LISTINGS: &str = "listings";
const DB_COUNTERS: &str = "counters";

type IdDb = Database<U64<BE>, Bytes>;

pub struct LmdbStorage {
    env: Arc<Env>,
    users_db: IdDb,
    sessions_db: Database<Str, Bytes>,
    saved_db: IdDb,
    listings_db: IdDb,
    counters_db: Database<Str, U64<BE>>,
}

fn encode<T: Serialize>(value: &T) -> Result<Vec<u8>> {
    Ok(bincode::serialize(value)?)
}

fn decode<T: DeserializeOwned>(bytes: &[u8]) -> Result<T> {
    Ok(bincode::deserialize(bytes)?)
}

impl LmdbStorage {
    pub fn new<P: AsRef<Path>>(path: P) -> Result<Self> {
        std::fs::create_dir_all(&path)?;

        let env = Arc::new(unsafe {
            EnvOpenOptions::new()
                .map_size(1024 * 1024 * 1024) // 1GB
                .max_dbs(8)
                .open(path)?
        });

        let mut wtxn = env.write_txn()?;
        let users_db = env.create_database(&mut wtxn, Some(DB_USERS))?;
        let sessions_db = env.create_database(&mut wtxn, Some(DB_SESSIONS))?;
        let saved_db = env.create_database(&mut wtxn, Some(DB_SAVED_PROPERTIES))?;
        let listings_db = env.create_database(&mut wtxn, Some(DB_LISTINGS))?;
        let counters_db = env.create_database(&mut wtxn, Some(DB_COUNTERS))?;
        wtxn.commit()?;

        Ok(Self {
            env,
            users_db,
            sessions_db,
            saved_db,
            listings_db,
            counters_db,
        })
    }

    /// Next id for `table`, allocated inside the caller's transaction.
    fn next_id(&self, wtxn: &mut RwTxn, table: &str) -> Result<u64> {
        let id = self.counters_db.get(wtxn, table)?.unwrap_or(0) + 1;
        self.counters_db.put(wtxn, table, &id)?;
        Ok(id)
    }

    fn get_by_id<T: DeserializeOwned>(&self, db: IdDb, id: u64) -> Result<Option<T>> {
        let rtxn = self.env.read_txn()?;
        match db.get(&rtxn, &id)? {
            Some(data) => Ok(Some(decode(data)?)),
            None => Ok(None),
        }
    }

    fn scan<T: DeserializeOwned>(&self, db: IdDb, keep: impl Fn(&T) -> bool) -> Result<Vec<T>> {
        let rtxn = self.env.read_txn()?;
        let mut out = Vec::new();
        for result in db.iter(&rtxn)? {
            let (_, data) = result?;
            let value: T = decode(data)?;
            if keep(&value) {
                out.push(value);
            }
        }
        Ok(out)
    }

    /// Delete `id` when `owned` accepts the stored value. Returns whether a
    /// row was removed.
    fn delete_owned<T: DeserializeOwned>(
        &self,
        db: IdDb,
        id: u64,
        owned: impl Fn(&T) -> bool,
    ) -> Result<bool> {
        let mut wtxn = self.env.write_txn()?;
        let accepted = match db.get(&wtxn, &id)? {
            Some(data) => owned(&decode(data)?),
            None => false,
        };
        if accepted {
            db.delete(&mut wtxn, &id)?;
        }
        wtxn.commit()?;
        Ok(accepted)
    }

    pub fn save_user(&self, user: &User) -> Result<()> {
        let mut wtxn = self.env.write_txn()?;
        self.users_db.put(&mut wtxn, &user.id, &encode(user)?)?;
        wtxn.commit()?;
        Ok(())
    }

    pub fn get_user(&self, id: u64) -> Result<Option<User>> {
        self.get_by_id(self.users_db, id)
    }

    pub fn save_session(&self, token: &str, session: &Session) -> Result<()> {
        let mut wtxn = self.env.write_txn()?;
        self.sessions_db.put(&mut wtxn, token, &encode(session)?)?;
        wtxn.commit()?;
        Ok(())
    }

    pub fn get_session(&self, token: &str) -> Result<Option<Session>> {
        let rtxn = self.env.read_txn()?;
        match self.sessions_db.get(&rtxn, token)? {
            Some(data) => Ok(Some(decode(data)?)),
            None => Ok(None),
        }
    }

    /// Store a saved property built from its freshly allocated id.
    pub fn insert_saved(&self, build: impl FnOnce(u64) -> SavedProperty) -> Result<SavedProperty> {
        let mut wtxn = self.env.write_txn()?;
        let record = build(self.next_id(&mut wtxn, DB_SAVED_PROPERTIES)?);
        self.saved_db.put(&mut wtxn, &record.id, &encode(&record)?)?;
        wtxn.commit()?;
        Ok(record)
    }

    pub fn saved_for_user(&self, user_id: u64) -> Result<Vec<SavedProperty>> {
        self.scan(self.saved_db, |p: &SavedProperty| p.user_id == user_id)
    }

    pub fn delete_saved(&self, user_id: u64, id: u64) -> Result<bool> {
        self.delete_owned(self.saved_db, id, |p: &SavedProperty| p.user_id == user_id)
    }

    pub fn insert_listing(&self, build: impl FnOnce(u64) -> Listing) -> Result<Listing> {
        let mut wtxn = self.env.write_txn()?;
        let record = build(self.next_id(&mut wtxn, DB_LISTINGS)?);
        self.listings_db.put(&mut wtxn, &record.id, &encode(&record)?)?;
        wtxn.commit()?;
        Ok(record)
    }

    pub fn listings_for_user(&self, user_id: u64) -> Result<Vec<Listing>> {
        self.scan(self.listings_db, |l: &Listing| l.user_id == user_id)
    }

    pub fn delete_listing(&self, user_id: u64, id: u64) -> Result<bool> {
        self.delete_owned(self.listings_db, id, |l: &Listing| l.user_id == user_id)
    }
}
