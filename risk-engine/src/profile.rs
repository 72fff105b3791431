//! Per-user behavioral profiles
//!
//! Rolling statistics built lazily from historical paid transactions and
//! kept in a shared in-memory cache. Updates are serialized per user: each
//! profile lives behind its own mutex, so two concurrent transactions for
//! the same user cannot lose a read-modify-write. Profiles are updated only
//! after a transaction has been scored, so a transaction never inflates its
//! own risk.

use std::collections::HashSet;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use dashmap::DashMap;
use parking_lot::Mutex;
use rust_decimal::prelude::ToPrimitive;

use crate::history::TransactionHistory;
use crate::types::{StoredTransaction, TransactionContext};
use crate::Result;

/// Coarse location key derived from an IP address.
///
/// Uses the /16 IPv4 prefix; non-IPv4 addresses fall back to the raw string.
pub fn location_key(ip_address: &str) -> String {
    let octets: Vec<&str> = ip_address.split('.').collect();
    if octets.len() == 4 {
        format!("{}.{}", octets[0], octets[1])
    } else {
        ip_address.to_string()
    }
}

/// Rolling statistical summary of one user's payment behavior
#[derive(Debug, Clone)]
pub struct UserRiskProfile {
    /// User this profile describes
    pub user_id: String,

    /// Number of transactions observed
    pub transaction_count: u64,

    /// Running mean of transaction amounts
    pub average_amount: f64,

    /// Welford M2 accumulator for the running variance
    m2: f64,

    /// Device fingerprints this user has paid from
    pub known_devices: HashSet<String>,

    /// Session types this user has booked before
    pub preferred_session_types: HashSet<String>,

    /// Coarse locations this user has paid from
    pub known_locations: HashSet<String>,

    /// Last time the profile was touched
    pub last_updated: DateTime<Utc>,
}

impl UserRiskProfile {
    /// Empty profile for a user with no observed transactions
    pub fn new(user_id: impl Into<String>) -> Self {
        Self {
            user_id: user_id.into(),
            transaction_count: 0,
            average_amount: 0.0,
            m2: 0.0,
            known_devices: HashSet::new(),
            preferred_session_types: HashSet::new(),
            known_locations: HashSet::new(),
            last_updated: Utc::now(),
        }
    }

    /// Sample standard deviation of observed amounts (0 below two samples)
    pub fn stddev_amount(&self) -> f64 {
        if self.transaction_count > 1 {
            (self.m2 / (self.transaction_count - 1) as f64).sqrt()
        } else {
            0.0
        }
    }

    /// Fold one amount into the running mean/variance (Welford update)
    fn observe_amount(&mut self, amount: f64) {
        self.transaction_count += 1;
        let delta = amount - self.average_amount;
        self.average_amount += delta / self.transaction_count as f64;
        let delta2 = amount - self.average_amount;
        self.m2 += delta * delta2;
    }

    /// Fold one transaction context into the profile
    fn observe(&mut self, ctx: &TransactionContext) {
        self.observe_amount(ctx.amount.to_f64().unwrap_or(0.0));
        if let Some(device) = &ctx.device_fingerprint {
            self.known_devices.insert(device.clone());
        }
        self.preferred_session_types.insert(ctx.session_type.clone());
        self.known_locations.insert(location_key(&ctx.ip_address));
        self.last_updated = ctx.timestamp;
    }

    /// Fold one stored transaction into the profile (lazy rebuild path)
    fn observe_stored(&mut self, tx: &StoredTransaction) {
        self.observe_amount(tx.amount.to_f64().unwrap_or(0.0));
        if let Some(device) = &tx.device_fingerprint {
            self.known_devices.insert(device.clone());
        }
        self.preferred_session_types.insert(tx.session_type.clone());
        self.known_locations.insert(location_key(&tx.ip_address));
        self.last_updated = tx.created_at;
    }
}

/// Shared in-memory cache of user profiles, keyed by user id
///
/// Constructed once at process start and passed by reference; there is no
/// global instance. Profiles only grow and are never deleted at runtime.
#[derive(Default)]
pub struct ProfileStore {
    profiles: DashMap<String, Arc<Mutex<UserRiskProfile>>>,
}

impl ProfileStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of cached profiles
    pub fn len(&self) -> usize {
        self.profiles.len()
    }

    /// True when no profiles are cached
    pub fn is_empty(&self) -> bool {
        self.profiles.is_empty()
    }

    /// Snapshot of a cached profile, if one exists
    pub fn snapshot(&self, user_id: &str) -> Option<UserRiskProfile> {
        self.profiles.get(user_id).map(|entry| entry.lock().clone())
    }

    /// Fetch a profile, lazily building it from the user's paid history.
    ///
    /// Returns `None` for a user with no cached profile and no paid
    /// transactions: analyzers treat such users with conservative defaults,
    /// and the profile is created by `record_observation` after scoring.
    pub fn get_or_build(
        &self,
        user_id: &str,
        history: &dyn TransactionHistory,
    ) -> Result<Option<UserRiskProfile>> {
        if let Some(profile) = self.snapshot(user_id) {
            return Ok(Some(profile));
        }

        let paid = history.paid_transactions(user_id)?;
        if paid.is_empty() {
            return Ok(None);
        }

        let mut profile = UserRiskProfile::new(user_id);
        for tx in &paid {
            profile.observe_stored(tx);
        }

        let entry = self
            .profiles
            .entry(user_id.to_string())
            .or_insert_with(|| Arc::new(Mutex::new(profile)));
        let result = entry.lock().clone();
        Ok(Some(result))
    }

    /// Fold a scored transaction into the user's profile.
    ///
    /// Called by the engine strictly after scoring completes. Creates the
    /// profile on first observation of a user.
    pub fn record_observation(&self, ctx: &TransactionContext) {
        let entry = self
            .profiles
            .entry(ctx.user_id.clone())
            .or_insert_with(|| Arc::new(Mutex::new(UserRiskProfile::new(&ctx.user_id))))
            .clone();
        entry.lock().observe(ctx);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;
    use uuid::Uuid;

    fn ctx(user: &str, amount: u64) -> TransactionContext {
        TransactionContext {
            user_id: user.to_string(),
            session_id: Uuid::new_v4(),
            amount: Decimal::from(amount),
            phone_number: "254700000001".to_string(),
            device_fingerprint: Some("dev-a".to_string()),
            ip_address: "41.90.12.7".to_string(),
            session_type: "individual".to_string(),
            timestamp: Utc::now(),
        }
    }

    #[test]
    fn welford_mean_and_stddev() {
        let store = ProfileStore::new();
        for amount in [2_000u64, 2_500, 3_000] {
            store.record_observation(&ctx("u1", amount));
        }

        let profile = store.snapshot("u1").unwrap();
        assert_eq!(profile.transaction_count, 3);
        assert!((profile.average_amount - 2_500.0).abs() < 1e-9);
        assert!((profile.stddev_amount() - 500.0).abs() < 1e-6);
    }

    #[test]
    fn stddev_is_zero_below_two_samples() {
        let store = ProfileStore::new();
        store.record_observation(&ctx("u1", 2_500));
        let profile = store.snapshot("u1").unwrap();
        assert_eq!(profile.stddev_amount(), 0.0);
    }

    #[test]
    fn profile_accumulates_sets() {
        let store = ProfileStore::new();
        let mut first = ctx("u1", 1_000);
        first.session_type = "group".to_string();
        store.record_observation(&first);
        store.record_observation(&ctx("u1", 1_200));

        let profile = store.snapshot("u1").unwrap();
        assert!(profile.preferred_session_types.contains("group"));
        assert!(profile.preferred_session_types.contains("individual"));
        assert!(profile.known_devices.contains("dev-a"));
        assert!(profile.known_locations.contains("41.90"));
    }

    #[test]
    fn concurrent_observations_never_lose_updates() {
        let store = Arc::new(ProfileStore::new());
        let mut handles = Vec::new();

        for _ in 0..4 {
            let store = store.clone();
            handles.push(std::thread::spawn(move || {
                for _ in 0..250 {
                    store.record_observation(&ctx("hot-user", 2_500));
                }
            }));
        }
        for handle in handles {
            handle.join().unwrap();
        }

        let profile = store.snapshot("hot-user").unwrap();
        assert_eq!(profile.transaction_count, 1_000);
        assert!((profile.average_amount - 2_500.0).abs() < 1e-9);
    }

    #[test]
    fn location_key_uses_slash16_prefix() {
        assert_eq!(location_key("41.90.12.7"), "41.90");
        assert_eq!(location_key("::1"), "::1");
    }
}
