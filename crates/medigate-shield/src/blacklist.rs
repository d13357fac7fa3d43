//! Temporary IP blacklist with self-expiring entries.

use std::net::IpAddr;

use chrono::{DateTime, Duration, Utc};
use dashmap::DashMap;
use tracing::{info, warn};

/// Temporary IP bans, checked before any rate counter.
///
/// Entries expire lazily on lookup and eagerly via the sweep; a re-ban
/// while an entry is live extends it to the new expiry.
#[derive(Debug, Default)]
pub struct IpBlacklist {
    /// Banned IP → expiry time.
    bans: DashMap<IpAddr, DateTime<Utc>>,
}

impl IpBlacklist {
    /// Creates an empty blacklist.
    pub fn new() -> Self {
        Self::default()
    }

    /// Bans an IP for the given duration.
    pub fn ban(&self, ip: IpAddr, duration_minutes: u64) {
        let expires_at = Utc::now() + Duration::minutes(duration_minutes as i64);
        self.bans.insert(ip, expires_at);
        warn!(ip = %ip, expires_at = %expires_at, "IP blacklisted");
    }

    /// Whether the IP currently has a live ban. An expired entry is
    /// removed on the spot.
    pub fn is_banned(&self, ip: IpAddr) -> bool {
        let Some(entry) = self.bans.get(&ip) else {
            return false;
        };
        if *entry > Utc::now() {
            return true;
        }
        drop(entry);
        self.bans.remove_if(&ip, |_, expires_at| *expires_at <= Utc::now());
        false
    }

    /// Seconds until the IP's ban expires, if it has a live one.
    pub fn remaining_seconds(&self, ip: IpAddr) -> Option<u64> {
        let entry = self.bans.get(&ip)?;
        let remaining = (*entry - Utc::now()).num_seconds();
        (remaining > 0).then_some(remaining as u64)
    }

    /// Lifts a ban ahead of its expiry (administrative surface).
    pub fn lift(&self, ip: IpAddr) -> bool {
        let removed = self.bans.remove(&ip).is_some();
        if removed {
            info!(ip = %ip, "IP ban lifted");
        }
        removed
    }

    /// Drops expired bans.
    pub fn sweep(&self, now: DateTime<Utc>) -> usize {
        let before = self.bans.len();
        self.bans.retain(|_, expires_at| *expires_at > now);
        before - self.bans.len()
    }

    /// Number of live bans (including not-yet-swept expired entries).
    pub fn len(&self) -> usize {
        self.bans.len()
    }

    /// Whether no bans are held.
    pub fn is_empty(&self) -> bool {
        self.bans.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ip() -> IpAddr {
        "203.0.113.10".parse().unwrap()
    }

    #[test]
    fn test_ban_and_check() {
        let blacklist = IpBlacklist::new();
        assert!(!blacklist.is_banned(ip()));

        blacklist.ban(ip(), 60);
        assert!(blacklist.is_banned(ip()));
        assert!(blacklist.remaining_seconds(ip()).is_some());
    }

    #[test]
    fn test_expired_ban_reads_as_absent() {
        let blacklist = IpBlacklist::new();
        blacklist.bans.insert(ip(), Utc::now() - Duration::seconds(1));

        assert!(!blacklist.is_banned(ip()));
        // Lazy expiry removed the entry.
        assert!(blacklist.is_empty());
    }

    #[test]
    fn test_lift_removes_live_ban() {
        let blacklist = IpBlacklist::new();
        blacklist.ban(ip(), 60);

        assert!(blacklist.lift(ip()));
        assert!(!blacklist.is_banned(ip()));
        assert!(!blacklist.lift(ip()));
    }

    #[test]
    fn test_sweep_drops_only_expired() {
        let blacklist = IpBlacklist::new();
        blacklist.bans.insert(ip(), Utc::now() - Duration::seconds(1));
        blacklist.ban("198.51.100.7".parse().unwrap(), 60);

        assert_eq!(blacklist.sweep(Utc::now()), 1);
        assert_eq!(blacklist.len(), 1);
    }
}
