use chrono::{DateTime, Duration, Utc};
use log::{debug, info};
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

use super::model::{OtpEntry, VerifyOutcome};
use crate::utils::helpers::{OTP_EXPIRATION_MINUTES, generate_otp_code};

/// Pending codes keyed by email address
pub trait OtpStore: Send + Sync {
    /// Issue a fresh code for `email`, replacing any pending one.
    fn issue(&self, email: &str) -> u32;

    /// Check `code`; consumes the entry on success or expiry.
    fn verify(&self, email: &str, code: u32) -> VerifyOutcome;

    /// Drop every expired entry, returning how many were removed.
    fn purge_expired(&self) -> usize;

    fn pending(&self) -> usize;
}

pub struct InMemoryOtpStore {
    entries: Mutex<HashMap<String, OtpEntry>>,
}

impl InMemoryOtpStore {
    pub fn new() -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
        }
    }

    // A panic while holding the lock cannot leave the map half-updated.
    fn lock(&self) -> MutexGuard<'_, HashMap<String, OtpEntry>> {
        self.entries.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn issue_at(&self, email: &str, now: DateTime<Utc>) -> u32 {
        let code = generate_otp_code();
        let entry = OtpEntry {
            code,
            expires_at: now + Duration::minutes(OTP_EXPIRATION_MINUTES),
        };

        if self.lock().insert(email.to_string(), entry).is_some() {
            debug!("Replaced pending OTP for {}", email);
        }
        code
    }

    fn verify_at(&self, email: &str, code: u32, now: DateTime<Utc>) -> VerifyOutcome {
        let mut entries = self.lock();

        let Some(entry) = entries.get(email) else {
            return VerifyOutcome::NotFound;
        };

        if now > entry.expires_at {
            entries.remove(email);
            return VerifyOutcome::Expired;
        }

        if entry.code != code {
            return VerifyOutcome::Mismatch;
        }

        entries.remove(email);
        VerifyOutcome::Success
    }

    fn purge_expired_at(&self, now: DateTime<Utc>) -> usize {
        let mut entries = self.lock();
        let before = entries.len();
        entries.retain(|_, entry| now <= entry.expires_at);
        before - entries.len()
    }
}

impl OtpStore for InMemoryOtpStore {
    fn issue(&self, email: &str) -> u32 {
        self.issue_at(email, Utc::now())
    }

    fn verify(&self, email: &str, code: u32) -> VerifyOutcome {
        self.verify_at(email, code, Utc::now())
    }

    fn purge_expired(&self) -> usize {
        self.purge_expired_at(Utc::now())
    }

    fn pending(&self) -> usize {
        self.lock().len()
    }
}

/// Periodically reclaim expired entries that were never verified.
pub fn spawn_expiry_sweep(
    store: Arc<dyn OtpStore>,
    every: std::time::Duration,
) -> tokio::task::JoinHandle<()> {
    info!("Starting OTP expiry sweep every {:?}", every);
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(every);
        // first tick completes immediately
        interval.tick().await;
        loop {
            interval.tick().await;
            let removed = store.purge_expired();
            if removed > 0 {
                info!(
                    "Swept {} expired OTP entries, {} pending",
                    removed,
                    store.pending()
                );
            }
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::helpers::{OTP_MAX, OTP_MIN};

    const EMAIL: &str = "alice@jyotirgamay.online";

    fn other_code(code: u32) -> u32 {
        if code == OTP_MAX { OTP_MIN } else { code + 1 }
    }

    #[test]
    fn issue_sets_five_minute_expiry() {
        let store = InMemoryOtpStore::new();
        let now = Utc::now();
        let code = store.issue_at(EMAIL, now);

        let entries = store.lock();
        let entry = entries.get(EMAIL).unwrap();
        assert_eq!(entry.code, code);
        assert_eq!(entry.expires_at, now + Duration::minutes(5));
    }

    #[test]
    fn mismatch_does_not_consume() {
        let store = InMemoryOtpStore::new();
        let code = store.issue(EMAIL);

        assert_eq!(store.verify(EMAIL, other_code(code)), VerifyOutcome::Mismatch);
        assert_eq!(store.pending(), 1);
        assert_eq!(store.verify(EMAIL, code), VerifyOutcome::Success);
    }

    #[test]
    fn success_consumes_entry() {
        let store = InMemoryOtpStore::new();
        let code = store.issue(EMAIL);

        assert_eq!(store.verify(EMAIL, code), VerifyOutcome::Success);
        assert_eq!(store.verify(EMAIL, code), VerifyOutcome::NotFound);
        assert_eq!(store.pending(), 0);
    }

    #[test]
    fn never_requested_is_not_found() {
        let store = InMemoryOtpStore::new();
        assert_eq!(store.verify(EMAIL, 123456), VerifyOutcome::NotFound);
    }

    #[test]
    fn expired_entry_is_removed_on_verify() {
        let store = InMemoryOtpStore::new();
        let issued = Utc::now() - Duration::minutes(10);
        let code = store.issue_at(EMAIL, issued);

        assert_eq!(store.verify(EMAIL, code), VerifyOutcome::Expired);
        assert_eq!(store.pending(), 0);
        assert_eq!(store.verify(EMAIL, code), VerifyOutcome::NotFound);
    }

    #[test]
    fn expiry_boundary_is_inclusive() {
        let store = InMemoryOtpStore::new();
        let issued = Utc::now();
        let deadline = issued + Duration::minutes(5);

        let code = store.issue_at(EMAIL, issued);
        assert_eq!(store.verify_at(EMAIL, code, deadline), VerifyOutcome::Success);

        let code = store.issue_at(EMAIL, issued);
        assert_eq!(
            store.verify_at(EMAIL, code, deadline + Duration::milliseconds(1)),
            VerifyOutcome::Expired
        );
    }

    #[test]
    fn expired_wrong_code_reports_expired() {
        let store = InMemoryOtpStore::new();
        let code = store.issue_at(EMAIL, Utc::now() - Duration::minutes(6));

        assert_eq!(store.verify(EMAIL, other_code(code)), VerifyOutcome::Expired);
        assert_eq!(store.pending(), 0);
    }

    #[test]
    fn reissue_invalidates_previous_code() {
        let store = InMemoryOtpStore::new();
        let first = store.issue(EMAIL);
        let mut second = store.issue(EMAIL);
        // the generator may repeat itself; keep issuing until the codes differ
        while second == first {
            second = store.issue(EMAIL);
        }

        assert_eq!(store.pending(), 1);
        assert_eq!(store.verify(EMAIL, first), VerifyOutcome::Mismatch);
        assert_eq!(store.verify(EMAIL, second), VerifyOutcome::Success);
    }

    #[test]
    fn reissue_restarts_the_timer() {
        let store = InMemoryOtpStore::new();
        let now = Utc::now();
        store.issue_at(EMAIL, now - Duration::minutes(4));
        let code = store.issue_at(EMAIL, now);

        assert_eq!(
            store.verify_at(EMAIL, code, now + Duration::minutes(3)),
            VerifyOutcome::Success
        );
    }

    #[test]
    fn purge_removes_only_expired() {
        let store = InMemoryOtpStore::new();
        let now = Utc::now();
        store.issue_at("old@jyotirgamay.online", now - Duration::minutes(6));
        store.issue_at("older@jyotirgamay.online", now - Duration::hours(1));
        let code = store.issue_at(EMAIL, now);

        assert_eq!(store.purge_expired_at(now), 2);
        assert_eq!(store.pending(), 1);
        assert_eq!(store.verify_at(EMAIL, code, now), VerifyOutcome::Success);
    }

    #[test]
    fn distinct_emails_do_not_interfere() {
        let store = InMemoryOtpStore::new();

        std::thread::scope(|s| {
            for i in 0..16 {
                let store = &store;
                s.spawn(move || {
                    let email = format!("user{i}@jyotirgamay.online");
                    for _ in 0..50 {
                        let code = store.issue(&email);
                        assert_eq!(store.verify(&email, other_code(code)), VerifyOutcome::Mismatch);
                        assert_eq!(store.verify(&email, code), VerifyOutcome::Success);
                        assert_eq!(store.verify(&email, code), VerifyOutcome::NotFound);
                    }
                });
            }
        });

        assert_eq!(store.pending(), 0);
    }

    #[test]
    fn same_email_issue_and_verify_are_serialized() {
        use std::sync::atomic::{AtomicBool, Ordering};

        let store = InMemoryOtpStore::new();
        // issued codes in issue order
        let issued: Mutex<Vec<u32>> = Mutex::new(Vec::new());
        let successes = Mutex::new(0usize);
        let done = AtomicBool::new(false);
        let (store, issued, successes, done) = (&store, &issued, &successes, &done);

        std::thread::scope(|s| {
            s.spawn(move || {
                while !done.load(Ordering::SeqCst) {
                    assert!(store.pending() <= 1);
                }
            });

            let workers: Vec<_> = (0..8)
                .map(|_| {
                    s.spawn(move || {
                        for _ in 0..200 {
                            let code = {
                                let mut log = issued.lock().unwrap();
                                let code = store.issue(EMAIL);
                                log.push(code);
                                code
                            };
                            let latest = *issued.lock().unwrap().last().unwrap();

                            match store.verify(EMAIL, code) {
                                VerifyOutcome::Success => {
                                    // a later issue would have replaced this code
                                    assert_eq!(code, latest);
                                    *successes.lock().unwrap() += 1;

                                    if store.verify(EMAIL, code) == VerifyOutcome::Success {
                                        let log = issued.lock().unwrap();
                                        let times = log.iter().filter(|c| **c == code).count();
                                        assert!(times > 1, "code {code} consumed twice");
                                    }
                                }
                                VerifyOutcome::Mismatch | VerifyOutcome::NotFound => {}
                                VerifyOutcome::Expired => panic!("fresh code reported expired"),
                            }
                        }
                    })
                })
                .collect();

            let results: Vec<_> = workers.into_iter().map(|w| w.join()).collect();
            done.store(true, Ordering::SeqCst);
            for result in results {
                result.unwrap();
            }
        });

        assert!(*successes.lock().unwrap() <= issued.lock().unwrap().len());
        assert!(store.pending() <= 1);

        let code = store.issue(EMAIL);
        assert_eq!(store.verify(EMAIL, code), VerifyOutcome::Success);
        assert_eq!(store.pending(), 0);
    }

    #[actix_web::test]
    async fn sweep_task_reclaims_expired_entries() {
        let store = Arc::new(InMemoryOtpStore::new());
        store.issue_at(EMAIL, Utc::now() - Duration::minutes(6));
        store.issue("fresh@jyotirgamay.online");

        let handle = spawn_expiry_sweep(store.clone(), std::time::Duration::from_millis(10));
        tokio::time::sleep(std::time::Duration::from_millis(100)).await;
        handle.abort();

        assert_eq!(store.pending(), 1);
    }
}
