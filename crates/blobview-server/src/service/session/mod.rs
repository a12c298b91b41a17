//! Viewer sessions keyed by a browser cookie.

mod settings;

use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use blobview_core::{PageCursor, QuerySignature};
use tokio::sync::{Mutex, OwnedMutexGuard, RwLock};
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use uuid::Uuid;

pub use self::settings::{SettingsUpdate, ViewerSettings};

/// Tracing target for session management.
const TRACING_TARGET: &str = "blobview_server::service::session";

/// Longest pause between two sweeps of idle sessions.
const MAX_SWEEP_PERIOD: Duration = Duration::from_secs(60);

/// Name of the cookie carrying the session id.
pub const SESSION_COOKIE: &str = "blobview_session";

/// State owned by one browser session.
#[derive(Debug, Clone)]
pub struct ViewerSession {
    /// Current form values.
    pub settings: ViewerSettings,
    /// Paging position.
    pub cursor: PageCursor,
    /// Signature of the settings the cursor's tokens were issued under.
    pub signature: Option<QuerySignature>,
}

impl ViewerSession {
    /// Creates a session on the first page of `settings`.
    pub fn new(settings: ViewerSettings) -> Self {
        Self {
            settings,
            cursor: PageCursor::new(),
            signature: None,
        }
    }
}

/// Exclusive access to one session, held for the length of a request.
pub type SessionHandle = OwnedMutexGuard<ViewerSession>;

#[derive(Debug)]
struct SessionEntry {
    session: Arc<Mutex<ViewerSession>>,
    last_seen: Instant,
}

/// All live sessions.
///
/// Each session sits behind its own mutex, so requests of one browser are
/// processed one at a time while different browsers proceed in parallel.
/// Sessions unused for longer than the TTL are dropped.
#[derive(Debug, Clone)]
pub struct SessionStore {
    inner: Arc<RwLock<HashMap<Uuid, SessionEntry>>>,
    defaults: Arc<ViewerSettings>,
    ttl: Duration,
}

impl SessionStore {
    /// Creates an empty store. New sessions start from `defaults`.
    pub fn new(defaults: ViewerSettings, ttl: Duration) -> Self {
        Self {
            inner: Arc::default(),
            defaults: Arc::new(defaults),
            ttl,
        }
    }

    /// Locks the session `id`, creating a fresh one when it is unknown or
    /// expired. Returns the id actually used.
    pub async fn acquire(&self, id: Option<Uuid>) -> (Uuid, SessionHandle) {
        let now = Instant::now();
        let (id, session) = {
            let mut sessions = self.inner.write().await;

            let existing = id.and_then(|id| {
                let entry = sessions.get_mut(&id)?;
                if now.duration_since(entry.last_seen) >= self.ttl {
                    return None;
                }
                entry.last_seen = now;
                Some((id, entry.session.clone()))
            });

            match existing {
                Some(found) => found,
                None => {
                    sweep(&mut sessions, self.ttl, now);

                    let id = Uuid::new_v4();
                    let session = Arc::new(Mutex::new(ViewerSession::new(
                        self.defaults.as_ref().clone(),
                    )));
                    sessions.insert(
                        id,
                        SessionEntry {
                            session: session.clone(),
                            last_seen: now,
                        },
                    );

                    tracing::debug!(
                        target: TRACING_TARGET,
                        session_id = %id,
                        active_sessions = sessions.len(),
                        "Created viewer session"
                    );

                    (id, session)
                }
            }
        };

        (id, session.lock_owned().await)
    }

    /// Locks an existing, unexpired session without creating one.
    pub async fn find(&self, id: Uuid) -> Option<SessionHandle> {
        let session = {
            let mut sessions = self.inner.write().await;
            let entry = sessions.get_mut(&id)?;
            let now = Instant::now();
            if now.duration_since(entry.last_seen) >= self.ttl {
                return None;
            }
            entry.last_seen = now;
            entry.session.clone()
        };

        Some(session.lock_owned().await)
    }

    /// Starts a background task that drops idle sessions once per TTL, and
    /// at least once a minute.
    ///
    /// The task ends after every clone of the store has been dropped. Must
    /// be called from within a Tokio runtime.
    pub fn spawn_sweeper(&self) -> JoinHandle<()> {
        let sessions = Arc::downgrade(&self.inner);
        let ttl = self.ttl;
        let period = ttl.clamp(Duration::from_millis(1), MAX_SWEEP_PERIOD);

        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                ticker.tick().await;
                let Some(sessions) = sessions.upgrade() else {
                    break;
                };
                sweep(&mut *sessions.write().await, ttl, Instant::now());
            }
        })
    }

    /// Returns the number of stored sessions, expired ones included.
    pub async fn len(&self) -> usize {
        self.inner.read().await.len()
    }

    /// Returns whether no session is stored.
    pub async fn is_empty(&self) -> bool {
        self.inner.read().await.is_empty()
    }
}

fn sweep(sessions: &mut HashMap<Uuid, SessionEntry>, ttl: Duration, now: Instant) {
    let before = sessions.len();
    sessions.retain(|_, entry| now.duration_since(entry.last_seen) < ttl);
    let removed = before - sessions.len();

    if removed > 0 {
        tracing::debug!(
            target: TRACING_TARGET,
            removed,
            active_sessions = sessions.len(),
            "Evicted idle viewer sessions"
        );
    }
}
