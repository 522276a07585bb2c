//! Session validity check
//!
//! Decides from the persisted token alone whether the console should treat
//! the user as signed in. A token that is missing, malformed, or expired is
//! invalid; the last two are purged from the store as a side effect. A valid
//! token is never touched.

use std::fmt;

use common::{ROLE_KEY, SessionStore, TOKEN_KEY};
use tracing::{debug, info, warn};

use crate::token::{TokenError, decode_claims};

/// Source of the current wall-clock instant
pub trait Clock: Send + Sync {
    /// Milliseconds since the Unix epoch
    fn now_ms(&self) -> i64;
}

/// Clock reading the system time
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_ms(&self) -> i64 {
        chrono::Utc::now().timestamp_millis()
    }
}

/// Clock frozen at a fixed instant
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub i64);

impl Clock for FixedClock {
    fn now_ms(&self) -> i64 {
        self.0
    }
}

/// Why a session was judged invalid
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InvalidReason {
    /// Nothing persisted under the token key
    NoToken,
    /// Token could not be decoded or lacks an expiry
    Malformed,
    /// Token expiry is at or before the check instant
    Expired,
}

impl fmt::Display for InvalidReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let reason = match self {
            InvalidReason::NoToken => "no token",
            InvalidReason::Malformed => "malformed token",
            InvalidReason::Expired => "expired token",
        };
        f.write_str(reason)
    }
}

/// Outcome of a validity check
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    Valid,
    Invalid(InvalidReason),
}

impl Verdict {
    pub fn is_valid(self) -> bool {
        matches!(self, Verdict::Valid)
    }
}

/// What happens to the stored role when an invalid token is purged
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RolePurge {
    /// Leave the role in place; it is ignored until the next sign-in overwrites it
    #[default]
    Keep,
    /// Remove the role together with the token
    WithToken,
}

/// Checks the persisted token for presence, shape and expiry
pub struct TokenValidator<S, C = SystemClock> {
    store: S,
    clock: C,
    role_purge: RolePurge,
}

impl<S: SessionStore> TokenValidator<S, SystemClock> {
    /// Create a validator reading the system clock
    pub fn new(store: S) -> Self {
        Self::with_clock(store, SystemClock)
    }
}

impl<S: SessionStore, C: Clock> TokenValidator<S, C> {
    /// Create a validator with an explicit clock
    pub fn with_clock(store: S, clock: C) -> Self {
        Self {
            store,
            clock,
            role_purge: RolePurge::default(),
        }
    }

    /// Set the role purge policy
    pub fn role_purge(mut self, role_purge: RolePurge) -> Self {
        self.role_purge = role_purge;
        self
    }

    /// The store this validator reads from
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Whether the persisted session is usable right now
    ///
    /// Never fails: every problem, including a store that cannot be read,
    /// yields `false`.
    pub fn is_session_valid(&self) -> bool {
        self.check().is_valid()
    }

    /// Run the check and report why a session was rejected
    pub fn check(&self) -> Verdict {
        let token = match self.store.get(TOKEN_KEY) {
            Ok(Some(token)) => token,
            Ok(None) => return Verdict::Invalid(InvalidReason::NoToken),
            Err(e) => {
                warn!("Failed to read session token: {}", e);
                return Verdict::Invalid(InvalidReason::NoToken);
            }
        };

        let expires_at_ms = match decode_claims(&token).and_then(|claims| claims.expires_at_ms()) {
            Ok(expires_at_ms) => expires_at_ms,
            Err(e) => {
                self.reject(InvalidReason::Malformed, Some(&e));
                return Verdict::Invalid(InvalidReason::Malformed);
            }
        };

        if self.clock.now_ms() >= expires_at_ms {
            self.reject(InvalidReason::Expired, None);
            return Verdict::Invalid(InvalidReason::Expired);
        }

        debug!("Session token valid until {} ms", expires_at_ms);
        Verdict::Valid
    }

    fn reject(&self, reason: InvalidReason, cause: Option<&TokenError>) {
        match cause {
            Some(cause) => info!("Discarding session token ({}): {}", reason, cause),
            None => info!("Discarding session token ({})", reason),
        }

        if let Err(e) = self.store.remove(TOKEN_KEY) {
            warn!("Failed to remove session token: {}", e);
        }

        if self.role_purge == RolePurge::WithToken {
            if let Err(e) = self.store.remove(ROLE_KEY) {
                warn!("Failed to remove session role: {}", e);
            }
        }
    }
}
