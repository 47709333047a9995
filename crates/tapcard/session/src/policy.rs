//! Session freshness policy and time source

use std::fmt;
use std::time::Duration;

use async_trait::async_trait;
use tokio::time::Instant;

use crate::ARCULUS_AID;

/// What to do with a connection before the next exchange
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Freshness {
    /// Keep using the connected tag
    Fresh,
    /// Restart polling inside the current radio session and reconnect
    Renew,
    /// Tear the radio session down and begin a new one
    Restart,
}

/// Timing and filtering options for card sessions
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionPolicy {
    /// Connection age after which the tag is re-detected before an exchange
    pub renew_after: Duration,

    /// Session age after which the whole radio session is restarted
    pub restart_after: Duration,

    /// Pause between tearing a radio session down and beginning the next
    pub restart_cooldown: Duration,

    /// AID the wallet card must advertise
    pub expected_aid: &'static str,
}

impl Default for SessionPolicy {
    fn default() -> Self {
        Self {
            renew_after: Duration::from_secs(10),
            restart_after: Duration::from_secs(40),
            restart_cooldown: Duration::from_secs(5),
            expected_aid: ARCULUS_AID,
        }
    }
}

impl SessionPolicy {
    /// Create a new default policy
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the renew threshold
    pub const fn with_renew_after(mut self, renew_after: Duration) -> Self {
        self.renew_after = renew_after;
        self
    }

    /// Set the restart threshold
    pub const fn with_restart_after(mut self, restart_after: Duration) -> Self {
        self.restart_after = restart_after;
        self
    }

    /// Set the cool-down between restarts
    pub const fn with_restart_cooldown(mut self, restart_cooldown: Duration) -> Self {
        self.restart_cooldown = restart_cooldown;
        self
    }

    /// Set the expected AID
    pub const fn with_expected_aid(mut self, expected_aid: &'static str) -> Self {
        self.expected_aid = expected_aid;
        self
    }

    /// Classify a connection by session age and time since the last renew
    ///
    /// Restart takes precedence over renew.
    pub fn freshness(&self, age: Duration, since_renew: Duration) -> Freshness {
        if age >= self.restart_after {
            Freshness::Restart
        } else if since_renew >= self.renew_after {
            Freshness::Renew
        } else {
            Freshness::Fresh
        }
    }
}

/// Time source for session timestamps and back-off
#[async_trait]
pub trait Clock: Send + Sync + fmt::Debug {
    /// Current instant
    fn now(&self) -> Instant;

    /// Suspend for `duration`
    async fn sleep(&self, duration: Duration);
}

/// [`Clock`] backed by tokio's timer, pausable in tests
#[derive(Debug, Default, Clone, Copy)]
pub struct TokioClock;

#[async_trait]
impl Clock for TokioClock {
    fn now(&self) -> Instant {
        Instant::now()
    }

    async fn sleep(&self, duration: Duration) {
        tokio::time::sleep(duration).await;
    }
}
