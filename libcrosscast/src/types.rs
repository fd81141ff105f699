//! Request and result records shared by the dispatcher and the CLI

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::platforms::PlatformId;

/// Which platforms a message should be sent to
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RequestFlags {
    pub twitter: bool,
    pub mastodon: bool,
    pub threads: bool,
    pub bluesky: bool,
    pub nostr: bool,
}

impl RequestFlags {
    /// Every platform requested
    pub fn all() -> Self {
        Self {
            twitter: true,
            mastodon: true,
            threads: true,
            bluesky: true,
            nostr: true,
        }
    }

    /// Flags with exactly the given platforms requested
    pub fn only(ids: &[PlatformId]) -> Self {
        let mut flags = Self::default();
        for id in ids {
            flags.set(*id, true);
        }
        flags
    }

    pub fn get(&self, id: PlatformId) -> bool {
        match id {
            PlatformId::Twitter => self.twitter,
            PlatformId::Mastodon => self.mastodon,
            PlatformId::Threads => self.threads,
            PlatformId::Bluesky => self.bluesky,
            PlatformId::Nostr => self.nostr,
        }
    }

    pub fn set(&mut self, id: PlatformId, requested: bool) {
        match id {
            PlatformId::Twitter => self.twitter = requested,
            PlatformId::Mastodon => self.mastodon = requested,
            PlatformId::Threads => self.threads = requested,
            PlatformId::Bluesky => self.bluesky = requested,
            PlatformId::Nostr => self.nostr = requested,
        }
    }

    /// True when no platform is requested
    pub fn is_empty(&self) -> bool {
        PlatformId::ALL.iter().all(|id| !self.get(*id))
    }

    /// Requested platforms, in output order
    pub fn requested(&self) -> impl Iterator<Item = PlatformId> + '_ {
        PlatformId::ALL.into_iter().filter(move |id| self.get(*id))
    }
}

/// Per-platform result of a cross-post
///
/// Every platform is always present; anything not attempted is `false`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PostOutcome {
    pub twitter: bool,
    pub mastodon: bool,
    pub threads: bool,
    pub bluesky: bool,
    pub nostr: bool,
}

impl PostOutcome {
    pub fn get(&self, id: PlatformId) -> bool {
        match id {
            PlatformId::Twitter => self.twitter,
            PlatformId::Mastodon => self.mastodon,
            PlatformId::Threads => self.threads,
            PlatformId::Bluesky => self.bluesky,
            PlatformId::Nostr => self.nostr,
        }
    }

    pub fn set(&mut self, id: PlatformId, succeeded: bool) {
        match id {
            PlatformId::Twitter => self.twitter = succeeded,
            PlatformId::Mastodon => self.mastodon = succeeded,
            PlatformId::Threads => self.threads = succeeded,
            PlatformId::Bluesky => self.bluesky = succeeded,
            PlatformId::Nostr => self.nostr = succeeded,
        }
    }

    /// Platforms that accepted the post
    pub fn succeeded(&self) -> impl Iterator<Item = PlatformId> + '_ {
        PlatformId::ALL.into_iter().filter(move |id| self.get(*id))
    }
}

impl fmt::Display for PostOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let fields: Vec<String> = PlatformId::ALL
            .iter()
            .map(|id| format!("{}: {}", id, self.get(*id)))
            .collect();
        write!(f, "{{ {} }}", fields.join(", "))
    }
}
