//! Capability provider interface.
//!
//! One method per platform capability, each returning a `ProbeOutcome`
//! rather than a `Result`: a provider reports what it found, it never
//! propagates an error. Default implementations return `Unsupported`, so a
//! provider only overrides the capabilities its platform actually offers.

/// What a single capability probe observed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProbeOutcome {
    /// The capability was exercised end to end.
    Pass { detail: String },
    /// The capability exists but the exercise failed.
    Fail { detail: String },
    /// The platform does not offer this capability at all.
    Unsupported { detail: String },
}

impl ProbeOutcome {
    pub fn pass(detail: impl Into<String>) -> Self {
        Self::Pass {
            detail: detail.into(),
        }
    }

    pub fn fail(detail: impl Into<String>) -> Self {
        Self::Fail {
            detail: detail.into(),
        }
    }

    pub fn unsupported(detail: impl Into<String>) -> Self {
        Self::Unsupported {
            detail: detail.into(),
        }
    }
}

/// Platform capabilities the engine can exercise. Implementations must be
/// cheap to call repeatedly and must not retain state between calls.
pub trait CapabilityProvider: Send + Sync {
    /// Persistent key/value storage surviving process restarts.
    fn persistent_store(&self) -> ProbeOutcome {
        ProbeOutcome::unsupported("no persistent key/value store wired for this platform")
    }

    /// Structured local database with query support.
    fn structured_database(&self) -> ProbeOutcome {
        ProbeOutcome::unsupported("no structured local database wired for this platform")
    }

    /// Background worker registration and round trip.
    fn background_worker(&self) -> ProbeOutcome {
        ProbeOutcome::unsupported("no background worker facility wired for this platform")
    }

    /// Response caching layer for repeated reads.
    fn response_cache(&self) -> ProbeOutcome {
        ProbeOutcome::unsupported("no response cache wired for this platform")
    }

    /// Durable write queue that survives interruption.
    fn durable_queue(&self) -> ProbeOutcome {
        ProbeOutcome::unsupported("no durable write queue wired for this platform")
    }

    /// Payload compression for sync traffic.
    fn payload_compression(&self) -> ProbeOutcome {
        ProbeOutcome::unsupported("no payload compression wired for this platform")
    }

    /// Readiness to drain queued writes once connectivity returns.
    fn sync_readiness(&self) -> ProbeOutcome {
        ProbeOutcome::unsupported("no synchronization facility wired for this platform")
    }

    /// Semantic response cache keyed by normalized query fingerprints.
    fn semantic_cache(&self) -> ProbeOutcome {
        ProbeOutcome::unsupported("no semantic cache wired for this platform")
    }
}

/// Provider for hosts where nothing is available; every probe skips.
pub struct UnsupportedProvider;

impl CapabilityProvider for UnsupportedProvider {}
