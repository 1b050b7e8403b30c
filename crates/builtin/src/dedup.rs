use std::time::{Duration, Instant};

use {
    anyhow::Result,
    async_trait::async_trait,
    tracing::debug,
};

use {
    botplugs_common::{ExpiringMap, FilterCmd},
    botplugs_plugins::FilterCommand,
};

const FNV_OFFSET: u64 = 0xcbf2_9ce4_8422_2325;
const FNV_PRIME: u64 = 0x0000_0100_0000_01b3;

/// FNV-1a over the message and its target, with a separator so that
/// ("ab", "c") and ("a", "bc") differ.
pub fn fingerprint(message: &str, target: &str) -> u64 {
    message
        .bytes()
        .chain(std::iter::once(0))
        .chain(target.bytes())
        .fold(FNV_OFFSET, |hash, byte| {
            (hash ^ u64::from(byte)).wrapping_mul(FNV_PRIME)
        })
}

/// Drops a message already sent to the same target within the timeout.
pub struct DedupFilter {
    seen: ExpiringMap<u64>,
    timeout: Duration,
}

impl DedupFilter {
    pub fn new(timeout: Duration) -> Self {
        Self {
            seen: ExpiringMap::new(),
            timeout,
        }
    }

    pub fn from_minutes(minutes: u64) -> Self {
        Self::new(Duration::from_secs(minutes.saturating_mul(60)))
    }

    /// True when the message should be delivered.
    pub fn admit_at(&self, message: &str, target: &str, now: Instant) -> bool {
        self.seen
            .insert_if_absent_at(fingerprint(message, target), now, self.timeout)
    }
}

#[async_trait]
impl FilterCommand for DedupFilter {
    fn name(&self) -> &str {
        "dedup"
    }

    async fn filter(&self, cmd: &FilterCmd) -> Result<Option<String>> {
        if self.admit_at(&cmd.message, &cmd.target, Instant::now()) {
            Ok(Some(cmd.message.clone()))
        } else {
            debug!(channel = %cmd.target, "deduplicating message");
            Ok(None)
        }
    }
}
