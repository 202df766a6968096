//! Provider Selector Service
//!
//! Pure domain logic for choosing which upstream provider answers a query.
//! The only state is the rotation window, guarded by a single mutex.

use crate::domain::error::ConfigError;
use crate::domain::value_objects::{ProviderId, SelectionMode};
use parking_lot::Mutex;
use rand::seq::SliceRandom;
use std::time::{Duration, Instant};

/// Validated provider selection policy.
///
/// Build it with [`SelectionPolicy::new`] so pool and interval are checked
/// once at startup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SelectionPolicy {
    /// Always the same provider
    Single(ProviderId),
    /// Independent uniform draw per request
    Random(Vec<ProviderId>),
    /// Uniform draw kept until `interval` has elapsed
    Rotate {
        pool: Vec<ProviderId>,
        interval: Duration,
    },
}

impl SelectionPolicy {
    /// Validate a mode, pool and rotation interval.
    ///
    /// The interval is only checked for [`SelectionMode::Rotate`]; a zero or
    /// negative value is rejected, never clamped, and so is one whose
    /// deadline cannot be represented as an [`Instant`].
    pub fn new(
        mode: SelectionMode,
        pool: Vec<ProviderId>,
        rotate_interval_secs: i64,
    ) -> Result<Self, ConfigError> {
        let first = *pool.first().ok_or(ConfigError::EmptyPool)?;

        match mode {
            SelectionMode::Single => Ok(Self::Single(first)),
            SelectionMode::Random => Ok(Self::Random(pool)),
            SelectionMode::Rotate => {
                if rotate_interval_secs <= 0 {
                    return Err(ConfigError::NonPositiveInterval(rotate_interval_secs));
                }
                let interval = Duration::from_secs(rotate_interval_secs as u64);
                deadline_after(Instant::now(), interval)?;
                Ok(Self::Rotate { pool, interval })
            }
        }
    }

    pub fn mode(&self) -> SelectionMode {
        match self {
            Self::Single(_) => SelectionMode::Single,
            Self::Random(_) => SelectionMode::Random,
            Self::Rotate { .. } => SelectionMode::Rotate,
        }
    }

    /// Providers this policy can choose from.
    pub fn pool(&self) -> &[ProviderId] {
        match self {
            Self::Single(id) => std::slice::from_ref(id),
            Self::Random(pool) => pool,
            Self::Rotate { pool, .. } => pool,
        }
    }
}

/// Provider currently active under a rotate policy.
///
/// `current` and `deadline` are always replaced together.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RotationState {
    pub current: ProviderId,
    pub deadline: Instant,
    /// Number of redraws since startup
    pub rotations: u64,
}

/// Selection engine.
///
/// Rotation is lazy: the deadline is checked when a provider is requested,
/// and a new provider is drawn under the lock only once it has passed.
pub struct ProviderSelector {
    policy: SelectionPolicy,
    rotation: Option<Mutex<RotationState>>,
}

impl ProviderSelector {
    /// Create a selector whose first rotation window starts now.
    pub fn new(policy: SelectionPolicy) -> Self {
        Self::starting_at(policy, Instant::now())
    }

    /// Create a selector whose first rotation window starts at `now`.
    pub fn starting_at(policy: SelectionPolicy, now: Instant) -> Self {
        let rotation = match &policy {
            SelectionPolicy::Rotate { pool, interval } => {
                let deadline = deadline_after(now, *interval).ok();
                draw(pool).zip(deadline).map(|(current, deadline)| {
                    tracing::debug!("initial rotate provider: {}", current);
                    Mutex::new(RotationState {
                        current,
                        deadline,
                        rotations: 0,
                    })
                })
            }
            _ => None,
        };

        Self { policy, rotation }
    }

    pub fn policy(&self) -> &SelectionPolicy {
        &self.policy
    }

    /// Pick the provider for the current request.
    pub fn select(&self) -> Result<ProviderId, ConfigError> {
        self.select_at(Instant::now())
    }

    /// Pick the provider for a request observed at `now`.
    ///
    /// Only fails when the policy was built around an empty pool or an
    /// interval too large for a deadline, both of which
    /// [`SelectionPolicy::new`] prevents.
    pub fn select_at(&self, now: Instant) -> Result<ProviderId, ConfigError> {
        match &self.policy {
            SelectionPolicy::Single(id) => Ok(*id),
            SelectionPolicy::Random(pool) => draw(pool).ok_or(ConfigError::EmptyPool),
            SelectionPolicy::Rotate { pool, interval } => {
                let rotation = match &self.rotation {
                    Some(rotation) => rotation,
                    None if pool.is_empty() => return Err(ConfigError::EmptyPool),
                    None => return Err(interval_overflow(*interval)),
                };
                let mut state = rotation.lock();

                if now >= state.deadline {
                    let next = draw(pool).ok_or(ConfigError::EmptyPool)?;
                    *state = RotationState {
                        current: next,
                        deadline: deadline_after(now, *interval)?,
                        rotations: state.rotations + 1,
                    };
                    tracing::debug!(
                        "rotated upstream to {} (rotation #{})",
                        next,
                        state.rotations
                    );
                }

                Ok(state.current)
            }
        }
    }

    /// Copy of the rotation window, if the policy rotates.
    pub fn rotation_state(&self) -> Option<RotationState> {
        self.rotation.as_ref().map(|r| *r.lock())
    }
}

fn draw(pool: &[ProviderId]) -> Option<ProviderId> {
    pool.choose(&mut rand::thread_rng()).copied()
}

fn deadline_after(now: Instant, interval: Duration) -> Result<Instant, ConfigError> {
    now.checked_add(interval).ok_or_else(|| interval_overflow(interval))
}

fn interval_overflow(interval: Duration) -> ConfigError {
    ConfigError::InvalidValue {
        key: "rotate interval".to_string(),
        value: format!("{}s", interval.as_secs()),
    }
}
