//! Movement policies that propose absolute targets for individual soldiers.

use std::fmt;

use rand::{Rng, RngCore};
use skirmish_core::{BoxError, GridPoint, PolicyFailure, SoldierSnapshot};

/// Largest offset the random walk applies along each axis.
const RANDOM_WALK_REACH: i32 = 1;

/// Rule that computes a soldier's next target position.
///
/// Implementations return an absolute coordinate. The world clamps it to the
/// grid afterwards, so targets outside the battlefield are allowed.
pub trait MovementPolicy: fmt::Debug {
    /// Proposes the position the soldier should occupy after this turn.
    fn target(
        &self,
        soldier: &SoldierSnapshot,
        rng: &mut dyn RngCore,
    ) -> Result<GridPoint, PolicyFailure>;
}

/// Uniform random walk: each axis shifts by -1, 0 or +1 independently.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct RandomWalk;

impl MovementPolicy for RandomWalk {
    fn target(
        &self,
        soldier: &SoldierSnapshot,
        rng: &mut dyn RngCore,
    ) -> Result<GridPoint, PolicyFailure> {
        let dx = rng.gen_range(-RANDOM_WALK_REACH..=RANDOM_WALK_REACH);
        let dy = rng.gen_range(-RANDOM_WALK_REACH..=RANDOM_WALK_REACH);
        Ok(soldier.position.offset(dx, dy))
    }
}

/// Keeps every soldier where it stands.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Stationary;

impl MovementPolicy for Stationary {
    fn target(
        &self,
        soldier: &SoldierSnapshot,
        _rng: &mut dyn RngCore,
    ) -> Result<GridPoint, PolicyFailure> {
        Ok(soldier.position)
    }
}

/// Adapter around an opaque decision capability.
///
/// The capability receives the soldier's current position and answers with a
/// raw target coordinate pair. It is invoked once per soldier per turn and no
/// state is threaded between invocations. Raw answers must be finite whole
/// numbers within the `i32` range.
pub struct ExternalDecision<F> {
    decide: F,
}

impl<F> ExternalDecision<F>
where
    F: Fn(GridPoint) -> Result<(f64, f64), BoxError>,
{
    /// Wraps the provided capability.
    pub fn new(decide: F) -> Self {
        Self { decide }
    }
}

impl<F> fmt::Debug for ExternalDecision<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ExternalDecision").finish_non_exhaustive()
    }
}

impl<F> MovementPolicy for ExternalDecision<F>
where
    F: Fn(GridPoint) -> Result<(f64, f64), BoxError>,
{
    fn target(
        &self,
        soldier: &SoldierSnapshot,
        _rng: &mut dyn RngCore,
    ) -> Result<GridPoint, PolicyFailure> {
        let (x, y) = (self.decide)(soldier.position).map_err(PolicyFailure::Capability)?;
        Ok(GridPoint::new(coordinate(x)?, coordinate(y)?))
    }
}

/// Converts a raw coordinate returned by a decision capability.
pub fn coordinate(value: f64) -> Result<i32, PolicyFailure> {
    if !value.is_finite() {
        return Err(PolicyFailure::NonFinite { value });
    }
    if value.fract() != 0.0 {
        return Err(PolicyFailure::Fractional { value });
    }
    if value < f64::from(i32::MIN) || value > f64::from(i32::MAX) {
        return Err(PolicyFailure::OutOfRange { value });
    }
    Ok(value as i32)
}
