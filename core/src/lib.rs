#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Core contracts shared across the Skirmish battle simulation.
//!
//! This crate defines the message surface that connects adapters, the
//! authoritative world, and pure systems. Systems inspect immutable
//! [`SoldierView`] snapshots and respond with [`Command`] values describing
//! desired mutations, the world executes those commands via its `apply` entry
//! point, and then broadcasts [`Event`] values describing what changed.

use std::{error::Error as StdError, fmt, str::FromStr};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Boxed error returned by opaque decision capabilities.
pub type BoxError = Box<dyn StdError + Send + Sync + 'static>;

/// Commands that express all permissible world mutations.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Command {
    /// Adds a new soldier to the end of the battlefield roster.
    DeploySoldier {
        /// Attributes assigned to the soldier.
        spec: SoldierSpec,
    },
    /// Requests that a soldier relocate to the provided absolute target.
    ///
    /// The world clamps the target to the grid bounds before applying it.
    MoveSoldier {
        /// Identifier of the soldier being moved.
        soldier: SoldierId,
        /// Absolute destination proposed by the soldier's movement policy.
        target: GridPoint,
    },
    /// Removes a soldier that lost an engagement.
    DefeatSoldier {
        /// Identifier of the defeated soldier.
        soldier: SoldierId,
        /// Identifier of the soldier that won the engagement.
        victor: SoldierId,
    },
    /// Closes the current turn and records survivor counts in the history.
    CompleteTurn,
}

/// Events broadcast by the world after processing commands.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Event {
    /// Confirms that a soldier joined the battlefield.
    SoldierDeployed {
        /// Identifier allocated to the soldier.
        soldier: SoldierId,
        /// Team the soldier fights for.
        team: Team,
        /// Unit kind of the soldier.
        kind: UnitKind,
        /// Initial position, which may lie outside the grid.
        position: GridPoint,
    },
    /// Confirms that a soldier changed position.
    SoldierMoved {
        /// Identifier of the soldier that moved.
        soldier: SoldierId,
        /// Position occupied before the move.
        from: GridPoint,
        /// Position occupied after clamping to the grid.
        to: GridPoint,
    },
    /// Confirms that a soldier was removed after losing an engagement.
    SoldierDefeated {
        /// Identifier of the removed soldier.
        soldier: SoldierId,
        /// Team the removed soldier fought for.
        team: Team,
        /// Identifier of the soldier that won the engagement.
        victor: SoldierId,
    },
    /// Announces that a turn completed and its survivor counts were recorded.
    TurnCompleted {
        /// History entry appended for the turn.
        record: TurnRecord,
    },
}

/// One of the two opposing sides.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Team {
    /// Team steered by the external decision capability.
    A,
    /// Team steered by the random walk.
    B,
}

impl Team {
    /// Both teams in canonical order.
    pub const ALL: [Team; 2] = [Team::A, Team::B];

    /// Human-readable label of the team.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::A => "A",
            Self::B => "B",
        }
    }
}

impl fmt::Display for Team {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Team {
    type Err = ConfigError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim() {
            "A" | "a" => Ok(Self::A),
            "B" | "b" => Ok(Self::B),
            other => Err(ConfigError::UnknownTeam(other.to_owned())),
        }
    }
}

/// Kinds of units that can be fielded. Used for presentation only.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UnitKind {
    /// Line infantry.
    Soldier,
    /// Mounted heavy unit.
    Knight,
    /// Ranged unit.
    Archer,
}

impl UnitKind {
    /// Every unit kind in presentation order.
    pub const ALL: [UnitKind; 3] = [UnitKind::Soldier, UnitKind::Knight, UnitKind::Archer];

    /// Lowercase label of the unit kind.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Soldier => "soldier",
            Self::Knight => "knight",
            Self::Archer => "archer",
        }
    }
}

impl fmt::Display for UnitKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for UnitKind {
    type Err = ConfigError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let trimmed = value.trim();
        Self::ALL
            .into_iter()
            .find(|kind| kind.label().eq_ignore_ascii_case(trimmed))
            .ok_or_else(|| ConfigError::UnknownUnitKind(trimmed.to_owned()))
    }
}

/// Unique identifier assigned to a soldier by the world.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SoldierId(u32);

impl SoldierId {
    /// Creates a new soldier identifier with the provided numeric value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

impl fmt::Display for SoldierId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Integer position on the battlefield.
///
/// Coordinates are signed because soldiers may be deployed, or proposed a
/// move, outside the grid before the world clamps them.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct GridPoint {
    x: i32,
    y: i32,
}

impl GridPoint {
    /// Creates a new grid point.
    #[must_use]
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Horizontal coordinate.
    #[must_use]
    pub const fn x(&self) -> i32 {
        self.x
    }

    /// Vertical coordinate.
    #[must_use]
    pub const fn y(&self) -> i32 {
        self.y
    }

    /// Computes the Manhattan distance between two points.
    #[must_use]
    pub fn manhattan_distance(self, other: GridPoint) -> u32 {
        self.x.abs_diff(other.x).saturating_add(self.y.abs_diff(other.y))
    }

    /// Returns the point shifted by the provided offsets, saturating at the `i32` bounds.
    #[must_use]
    pub fn offset(self, dx: i32, dy: i32) -> Self {
        Self {
            x: self.x.saturating_add(dx),
            y: self.y.saturating_add(dy),
        }
    }
}

impl fmt::Display for GridPoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

/// Dimensions of the battlefield grid. Both axes are strictly positive.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "RawGridSize")]
pub struct GridSize {
    width: u32,
    height: u32,
}

#[derive(Deserialize)]
struct RawGridSize {
    width: i64,
    height: i64,
}

impl TryFrom<RawGridSize> for GridSize {
    type Error = ConfigError;

    fn try_from(raw: RawGridSize) -> Result<Self, Self::Error> {
        Self::try_new(raw.width, raw.height)
    }
}

impl GridSize {
    /// Validates and creates grid dimensions.
    ///
    /// Accepts signed values so configuration layers can forward raw input;
    /// zero, negative, or values beyond `i32::MAX` are rejected.
    pub fn try_new(width: i64, height: i64) -> Result<Self, ConfigError> {
        if width <= 0 || height <= 0 {
            return Err(ConfigError::NonPositiveGrid { width, height });
        }
        let limit = i64::from(i32::MAX);
        if width > limit || height > limit {
            return Err(ConfigError::GridTooLarge { width, height });
        }
        Ok(Self {
            width: width as u32,
            height: height as u32,
        })
    }

    /// Number of columns in the grid.
    #[must_use]
    pub const fn width(&self) -> u32 {
        self.width
    }

    /// Number of rows in the grid.
    #[must_use]
    pub const fn height(&self) -> u32 {
        self.height
    }

    /// Largest valid x coordinate.
    #[must_use]
    pub const fn max_x(&self) -> i32 {
        self.width as i32 - 1
    }

    /// Largest valid y coordinate.
    #[must_use]
    pub const fn max_y(&self) -> i32 {
        self.height as i32 - 1
    }

    /// Reports whether the point lies inside the grid.
    #[must_use]
    pub fn contains(&self, point: GridPoint) -> bool {
        (0..=self.max_x()).contains(&point.x()) && (0..=self.max_y()).contains(&point.y())
    }

    /// Clamps each coordinate of the point independently into the grid.
    #[must_use]
    pub fn clamp(&self, point: GridPoint) -> GridPoint {
        GridPoint::new(
            point.x().clamp(0, self.max_x()),
            point.y().clamp(0, self.max_y()),
        )
    }
}

/// Attributes of a soldier requested for deployment.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SoldierSpec {
    /// Initial position.
    pub position: GridPoint,
    /// Combat strength added to every roll.
    pub strength: u32,
    /// Unit kind used for presentation.
    pub kind: UnitKind,
    /// Team the soldier fights for.
    pub team: Team,
    /// Manhattan distance within which the soldier may start a fight.
    pub engagement_range: u32,
}

/// Immutable representation of a single soldier used for queries.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SoldierSnapshot {
    /// Identifier allocated by the world.
    pub id: SoldierId,
    /// Current position.
    pub position: GridPoint,
    /// Combat strength added to every roll.
    pub strength: u32,
    /// Unit kind used for presentation.
    pub kind: UnitKind,
    /// Team the soldier fights for.
    pub team: Team,
    /// Manhattan distance within which the soldier may start a fight.
    pub engagement_range: u32,
}

impl SoldierSnapshot {
    /// Manhattan distance to another soldier.
    #[must_use]
    pub fn distance_to(&self, other: &SoldierSnapshot) -> u32 {
        self.position.manhattan_distance(other.position)
    }

    /// Reports whether this soldier may start a fight with `other`.
    ///
    /// Only this soldier's own engagement range is consulted, so the check is
    /// not symmetric between soldiers of different ranges.
    #[must_use]
    pub fn can_engage(&self, other: &SoldierSnapshot) -> bool {
        self.team != other.team && self.distance_to(other) <= self.engagement_range
    }
}

/// Read-only snapshot of every live soldier in roster order.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SoldierView {
    snapshots: Vec<SoldierSnapshot>,
}

impl SoldierView {
    /// Creates a new view from snapshots already in roster order.
    #[must_use]
    pub fn from_snapshots(snapshots: Vec<SoldierSnapshot>) -> Self {
        Self { snapshots }
    }

    /// Iterator over the snapshots in roster order.
    pub fn iter(&self) -> impl Iterator<Item = &SoldierSnapshot> {
        self.snapshots.iter()
    }

    /// Snapshots as a slice in roster order.
    #[must_use]
    pub fn as_slice(&self) -> &[SoldierSnapshot] {
        &self.snapshots
    }

    /// Number of live soldiers.
    #[must_use]
    pub fn len(&self) -> usize {
        self.snapshots.len()
    }

    /// Reports whether no soldier is alive.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.snapshots.is_empty()
    }

    /// Counts live soldiers per team.
    #[must_use]
    pub fn survivor_counts(&self) -> SurvivorCounts {
        SurvivorCounts::tally(self.snapshots.iter().map(|snapshot| snapshot.team))
    }
}

/// Number of live soldiers on each team.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SurvivorCounts {
    /// Live soldiers on team A.
    pub team_a: usize,
    /// Live soldiers on team B.
    pub team_b: usize,
}

impl SurvivorCounts {
    /// Creates survivor counts from explicit values.
    #[must_use]
    pub const fn new(team_a: usize, team_b: usize) -> Self {
        Self { team_a, team_b }
    }

    /// Counts the provided team memberships.
    #[must_use]
    pub fn tally<I>(teams: I) -> Self
    where
        I: IntoIterator<Item = Team>,
    {
        teams.into_iter().fold(Self::default(), |mut counts, team| {
            match team {
                Team::A => counts.team_a += 1,
                Team::B => counts.team_b += 1,
            }
            counts
        })
    }

    /// Live soldiers on the provided team.
    #[must_use]
    pub const fn get(&self, team: Team) -> usize {
        match team {
            Team::A => self.team_a,
            Team::B => self.team_b,
        }
    }

    /// Reports whether at least one team has been wiped out.
    #[must_use]
    pub const fn is_decided(&self) -> bool {
        self.team_a == 0 || self.team_b == 0
    }

    /// The only team with survivors, or `None` when both or neither have any.
    #[must_use]
    pub const fn winner(&self) -> Option<Team> {
        match (self.team_a, self.team_b) {
            (0, 0) => None,
            (0, _) => Some(Team::B),
            (_, 0) => Some(Team::A),
            _ => None,
        }
    }
}

/// History entry recorded at the end of every turn.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TurnRecord {
    /// Turn index after the increment, starting at 1 for the first turn.
    pub turn: u64,
    /// Survivor counts after combat resolution.
    pub survivors: SurvivorCounts,
}

/// Size and combat attributes of one unit kind within a team composition.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct UnitProfile {
    /// Number of soldiers to deploy.
    pub count: u32,
    /// Strength assigned to each soldier.
    pub strength: u32,
    /// Engagement range assigned to each soldier.
    pub engagement_range: u32,
}

impl UnitProfile {
    /// Creates a profile from already validated values.
    #[must_use]
    pub const fn new(count: u32, strength: u32, engagement_range: u32) -> Self {
        Self {
            count,
            strength,
            engagement_range,
        }
    }

    /// Validates raw signed values for the provided unit kind.
    pub fn try_new(
        kind: UnitKind,
        count: i64,
        strength: i64,
        engagement_range: i64,
    ) -> Result<Self, ConfigError> {
        Ok(Self {
            count: non_negative(kind, "count", count)?,
            strength: non_negative(kind, "strength", strength)?,
            engagement_range: non_negative(kind, "range", engagement_range)?,
        })
    }
}

fn non_negative(kind: UnitKind, field: &'static str, value: i64) -> Result<u32, ConfigError> {
    if value < 0 {
        return Err(ConfigError::NegativeValue { kind, field, value });
    }
    u32::try_from(value).map_err(|_| ConfigError::ValueTooLarge { kind, field, value })
}

/// Ordered mapping from unit kind to its profile.
///
/// Entries keep insertion order; inserting a kind twice replaces the earlier
/// profile in place.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Composition {
    entries: Vec<(UnitKind, UnitProfile)>,
}

impl Composition {
    /// Creates an empty composition.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the composition with the provided entry inserted.
    #[must_use]
    pub fn with(mut self, kind: UnitKind, profile: UnitProfile) -> Self {
        self.insert(kind, profile);
        self
    }

    /// Inserts or replaces the profile for a unit kind.
    pub fn insert(&mut self, kind: UnitKind, profile: UnitProfile) {
        match self.entries.iter_mut().find(|(existing, _)| *existing == kind) {
            Some(entry) => entry.1 = profile,
            None => self.entries.push((kind, profile)),
        }
    }

    /// Iterator over entries in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (UnitKind, UnitProfile)> + '_ {
        self.entries.iter().copied()
    }

    /// Total number of soldiers described by the composition.
    #[must_use]
    pub fn total_count(&self) -> u64 {
        self.entries
            .iter()
            .map(|(_, profile)| u64::from(profile.count))
            .sum()
    }
}

/// Inclusive range of x coordinates a team deploys into.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "RawDeploymentRange")]
pub struct DeploymentRange {
    min_x: i32,
    max_x: i32,
}

#[derive(Deserialize)]
struct RawDeploymentRange {
    min_x: i32,
    max_x: i32,
}

impl TryFrom<RawDeploymentRange> for DeploymentRange {
    type Error = ConfigError;

    fn try_from(raw: RawDeploymentRange) -> Result<Self, Self::Error> {
        Self::try_new(raw.min_x, raw.max_x)
    }
}

impl DeploymentRange {
    /// Validates and creates an inclusive x range.
    pub fn try_new(min_x: i32, max_x: i32) -> Result<Self, ConfigError> {
        if min_x > max_x {
            return Err(ConfigError::InvertedRange { min_x, max_x });
        }
        Ok(Self { min_x, max_x })
    }

    /// Smallest x coordinate, inclusive.
    #[must_use]
    pub const fn min_x(&self) -> i32 {
        self.min_x
    }

    /// Largest x coordinate, inclusive.
    #[must_use]
    pub const fn max_x(&self) -> i32 {
        self.max_x
    }
}

/// Outcome of a single fight within a combat pass.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Engagement {
    /// Soldier that initiated the fight (earlier in roster order).
    pub attacker: SoldierId,
    /// Soldier that was engaged.
    pub defender: SoldierId,
    /// Attacker's strength plus its random draw.
    pub attacker_roll: f64,
    /// Defender's strength plus its random draw.
    pub defender_roll: f64,
    /// Soldier that survived the fight.
    pub victor: SoldierId,
}

impl Engagement {
    /// Soldier that lost the fight.
    #[must_use]
    pub fn defeated(&self) -> SoldierId {
        if self.victor == self.attacker {
            self.defender
        } else {
            self.attacker
        }
    }
}

/// Reasons a battle configuration is rejected.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum ConfigError {
    /// Grid width or height is zero or negative.
    #[error("grid dimensions must be positive (received {width}x{height})")]
    NonPositiveGrid {
        /// Requested width.
        width: i64,
        /// Requested height.
        height: i64,
    },
    /// Grid width or height does not fit signed 32-bit coordinates.
    #[error("grid dimensions {width}x{height} exceed the supported coordinate range")]
    GridTooLarge {
        /// Requested width.
        width: i64,
        /// Requested height.
        height: i64,
    },
    /// A composition entry carries a negative value.
    #[error("{field} for {kind} must not be negative (received {value})")]
    NegativeValue {
        /// Unit kind of the offending entry.
        kind: UnitKind,
        /// Name of the offending field.
        field: &'static str,
        /// Rejected value.
        value: i64,
    },
    /// A composition entry carries a value that does not fit 32 bits.
    #[error("{field} for {kind} is too large (received {value})")]
    ValueTooLarge {
        /// Unit kind of the offending entry.
        kind: UnitKind,
        /// Name of the offending field.
        field: &'static str,
        /// Rejected value.
        value: i64,
    },
    /// The deployment x range has its bounds reversed.
    #[error("deployment range {min_x}..={max_x} is inverted")]
    InvertedRange {
        /// Requested lower bound.
        min_x: i32,
        /// Requested upper bound.
        max_x: i32,
    },
    /// A unit kind label did not match any known kind.
    #[error("unknown unit kind '{0}'")]
    UnknownUnitKind(String),
    /// A team label did not match either team.
    #[error("unknown team '{0}'")]
    UnknownTeam(String),
}

/// Reasons a movement policy could not produce a target.
#[derive(Debug, Error)]
pub enum PolicyFailure {
    /// The opaque decision capability reported an error.
    #[error("decision capability failed: {0}")]
    Capability(#[source] BoxError),
    /// The capability returned NaN or an infinite coordinate.
    #[error("decision returned a non-finite coordinate ({value})")]
    NonFinite {
        /// Rejected value.
        value: f64,
    },
    /// The capability returned a coordinate with a fractional part.
    #[error("decision returned a fractional coordinate ({value})")]
    Fractional {
        /// Rejected value.
        value: f64,
    },
    /// The capability returned a coordinate outside the `i32` range.
    #[error("decision returned a coordinate outside the supported range ({value})")]
    OutOfRange {
        /// Rejected value.
        value: f64,
    },
}

/// Errors surfaced by the battle controller.
#[derive(Debug, Error)]
pub enum BattleError {
    /// The battle was configured with invalid parameters.
    #[error("invalid configuration: {0}")]
    InvalidConfiguration(#[from] ConfigError),
    /// A movement policy failed while planning a turn.
    #[error("movement policy failed for soldier {soldier} of team {team}")]
    ExternalPolicyFailure {
        /// Soldier whose move could not be planned.
        soldier: SoldierId,
        /// Team of that soldier.
        team: Team,
        /// Underlying failure.
        #[source]
        source: PolicyFailure,
    },
}
