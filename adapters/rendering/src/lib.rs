#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Shared rendering contracts for Skirmish adapters.
//!
//! Adapters never read the world directly. They receive a [`BattlefieldScene`]
//! describing the soldiers still standing and a [`HistoryChart`] describing
//! how each team shrank over time, and hand both to a [`RenderingBackend`].

use anyhow::Result as AnyResult;
use glam::Vec2;
use serde::{Deserialize, Serialize};
use skirmish_core::{
    GridSize, SoldierSnapshot, SoldierView, SurvivorCounts, Team, TurnRecord, UnitKind,
};
use skirmish_world::History;

/// Margin added around the outermost cells on both plot axes.
pub const AXIS_MARGIN: f32 = 0.1;

/// Opacity applied to battlefield markers.
pub const MARKER_ALPHA: f32 = 0.7;

/// RGBA color used when presenting frames.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Color {
    /// Red channel intensity in the range 0.0..=1.0.
    pub red: f32,
    /// Green channel intensity in the range 0.0..=1.0.
    pub green: f32,
    /// Blue channel intensity in the range 0.0..=1.0.
    pub blue: f32,
    /// Alpha channel intensity in the range 0.0..=1.0.
    pub alpha: f32,
}

impl Color {
    /// Royal blue, used for team A.
    pub const ROYAL_BLUE: Color = Color::from_rgb_u8(65, 105, 225);

    /// Firebrick, used for team B.
    pub const FIREBRICK: Color = Color::from_rgb_u8(178, 34, 34);

    /// Creates an opaque color from byte RGB values.
    #[must_use]
    pub const fn from_rgb_u8(red: u8, green: u8, blue: u8) -> Self {
        Self {
            red: red as f32 / 255.0,
            green: green as f32 / 255.0,
            blue: blue as f32 / 255.0,
            alpha: 1.0,
        }
    }

    /// Returns the same color with the provided opacity.
    #[must_use]
    pub fn with_alpha(self, alpha: f32) -> Self {
        Self {
            alpha: alpha.clamp(0.0, 1.0),
            ..self
        }
    }

    /// Color assigned to the provided team.
    #[must_use]
    pub const fn for_team(team: Team) -> Self {
        match team {
            Team::A => Self::ROYAL_BLUE,
            Team::B => Self::FIREBRICK,
        }
    }
}

/// Marker drawn for a soldier depending on its unit kind.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum MarkerShape {
    /// Circle, used for soldiers.
    Circle,
    /// Square, used for knights.
    Square,
    /// Upward triangle, used for archers.
    Triangle,
}

impl MarkerShape {
    /// Marker used for the provided unit kind.
    #[must_use]
    pub const fn for_kind(kind: UnitKind) -> Self {
        match kind {
            UnitKind::Soldier => Self::Circle,
            UnitKind::Knight => Self::Square,
            UnitKind::Archer => Self::Triangle,
        }
    }

    /// Single character stand-in for text backends.
    #[must_use]
    pub const fn glyph(self) -> char {
        match self {
            Self::Circle => 'o',
            Self::Square => 's',
            Self::Triangle => '^',
        }
    }
}

/// Visible range and tick positions of one plot axis.
#[derive(Clone, Debug, PartialEq)]
pub struct AxisBounds {
    /// Lowest visible coordinate.
    pub min: f32,
    /// Highest visible coordinate.
    pub max: f32,
    /// Integer tick positions, one per cell.
    pub ticks: Vec<i32>,
}

impl AxisBounds {
    /// Bounds covering `cells` cells with a small margin on both sides.
    #[must_use]
    pub fn for_cells(cells: u32) -> Self {
        let last = cells.saturating_sub(1) as f32;
        Self {
            min: -AXIS_MARGIN,
            max: last + AXIS_MARGIN,
            ticks: (0..cells).map(|cell| cell as i32).collect(),
        }
    }

    /// Reports whether the coordinate lies inside the visible range.
    #[must_use]
    pub fn contains(&self, value: f32) -> bool {
        value >= self.min && value <= self.max
    }
}

/// Soldiers sharing a team and a unit kind, drawn with one marker style.
#[derive(Clone, Debug, PartialEq)]
pub struct MarkerGroup {
    /// Team of every soldier in the group.
    pub team: Team,
    /// Unit kind of every soldier in the group.
    pub kind: UnitKind,
    /// Marker drawn for each soldier.
    pub shape: MarkerShape,
    /// Fill color of the markers.
    pub color: Color,
    /// Legend entry for the group.
    pub label: String,
    /// Plot positions of the soldiers in roster order.
    pub positions: Vec<Vec2>,
}

/// Static picture of the battlefield at the end of a turn.
#[derive(Clone, Debug, PartialEq)]
pub struct BattlefieldScene {
    /// Heading shown above the plot.
    pub title: String,
    /// Battlefield dimensions.
    pub grid: GridSize,
    /// Horizontal axis bounds.
    pub x_axis: AxisBounds,
    /// Vertical axis bounds.
    pub y_axis: AxisBounds,
    /// Horizontal axis caption.
    pub x_label: &'static str,
    /// Vertical axis caption.
    pub y_label: &'static str,
    /// Non-empty marker groups ordered by team and then unit kind.
    pub groups: Vec<MarkerGroup>,
}

impl BattlefieldScene {
    /// Builds the scene for the live soldiers after `turn` completed turns.
    #[must_use]
    pub fn new(turn: u64, grid: GridSize, soldiers: &SoldierView) -> Self {
        let mut groups = Vec::new();
        for team in Team::ALL {
            for kind in UnitKind::ALL {
                let positions: Vec<Vec2> = soldiers
                    .iter()
                    .filter(|soldier| soldier.team == team && soldier.kind == kind)
                    .map(|soldier| {
                        Vec2::new(soldier.position.x() as f32, soldier.position.y() as f32)
                    })
                    .collect();
                if positions.is_empty() {
                    continue;
                }
                groups.push(MarkerGroup {
                    team,
                    kind,
                    shape: MarkerShape::for_kind(kind),
                    color: Color::for_team(team).with_alpha(MARKER_ALPHA),
                    label: format!("Team {team} - {kind}"),
                    positions,
                });
            }
        }

        Self {
            title: format!("Battlefield - Turn {turn}"),
            grid,
            x_axis: AxisBounds::for_cells(grid.width()),
            y_axis: AxisBounds::for_cells(grid.height()),
            x_label: "X Position",
            y_label: "Y Position",
            groups,
        }
    }
}

/// Survivor counts of one team over the recorded turns.
#[derive(Clone, Debug, PartialEq)]
pub struct ChartSeries {
    /// Team the series describes.
    pub team: Team,
    /// Legend entry for the series.
    pub label: String,
    /// Line color.
    pub color: Color,
    /// `(turn, survivors)` samples in turn order.
    pub points: Vec<(u64, usize)>,
}

/// Line chart of team sizes over time.
#[derive(Clone, Debug, PartialEq)]
pub struct HistoryChart {
    /// Heading shown above the chart.
    pub title: &'static str,
    /// Horizontal axis caption.
    pub x_label: &'static str,
    /// Vertical axis caption.
    pub y_label: &'static str,
    /// One tick per recorded turn.
    pub x_ticks: Vec<u64>,
    /// One series per team, team A first.
    pub series: Vec<ChartSeries>,
}

impl HistoryChart {
    /// Builds the chart from a battle history.
    #[must_use]
    pub fn new(history: &History) -> Self {
        let series = Team::ALL
            .into_iter()
            .map(|team| ChartSeries {
                team,
                label: format!("Team {team}"),
                color: Color::for_team(team),
                points: history.series(team).collect(),
            })
            .collect();

        Self {
            title: "Team Size Over Time",
            x_label: "Turn",
            y_label: "Soldier Count",
            x_ticks: history.records().iter().map(|record| record.turn).collect(),
            series,
        }
    }

    /// Largest survivor count in any series, used to scale the vertical axis.
    #[must_use]
    pub fn peak(&self) -> usize {
        self.series
            .iter()
            .flat_map(|series| series.points.iter().map(|&(_, count)| count))
            .max()
            .unwrap_or(0)
    }
}

/// Serializable summary of a battle, suitable for external plotting tools.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct BattleReport {
    /// Battlefield dimensions.
    pub grid: GridSize,
    /// Completed turns.
    pub turn: u64,
    /// Surviving team, if exactly one team has soldiers left.
    pub winner: Option<Team>,
    /// Final survivor counts.
    pub survivors: SurvivorCounts,
    /// Live soldiers in roster order.
    pub soldiers: Vec<SoldierSnapshot>,
    /// One entry per completed turn.
    pub history: Vec<TurnRecord>,
}

impl BattleReport {
    /// Captures the final state of a battle.
    #[must_use]
    pub fn new(grid: GridSize, turn: u64, soldiers: &SoldierView, history: &History) -> Self {
        let survivors = soldiers.survivor_counts();
        Self {
            grid,
            turn,
            winner: survivors.winner(),
            survivors,
            soldiers: soldiers.iter().copied().collect(),
            history: history.records().to_vec(),
        }
    }
}

/// Rendering backend capable of presenting Skirmish battles.
pub trait RenderingBackend {
    /// Presents the battlefield as it stands after the latest turn.
    fn render_battlefield(&mut self, scene: &BattlefieldScene) -> AnyResult<()>;

    /// Presents the team sizes recorded so far.
    fn render_history(&mut self, chart: &HistoryChart) -> AnyResult<()>;
}
