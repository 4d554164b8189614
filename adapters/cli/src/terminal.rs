//! Text rendering backend that writes plain ASCII to any writer.

use std::io::Write;

use anyhow::{Context, Result};
use skirmish_core::Team;
use skirmish_rendering::{BattlefieldScene, HistoryChart, MarkerGroup, RenderingBackend};

/// Renders scenes as a character grid and charts as a table.
#[derive(Debug)]
pub(crate) struct TerminalBackend<W> {
    out: W,
}

impl<W: Write> TerminalBackend<W> {
    pub(crate) fn new(out: W) -> Self {
        Self { out }
    }

    #[cfg(test)]
    pub(crate) fn into_inner(self) -> W {
        self.out
    }
}

/// Occupants of a single cell.
#[derive(Clone, Copy)]
enum Cell {
    Empty,
    Single { team: Team, glyph: char },
    Crowd { team: Option<Team>, count: usize },
}

impl Cell {
    fn add(self, team: Team, glyph: char) -> Self {
        match self {
            Self::Empty => Self::Single { team, glyph },
            Self::Single { team: existing, .. } => Self::Crowd {
                team: (existing == team).then_some(team),
                count: 2,
            },
            Self::Crowd {
                team: existing,
                count,
            } => Self::Crowd {
                team: existing.filter(|existing| *existing == team),
                count: count + 1,
            },
        }
    }

    fn render(self) -> String {
        match self {
            Self::Empty => " .".to_owned(),
            Self::Single { team, glyph } => format!("{team}{glyph}"),
            Self::Crowd {
                team: Some(team),
                count,
            } if count < 10 => format!("{team}{count}"),
            Self::Crowd { .. } => "**".to_owned(),
        }
    }
}

impl<W: Write> RenderingBackend for TerminalBackend<W> {
    fn render_battlefield(&mut self, scene: &BattlefieldScene) -> Result<()> {
        let width = scene.grid.width() as usize;
        let height = scene.grid.height() as usize;
        let mut cells = vec![Cell::Empty; width * height];
        let mut off_grid = 0usize;

        for group in &scene.groups {
            for position in &group.positions {
                if !(scene.x_axis.contains(position.x) && scene.y_axis.contains(position.y)) {
                    off_grid += 1;
                    continue;
                }
                let index = position.y as usize * width + position.x as usize;
                cells[index] = cells[index].add(group.team, group.shape.glyph());
            }
        }

        writeln!(self.out, "{}", scene.title).context("failed to write scene title")?;
        for row in (0..height).rev() {
            let line: String = cells[row * width..(row + 1) * width]
                .iter()
                .map(|cell| cell.render())
                .collect::<Vec<_>>()
                .join(" ");
            writeln!(self.out, "{row:>3} |{line}").context("failed to write grid row")?;
        }
        let ticks: String = scene
            .x_axis
            .ticks
            .iter()
            .map(|tick| format!("{tick:>2}"))
            .collect::<Vec<_>>()
            .join(" ");
        writeln!(self.out, "     {ticks}").context("failed to write axis ticks")?;

        for group in &scene.groups {
            write_legend_entry(&mut self.out, group)?;
        }
        if off_grid > 0 {
            writeln!(self.out, "  ({off_grid} outside the grid)")
                .context("failed to write off-grid note")?;
        }
        Ok(())
    }

    fn render_history(&mut self, chart: &HistoryChart) -> Result<()> {
        writeln!(self.out, "{}", chart.title).context("failed to write chart title")?;
        let column = chart
            .series
            .iter()
            .map(|series| series.label.len())
            .chain([chart.peak().to_string().len()])
            .max()
            .unwrap_or(0)
            + 2;
        let header: String = chart
            .series
            .iter()
            .map(|series| format!("{:>column$}", series.label))
            .collect();
        writeln!(self.out, "{:>6}{header}", chart.x_label)
            .context("failed to write chart header")?;

        for (row, turn) in chart.x_ticks.iter().enumerate() {
            let counts: String = chart
                .series
                .iter()
                .map(|series| {
                    series
                        .points
                        .get(row)
                        .map_or_else(
                            || format!("{:>column$}", "-"),
                            |(_, count)| format!("{count:>column$}"),
                        )
                })
                .collect();
            writeln!(self.out, "{turn:>6}{counts}").context("failed to write chart row")?;
        }
        self.out.flush().context("failed to flush terminal output")
    }
}

fn write_legend_entry<W: Write>(out: &mut W, group: &MarkerGroup) -> Result<()> {
    writeln!(
        out,
        "  {}{}  {} ({})",
        group.team,
        group.shape.glyph(),
        group.label,
        group.positions.len()
    )
    .context("failed to write legend")
}

#[cfg(test)]
mod tests {
    use super::*;
    use skirmish_battle::{BattleConfig, Battlefield};
    use skirmish_core::{
        GridPoint, GridSize, SoldierId, SoldierSnapshot, SoldierSpec, SoldierView, UnitKind,
    };
    use skirmish_system_movement::{Stationary, TeamPolicies};

    fn snapshot(id: u32, team: Team, kind: UnitKind, x: i32, y: i32) -> SoldierSnapshot {
        SoldierSnapshot {
            id: SoldierId::new(id),
            position: GridPoint::new(x, y),
            strength: 1,
            kind,
            team,
            engagement_range: 1,
        }
    }

    fn render(soldiers: Vec<SoldierSnapshot>) -> String {
        let grid = GridSize::try_new(3, 2).expect("valid grid");
        let scene = BattlefieldScene::new(4, grid, &SoldierView::from_snapshots(soldiers));
        let mut backend = TerminalBackend::new(Vec::new());
        backend.render_battlefield(&scene).expect("in-memory writes");
        String::from_utf8(backend.into_inner()).expect("ascii output")
    }

    #[test]
    fn draws_rows_top_down_with_team_glyphs() {
        let output = render(vec![
            snapshot(0, Team::A, UnitKind::Soldier, 0, 0),
            snapshot(1, Team::B, UnitKind::Archer, 2, 1),
        ]);
        let lines: Vec<_> = output.lines().collect();

        assert_eq!(lines[0], "Battlefield - Turn 4");
        assert_eq!(lines[1], "  1 | .  . B^");
        assert_eq!(lines[2], "  0 |Ao  .  .");
        assert!(output.contains("Ao  Team A - soldier (1)"));
        assert!(output.contains("B^  Team B - archer (1)"));
    }

    #[test]
    fn stacked_and_stray_soldiers_are_summarized() {
        let output = render(vec![
            snapshot(0, Team::A, UnitKind::Soldier, 1, 0),
            snapshot(1, Team::A, UnitKind::Knight, 1, 0),
            snapshot(2, Team::B, UnitKind::Knight, 1, 1),
            snapshot(3, Team::A, UnitKind::Archer, 1, 1),
            snapshot(4, Team::B, UnitKind::Soldier, -3, 0),
        ]);

        assert!(output.contains("  0 | . A2  ."));
        assert!(output.contains("  1 | . **  ."));
        assert!(output.contains("(1 outside the grid)"));
    }

    #[test]
    fn history_table_lists_one_row_per_turn() {
        let config = BattleConfig::try_new(5, 5, 3).expect("valid grid");
        let mut battlefield = Battlefield::new(
            config,
            TeamPolicies::new(Box::new(Stationary), Box::new(Stationary)),
        );
        for (team, corner) in [(Team::A, 0), (Team::B, 4)] {
            let _ = battlefield.add_soldier(SoldierSpec {
                position: GridPoint::new(corner, corner),
                strength: 1,
                kind: UnitKind::Soldier,
                team,
                engagement_range: 0,
            });
        }
        let _ = battlefield.run(2).expect("stationary never fails");
        let mut backend = TerminalBackend::new(Vec::new());

        backend
            .render_history(&HistoryChart::new(battlefield.history()))
            .expect("in-memory writes");

        let output = String::from_utf8(backend.into_inner()).expect("ascii output");
        let lines: Vec<_> = output.lines().collect();
        assert_eq!(lines[0], "Team Size Over Time");
        assert_eq!(lines[1], "  Turn  Team A  Team B");
        assert_eq!(lines[2], "     1       1       1");
        assert_eq!(lines[3], "     2       1       1");
        assert_eq!(lines.len(), 4);
    }

    #[test]
    fn history_columns_widen_for_large_counts() {
        let grid = GridSize::try_new(2, 2).expect("valid grid");
        let mut chart = HistoryChart::new(
            Battlefield::new(
                BattleConfig::new(grid, 0),
                TeamPolicies::new(Box::new(Stationary), Box::new(Stationary)),
            )
            .history(),
        );
        chart.x_ticks = vec![1];
        chart.series[0].points = vec![(1, 123_456_789)];
        chart.series[1].points = vec![(1, 0)];
        let mut backend = TerminalBackend::new(Vec::new());

        backend.render_history(&chart).expect("in-memory writes");

        let output = String::from_utf8(backend.into_inner()).expect("ascii output");
        let lines: Vec<_> = output.lines().collect();
        assert_eq!(lines[1], "  Turn     Team A     Team B");
        assert_eq!(lines[2], "     1  123456789          0");
    }
}
