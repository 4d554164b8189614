//! Turn-indexed record of survivor counts.

use serde::Serialize;
use skirmish_core::{SurvivorCounts, Team, TurnRecord};

/// Ordered record of survivor counts, one entry per completed turn.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct History {
    records: Vec<TurnRecord>,
}

impl History {
    pub(crate) fn record(&mut self, turn: u64, survivors: SurvivorCounts) -> TurnRecord {
        debug_assert!(
            self.latest().map_or(true, |latest| latest.turn < turn),
            "history must be appended in turn order"
        );
        let record = TurnRecord { turn, survivors };
        self.records.push(record);
        record
    }

    /// Records in the order they were appended.
    #[must_use]
    pub fn records(&self) -> &[TurnRecord] {
        &self.records
    }

    /// Number of recorded turns.
    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Reports whether no turn has completed yet.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Most recent entry, if any.
    #[must_use]
    pub fn latest(&self) -> Option<&TurnRecord> {
        self.records.last()
    }

    /// Turn indices paired with the survivor count of one team.
    pub fn series(&self, team: Team) -> impl Iterator<Item = (u64, usize)> + '_ {
        self.records
            .iter()
            .map(move |record| (record.turn, record.survivors.get(team)))
    }
}
