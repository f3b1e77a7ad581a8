//! Collection of events and timings from parallel processing.
//!
//! Each rayon split folds into its own accumulator and adjacent accumulators
//! are reduced left to right, so events keep their input order.

use super::QuantEvent;
use crate::timings::QuantTimings;
use rayon::iter::{
    FromParallelIterator,
    IntoParallelIterator,
    ParallelIterator,
};

#[derive(Default)]
pub(super) struct QuantEventAccumulator {
    pub(super) events: Vec<QuantEvent>,
    pub(super) timings: QuantTimings,
}

impl QuantEventAccumulator {
    pub(super) fn reduce(mut self, other: Self) -> Self {
        self.events.extend(other.events);
        self.timings += other.timings;
        self
    }

    pub(super) fn fold(mut self, item: (QuantEvent, QuantTimings)) -> Self {
        self.events.push(item.0);
        self.timings += item.1;
        self
    }
}

impl FromIterator<(QuantEvent, QuantTimings)> for QuantEventAccumulator {
    fn from_iter<I>(iter: I) -> Self
    where
        I: IntoIterator<Item = (QuantEvent, QuantTimings)>,
    {
        iter.into_iter()
            .fold(QuantEventAccumulator::default(), QuantEventAccumulator::fold)
    }
}

impl FromParallelIterator<(QuantEvent, QuantTimings)> for QuantEventAccumulator {
    fn from_par_iter<I>(par_iter: I) -> Self
    where
        I: IntoParallelIterator<Item = (QuantEvent, QuantTimings)>,
    {
        par_iter
            .into_par_iter()
            .fold(QuantEventAccumulator::default, QuantEventAccumulator::fold)
            .reduce(QuantEventAccumulator::default, QuantEventAccumulator::reduce)
    }
}
