//! Enriched series and bounded trailing-window views.
//!
//! A "sub-series ending at index i" — the prefix of length i+1 — is the unit
//! rules operate on, modeling "as of this point in history". Window
//! extraction is explicit (length + offset from the end) instead of negative
//! indexing, so every rule's trailing-context arithmetic lives in one place.

use crate::enrich::EnrichedBar;

/// Owned, append-only-within-a-run sequence of enriched bars, ascending by ts.
#[derive(Debug, Clone, Default)]
pub struct Series {
    bars: Vec<EnrichedBar>,
}

impl Series {
    pub fn new(bars: Vec<EnrichedBar>) -> Self {
        Self { bars }
    }

    pub fn len(&self) -> usize {
        self.bars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bars.is_empty()
    }

    pub fn bars(&self) -> &[EnrichedBar] {
        &self.bars
    }

    /// View over the whole series.
    pub fn view(&self) -> SeriesView<'_> {
        SeriesView { bars: &self.bars }
    }

    /// Prefix sub-series ending at `index` (inclusive). `None` when the
    /// index is out of range.
    pub fn prefix(&self, index: usize) -> Option<SeriesView<'_>> {
        let bars = self.bars.get(..=index)?;
        Some(SeriesView { bars })
    }

    /// View over the series minus its final bar. Empty view for an empty series.
    pub fn without_last(&self) -> SeriesView<'_> {
        let end = self.bars.len().saturating_sub(1);
        SeriesView {
            bars: &self.bars[..end],
        }
    }
}

/// Borrowed prefix of a series; all rule evaluation goes through this.
#[derive(Debug, Clone, Copy)]
pub struct SeriesView<'a> {
    bars: &'a [EnrichedBar],
}

impl<'a> SeriesView<'a> {
    pub fn new(bars: &'a [EnrichedBar]) -> Self {
        Self { bars }
    }

    pub fn len(&self) -> usize {
        self.bars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bars.is_empty()
    }

    pub fn bars(&self) -> &'a [EnrichedBar] {
        self.bars
    }

    /// Newest bar of the view.
    pub fn last(&self) -> Option<&'a EnrichedBar> {
        self.bars.last()
    }

    /// Bar `k` places back from the end: `from_end(0)` is the newest bar,
    /// `from_end(1)` the one before it.
    pub fn from_end(&self, k: usize) -> Option<&'a EnrichedBar> {
        self.bars.len().checked_sub(k + 1).map(|i| &self.bars[i])
    }

    /// Trailing window of `len` bars after skipping the `skip` newest.
    ///
    /// `trailing(n, 1)` is the n bars immediately before the current one —
    /// the shape every lookback-extremum rule uses. `None` when the view is
    /// too short, so rules fall through to "no match" via `?`.
    pub fn trailing(&self, len: usize, skip: usize) -> Option<&'a [EnrichedBar]> {
        let n = self.bars.len();
        let end = n.checked_sub(skip)?;
        let start = end.checked_sub(len)?;
        Some(&self.bars[start..end])
    }
}
