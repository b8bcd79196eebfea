//! View projections: pure derivations of the table and board views from a
//! store snapshot plus filter configuration.
//!
//! Both projections are recomputed against the live store on every call
//! and stamped with the store version they derived from — nothing here is
//! cached across store mutations, so a view can never lag the store.

use serde::{Deserialize, Serialize};

use crate::model::{Classification, Lead, Status};
use crate::store::LeadStore;

// ---------------------------------------------------------------------------
// Filters
// ---------------------------------------------------------------------------

/// Status facet of the table filter.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum StatusFilter {
    #[default]
    All,
    Only(Status),
}

/// Classification facet of the table filter. `Pending` matches leads the
/// classifier has not tiered yet.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum ClassificationFilter {
    #[default]
    All,
    Pending,
    Only(Classification),
}

/// Filter criteria applied to the table view. The three facets are
/// AND-combined; the text query is an OR over name, phone, and vehicle.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TableFilter {
    /// Case-insensitive substring query.
    pub query: String,
    pub status: StatusFilter,
    pub classification: ClassificationFilter,
}

impl TableFilter {
    /// Returns true if no filter criteria are active.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.query.is_empty()
            && self.status == StatusFilter::All
            && self.classification == ClassificationFilter::All
    }

    /// Returns true if the lead satisfies all active criteria.
    #[must_use]
    pub fn matches(&self, lead: &Lead) -> bool {
        if let StatusFilter::Only(status) = self.status {
            if lead.status != status {
                return false;
            }
        }
        match self.classification {
            ClassificationFilter::All => {}
            ClassificationFilter::Pending => {
                if lead.classification.is_some() {
                    return false;
                }
            }
            ClassificationFilter::Only(tier) => {
                if lead.classification != Some(tier) {
                    return false;
                }
            }
        }
        if !self.query.is_empty() {
            let q = self.query.to_lowercase();
            if !lead.name.to_lowercase().contains(&q)
                && !lead.phone.to_lowercase().contains(&q)
                && !lead.vehicle_interest.to_lowercase().contains(&q)
            {
                return false;
            }
        }
        true
    }
}

/// Sort order for the table view.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SortOrder {
    /// Newest first — the dashboard default.
    #[default]
    CreatedDesc,
    /// Oldest first.
    CreatedAsc,
    /// Alphabetical by lead name.
    NameAsc,
}

// ---------------------------------------------------------------------------
// Table projection
// ---------------------------------------------------------------------------

/// The filtered, ordered table sequence.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableView {
    pub leads: Vec<Lead>,
    /// Store version this view was derived from.
    pub store_version: u64,
}

/// Project the table view from the current store state.
#[must_use]
pub fn project_table(store: &LeadStore, filter: &TableFilter, sort: SortOrder) -> TableView {
    let mut leads: Vec<Lead> = store
        .snapshot()
        .into_iter()
        .filter(|lead| filter.matches(lead))
        .collect();

    match sort {
        SortOrder::CreatedDesc => leads.sort_by(|a, b| b.created_at.cmp(&a.created_at)),
        SortOrder::CreatedAsc => leads.sort_by(|a, b| a.created_at.cmp(&b.created_at)),
        SortOrder::NameAsc => leads.sort_by(|a, b| a.name.cmp(&b.name)),
    }

    TableView {
        leads,
        store_version: store.version(),
    }
}

// ---------------------------------------------------------------------------
// Board projection
// ---------------------------------------------------------------------------

/// One board column: a status bucket and its cards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BoardColumn {
    pub status: Status,
    pub leads: Vec<Lead>,
}

/// The three-column board. Leads with status `Perdido` appear in no
/// column; the board simply has no lane for them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BoardView {
    pub columns: [BoardColumn; 3],
    pub store_version: u64,
}

impl BoardView {
    /// The column for a status, if that status owns one.
    #[must_use]
    pub fn column(&self, status: Status) -> Option<&BoardColumn> {
        self.columns.iter().find(|column| column.status == status)
    }

    /// Total cards across all columns.
    #[must_use]
    pub fn card_count(&self) -> usize {
        self.columns.iter().map(|column| column.leads.len()).sum()
    }
}

/// Partition the unfiltered snapshot into the three board buckets. The
/// table's filters deliberately do not apply here — the board always shows
/// the whole pipeline.
#[must_use]
pub fn project_board(store: &LeadStore) -> BoardView {
    let mut columns = Status::BOARD.map(|status| BoardColumn {
        status,
        leads: Vec::new(),
    });

    for lead in store.snapshot() {
        if let Some(column) = columns.iter_mut().find(|column| column.status == lead.status) {
            column.leads.push(lead);
        }
    }

    BoardView {
        columns,
        store_version: store.version(),
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
