//! Catalog counts and the chart views built from them.

use serde::{Deserialize, Serialize};

/// The three aggregate counts shown on the home and statistics screens.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogCounts {
    pub users: u64,
    pub authors: u64,
    pub audiobooks: u64,
}

impl CatalogCounts {
    /// Label/value pairs in display order.
    pub fn series(&self) -> [(&'static str, u64); 3] {
        [
            ("Users", self.users),
            ("Authors", self.authors),
            ("Audiobooks", self.audiobooks),
        ]
    }

    pub fn total(&self) -> u64 {
        self.users + self.authors + self.audiobooks
    }

    pub fn max(&self) -> u64 {
        self.users.max(self.authors).max(self.audiobooks)
    }

    /// Each count's share of the total, in percent. All zeros when the total is zero.
    pub fn shares(&self) -> [(&'static str, f64); 3] {
        let total = self.total();
        self.series().map(|(label, value)| {
            let pct = if total == 0 {
                0.0
            } else {
                value as f64 * 100.0 / total as f64
            };
            (label, pct)
        })
    }
}

/// Chart style on the statistics screen.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum ChartKind {
    #[default]
    Bar,
    Area,
    Pie,
}

impl ChartKind {
    pub const ALL: [ChartKind; 3] = [ChartKind::Bar, ChartKind::Area, ChartKind::Pie];

    pub fn title(&self) -> &'static str {
        match self {
            ChartKind::Bar => "Bar",
            ChartKind::Area => "Area",
            ChartKind::Pie => "Pie",
        }
    }

    pub fn next(&self) -> Self {
        match self {
            ChartKind::Bar => ChartKind::Area,
            ChartKind::Area => ChartKind::Pie,
            ChartKind::Pie => ChartKind::Bar,
        }
    }

    pub fn prev(&self) -> Self {
        match self {
            ChartKind::Bar => ChartKind::Pie,
            ChartKind::Area => ChartKind::Bar,
            ChartKind::Pie => ChartKind::Area,
        }
    }
}
