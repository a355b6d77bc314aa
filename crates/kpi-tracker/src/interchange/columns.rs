//! Sheet headers and the flat row shape shared by import and export.

pub const NUMBER: &str = "Bil";
pub const DEPARTMENT: &str = "Bahagian";
pub const CATEGORY: &str = "Kategori";
pub const STATEMENT: &str = "Pernyataan";
pub const METHOD: &str = "Kaedah Pengukuran";
pub const TARGET: &str = "Target";
pub const DETAILS: &str = "Perincian";
pub const SCORE: &str = "Peratus Pencapaian";
pub const ALLOCATED: &str = "Peruntukan (RM)";
pub const SPENT: &str = "Perbelanjaan (RM)";
pub const UTILIZATION: &str = "% Perbelanjaan";

pub const HEADERS: [&str; 11] = [
    NUMBER,
    DEPARTMENT,
    CATEGORY,
    STATEMENT,
    METHOD,
    TARGET,
    DETAILS,
    SCORE,
    ALLOCATED,
    SPENT,
    UTILIZATION,
];

/// One sheet row, every cell as text.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SheetRow {
    pub number: String,
    pub department: String,
    pub category: String,
    pub statement: String,
    pub method: String,
    pub target: String,
    pub details: String,
    pub score: String,
    pub allocated: String,
    pub spent: String,
    pub utilization: String,
}

impl SheetRow {
    pub fn cells(&self) -> [&str; 11] {
        [
            self.number.as_str(),
            self.department.as_str(),
            self.category.as_str(),
            self.statement.as_str(),
            self.method.as_str(),
            self.target.as_str(),
            self.details.as_str(),
            self.score.as_str(),
            self.allocated.as_str(),
            self.spent.as_str(),
            self.utilization.as_str(),
        ]
    }

    /// Mutable slot for a header name; unknown headers are ignored.
    pub(crate) fn cell_mut(&mut self, header: &str) -> Option<&mut String> {
        let slot = match header {
            NUMBER => &mut self.number,
            DEPARTMENT => &mut self.department,
            CATEGORY => &mut self.category,
            STATEMENT => &mut self.statement,
            METHOD => &mut self.method,
            TARGET => &mut self.target,
            DETAILS => &mut self.details,
            SCORE => &mut self.score,
            ALLOCATED => &mut self.allocated,
            SPENT => &mut self.spent,
            UTILIZATION => &mut self.utilization,
            _ => return None,
        };
        Some(slot)
    }
}
