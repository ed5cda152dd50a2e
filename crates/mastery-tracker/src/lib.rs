pub mod backup;
pub mod config;
pub mod csv;
pub mod error;
pub mod progress;
pub mod reports;
pub mod session_manager;
pub mod tracker;
pub mod weekly_grid;

pub use backup::{DataManager, ImportSummary};
pub use config::TrackerConfig;
pub use error::{Result, TrackerError};
pub use progress::{BestDay, CategoryCompletion, ProgressAggregator};
pub use reports::{Report, ReportGenerator, ReportKind, ReportOrder};
pub use session_manager::SessionManager;
pub use tracker::Tracker;
pub use weekly_grid::{CellStatus, WeekGrid};
