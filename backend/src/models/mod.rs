#[macro_use]
pub mod macros;
pub mod summary;
pub mod time;

pub use summary::{LinearModel, Summary, SummaryGroup};
pub use time::{NumericPoint, TimeSeriesPoint};

define_id_type!(DatasetId);
