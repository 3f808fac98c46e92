pub mod aggregation;
pub mod correlation;
pub mod preparer;
pub mod resample;
pub mod rolling;
pub mod seasonal;
pub mod temporal;

pub use aggregation::{group_and_average, ColumnMean, GroupAverage, GroupValue, MeanAccumulator};
pub use correlation::{correlate, correlation_matrix, pearson, CorrelationMatrix};
pub use preparer::{
    decompose_daily, smoothed_daily_series, DailyDecomposition, DatasetPreparer, PreparedDataset,
    SelectionBounds, SmoothedPoint, SmoothedSeries,
};
pub use resample::{forward_fill, resample_daily, DailyValue};
pub use rolling::{rolling_mean, RollingMean};
pub use seasonal::{seasonal_decompose, Decomposition};
pub use temporal::{
    date_bounds, derive_temporal_fields, filter_by_date, filter_by_station, filter_by_year,
    year_bounds,
};
