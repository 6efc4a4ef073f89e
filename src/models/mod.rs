pub mod category;
pub mod report_metric;
pub mod routine;
pub mod schedule_entry;
pub mod task;

pub use category::Category;
pub use report_metric::ReportMetric;
pub use routine::Routine;
pub use schedule_entry::ScheduleEntry;
pub use task::Task;
