mod job;
mod store;

pub use job::{JobRecord, JobStatus, JobUpdate, NewJob, parse_upload_date};
pub use store::JobStore;
