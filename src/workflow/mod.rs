pub mod fetch_flow;
pub mod roll_ctx;

pub use fetch_flow::{AttemptOutcome, FetchFlow, FetchResult};
pub use roll_ctx::{build_roll_no, RollCtx};
