pub mod form_state;
pub mod program;
pub mod record;

pub use form_state::FormState;
pub use program::Program;
pub use record::{BatchReport, BatchRequest, ResultRecord, NOT_AVAILABLE};
