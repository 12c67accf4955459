//! Feedback domain core shared by the bridge and the dialog.
//!
//! - `types` - the request handed to the dialog and the result it hands back
//! - `compose` - how checked options and free text become one feedback string
//! - `io` - the single-write, single-read result file
//! - `commit` - the commit instruction appended when the user asks for one

mod commit;
mod compose;
mod io;
mod types;

pub use commit::{append_commit_instruction, commit_subject, COMMIT_MARKER, FALLBACK_SUBJECT};
pub use compose::{
    compose_feedback, join_predefined_options, parse_predefined_options, OPTION_DELIMITER,
};
pub use io::{read_result, write_result_atomic};
pub use types::{FeedbackRequest, FeedbackResult, DEFAULT_PROMPT};
