pub mod submitter;

pub use submitter::{HttpSubmitter, SubmitResponse, Submitter};
