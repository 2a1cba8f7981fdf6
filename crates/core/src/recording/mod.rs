pub mod infrastructure;
pub mod output_naming;
pub mod recording_clock;
pub mod recording_error;
pub mod recording_session;

#[cfg(test)]
pub(crate) mod test_support;
