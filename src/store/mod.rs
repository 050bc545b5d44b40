pub mod newsletters;
pub mod subscribers;
pub mod waitlist;

/// Wraps a value that is stored but can no longer be parsed into its domain type.
pub(crate) fn decode_error(message: String) -> sqlx::Error {
    sqlx::Error::Decode(message.into())
}
