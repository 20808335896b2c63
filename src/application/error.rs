#[derive(Debug)]
pub enum ApplicationError {
    NotFound,
    BadRequest(String),
    PayloadTooLarge,
    /// The container could not be reached, as opposed to being empty.
    Unavailable(String),
    InternalError(String),
}
