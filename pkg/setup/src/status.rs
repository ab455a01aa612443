use http::StatusCode;

/// Maps a domain error onto the HTTP status reported to clients.
pub trait ErrorStatus {
    fn status(&self) -> StatusCode;
}
