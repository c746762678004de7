use serde::{Deserialize, Serialize};

/// An HTTP status code and the message that accompanied it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HttpStatusFields {
    /// The HTTP status code.
    pub status_code: Option<u16>,
    /// The message returned with the status code.
    pub status_code_msg: Option<String>,
}

impl HttpStatusFields {
    /// Records a status code and message.
    pub fn new(status_code: u16, status_code_msg: impl Into<String>) -> Self {
        Self {
            status_code: Some(status_code),
            status_code_msg: Some(status_code_msg.into()),
        }
    }
}

/// A model that stores the outcome of an HTTP call.
pub trait HttpStatus {
    /// The stored status.
    fn http_status(&self) -> &HttpStatusFields;

    /// `true` when a 4xx or 5xx code is stored.
    fn is_error_status(&self) -> bool {
        self.http_status().status_code.is_some_and(|code| code >= 400)
    }
}
