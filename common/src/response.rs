use serde::Serialize;

/// Standardized API response wrapper for all outgoing JSON responses.
///
/// Enforces a consistent structure across both services:
/// ```json
/// {
///   "success": true,
///   "data": { ... },
///   "message": "Some message"
/// }
/// ```
#[derive(Debug, Serialize)]
pub struct ApiResponse<T>
where
    T: Serialize,
{
    pub success: bool,
    pub data: T,
    pub message: String,
}

/// Acknowledgement for an accepted (or suppressed) message submission.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MessageAccepted {
    pub message_id: String,
    pub duplicate: bool,
}

impl<T> ApiResponse<T>
where
    T: Serialize,
{
    /// Constructs a success response with the given data and message.
    pub fn success(data: T, message: impl Into<String>) -> Self {
        Self {
            success: true,
            data,
            message: message.into(),
        }
    }

    /// Constructs an error response with a message and default `data`.
    pub fn error(message: impl Into<String>) -> Self
    where
        T: Default,
    {
        Self {
            success: false,
            data: T::default(),
            message: message.into(),
        }
    }
}
