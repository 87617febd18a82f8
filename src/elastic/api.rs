pub const ELASTIC_BASE_API: &str = "https://api.elasticemail.com/v2/";

// Request timeout, in seconds
pub(crate) const ELASTIC_REQUEST_TIMEOUT: u64 = 30;

// Scalar form fields understood by the v2 send endpoint. Several are
// transmitted twice under legacy and current names.
pub const FIELD_API_KEY: &str = "api_key";
pub const FIELD_ACCOUNT: &str = "account";
pub const FIELD_MSG_TO: &str = "msgTo";
pub const FIELD_MSG_CC: &str = "msgCC";
pub const FIELD_MSG_BCC: &str = "msgBcc";
pub const FIELD_MSG_FROM: &str = "msgFrom";
pub const FIELD_MSG_FROM_NAME: &str = "msgFromName";
pub const FIELD_FROM: &str = "from";
pub const FIELD_FROM_NAME: &str = "fromName";
pub const FIELD_TO: &str = "to";
pub const FIELD_SUBJECT: &str = "subject";
pub const FIELD_BODY_HTML: &str = "body_html";
pub const FIELD_BODY_TEXT: &str = "body_text";

pub enum Endpoint {
    EmailSend,
}

#[inline]
pub fn build_endpoint_url(endpoint: Endpoint) -> String {
    match endpoint {
        Endpoint::EmailSend => format!("{}{}", ELASTIC_BASE_API, "email/send"),
    }
}

/// Multipart field name for the i-th staged attachment.
/// Indices start at 1 and are contiguous.
#[inline]
pub fn file_field(index: usize) -> String {
    format!("file_{}", index)
}
