pub mod response;
pub mod serialize;
pub mod transport;
pub mod truncate;

pub use response::{
    ERROR_BODY_EXCERPT_MAX_CHARS, PROBE_BODY_EXCERPT_MAX_CHARS, RESPONSE_FALLBACK_MAX_CHARS,
    SHAPE_MATCHERS, ShapeMatcher, cap_chars, extract_reply, extract_reply_from_body, match_shape,
};
pub use serialize::{
    ChatRequestOptions, DEFAULT_MAX_TOKENS, DEFAULT_MODEL, DEFAULT_TEMPERATURE, SerializationMode,
    UnknownSerializationMode, build_request_body, flatten_messages, probe_request_body,
};
pub use transport::{
    ChatTransport, HttpChatTransport, TransportConfigError, TransportError, TransportFuture,
    TransportResponse,
};
pub use truncate::{TRUNCATION_SLACK_CHARS, truncate_history};
