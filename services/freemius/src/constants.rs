use percent_encoding::AsciiSet;
use percent_encoding::NON_ALPHANUMERIC;

// API endpoints.
pub const API_ADDRESS: &str = "https://api.freemius.com";
pub const API_SANDBOX_ADDRESS: &str = "https://sandbox-api.freemius.com";

// Headers used by the signing scheme.
pub const CONTENT_MD5: &str = "content-md5";

// Env values used by the credential providers.
pub const FREEMIUS_API_SCOPE: &str = "FREEMIUS_API_SCOPE";
pub const FREEMIUS_ENTITY_ID: &str = "FREEMIUS_ENTITY_ID";
pub const FREEMIUS_PUBLIC_KEY: &str = "FREEMIUS_PUBLIC_KEY";
pub const FREEMIUS_SECRET_KEY: &str = "FREEMIUS_SECRET_KEY";
pub const FREEMIUS_API_SANDBOX: &str = "FREEMIUS_API_SANDBOX";

/// AsciiSet for encoding query parameter values.
///
/// Every byte except the unreserved characters 'A'-'Z', 'a'-'z', '0'-'9',
/// '-', '.', '_' and '~' is encoded.
pub static QUERY_ENCODE_SET: AsciiSet = NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'.')
    .remove(b'_')
    .remove(b'~');
