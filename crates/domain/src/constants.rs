//! Application constants
//!
//! Storage slot names, wire-level header names and protocol bounds.

// Persistent key-value slots
pub const SLOT_SERVER_URL: &str = "server_url";
pub const SLOT_PASSWORD: &str = "password";
pub const SLOT_LOGIN: &str = "login";
pub const SLOT_SERIAL: &str = "serial";

// Wire contract
pub const HEADER_NEXT_PASSWORD: &str = "X-Next-Password";
pub const HEADER_AUTHORIZATION: &str = "Authorization";
pub const HEADER_USER_AGENT: &str = "User-Agent";
pub const HEADER_CONTENT_TYPE: &str = "Content-Type";
pub const CONTENT_TYPE_JSON: &str = "application/json";
pub const USER_AGENT_SUFFIX: &str = "Hauth";

// Transport
pub const DEFAULT_CONNECT_TIMEOUT_MS: u64 = 3000;

// Device identity
pub const PROBE_RETRY_LIMIT: u32 = 5;
pub const PROBE_TIMEOUT_MS: u64 = 10_000;
pub const BUILTIN_SERIAL_LEN: usize = 10;
pub const UNKNOWN_SERIAL: &str = "unknown";
pub const KNOWN_MANUFACTURER: &str = "Freescale";
pub const KNOWN_MODEL: &str = "PM098-MX6DQ";

// Legacy integer result codes
pub const LEGACY_MISSING_PASSWORD: i32 = 1;
pub const LEGACY_INVALID_PASSWORD: i32 = 2;
pub const LEGACY_IO_EXCEPTION: i32 = 3;
