//! Storage keys and token endpoint paths

/// Local-storage key for the short-lived bearer credential
pub const ACCESS_TOKEN_KEY: &str = "access_token";

/// Local-storage key for the long-lived credential used only to mint access tokens
pub const REFRESH_TOKEN_KEY: &str = "refresh_token";

/// Login endpoint (email + password → token pair), relative to the API base URL
pub const LOGIN_PATH: &str = "/token/";

/// Token refresh endpoint, relative to the API base URL
pub const REFRESH_PATH: &str = "/token/refresh/";

/// Client-side route the user is sent to when the session cannot be recovered
pub const LOGIN_ROUTE: &str = "/login";
