//! Reserved secret keys.

/// Platform API key.
pub const API_KEY: &str = "api_key";

/// OAuth application client id.
pub const CLIENT_ID: &str = "client_id";

/// OAuth application client secret.
pub const CLIENT_SECRET: &str = "client_secret";

/// JSON array of registered grants.
pub const GRANTS: &str = "grants";

/// Id of the grant used when none is given explicitly.
pub const DEFAULT_GRANT: &str = "default_grant";

const GRANT_TOKEN_PREFIX: &str = "grant_token_";

/// Key holding the OAuth token for a single grant.
pub fn grant_token(grant_id: &str) -> String {
    format!("{GRANT_TOKEN_PREFIX}{grant_id}")
}
