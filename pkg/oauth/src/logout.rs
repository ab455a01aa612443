/// Returns the end-session URL for well-known providers.
///
/// Unknown providers have none.
pub fn logout_url(provider_url: &str) -> Option<String> {
    let base = provider_url.trim_end_matches('/');
    if base.contains("accounts.google.com") {
        return Some("https://accounts.google.com/logout".to_string());
    }

    let suffix = KNOWN_LOGOUT_PATHS
        .iter()
        .find_map(|(needle, path)| base.contains(needle).then_some(*path))?;
    Some(format!("{base}{suffix}"))
}

/// Provider URL fragment and the logout path appended to the provider URL.
const KNOWN_LOGOUT_PATHS: [(&str, &str); 5] = [
    ("login.microsoftonline.com", "/oauth2/logout"),
    ("auth0.com", "/v2/logout"),
    ("okta.com", "/oauth2/v1/logout"),
    ("/realms/", "/protocol/openid-connect/logout"),
    ("oryapis.com", "/oauth2/sessions/logout"),
];
