use url::Url;

const API_PREFIX: &str = "/api";

/// Ensure the path is absolute and carries the `/api` routing prefix
pub fn normalise(path: &str) -> String {
    let mut normalised = String::with_capacity(API_PREFIX.len() + path.len() + 1);

    if !path.starts_with('/') {
        normalised.push('/');
    }
    normalised.push_str(path);

    if !normalised.starts_with(API_PREFIX) {
        normalised.insert_str(0, API_PREFIX);
    }

    normalised
}

/// Join the normalised path onto the base URL and append the query pairs
///
/// Pairs are appended to a query the path might already carry
pub fn resolve(base_url: &Url, path: &str, params: &[(String, String)]) -> Result<Url, url::ParseError> {
    let base = base_url.as_str().trim_end_matches('/');
    let mut url = Url::parse(&format!("{base}{path}"))?;

    if !params.is_empty() {
        url.query_pairs_mut().extend_pairs(params);
    }

    Ok(url)
}
