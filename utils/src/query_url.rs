use url::Url;

pub use url::ParseError;

/// Builds `base` with `segments` appended to its path and `params` appended
/// to its query, all percent-encoded.
pub fn build_url(base: &str, segments: &[&str], params: &[(&str, &str)]) -> Result<Url, ParseError> {
    let mut url = Url::parse(base)?;
    if !segments.is_empty() {
        let mut path = url
            .path_segments_mut()
            .map_err(|_| ParseError::RelativeUrlWithCannotBeABaseBase)?;
        path.pop_if_empty().extend(segments);
    }
    if !params.is_empty() {
        let mut pairs = url.query_pairs_mut();
        for (key, value) in params {
            pairs.append_pair(key, value);
        }
    }
    Ok(url)
}

/// Builds `base` with the given query pairs appended.
pub fn with_query(base: &str, params: &[(&str, &str)]) -> Result<Url, ParseError> {
    build_url(base, &[], params)
}

/// Returns `url` as a string with the values of `secrets` replaced by `***`.
pub fn redact_query(url: &Url, secrets: &[&str]) -> String {
    if url.query().is_none() {
        return url.to_string();
    }

    let pairs: Vec<(String, String)> = url
        .query_pairs()
        .map(|(key, value)| {
            if secrets.iter().any(|s| key.eq_ignore_ascii_case(s)) {
                (key.into_owned(), "***".to_string())
            } else {
                (key.into_owned(), value.into_owned())
            }
        })
        .collect();

    let mut redacted = url.clone();
    redacted
        .query_pairs_mut()
        .clear()
        .extend_pairs(pairs.iter().map(|(k, v)| (k.as_str(), v.as_str())));
    redacted.to_string()
}
