use crate::UrlError;
use url::Url;

/// List of tracking query parameters ignored when comparing URLs
const TRACKING_PARAMS: &[&str] = &[
    "utm_source",
    "utm_medium",
    "utm_campaign",
    "utm_term",
    "utm_content",
    "fbclid",
    "gclid",
    "mc_eid",
];

/// Parses an absolute HTTP(S) URL
///
/// # Returns
///
/// * `Ok(Url)` - The parsed URL
/// * `Err(UrlError)` - The string is not a URL, is not HTTP(S), or has no host
pub fn parse_http_url(url_str: &str) -> Result<Url, UrlError> {
    let url = Url::parse(url_str).map_err(|e| UrlError::Parse(e.to_string()))?;

    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(UrlError::InvalidScheme(format!(
            "Only HTTP and HTTPS schemes are supported, got: {}",
            url.scheme()
        )));
    }

    if url.host_str().is_none() {
        return Err(UrlError::MissingHost);
    }

    Ok(url)
}

/// Computes the key under which a URL is recorded as visited
///
/// Two links that address the same page map to the same key, so a pagination
/// link that points back at the current page is recognized even when it is
/// spelled differently.
///
/// # Normalization Steps
///
/// 1. Scheme and host are already lowercased by the URL parser
/// 2. Remove dot segments, duplicate slashes and the trailing slash
///    (except for root `/`)
/// 3. Remove fragment
/// 4. Remove tracking query parameters
/// 5. Sort remaining query parameters; drop an empty query
///
/// # Examples
///
/// ```
/// use patent_harvester::url::canonical_key;
/// use url::Url;
///
/// let a = Url::parse("https://Example.com/dates/2020/?page=2#top").unwrap();
/// let b = Url::parse("https://example.com/dates/./2020?page=2").unwrap();
/// assert_eq!(canonical_key(&a), canonical_key(&b));
/// ```
pub fn canonical_key(url: &Url) -> String {
    let mut url = url.clone();

    let normalized_path = normalize_path(url.path());
    url.set_path(&normalized_path);

    url.set_fragment(None);

    if url.query().is_some() {
        let params = filter_and_sort_query_params(&url);

        if params.is_empty() {
            url.set_query(None);
        } else {
            // Re-encode so reserved characters inside values stay distinct
            url.query_pairs_mut().clear().extend_pairs(&params);
        }
    }

    url.to_string()
}

/// Normalizes a URL path by removing dot segments and trailing slashes
fn normalize_path(path: &str) -> String {
    let mut segments: Vec<&str> = Vec::new();

    for segment in path.split('/') {
        match segment {
            "" | "." => continue,
            ".." => {
                segments.pop();
            }
            _ => segments.push(segment),
        }
    }

    if segments.is_empty() {
        "/".to_string()
    } else {
        format!("/{}", segments.join("/"))
    }
}

/// Filters out tracking parameters and sorts remaining query parameters
fn filter_and_sort_query_params(url: &Url) -> Vec<(String, String)> {
    let mut params: Vec<(String, String)> = url
        .query_pairs()
        .filter(|(key, _)| !is_tracking_param(key))
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();

    params.sort();
    params
}

fn is_tracking_param(key: &str) -> bool {
    TRACKING_PARAMS.contains(&key) || key.starts_with("utm_")
}
