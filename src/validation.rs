use url::Url;

/// Longest target URL accepted, in characters.
pub const MAX_URL_LENGTH: usize = 2083;

/// Why a submitted target URL was refused.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("Input should be a valid URL, input is empty")]
    Empty,
    #[error("URL should have at most {MAX_URL_LENGTH} characters")]
    TooLong,
    #[error("Input should be a valid URL, {0}")]
    Malformed(url::ParseError),
    #[error("URL scheme should be 'http' or 'https'")]
    UnsupportedScheme,
    #[error("Input should be a valid URL, missing host")]
    MissingHost,
}

impl ValidationError {
    /// Machine-readable error type reported to clients.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Empty | Self::Malformed(_) | Self::MissingHost => "url_parsing",
            Self::TooLong => "url_too_long",
            Self::UnsupportedScheme => "url_scheme",
        }
    }
}

/// Accept `input` only if it is an absolute `http`/`https` URL with a host.
///
/// Surrounding whitespace is trimmed; otherwise the URL is returned exactly
/// as submitted, without normalisation.
pub fn validate_target_url(input: &str) -> Result<String, ValidationError> {
    let url = input.trim();
    if url.is_empty() {
        return Err(ValidationError::Empty);
    }
    if url.chars().count() > MAX_URL_LENGTH {
        return Err(ValidationError::TooLong);
    }

    let parsed = Url::parse(url).map_err(ValidationError::Malformed)?;
    match parsed.scheme() {
        "http" | "https" => {}
        _ => return Err(ValidationError::UnsupportedScheme),
    }
    if parsed.host().is_none() {
        return Err(ValidationError::MissingHost);
    }

    Ok(url.to_owned())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_absolute_http_urls_verbatim() {
        for url in [
            "https://example.com",
            "http://example.com/very/long/path?x=1&y=2#top",
            "https://sub.example.co.uk:8443/a%20b",
            "http://127.0.0.1:8000/",
        ] {
            assert_eq!(validate_target_url(url).unwrap(), url);
        }
    }

    #[test]
    fn trims_surrounding_whitespace() {
        assert_eq!(
            validate_target_url("  https://example.com/x \n").unwrap(),
            "https://example.com/x"
        );
    }

    #[test]
    fn rejects_relative_and_garbage_input() {
        assert!(matches!(
            validate_target_url("not-a-url"),
            Err(ValidationError::Malformed(url::ParseError::RelativeUrlWithoutBase))
        ));
        assert!(matches!(
            validate_target_url("/just/a/path"),
            Err(ValidationError::Malformed(_))
        ));
        assert!(matches!(
            validate_target_url("http://"),
            Err(ValidationError::Malformed(_))
        ));
        assert_eq!(validate_target_url("   "), Err(ValidationError::Empty));
    }

    #[test]
    fn rejects_non_http_schemes() {
        for url in ["javascript:alert(1)", "ftp://example.com/f", "mailto:a@example.com"] {
            let err = validate_target_url(url).unwrap_err();
            assert_eq!(err, ValidationError::UnsupportedScheme, "{url}");
            assert_eq!(err.kind(), "url_scheme");
        }
    }

    #[test]
    fn enforces_length_limit() {
        let base = "https://example.com/";
        let ok = format!("{base}{}", "a".repeat(MAX_URL_LENGTH - base.len()));
        let too_long = format!("{ok}a");

        assert!(validate_target_url(&ok).is_ok());
        assert_eq!(validate_target_url(&too_long), Err(ValidationError::TooLong));
    }
}
