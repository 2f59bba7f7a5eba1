//! Small helpers shared by the OpenWeatherMap clients.

use reqwest::{Client, Request, StatusCode, Url};
use serde::de::DeserializeOwned;
use std::time::Duration;

use crate::WeatherError;

/// Query parameter OpenWeatherMap expects the API key in.
pub(crate) const CREDENTIAL_PARAM: &str = "appid";

const FILTERED: &str = "[FILTERED]";

pub(crate) fn build_client(timeout: Duration) -> Result<Client, WeatherError> {
    Ok(Client::builder().timeout(timeout).build()?)
}

/// Status and body of a completed request.
#[derive(Debug)]
pub(crate) struct RawResponse {
    pub status: StatusCode,
    pub body: String,
}

/// Send `request` once. Only the redacted URL is ever logged.
pub(crate) async fn send(http: &Client, request: Request) -> Result<RawResponse, WeatherError> {
    let url = redact_credential(request.url().as_str());
    tracing::debug!(%url, "sending provider request");

    let res = http.execute(request).await?;
    let status = res.status();
    let body = res.text().await?;

    tracing::debug!(%url, status = status.as_u16(), "provider responded");
    Ok(RawResponse { status, body })
}

pub(crate) fn decode<T: DeserializeOwned>(body: &str, what: &str) -> Result<T, WeatherError> {
    serde_json::from_str(body).map_err(|e| WeatherError::Decode(format!("{what}: {e}")))
}

/// Replace the value of every `appid` query parameter in `url` with `[FILTERED]`.
///
/// Parameter names are compared after percent-decoding, the way the server
/// reads them. A URL that does not parse is replaced wholesale.
pub fn redact_credential(url: &str) -> String {
    let Ok(mut parsed) = Url::parse(url) else {
        return FILTERED.to_string();
    };

    let mut found = false;
    let pairs: Vec<(String, String)> = parsed
        .query_pairs()
        .map(|(name, value)| {
            if name.eq_ignore_ascii_case(CREDENTIAL_PARAM) {
                found = true;
                (name.into_owned(), FILTERED.to_string())
            } else {
                (name.into_owned(), value.into_owned())
            }
        })
        .collect();

    if found {
        parsed.query_pairs_mut().clear().extend_pairs(pairs);
    }
    parsed.to_string()
}

pub(crate) fn truncate_body(body: &str) -> String {
    const MAX: usize = 200;
    if body.len() > MAX {
        let mut end = MAX;
        while !body.is_char_boundary(end) {
            end -= 1;
        }
        format!("{}...", &body[..end])
    } else {
        body.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn credential_values(url: &str) -> Vec<String> {
        Url::parse(url)
            .expect("redacted url parses")
            .query_pairs()
            .filter(|(name, _)| name == CREDENTIAL_PARAM)
            .map(|(_, value)| value.into_owned())
            .collect()
    }

    #[test]
    fn redacts_appid_in_middle_and_end() {
        let redacted = redact_credential("https://x/direct?appid=SECRET&q=Paris&limit=1");
        assert!(!redacted.contains("SECRET"));
        assert_eq!(credential_values(&redacted), vec![FILTERED.to_string()]);
        assert!(redacted.contains("q=Paris"));

        let redacted = redact_credential("https://x/weather?lat=1&lon=2&units=metric&appid=SECRET");
        assert!(!redacted.contains("SECRET"));
        assert_eq!(credential_values(&redacted), vec![FILTERED.to_string()]);
    }

    #[test]
    fn redacts_percent_encoded_param_name() {
        let redacted = redact_credential("https://x/direct?q=a&app%69d=SECRET");

        assert!(!redacted.contains("SECRET"));
        assert_eq!(credential_values(&redacted), vec![FILTERED.to_string()]);
    }

    #[test]
    fn redacts_every_occurrence() {
        let redacted = redact_credential("https://x/direct?appid=ONE&appid=TWO");

        assert!(!redacted.contains("ONE") && !redacted.contains("TWO"));
        assert_eq!(credential_values(&redacted).len(), 2);
    }

    #[test]
    fn leaves_lookalike_params_alone() {
        assert_eq!(
            redact_credential("https://x/direct?xappid=keep&q=a"),
            "https://x/direct?xappid=keep&q=a"
        );
        assert_eq!(redact_credential("https://x/direct?q=a"), "https://x/direct?q=a");
    }

    #[test]
    fn unparseable_url_is_hidden_entirely() {
        assert_eq!(redact_credential("not a url appid=SECRET"), FILTERED);
    }

    #[test]
    fn truncates_long_bodies_on_char_boundary() {
        let body = "é".repeat(150);
        let truncated = truncate_body(&body);
        assert!(truncated.ends_with("..."));
        assert!(truncated.len() <= 203);
        assert_eq!(truncate_body("short"), "short");
    }
}
