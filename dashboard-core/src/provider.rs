use reqwest::StatusCode;

pub mod openweather;

pub use openweather::OpenWeatherClient;

/// Failures raised by the weather service client.
///
/// The API key never appears in any variant: request errors are stripped of
/// their URL (the key travels as a query parameter) and upstream bodies are
/// echoed back truncated.
#[derive(Debug, thiserror::Error)]
pub enum WeatherError {
    #[error("weather service request failed: {0}")]
    Request(#[source] reqwest::Error),

    #[error("weather service returned {status}: {body}")]
    Upstream { status: StatusCode, body: String },

    #[error("failed to decode weather service response: {0}")]
    Parse(#[from] serde_json::Error),
}

impl WeatherError {
    pub(crate) fn request(err: reqwest::Error) -> Self {
        WeatherError::Request(err.without_url())
    }

    pub(crate) fn upstream(status: StatusCode, body: &str) -> Self {
        WeatherError::Upstream { status, body: truncate_body(body) }
    }
}

fn truncate_body(body: &str) -> String {
    const MAX: usize = 200;
    if body.len() > MAX {
        // Back off to a char boundary so multi-byte text cannot panic the slice.
        let mut idx = MAX;
        while !body.is_char_boundary(idx) {
            idx -= 1;
        }
        format!("{}...", &body[..idx])
    } else {
        body.to_string()
    }
}
