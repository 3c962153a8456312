// Google Translate free ("gtx") endpoint: request URLs and response parsing.
//
// Response shape for dt=t:
//   [[["translated", "source", null, null, 10], ...], null, "en", ...]

use crate::utils::url_encode;
use serde_json::Value;

pub struct GoogleService {
    base_url: String,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ParsedResponse {
    /// First translated segment, `None` when the payload carries no text.
    pub translated: Option<String>,
    pub detected_language: Option<String>,
}

impl GoogleService {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
        }
    }

    /// GET url with `sl=auto`, plain-text mode and the escaped text.
    pub fn request_url(&self, text: &str, target_lang: &str) -> String {
        format!(
            "{}?client=gtx&sl=auto&tl={}&dt=t&q={}",
            self.base_url,
            url_encode(target_lang),
            url_encode(text)
        )
    }
}

pub fn parse_response(body: &str) -> Result<ParsedResponse, String> {
    let json: Value =
        serde_json::from_str(body).map_err(|e| format!("JSON parse error: {}", e))?;

    let translated = json
        .get(0)
        .and_then(|segments| segments.get(0))
        .and_then(|segment| segment.get(0))
        .and_then(Value::as_str)
        .filter(|text| !text.is_empty())
        .map(str::to_string);

    let detected_language = json
        .get(2)
        .and_then(Value::as_str)
        .filter(|code| !code.is_empty())
        .map(str::to_string);

    Ok(ParsedResponse {
        translated,
        detected_language,
    })
}
