use axum::http::HeaderMap;

/// Caller credentials taken from request headers
///
/// An absent header stays `None` and never authenticates, even against a
/// stored empty login or password.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Credentials {
    pub login: Option<String>,
    pub password: Option<String>,
}

impl Credentials {
    pub fn new(login: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            login: Some(login.into()),
            password: Some(password.into()),
        }
    }

    /// Read credentials from the `login`/`password` headers, falling back to
    /// `requestLogin`/`requestPassword`.
    pub fn from_headers(headers: &HeaderMap) -> Self {
        Self {
            login: header_value(headers, &["login", "requestlogin"]),
            password: header_value(headers, &["password", "requestpassword"]),
        }
    }

    /// Both halves, or `None` when either header was missing
    pub fn pair(&self) -> Option<(&str, &str)> {
        Some((self.login.as_deref()?, self.password.as_deref()?))
    }

    /// Login for log fields
    pub fn caller(&self) -> &str {
        self.login.as_deref().unwrap_or("<none>")
    }
}

fn header_value(headers: &HeaderMap, names: &[&str]) -> Option<String> {
    names
        .iter()
        .find_map(|name| headers.get(*name).and_then(|v| v.to_str().ok()))
        .map(str::to_string)
}

/// Compare two secrets in constant time
pub fn secrets_match(provided: &str, expected: &str) -> bool {
    provided.as_bytes().len() == expected.as_bytes().len()
        && provided
            .as_bytes()
            .iter()
            .zip(expected.as_bytes().iter())
            .fold(0u8, |acc, (a, b)| acc | (a ^ b))
            == 0
}
