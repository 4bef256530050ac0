use serde::Deserialize;
use uuid::Uuid;

/// Query of `GET /auth/callback`.
#[derive(Debug, Default, PartialEq)]
pub struct CallbackQuery {
    pub code: Option<String>,
}

impl CallbackQuery {
    /// Keeps the first `code` when the parameter repeats.
    pub fn from_pairs(pairs: Vec<(String, String)>) -> Self {
        let code = pairs
            .into_iter()
            .find(|(k, _)| k == "code")
            .map(|(_, v)| v);
        Self { code }
    }
}

/// Authenticated principal as returned by the code exchange.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct SessionUser {
    pub id: Uuid,
    #[serde(default)]
    pub email: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Session {
    pub access_token: String,
    pub refresh_token: Option<String>,
    pub expires_in: Option<i64>, // seconds
    pub user: SessionUser,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pairs(raw: &[(&str, &str)]) -> Vec<(String, String)> {
        raw.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect()
    }

    #[test]
    fn first_code_wins() {
        let q = CallbackQuery::from_pairs(pairs(&[("code", "a"), ("next", "/x"), ("code", "b")]));
        assert_eq!(q.code.as_deref(), Some("a"));
    }

    #[test]
    fn missing_code_is_none() {
        assert_eq!(CallbackQuery::from_pairs(pairs(&[("state", "s")])), CallbackQuery::default());
        assert_eq!(CallbackQuery::from_pairs(Vec::new()).code, None);
    }
}
