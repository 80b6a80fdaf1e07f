use serde::{Deserialize, Serialize};
use serde_valid::Validate;

#[derive(Debug, Deserialize, Validate)]
pub struct SignupForm {
    #[validate(min_length = 1)]
    #[validate(max_length = 64)]
    #[validate(pattern = r"^[^\x00]*$")]
    pub username: String,
    #[validate(min_length = 1)]
    #[validate(max_length = 256)]
    pub password: String,
    #[validate(max_length = 254)]
    #[validate(pattern = r"^[^@\s\x00]+@[^@\s\x00]+$")]
    pub email: String,
}

#[derive(Deserialize)]
pub struct LoginForm {
    pub username: String,
    pub password: String,
}

impl std::fmt::Debug for LoginForm {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LoginForm")
            .field("username", &self.username)
            .finish_non_exhaustive()
    }
}

#[derive(Debug, Serialize)]
pub struct TokenView {
    pub token: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn signup(value: serde_json::Value) -> SignupForm {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn short_password_is_accepted() {
        let form = signup(json!({"username": "alice", "password": "pw123", "email": "alice@example.com"}));
        assert!(form.validate().is_ok());
    }

    #[test]
    fn empty_username_and_bad_email_are_rejected() {
        let form = signup(json!({"username": "", "password": "pw123", "email": "alice@example.com"}));
        assert!(form.validate().is_err());

        let form = signup(json!({"username": "alice", "password": "pw123", "email": "alice"}));
        assert!(form.validate().is_err());
    }

    #[test]
    fn nul_in_stored_fields_is_rejected() {
        let form = signup(json!({"username": "al\u{0}ice", "password": "pw123", "email": "alice@example.com"}));
        assert!(form.validate().is_err());

        let form = signup(json!({"username": "alice", "password": "pw123", "email": "alice@exa\u{0}mple.com"}));
        assert!(form.validate().is_err());

        let form = signup(json!({"username": "alice", "password": "pw\u{0}123", "email": "alice@example.com"}));
        assert!(form.validate().is_ok());
    }

    #[test]
    fn login_debug_hides_password() {
        let form = LoginForm {
            username: "alice".to_string(),
            password: "pw123".to_string(),
        };
        assert!(!format!("{form:?}").contains("pw123"));
    }
}
