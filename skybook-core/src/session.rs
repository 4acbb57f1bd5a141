use serde::{Deserialize, Serialize};
use skybook_shared::Masked;
use uuid::Uuid;

/// Caller context handed explicitly to the wizard and the reconciler.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Session {
    pub user_id: Option<Uuid>,
    pub email: Option<String>,
    pub access_token: Option<Masked<String>>,
}

impl Session {
    pub fn anonymous() -> Self {
        Self::default()
    }

    pub fn authenticated(user_id: Uuid, email: impl Into<String>, access_token: impl Into<String>) -> Self {
        Self {
            user_id: Some(user_id),
            email: Some(email.into()),
            access_token: Some(Masked(access_token.into())),
        }
    }

    pub fn is_authenticated(&self) -> bool {
        self.user_id.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_token_never_logged() {
        let session = Session::authenticated(Uuid::new_v4(), "ana@example.com", "jwt-secret-value");
        let rendered = format!("{:?}", session);
        assert!(session.is_authenticated());
        assert!(!rendered.contains("jwt-secret-value"));
    }
}
