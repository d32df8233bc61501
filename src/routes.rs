//! Navigation targets between views. Actions return a [`Route`] to tell the
//! front end where the user goes next; the CLI turns it into a hint naming
//! the command to run.

use std::fmt;

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Route {
    Landing,
    Login,
    Register,
    Verify { email: String },
    ForgotPassword,
    Dashboard,
    Contact,
    Docs,
    Admin,
}

impl Route {
    /// Path form of the route, with the verify email URL-encoded.
    #[must_use]
    pub fn path(&self) -> String {
        match self {
            Self::Landing => "/".to_string(),
            Self::Login => "/login".to_string(),
            Self::Register => "/register".to_string(),
            Self::Verify { email } => {
                let query: String = url::form_urlencoded::Serializer::new(String::new())
                    .append_pair("email", email)
                    .finish();
                format!("/verify?{query}")
            }
            Self::ForgotPassword => "/forgot-password".to_string(),
            Self::Dashboard => "/dashboard".to_string(),
            Self::Contact => "/contact".to_string(),
            Self::Docs => "/docs".to_string(),
            Self::Admin => "/admin".to_string(),
        }
    }

    /// Whether the view behind this route needs a signed-in user.
    #[must_use]
    pub const fn requires_auth(&self) -> bool {
        matches!(self, Self::Dashboard | Self::Contact | Self::Admin)
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.path())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn verify_path_encodes_email() {
        let route = Route::Verify {
            email: "jo+home@example.com".to_string(),
        };
        assert_eq!(route.path(), "/verify?email=jo%2Bhome%40example.com");
    }

    #[test]
    fn protected_routes() {
        assert!(Route::Dashboard.requires_auth());
        assert!(Route::Admin.requires_auth());
        assert!(!Route::Login.requires_auth());
        assert!(!Route::Docs.requires_auth());
    }
}
