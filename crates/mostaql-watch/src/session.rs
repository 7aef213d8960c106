use std::fmt;

/// Environment variable holding the `mostaqlweb` login cookie.
pub const TOKEN_VAR: &str = "MOSTAQLWEB";
const TOKEN_COOKIE: &str = "mostaqlweb";

/// (env var, cookie name, fallback) for cookies that help but are not required.
const OPTIONAL_COOKIES: &[(&str, &str, Option<&str>)] = &[
    ("XSRF_TOKEN", "XSRF-TOKEN", None),
    ("AWSALB", "AWSALB", None),
    ("AWSALBCORS", "AWSALBCORS", None),
    ("NOTIFICATION_COUNT", "notification_count", Some("0")),
    ("GA_ID", "_ga", None),
    ("GA_SPLJ01EF84", "_ga_SPLJ01EF84", None),
    ("GID", "_gid", None),
    ("STRIPE_MID", "__stripe_mid", None),
];

#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error("MOSTAQLWEB environment variable is not set")]
    MissingToken,
}

/// Cookies sent with the dashboard request.
#[derive(Clone, PartialEq, Eq)]
pub struct SessionContext {
    token: String,
    optional: Vec<(&'static str, String)>,
}

impl SessionContext {
    pub fn from_env() -> Result<Self, SessionError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, SessionError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let token = lookup(TOKEN_VAR)
            .filter(|v| !v.is_empty())
            .ok_or(SessionError::MissingToken)?;

        let optional = OPTIONAL_COOKIES
            .iter()
            .filter_map(|&(var, cookie, fallback)| {
                let value = lookup(var).or_else(|| fallback.map(str::to_string))?;
                (!value.is_empty()).then_some((cookie, value))
            })
            .collect();

        Ok(Self { token, optional })
    }

    pub fn token(&self) -> &str {
        &self.token
    }

    /// Cookie names and values, mandatory cookie first.
    pub fn cookies(&self) -> impl Iterator<Item = (&str, &str)> {
        std::iter::once((TOKEN_COOKIE, self.token.as_str()))
            .chain(self.optional.iter().map(|(k, v)| (*k, v.as_str())))
    }

    pub fn cookie_header(&self) -> String {
        self.cookies()
            .map(|(name, value)| format!("{name}={value}"))
            .collect::<Vec<_>>()
            .join("; ")
    }

    /// Operator instructions printed when the token is missing.
    pub fn guidance() -> &'static str {
        concat!(
            "Please set the MOSTAQLWEB environment variable (a .env file works too).\n",
            "Open mostaql.com in your browser and log in, then open the developer tools\n",
            "and copy the value of the `mostaqlweb` cookie into MOSTAQLWEB.\n",
            "Optional cookies: XSRF_TOKEN, AWSALB, AWSALBCORS, NOTIFICATION_COUNT, GA_ID,\n",
            "GA_SPLJ01EF84, GID, STRIPE_MID."
        )
    }
}

impl fmt::Debug for SessionContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let names: Vec<&str> = self.cookies().map(|(name, _)| name).collect();
        f.debug_struct("SessionContext")
            .field("cookies", &names)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| map.get(name).cloned()
    }

    #[test]
    fn test_missing_token_is_an_error() {
        let result = SessionContext::from_lookup(lookup(&[("AWSALB", "abc")]));
        assert!(matches!(result, Err(SessionError::MissingToken)));
    }

    #[test]
    fn test_empty_token_is_an_error() {
        let result = SessionContext::from_lookup(lookup(&[(TOKEN_VAR, "")]));
        assert!(matches!(result, Err(SessionError::MissingToken)));
    }

    #[test]
    fn test_token_only_gets_notification_count_default() {
        let session = SessionContext::from_lookup(lookup(&[(TOKEN_VAR, "s3cr3t")])).unwrap();

        assert_eq!(session.token(), "s3cr3t");
        assert_eq!(
            session.cookie_header(),
            "mostaqlweb=s3cr3t; notification_count=0"
        );
    }

    #[test]
    fn test_optional_cookies_skip_empty_values() {
        let session = SessionContext::from_lookup(lookup(&[
            (TOKEN_VAR, "tok"),
            ("XSRF_TOKEN", "xsrf"),
            ("GID", ""),
            ("STRIPE_MID", "stripe"),
            ("NOTIFICATION_COUNT", "4"),
        ]))
        .unwrap();

        let cookies: Vec<(&str, &str)> = session.cookies().collect();
        assert_eq!(
            cookies,
            vec![
                ("mostaqlweb", "tok"),
                ("XSRF-TOKEN", "xsrf"),
                ("notification_count", "4"),
                ("__stripe_mid", "stripe"),
            ]
        );
    }

    #[test]
    fn test_debug_hides_values() {
        let session = SessionContext::from_lookup(lookup(&[(TOKEN_VAR, "very-secret")])).unwrap();
        let debug = format!("{session:?}");
        assert!(debug.contains("mostaqlweb"));
        assert!(!debug.contains("very-secret"));
    }
}
