use std::fmt;

use super::{BASIC_URI_KEY, Config, SECURE_URI_KEY};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
/// Remote action exposed by the gateway.
pub enum Endpoint {
    Auth,
    Balance,
    Send,
    Schedule,
}

impl Endpoint {
    pub const ALL: [Endpoint; 4] = [Self::Auth, Self::Balance, Self::Send, Self::Schedule];

    /// Config key holding this endpoint's path suffix.
    pub fn config_key(self) -> &'static str {
        match self {
            Self::Auth => "resource.uri.auth",
            Self::Balance => "resource.uri.balance",
            Self::Send => "resource.uri.send",
            Self::Schedule => "resource.uri.schedule",
        }
    }
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Auth => "auth",
            Self::Balance => "balance",
            Self::Send => "send",
            Self::Schedule => "schedule",
        };
        f.write_str(name)
    }
}

/// Build the URL for `endpoint` from `uri.secure` or `uri.basic` plus the endpoint's
/// suffix. `None` if either key is missing.
///
/// Nothing is cached: flipping the secure flag is seen by the next call.
pub fn resolve(config: &Config, endpoint: Endpoint, secure: bool) -> Option<String> {
    let base_key = if secure { SECURE_URI_KEY } else { BASIC_URI_KEY };
    let base = config.get(base_key)?;
    let suffix = config.get(endpoint.config_key())?;
    Some(format!("{base}{suffix}"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ConfigLoader;

    fn config(pairs: &[(&str, &str)]) -> Config {
        let mut config = Config::new();
        for (key, value) in pairs {
            config.set(*key, *value).unwrap();
        }
        config
    }

    #[test]
    fn picks_base_by_secure_flag() {
        let config = config(&[
            ("uri.secure", "https://host"),
            ("uri.basic", "http://host2"),
            ("resource.uri.send", "/send"),
        ]);

        assert_eq!(
            resolve(&config, Endpoint::Send, true).as_deref(),
            Some("https://host/send")
        );
        assert_eq!(
            resolve(&config, Endpoint::Send, false).as_deref(),
            Some("http://host2/send")
        );
    }

    #[test]
    fn missing_resource_key_is_absent() {
        let config = config(&[("uri.secure", "https://host")]);
        assert_eq!(resolve(&config, Endpoint::Schedule, true), None);
    }

    #[test]
    fn missing_base_key_is_absent() {
        let config = config(&[("resource.uri.auth", "/auth")]);
        assert_eq!(resolve(&config, Endpoint::Auth, false), None);
    }

    #[test]
    fn secure_flag_flip_is_observed_immediately() {
        let mut config = ConfigLoader::new().no_user_source().load().unwrap();

        config.set_secure(true);
        assert_eq!(
            config.endpoint(Endpoint::Balance).as_deref(),
            Some("https://www.bbnplace.com/sms/bulksms/acctbals.php")
        );

        config.set_secure(false);
        assert_eq!(
            config.endpoint(Endpoint::Balance).as_deref(),
            Some("http://sms.bbnplace.com/bulksms/acctbals.php")
        );
    }

    #[test]
    fn defaults_cover_every_endpoint() {
        let config = ConfigLoader::new().no_user_source().load().unwrap();
        for endpoint in Endpoint::ALL {
            assert!(
                config.endpoint(endpoint).is_some(),
                "no default for {endpoint}"
            );
        }
    }
}
