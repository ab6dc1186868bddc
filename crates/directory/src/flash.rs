use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use time::Duration as TimeDuration;

pub const FLASH_COOKIE: &str = "directory_flash";

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Level {
    Success,
    Error,
}

impl Level {
    pub fn as_str(self) -> &'static str {
        match self {
            Level::Success => "success",
            Level::Error => "error",
        }
    }

    fn parse(value: &str) -> Option<Self> {
        match value {
            "success" => Some(Level::Success),
            "error" => Some(Level::Error),
            _ => None,
        }
    }
}

/// One-time status message shown on the page rendered after a redirect.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Flash {
    pub level: Level,
    pub message: String,
}

impl Flash {
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            level: Level::Success,
            message: message.into(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            level: Level::Error,
            message: message.into(),
        }
    }

    fn encode(&self) -> String {
        url::form_urlencoded::Serializer::new(String::new())
            .append_pair("level", self.level.as_str())
            .append_pair("message", &self.message)
            .finish()
    }

    fn decode(value: &str) -> Option<Self> {
        let mut level = None;
        let mut message = None;
        for (key, val) in url::form_urlencoded::parse(value.as_bytes()) {
            match key.as_ref() {
                "level" => level = Level::parse(&val),
                "message" => message = Some(val.into_owned()),
                _ => {}
            }
        }
        Some(Self {
            level: level?,
            message: message?,
        })
    }
}

pub fn push(jar: CookieJar, flash: Flash) -> CookieJar {
    jar.add(
        Cookie::build((FLASH_COOKIE, flash.encode()))
            .path("/")
            .http_only(true)
            .same_site(SameSite::Lax)
            .max_age(TimeDuration::minutes(5))
            .build(),
    )
}

/// Reads the pending message, if any, and schedules removal of the cookie
/// whether or not it decoded.
pub fn take(jar: CookieJar) -> (CookieJar, Option<Flash>) {
    let Some(raw) = jar.get(FLASH_COOKIE).map(|c| c.value().to_string()) else {
        return (jar, None);
    };
    let jar = jar.remove(Cookie::build((FLASH_COOKIE, "")).path("/").build());
    (jar, Flash::decode(&raw))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn message_survives_cookie_encoding() {
        let flash = Flash::error("Error: department name already exists.");
        let encoded = flash.encode();
        assert!(!encoded.contains(' '));
        assert_eq!(Flash::decode(&encoded), Some(flash));
    }

    #[test]
    fn take_consumes_the_message() {
        let jar = push(CookieJar::new(), Flash::success("Saved."));
        let (jar, flash) = take(jar);
        assert_eq!(flash, Some(Flash::success("Saved.")));
        assert!(jar.get(FLASH_COOKIE).is_none());
    }

    #[test]
    fn undecodable_cookie_is_still_removed() {
        let jar = CookieJar::new().add(Cookie::new(FLASH_COOKIE, "level=loud&message=hi"));
        let (jar, flash) = take(jar);
        assert_eq!(flash, None);
        assert!(jar.get(FLASH_COOKIE).is_none());
    }

    #[test]
    fn garbage_is_ignored() {
        assert_eq!(Flash::decode("level=loud&message=hi"), None);
        assert_eq!(Flash::decode("message=hi"), None);
    }
}
