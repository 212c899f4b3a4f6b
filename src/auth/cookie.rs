use axum_extra::extract::cookie::{Cookie, SameSite};

pub const REFRESH_COOKIE_NAME: &str = "refreshToken";

/// Browsers only send the cookie to the refresh endpoint.
pub const REFRESH_COOKIE_PATH: &str = "/refresh_token";

pub fn refresh_cookie(token: String) -> Cookie<'static> {
    Cookie::build((REFRESH_COOKIE_NAME, token))
        .path(REFRESH_COOKIE_PATH)
        .http_only(true)
        .same_site(SameSite::Lax)
        .build()
}

/// Name-and-path stub handed to `CookieJar::remove`; the removal cookie must
/// match both for the browser to drop the original.
pub fn clear_refresh_cookie() -> Cookie<'static> {
    Cookie::build((REFRESH_COOKIE_NAME, ""))
        .path(REFRESH_COOKIE_PATH)
        .http_only(true)
        .build()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn refresh_cookie_is_http_only_and_path_scoped() {
        let cookie = refresh_cookie("some.jwt.token".to_string());
        assert_eq!(cookie.name(), REFRESH_COOKIE_NAME);
        assert_eq!(cookie.value(), "some.jwt.token");
        assert_eq!(cookie.path(), Some(REFRESH_COOKIE_PATH));
        assert_eq!(cookie.http_only(), Some(true));
        assert_eq!(cookie.same_site(), Some(SameSite::Lax));
    }

    #[test]
    fn clear_cookie_matches_name_and_path() {
        let cookie = clear_refresh_cookie();
        assert_eq!(cookie.name(), REFRESH_COOKIE_NAME);
        assert_eq!(cookie.value(), "");
        assert_eq!(cookie.path(), Some(REFRESH_COOKIE_PATH));
    }
}
