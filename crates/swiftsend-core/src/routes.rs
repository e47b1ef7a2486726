//! Route guard decisions.
//!
//! Pure function from (path, token presence) to a navigation decision.
//! The guard never performs the navigation itself; the shell that owns the
//! router applies the returned action.

/// Path prefixes that require a valid access token
pub const PROTECTED_PREFIXES: &[&str] = &["/dashboard", "/transfer", "/profile", "/settings"];

/// Path prefixes only accessible when NOT authenticated
pub const AUTH_PREFIXES: &[&str] = &["/auth"];

/// Sign-in entry point
pub const LOGIN_PATH: &str = "/auth/login";

/// Authenticated landing page
pub const HOME_PATH: &str = "/dashboard";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RouteAction {
    Allow,
    Redirect(String),
}

/// Decide what to do with a navigation request.
///
/// - `/` redirects based solely on token presence.
/// - Protected prefixes without a token redirect to sign-in, preserving the
///   originally requested path as a `redirect` query parameter.
/// - Auth prefixes with a token redirect to the landing page.
pub fn route_for(path: &str, authenticated: bool) -> RouteAction {
    if path == "/" {
        let dest = if authenticated { HOME_PATH } else { LOGIN_PATH };
        return RouteAction::Redirect(dest.to_string());
    }

    let is_protected = PROTECTED_PREFIXES.iter().any(|p| path.starts_with(p));
    let is_auth_page = AUTH_PREFIXES.iter().any(|p| path.starts_with(p));

    if is_protected && !authenticated {
        return RouteAction::Redirect(format!("{}?redirect={}", LOGIN_PATH, path));
    }

    if is_auth_page && authenticated {
        return RouteAction::Redirect(HOME_PATH.to_string());
    }

    RouteAction::Allow
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn root_redirects_on_token_presence() {
        assert_eq!(
            route_for("/", true),
            RouteAction::Redirect("/dashboard".into())
        );
        assert_eq!(
            route_for("/", false),
            RouteAction::Redirect("/auth/login".into())
        );
    }

    #[test]
    fn protected_paths_require_a_token() {
        assert_eq!(
            route_for("/transfer/new", false),
            RouteAction::Redirect("/auth/login?redirect=/transfer/new".into())
        );
        assert_eq!(route_for("/transfer/new", true), RouteAction::Allow);
        assert_eq!(
            route_for("/settings", false),
            RouteAction::Redirect("/auth/login?redirect=/settings".into())
        );
    }

    #[test]
    fn auth_pages_bounce_authenticated_users() {
        assert_eq!(
            route_for("/auth/login", true),
            RouteAction::Redirect("/dashboard".into())
        );
        assert_eq!(
            route_for("/auth/register", true),
            RouteAction::Redirect("/dashboard".into())
        );
        assert_eq!(route_for("/auth/login", false), RouteAction::Allow);
    }

    #[test]
    fn public_paths_are_always_allowed() {
        assert_eq!(route_for("/terms", false), RouteAction::Allow);
        assert_eq!(route_for("/terms", true), RouteAction::Allow);
        assert_eq!(route_for("/privacy", false), RouteAction::Allow);
    }
}
