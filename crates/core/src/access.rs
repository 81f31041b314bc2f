//! # Route access policy
//!
//! Decides, for every request, whether the caller may see the requested path
//! or must be sent elsewhere. The policy is pure so it can be evaluated on
//! each navigation without caching anything beyond the session itself.

use serde::Serialize;
use uuid::Uuid;

use crate::models::profile::Role;

pub const LOGIN_PATH: &str = "/login";
pub const COMPLETE_ACCOUNT_PATH: &str = "/complete-account";

/// Paths reachable without a session. Entries ending in `/` match as prefixes.
const PUBLIC_PATHS: &[&str] = &[
    "/",
    "/login",
    "/signup",
    "/reset-password",
    "/auth/",
    "/api/signup-parent",
    "/health",
    "/version",
    "/hooks/",
];

/// The identity facts the policy needs about an authenticated caller.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Caller {
    pub user_id: Uuid,
    pub role: Role,
    pub metadata_complete: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Access {
    Allow,
    Redirect(String),
}

impl Access {
    fn to(path: &str) -> Self {
        Access::Redirect(path.to_string())
    }
}

/// Matches `prefix` on whole path segments, so `/coach` covers `/coach` and
/// `/coach/openings` but not `/coaching`.
fn has_prefix(path: &str, prefix: &str) -> bool {
    match path.strip_prefix(prefix) {
        Some(rest) => rest.is_empty() || rest.starts_with('/') || prefix.ends_with('/'),
        None => false,
    }
}

pub fn is_public(path: &str) -> bool {
    PUBLIC_PATHS.iter().any(|public| {
        if public.ends_with('/') && *public != "/" {
            has_prefix(path, public) || path == public.trim_end_matches('/')
        } else {
            path == *public
        }
    })
}

pub fn authorize(path: &str, caller: Option<&Caller>) -> Access {
    if is_public(path) {
        return Access::Allow;
    }

    let Some(caller) = caller else {
        return Access::to(LOGIN_PATH);
    };

    if !caller.metadata_complete && !has_prefix(path, COMPLETE_ACCOUNT_PATH) {
        return Access::to(COMPLETE_ACCOUNT_PATH);
    }

    let other = match caller.role {
        Role::Coach => Role::Client,
        Role::Client => Role::Coach,
    };
    if has_prefix(path, other.path_prefix()) {
        return Access::to(caller.role.landing_path());
    }

    Access::Allow
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    fn caller(role: Role, complete: bool) -> Caller {
        Caller {
            user_id: Uuid::new_v4(),
            role,
            metadata_complete: complete,
        }
    }

    #[rstest]
    #[case("/")]
    #[case("/login")]
    #[case("/signup")]
    #[case("/reset-password")]
    #[case("/auth/callback")]
    #[case("/auth/login")]
    #[case("/api/signup-parent")]
    #[case("/health")]
    #[case("/hooks/changes")]
    fn public_paths_allow_anonymous(#[case] path: &str) {
        assert_eq!(authorize(path, None), Access::Allow);
    }

    #[rstest]
    #[case("/client/book")]
    #[case("/client/dashboard")]
    #[case("/coach/requests")]
    #[case("/settings")]
    #[case("/events")]
    #[case("/complete-account")]
    #[case("/loginx")]
    #[case("/authority")]
    fn anonymous_is_sent_to_login(#[case] path: &str) {
        assert_eq!(authorize(path, None), Access::Redirect("/login".into()));
    }

    #[rstest]
    #[case("/client/book")]
    #[case("/client/messages")]
    #[case("/settings")]
    #[case("/coach/dashboard")]
    fn incomplete_client_is_sent_to_completion(#[case] path: &str) {
        let c = caller(Role::Client, false);
        assert_eq!(authorize(path, Some(&c)), Access::Redirect("/complete-account".into()));
    }

    #[test]
    fn incomplete_client_may_reach_completion_and_public_paths() {
        let c = caller(Role::Client, false);
        assert_eq!(authorize("/complete-account", Some(&c)), Access::Allow);
        assert_eq!(authorize("/auth/logout", Some(&c)), Access::Allow);
    }

    #[rstest]
    #[case("/coach/dashboard")]
    #[case("/coach/requests")]
    #[case("/client/book")]
    fn incomplete_coach_is_sent_to_completion(#[case] path: &str) {
        let c = caller(Role::Coach, false);
        assert_eq!(authorize(path, Some(&c)), Access::Redirect("/complete-account".into()));
    }

    #[test]
    fn coach_on_client_booking_goes_to_coach_landing() {
        let c = caller(Role::Coach, true);
        assert_eq!(
            authorize("/client/book", Some(&c)),
            Access::Redirect("/coach/dashboard".into())
        );
    }

    #[test]
    fn client_on_coach_path_goes_to_client_landing() {
        let c = caller(Role::Client, true);
        assert_eq!(
            authorize("/coach/availability", Some(&c)),
            Access::Redirect("/client/dashboard".into())
        );
    }

    #[rstest]
    #[case(Role::Coach, "/coach/requests")]
    #[case(Role::Coach, "/settings")]
    #[case(Role::Client, "/client/book")]
    #[case(Role::Client, "/coaching-tips")]
    fn own_paths_are_allowed(#[case] role: Role, #[case] path: &str) {
        assert_eq!(authorize(path, Some(&caller(role, true))), Access::Allow);
    }
}
