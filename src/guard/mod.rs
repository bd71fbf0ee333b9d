//! Screens and the guards in front of them.
//!
//! A guard is evaluated against an [`AuthSnapshot`] before a screen is built.
//! Login and signup are public-only and the dashboard is authenticated-only,
//! so a redirect target never redirects back.

use std::fmt;

use crate::auth::AuthSnapshot;
use crate::resources::ResourceKind;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Route {
    Login,
    Signup,
    Dashboard,
    Profile,
    Settings,
    List(ResourceKind),
    Add(ResourceKind),
    Edit(ResourceKind, String),
    Attendance,
    MembershipReport,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Guard {
    /// Only reachable with a session token
    Authenticated,
    /// Only reachable without one
    Public,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GuardOutcome {
    /// Session still resolving; show a loading indicator and do not redirect
    Placeholder,
    Redirect(Route),
    Render,
}

impl Route {
    pub fn path(&self) -> String {
        match self {
            Route::Login => "/login".to_string(),
            Route::Signup => "/signup".to_string(),
            Route::Dashboard => "/".to_string(),
            Route::Profile => "/profile".to_string(),
            Route::Settings => "/settings".to_string(),
            Route::List(kind) => format!("/{}/list", kind.route_segment()),
            Route::Add(kind) => format!("/{}/add", kind.route_segment()),
            Route::Edit(kind, id) => format!("/{}/edit/{}", kind.route_segment(), id),
            Route::Attendance => "/staff-member/attendance".to_string(),
            Route::MembershipReport => "/reports/membership".to_string(),
        }
    }

    pub fn guard(&self) -> Guard {
        match self {
            Route::Login | Route::Signup => Guard::Public,
            _ => Guard::Authenticated,
        }
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.path())
    }
}

pub fn evaluate(guard: Guard, auth: &AuthSnapshot) -> GuardOutcome {
    if auth.is_loading {
        return GuardOutcome::Placeholder;
    }
    match (guard, auth.token.is_some()) {
        (Guard::Authenticated, false) => GuardOutcome::Redirect(Route::Login),
        (Guard::Public, true) => GuardOutcome::Redirect(Route::Dashboard),
        _ => GuardOutcome::Render,
    }
}

/// Evaluate the guard of `route`
pub fn check(route: &Route, auth: &AuthSnapshot) -> GuardOutcome {
    evaluate(route.guard(), auth)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn loading_shows_placeholder_for_both_guards() {
        let loading = AuthSnapshot::loading();
        assert_eq!(evaluate(Guard::Authenticated, &loading), GuardOutcome::Placeholder);
        assert_eq!(evaluate(Guard::Public, &loading), GuardOutcome::Placeholder);
    }

    #[test]
    fn private_route_without_token_goes_to_login() {
        let outcome = check(&Route::List(ResourceKind::Member), &AuthSnapshot::anonymous());
        assert_eq!(outcome, GuardOutcome::Redirect(Route::Login));
    }

    #[test]
    fn login_with_token_goes_to_dashboard() {
        let outcome = check(&Route::Login, &AuthSnapshot::authenticated("t"));
        assert_eq!(outcome, GuardOutcome::Redirect(Route::Dashboard));
    }

    #[test]
    fn redirect_targets_render() {
        assert_eq!(check(&Route::Login, &AuthSnapshot::anonymous()), GuardOutcome::Render);
        assert_eq!(check(&Route::Dashboard, &AuthSnapshot::authenticated("t")), GuardOutcome::Render);
    }

    #[test]
    fn paths() {
        assert_eq!(Route::List(ResourceKind::Staff).path(), "/staff-member/list");
        assert_eq!(Route::Edit(ResourceKind::Category, "7".into()).path(), "/category/edit/7");
        assert_eq!(Route::Dashboard.to_string(), "/");
    }
}
