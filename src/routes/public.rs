use super::{Page, RouteSpec, RouteTable, paths};

/// Public Route Table
///
/// Pages any visitor may open, with or without a session. The guard lets every
/// navigation to these through untouched, which is what keeps the login and the
/// verification holding page reachable from every redirect.
pub fn public_routes() -> RouteTable {
    RouteTable::new()
        .page(paths::REGISTER, RouteSpec::public(Page::Register))
        .page(paths::LOGIN, RouteSpec::public(Page::Login))
        // Holding page for teachers whose account an admin has not verified yet.
        .page(
            paths::ACCOUNT_NOT_VERIFIED,
            RouteSpec::public(Page::AccountNotVerified),
        )
}
