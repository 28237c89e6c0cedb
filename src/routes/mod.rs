/// Router Module Index
///
/// Splits the `/api` surface by access level. Protection is applied per module
/// with Axum layers, so a route's guard follows from the module it is declared in.

/// Routes open to site visitors: content lists, page copy, contact form, login.
/// The page-content write is the one exception and guards itself with `AuthUser`.
pub mod public;

/// Routes nested under `/admin` and wrapped in the bearer-token layer.
pub mod admin;
