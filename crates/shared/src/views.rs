//! Small presentational decisions shared by several screens.

/// Most placeholder rows a user list shows while loading.
pub const MAX_PLACEHOLDER_ROWS: usize = 5;

/// Placeholder rows to show for `requested` pending users.
pub fn placeholder_rows(requested: usize) -> usize {
	requested.min(MAX_PLACEHOLDER_ROWS)
}

/// Header of the email verification screen.
pub fn email_verified_title(has_user: bool) -> &'static str {
	if has_user { "Email address verified" } else { "Log in to daily.dev" }
}
