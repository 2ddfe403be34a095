//! SQL utility functions

/// Escape character declared in every `LIKE ... ESCAPE` clause we emit
pub const LIKE_ESCAPE_CHAR: char = '\\';

/// Escape SQL LIKE metacharacters (%, _, \) in user input
///
/// Use this when building LIKE patterns from user input to prevent
/// unintended pattern matching.
///
/// # Example
///
/// ```
/// use im_server::utils::sql::escape_like_pattern;
///
/// let user_input = "100% match_test";
/// let pattern = format!("%{}%", escape_like_pattern(user_input));
/// assert_eq!(pattern, "%100\\% match\\_test%");
/// ```
pub fn escape_like_pattern(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        if matches!(c, '%' | '_') || c == LIKE_ESCAPE_CHAR {
            out.push(LIKE_ESCAPE_CHAR);
        }
        out.push(c);
    }
    out
}

/// `<expr> LIKE ? ESCAPE '\'`, matching the escaping of [`escape_like_pattern`]
pub fn like_clause(expr: &str) -> String {
    format!("{} LIKE ? ESCAPE '{}'", expr, LIKE_ESCAPE_CHAR)
}

/// Normalize a free-text term for case-insensitive matching.
///
/// Trims surrounding whitespace and folds ASCII letters only, the same way
/// SQLite's `LOWER()` does. Pair with `LOWER(column)`.
pub fn simplify_term(s: &str) -> String {
    s.trim().to_ascii_lowercase()
}

/// Build a bound `%term%` substring pattern from raw user input.
///
/// The term is simplified and its LIKE metacharacters are neutralized, so a
/// literal `%` or `_` in the input only ever matches itself.
pub fn contains_pattern(term: &str) -> String {
    format!("%{}%", escape_like_pattern(&simplify_term(term)))
}

/// `?, ?, ?` for an `IN (...)` list of `n` bound values
pub fn placeholders(n: usize) -> String {
    vec!["?"; n].join(", ")
}

/// Quote an identifier for SQLite (`group` and `user` are reserved words).
pub fn quote_ident(ident: &str) -> String {
    format!("\"{}\"", ident.replace('"', "\"\""))
}
