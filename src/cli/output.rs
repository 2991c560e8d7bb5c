//! CLI output formatting utilities

use colored::Colorize;

use crate::auth::Claims;

/// Print a success message
pub fn success(message: &str) {
    println!("{} {}", "✓".green(), message);
}

/// Print an error message
pub fn error(message: &str) {
    eprintln!("{} {}", "✗".red(), message);
}

/// Print a warning message
pub fn warn(message: &str) {
    println!("{} {}", "⚠".yellow(), message);
}

/// Print an info message
pub fn info(message: &str) {
    println!("{} {}", "ℹ".blue(), message);
}

fn format_timestamp(ts: i64) -> String {
    chrono::DateTime::from_timestamp(ts, 0)
        .map(|dt| dt.to_rfc3339())
        .unwrap_or_else(|| ts.to_string())
}

/// Print decoded token claims
pub fn print_claims(claims: &Claims) {
    println!("{:<10} {}", "Subject:".bold(), claims.sub);
    println!("{:<10} {}", "Username:".bold(), claims.username);
    println!("{:<10} {}", "Email:".bold(), claims.email);
    println!("{:<10} {}", "Roles:".bold(), claims.roles.join(", ").cyan());
    println!("{:<10} {}", "Issued:".bold(), format_timestamp(claims.iat));

    let expires = format_timestamp(claims.exp);
    if claims.is_expired() {
        println!("{:<10} {}", "Expires:".bold(), expires.red());
    } else {
        println!("{:<10} {}", "Expires:".bold(), expires.green());
    }
    println!("{:<10} {}", "Token ID:".bold(), claims.jti);
}
