//! Shared helpers for CLI commands.

use souschef::router::RoutedResponse;

/// Returns the first `limit` characters of `text`, marking truncation.
pub fn preview(text: &str, limit: usize) -> String {
    match text.char_indices().nth(limit) {
        Some((idx, _)) => format!("{}...", &text[..idx]),
        None => text.to_string(),
    }
}

/// Prints a routed response with its method tag and a short preview.
pub fn print_response(response: &RoutedResponse) {
    println!("   [{}] {}", response.method, preview(&response.text, 100));
}

/// Prints a full response between ruler lines.
pub fn print_recipe(response: &RoutedResponse) {
    println!("\n{}", "=".repeat(60));
    println!("YOUR RECIPE (via {}):", response.method);
    println!("{}", "=".repeat(60));
    println!("{}", response.text);
    println!("{}", "=".repeat(60));
}
