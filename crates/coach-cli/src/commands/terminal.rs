//! Terminal formatting helpers for the coaching report.

use colored::Colorize;

/// Color a value based on whether it's positive or negative.
///
/// `invert` flips the polarity for metrics where lower is better (e.g.
/// maximum adverse excursion).
pub fn color_value(value: f64, format_str: String, invert: bool) -> String {
    let is_positive = if invert { value < 0.0 } else { value > 0.0 };
    if is_positive {
        format_str.green().to_string()
    } else if value == 0.0 {
        format_str.yellow().to_string()
    } else {
        format_str.red().to_string()
    }
}

/// Print a horizontal separator.
pub fn print_separator() {
    println!("{}", "-".repeat(70).dimmed());
}

/// Print a section header.
pub fn print_section(title: &str) {
    println!("\n{}", title.cyan().bold());
    print_separator();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_color_value_positive() {
        let result = color_value(1.5, "1.5".to_string(), false);
        assert!(result.contains("1.5"));
    }

    #[test]
    fn test_color_value_negative() {
        let result = color_value(-1.5, "-1.5".to_string(), false);
        assert!(result.contains("-1.5"));
    }

    #[test]
    fn test_color_value_inverted() {
        let result = color_value(-0.1, "-10%".to_string(), true);
        assert!(result.contains("-10%"));
    }
}
