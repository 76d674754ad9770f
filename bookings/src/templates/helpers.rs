//! Template filters registered on every compiled page.
//!
//! ```html
//! <p>{{ data.reservation.first_name|truncate(20) }}</p>
//! <p>{{ int_map.nights }} {{ int_map.nights|pluralize("night", "nights") }}</p>
//! ```

use minijinja::Environment;

/// Register the site's filters on `env`.
pub fn register_filters(env: &mut Environment<'_>) {
    env.add_filter("truncate", truncate);
    env.add_filter("pluralize", pluralize);
}

/// Truncate text with ellipsis.
///
/// Lengths are in characters, so multi-byte text is never split mid-codepoint.
///
/// # Example
///
/// ```rust
/// use bookings::templates::truncate;
///
/// assert_eq!(truncate("Hello, World!".to_string(), 5), "He...");
/// assert_eq!(truncate("Hi".to_string(), 10), "Hi");
/// ```
#[must_use]
pub fn truncate(s: String, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s
    } else {
        let kept: String = s.chars().take(max_len.saturating_sub(3)).collect();
        format!("{kept}...")
    }
}

/// Pluralize a word based on count.
///
/// # Example
///
/// ```rust
/// use bookings::templates::pluralize;
///
/// assert_eq!(pluralize(1, "room".to_string(), "rooms".to_string()), "room");
/// assert_eq!(pluralize(2, "room".to_string(), "rooms".to_string()), "rooms");
/// ```
#[must_use]
pub fn pluralize(count: i64, singular: String, plural: String) -> String {
    if count == 1 {
        singular
    } else {
        plural
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate() {
        assert_eq!(truncate("Hello, World!".into(), 5), "He...");
        assert_eq!(truncate("Hi".into(), 10), "Hi");
        assert_eq!(truncate(String::new(), 5), "");
        assert_eq!(truncate("Test".into(), 4), "Test");
        assert_eq!(truncate("Test".into(), 3), "...");
        assert_eq!(truncate("Château Smythe".into(), 6), "Châ...");
    }

    #[test]
    fn test_pluralize() {
        assert_eq!(pluralize(0, "night".into(), "nights".into()), "nights");
        assert_eq!(pluralize(1, "night".into(), "nights".into()), "night");
        assert_eq!(pluralize(2, "night".into(), "nights".into()), "nights");
        assert_eq!(pluralize(-1, "night".into(), "nights".into()), "nights");
    }

    #[test]
    fn test_filters_in_environment() {
        let mut env = Environment::new();
        register_filters(&mut env);
        env.add_template("t", "{{ name|truncate(5) }} {{ n|pluralize('suite', 'suites') }}")
            .unwrap();

        let out = env
            .get_template("t")
            .unwrap()
            .render(minijinja::context! { name => "Generals", n => 2 })
            .unwrap();
        assert_eq!(out, "Ge... suites");
    }
}
