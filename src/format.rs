//! Presentation-safe formatting helpers.
//!
//! Everything here is pure and total: payloads coming from the agent are
//! untrusted, so every helper maps odd input (negative, NaN, infinite, empty)
//! onto a value the visual layer can draw without special cases.

/// Width of a proportional bar, in percent of the largest value.
///
/// Returns `value / max(values) * 100`, clamped to `[0, 100]`. When the
/// maximum is not positive every entry gets `0`.
pub fn relative_width<I>(value: f64, values: I) -> f64
where
    I: IntoIterator<Item = f64>,
{
    let max = max_value(values);
    if max <= 0.0 || !value.is_finite() {
        return 0.0;
    }
    clamp_percent(value / max * 100.0)
}

/// Largest finite value in `values`, or `0.0` when there is none.
pub fn max_value<I>(values: I) -> f64
where
    I: IntoIterator<Item = f64>,
{
    values
        .into_iter()
        .filter(|v| v.is_finite())
        .fold(None, |acc: Option<f64>, v| Some(acc.map_or(v, |m| m.max(v))))
        .unwrap_or(0.0)
}

/// Smallest finite value in `values`, or `None` when there is none.
pub fn min_value<I>(values: I) -> Option<f64>
where
    I: IntoIterator<Item = f64>,
{
    values
        .into_iter()
        .filter(|v| v.is_finite())
        .fold(None, |acc: Option<f64>, v| Some(acc.map_or(v, |m| m.min(v))))
}

/// Convert a `[0, 1]` fraction into a percentage in `[0, 100]`.
///
/// Out-of-range fractions are clamped rather than rejected. NaN maps to `0`.
pub fn clamp_percentage(fraction: f64) -> f64 {
    clamp_percent(fraction * 100.0)
}

/// Clamp a value that is already a percentage into `[0, 100]`.
pub fn clamp_percent(percent: f64) -> f64 {
    if percent.is_nan() {
        return 0.0;
    }
    percent.clamp(0.0, 100.0)
}

/// Look up the presentation entry for `category`.
///
/// Matching is ASCII case-insensitive. Unknown categories resolve to the
/// `fallback_key` entry; `None` only when the table has neither.
pub fn pick_icon<'t, T>(category: &str, table: &'t [(&str, T)], fallback_key: &str) -> Option<&'t T> {
    let lookup = |key: &str| {
        table
            .iter()
            .find(|(name, _)| name.eq_ignore_ascii_case(key.trim()))
            .map(|(_, entry)| entry)
    };
    lookup(category).or_else(|| lookup(fallback_key))
}

/// `$12.50` style money label.
pub fn money(value: f64) -> String {
    format!("${:.2}", finite_or_zero(value))
}

/// Score with three decimals, as used for keyword weights.
pub fn score(value: f64) -> String {
    format!("{:.3}", finite_or_zero(value))
}

/// Percentage label with one decimal (`40.0%`).
pub fn percent_label(percent: f64) -> String {
    format!("{:.1}%", clamp_percent(percent))
}

/// Render a number without a trailing `.0` when it is integral.
pub fn number(value: f64) -> String {
    let value = finite_or_zero(value);
    if value.fract() == 0.0 && value.abs() < 1e15 {
        format!("{}", value as i64)
    } else {
        format!("{}", value)
    }
}

/// Uppercase the first character, leave the rest untouched.
pub fn capitalize(text: &str) -> String {
    let mut chars = text.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Truncate to at most `max_chars` characters, respecting char boundaries.
pub fn truncate_chars(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}

fn finite_or_zero(value: f64) -> f64 {
    if value.is_finite() {
        value
    } else {
        0.0
    }
}
