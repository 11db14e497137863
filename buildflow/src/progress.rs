//! Text progress bars.
//!
//! Rendering is a pure function of its inputs; nothing here remembers
//! previous calls.

/// Default bar width in characters.
pub const DEFAULT_BAR_WIDTH: usize = 50;

/// Renders `[====    ] N%` for a percentage.
///
/// `filled = floor(percent * width / 100)`. Values above 100 are clamped
/// when computing the fill but printed as given.
#[must_use]
pub fn render(percent: u8, width: usize) -> String {
    let filled = usize::from(percent.min(100)) * width / 100;

    let mut bar = String::with_capacity(width + 8);
    bar.push('[');
    bar.push_str(&"=".repeat(filled));
    bar.push_str(&" ".repeat(width - filled));
    bar.push_str("] ");
    bar.push_str(&percent.to_string());
    bar.push('%');
    bar
}

/// Renders a bar with the default width.
#[must_use]
pub fn render_default(percent: u8) -> String {
    render(percent, DEFAULT_BAR_WIDTH)
}

/// Integer percentage of `completed` out of `total`.
///
/// An empty total counts as complete.
#[must_use]
pub fn percent_of(completed: usize, total: usize) -> u8 {
    if total == 0 {
        return 100;
    }
    let percent = completed.min(total) * 100 / total;
    u8::try_from(percent).unwrap_or(100)
}

/// Renders a bar for `completed` out of `total`.
#[must_use]
pub fn render_fraction(completed: usize, total: usize, width: usize) -> String {
    render(percent_of(completed, total), width)
}
