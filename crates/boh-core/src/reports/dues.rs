use crate::models::DuesStatus;

/// How a dues status is drawn in the preview table and the print document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StatusStyle {
    pub glyph: &'static str,
    pub css_class: &'static str,
    /// Print cell background, CSS hex.
    pub background: &'static str,
    /// Print cell foreground, CSS hex.
    pub foreground: &'static str,
}

const PAID: StatusStyle = StatusStyle {
    glyph: "✓",
    css_class: "paid",
    background: "#dcfce7",
    foreground: "#166534",
};

const LATE: StatusStyle = StatusStyle {
    glyph: "L",
    css_class: "late",
    background: "#fef3c7",
    foreground: "#92400e",
};

const UNPAID: StatusStyle = StatusStyle {
    glyph: "✗",
    css_class: "unpaid",
    background: "#fee2e2",
    foreground: "#991b1b",
};

impl StatusStyle {
    pub fn of(status: DuesStatus) -> Self {
        match status {
            DuesStatus::Paid => PAID,
            DuesStatus::Late => LATE,
            DuesStatus::Unpaid => UNPAID,
        }
    }

    /// CSS rule for the print stylesheet, e.g. `.paid { ... }`.
    pub fn css_rule(&self) -> String {
        format!(
            ".{} {{ background-color: {}; color: {}; }}",
            self.css_class, self.background, self.foreground
        )
    }
}
