//! Step banner display.

use super::colors::*;

const BANNER_WIDTH: usize = 60;

/// Color options for step banners.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum BannerColor {
    /// Cyan - used for starting a step
    Cyan,
    /// Green - used for successful completion
    Green,
    /// Yellow - used for cancelled steps
    Yellow,
}

impl BannerColor {
    pub fn ansi_code(&self) -> &'static str {
        match self {
            BannerColor::Cyan => CYAN,
            BannerColor::Green => GREEN,
            BannerColor::Yellow => YELLOW,
        }
    }
}

/// Banner line `━━━ TITLE ━━━`, without color codes.
fn banner_line(title: &str) -> String {
    let label = format!(" {} ", title);
    let remaining = BANNER_WIDTH.saturating_sub(label.chars().count());
    let left = remaining / 2;
    let right = remaining - left;
    format!("{}{}{}", "━".repeat(left), label, "━".repeat(right))
}

/// Print a color-coded banner announcing a workflow step.
pub fn print_step_banner(title: &str, color: BannerColor) {
    println!();
    println!("{}{BOLD}{}{RESET}", color.ansi_code(), banner_line(title));
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_banner_line_is_fixed_width() {
        let line = banner_line("SETUP BRANCH");
        assert_eq!(line.chars().count(), BANNER_WIDTH);
        assert!(line.contains(" SETUP BRANCH "));
    }

    #[test]
    fn test_banner_line_with_long_title() {
        let title = "X".repeat(80);
        assert!(banner_line(&title).contains(&title));
    }
}
