pub mod city_map;
pub mod city_table;
pub mod filter_overlay;
pub mod report_header;
pub mod toasts;
pub mod weather_report;

// Re-export core Component trait
pub use tui_dispatch::Component;

pub use city_map::{CityMap, CityMapProps};
pub use city_table::{CityTable, CityTableProps};
pub use filter_overlay::{FilterOverlay, FilterOverlayProps};
pub use report_header::{ReportHeader, ReportHeaderProps};
pub use toasts::{Toasts, ToastsProps};
pub use weather_report::{WeatherReport, WeatherReportProps, ERROR_ICON};

const SPINNER_FRAMES: [&str; 10] = ["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"];

/// Spinner glyph for the current tick
pub fn spinner(tick_count: u32) -> &'static str {
    SPINNER_FRAMES[tick_count as usize % SPINNER_FRAMES.len()]
}

/// `1234567` → `1,234,567`
pub fn group_thousands(value: u64) -> String {
    let digits = value.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_group_thousands() {
        assert_eq!(group_thousands(0), "0");
        assert_eq!(group_thousands(999), "999");
        assert_eq!(group_thousands(1000), "1,000");
        assert_eq!(group_thousands(2138551), "2,138,551");
    }
}
