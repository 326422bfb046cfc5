//! Display colors assigned to processes

/// Fixed palette, handed out in order
pub const PROCESS_COLORS: [&str; 12] = [
    "#FF6B6B", "#4ECDC4", "#45B7D1", "#96CEB4", "#FFEAA7", "#DDA0DD", "#98D8C8", "#F7DC6F",
    "#BB8FCE", "#85C1E9", "#F8B500", "#00CED1",
];

/// Color of idle Gantt segments
pub const IDLE_COLOR: &str = "#374151";

/// Picks the first palette entry not already in use
///
/// When every entry is taken, cycles by the number of existing processes.
pub fn next_color<'a>(used: impl IntoIterator<Item = &'a str>) -> &'static str {
    let used: Vec<&str> = used.into_iter().collect();
    PROCESS_COLORS
        .iter()
        .copied()
        .find(|color| !used.contains(color))
        .unwrap_or(PROCESS_COLORS[used.len() % PROCESS_COLORS.len()])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_unused() {
        assert_eq!(next_color([]), "#FF6B6B");
        assert_eq!(next_color(["#FF6B6B"]), "#4ECDC4");
        assert_eq!(next_color(["#4ECDC4"]), "#FF6B6B");
    }

    #[test]
    fn test_cycles_when_exhausted() {
        let mut used: Vec<&str> = PROCESS_COLORS.to_vec();
        assert_eq!(next_color(used.iter().copied()), PROCESS_COLORS[0]);
        used.push(PROCESS_COLORS[0]);
        assert_eq!(next_color(used.iter().copied()), PROCESS_COLORS[1]);
    }
}
