use std::collections::HashSet;

/// Longest sheet title a workbook accepts.
pub const MAX_SHEET_NAME_LEN: usize = 31;
/// Length the base name is cut to before a `_N` collision suffix is added.
const COLLISION_PREFIX_LEN: usize = 28;
const INVALID_CHARS: [char; 7] = ['[', ']', ':', '*', '?', '/', '\\'];

/// Hands out unique, spreadsheet-safe sheet titles for one report run.
///
/// The allocator is owned by a single generation pass. Names are compared
/// case-insensitively because workbook sheet titles are.
#[derive(Debug, Default)]
pub struct SheetNameAllocator {
    used: HashSet<String>,
}

impl SheetNameAllocator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Allocates the title for a student: `"{last}, {first}"`, sanitised, with
    /// `Student_{row_index}` as the fallback and `_N` suffixes on collision.
    pub fn allocate(&mut self, last_name: &str, first_name: &str, row_index: usize) -> String {
        let candidate = sanitize(&format!("{last_name}, {first_name}"));
        let base = if candidate.is_empty() || candidate == ", " {
            format!("Student_{row_index}")
        } else {
            candidate
        };

        if self.claim(&base) {
            return base;
        }

        let mut counter = 1;
        loop {
            let suffix = format!("_{counter}");
            let prefix_len = COLLISION_PREFIX_LEN.min(MAX_SHEET_NAME_LEN - suffix.len());
            let candidate = format!("{}{suffix}", truncate(&base, prefix_len));
            if self.claim(&candidate) {
                return candidate;
            }
            counter += 1;
        }
    }

    fn claim(&mut self, name: &str) -> bool {
        self.used.insert(name.to_lowercase())
    }
}

/// Truncates to the sheet-name limit and strips characters workbooks reject,
/// control characters included. Workbooks also refuse titles that start or
/// end with an apostrophe.
fn sanitize(raw: &str) -> String {
    let stripped: String = truncate(raw, MAX_SHEET_NAME_LEN)
        .chars()
        .filter(|ch| !INVALID_CHARS.contains(ch) && !ch.is_control())
        .collect();
    stripped.trim_matches('\'').to_string()
}

fn truncate(raw: &str, max_chars: usize) -> &str {
    match raw.char_indices().nth(max_chars) {
        Some((idx, _)) => &raw[..idx],
        None => raw,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn duplicate_names_get_numbered_suffix() {
        let mut names = SheetNameAllocator::new();
        assert_eq!(names.allocate("Smith", "John", 0), "Smith, John");
        assert_eq!(names.allocate("Smith", "John", 1), "Smith, John_1");
        assert_eq!(names.allocate("smith", "john", 2), "smith, john_2");
    }

    #[test]
    fn empty_names_fall_back_to_row_index() {
        let mut names = SheetNameAllocator::new();
        assert_eq!(names.allocate("", "", 4), "Student_4");
        assert_eq!(names.allocate("[]", "", 5), "Student_5");
        assert_eq!(names.allocate("", "", 4), "Student_4_1");
    }

    #[test]
    fn long_names_are_truncated_before_suffixing() {
        let mut names = SheetNameAllocator::new();
        let first = names.allocate("Wolfeschlegelsteinhausenberger", "Hubert", 0);
        assert_eq!(first.chars().count(), 31);
        assert_eq!(first, "Wolfeschlegelsteinhausenberger,");

        let second = names.allocate("Wolfeschlegelsteinhausenberger", "Hubert", 1);
        assert_eq!(second, "Wolfeschlegelsteinhausenberg_1");
        assert!(second.chars().count() <= MAX_SHEET_NAME_LEN);
    }

    #[test]
    fn invalid_characters_are_stripped() {
        let mut names = SheetNameAllocator::new();
        assert_eq!(names.allocate("O'Neil/Ross", "A*B?", 0), "O'NeilRoss, AB");
    }

    #[test]
    fn control_characters_are_stripped() {
        let mut names = SheetNameAllocator::new();
        assert_eq!(names.allocate("Lopez\n", "Ana\t", 0), "Lopez, Ana");
        assert_eq!(names.allocate("\r\n", "", 1), "Student_1");
    }

    #[test]
    fn suffix_stays_within_limit_for_large_counters() {
        let mut names = SheetNameAllocator::new();
        let last = "Abcdefghijklmnopqrstuvwxyzabcdef";
        let mut allocated = HashSet::new();
        for row in 0..120 {
            let name = names.allocate(last, "X", row);
            assert!(name.chars().count() <= MAX_SHEET_NAME_LEN, "{name}");
            allocated.insert(name.to_lowercase());
        }
        assert_eq!(allocated.len(), 120);
    }
}
