//! Title quality heuristics.
//!
//! Compositors often report a window before its application has set the real
//! caption: the title is empty, carries a `_` placeholder, or still equals the
//! application class. Such titles are not worth publishing as final.

/// Префикс, которым композитор помечает временные заголовки
const PLACEHOLDER_PREFIX: char = '_';

/// Заголовок пустой или является заглушкой композитора
pub fn is_problematic(title: &str) -> bool {
    title.is_empty() || title.starts_with(PLACEHOLDER_PREFIX)
}

/// Заголовок пригоден для публикации: не заглушка и уже отличается от класса окна
pub fn is_usable(class: &str, title: &str) -> bool {
    !is_problematic(title) && title != class
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_problematic_titles() {
        assert!(is_problematic(""));
        assert!(is_problematic("_"));
        assert!(is_problematic("_KWIN_PLACEHOLDER"));
        assert!(!is_problematic("Mozilla Firefox"));
        assert!(!is_problematic(" _leading space"));
    }

    #[test]
    fn test_title_equal_to_class_is_not_usable() {
        assert!(!is_usable("code", "code"));
        assert!(!is_usable("firefox", ""));
        assert!(is_usable("code", "main.rs - Visual Studio Code"));
        // Сравнение регистрозависимое
        assert!(is_usable("code", "Code"));
    }
}
