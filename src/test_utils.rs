use crate::models::domain::{CatalogItem, Category, GameSession, User};

#[cfg(test)]
pub mod fixtures {
    use super::*;

    /// Creates a standard level-1 catalog item
    pub fn test_item(id: &str) -> CatalogItem {
        CatalogItem::test_item(id, Category::Asset, 1)
    }

    /// Creates a catalog item at a specific level and category
    pub fn test_item_at(id: &str, category: Category, level: u8) -> CatalogItem {
        CatalogItem::test_item(id, category, level)
    }

    /// Creates a standard test student
    pub fn test_student() -> User {
        User::test_student("0712345678", "S-100")
    }

    /// Creates an in-progress session owned by the given student id
    pub fn test_session(student_id: &str, level: u8, total_questions: u32) -> GameSession {
        GameSession::test_session(student_id, level, total_questions)
    }
}


#[cfg(test)]
mod tests {
    use super::fixtures::*;
    use crate::models::domain::SessionStatus;

    #[test]
    fn test_fixtures_test_item() {
        let item = test_item("CASH_01");
        assert_eq!(item.id, "CASH_01");
        assert!(item.is_active);
    }

    #[test]
    fn test_fixtures_test_session() {
        let session = test_session("student-1", 2, 10);
        assert_eq!(session.level, 2);
        assert_eq!(session.status, SessionStatus::InProgress);
        assert_eq!(session.total_questions, 10);
    }
}
