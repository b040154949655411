//! Default-version selection for display

use super::models::ContentItem;

/// Pick the item shown to readers among the items of one group.
///
/// The approved item flagged default wins. Without one, the approved item
/// with the lexicographically smallest version label is used (lowest id on
/// equal labels). Pending and rejected items are never presented.
pub fn select_presented(items: &[ContentItem]) -> Option<&ContentItem> {
    let approved = || items.iter().filter(|item| item.is_approved());

    approved().find(|item| item.is_default).or_else(|| {
        approved().min_by(|a, b| {
            a.version_label
                .cmp(&b.version_label)
                .then_with(|| a.id.cmp(&b.id))
        })
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::moderation::models::{AuthorKind, ContentDetail, ContentStatus};
    use chrono::Utc;

    fn item(id: i64, label: &str, status: ContentStatus, is_default: bool) -> ContentItem {
        ContentItem {
            id,
            detail: ContentDetail::Translation {
                ayah_id: 1,
                language: "en".to_string(),
            },
            body: format!("text {}", id),
            version_label: label.to_string(),
            status,
            is_default,
            author: AuthorKind::SystemImport,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_default_wins_over_label_order() {
        let items = vec![
            item(1, "Asad", ContentStatus::Approved, false),
            item(2, "Yusuf Ali", ContentStatus::Approved, true),
        ];
        assert_eq!(select_presented(&items).map(|i| i.id), Some(2));
    }

    #[test]
    fn test_falls_back_to_smallest_label() {
        let items = vec![
            item(1, "Pickthall", ContentStatus::Approved, false),
            item(2, "Asad", ContentStatus::Approved, false),
            item(3, "Abdel Haleem", ContentStatus::Pending, false),
        ];
        assert_eq!(select_presented(&items).map(|i| i.id), Some(2));
    }

    #[test]
    fn test_equal_labels_prefer_lowest_id() {
        let items = vec![
            item(5, "Sahih", ContentStatus::Approved, false),
            item(3, "Sahih", ContentStatus::Approved, false),
        ];
        assert_eq!(select_presented(&items).map(|i| i.id), Some(3));
    }

    #[test]
    fn test_nothing_approved() {
        let items = vec![
            item(1, "A", ContentStatus::Pending, false),
            item(2, "B", ContentStatus::Rejected, false),
        ];
        assert!(select_presented(&items).is_none());
        assert!(select_presented(&[]).is_none());
    }
}
