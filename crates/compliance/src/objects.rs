//! Prohibited-object categorisation

use std::collections::BTreeSet;

use detector_backend::ObjectDetection;
use serde::{Deserialize, Serialize};

/// Category of a prohibited object
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ObjectCategory {
    MobilePhone,
    UnauthorizedDevice,
    UnauthorizedMaterial,
    ProhibitedItem,
}

const PHONE_KEYWORDS: &[&str] = &["phone", "mobile", "smartphone", "iphone", "android"];

const DEVICE_KEYWORDS: &[&str] = &[
    "laptop",
    "tablet",
    "ipad",
    "computer",
    "keyboard",
    "mouse",
    "remote",
    "monitor",
    "tv",
    "headphone",
    "earphone",
    "microphone",
    "earbud",
    "watch",
    "calculator",
];

const MATERIAL_KEYWORDS: &[&str] = &["book", "notebook", "paper", "note", "document", "sheet"];

const PROHIBITED_KEYWORDS: &[&str] = &[
    "camera",
    "scissors",
    "knife",
    "backpack",
    "handbag",
    "bag",
    "suitcase",
];

/// Category of a detector label by case-insensitive substring match.
///
/// Devices are checked before phones: "headphones", "earphones" and
/// "microphone" all contain "phone".
pub fn categorize_label(label: &str) -> Option<ObjectCategory> {
    let label = label.to_lowercase();
    let matches = |keywords: &[&str]| keywords.iter().any(|k| label.contains(k));

    if matches(DEVICE_KEYWORDS) {
        Some(ObjectCategory::UnauthorizedDevice)
    } else if matches(PHONE_KEYWORDS) {
        Some(ObjectCategory::MobilePhone)
    } else if matches(MATERIAL_KEYWORDS) {
        Some(ObjectCategory::UnauthorizedMaterial)
    } else if matches(PROHIBITED_KEYWORDS) {
        Some(ObjectCategory::ProhibitedItem)
    } else {
        None
    }
}

/// Distinct categories present among `objects`, in category order
pub fn categorize_objects(objects: &[ObjectDetection]) -> Vec<ObjectCategory> {
    objects
        .iter()
        .filter_map(|o| categorize_label(&o.label))
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_label_categories() {
        assert_eq!(categorize_label("cell phone"), Some(ObjectCategory::MobilePhone));
        assert_eq!(categorize_label("Laptop"), Some(ObjectCategory::UnauthorizedDevice));
        assert_eq!(categorize_label("book"), Some(ObjectCategory::UnauthorizedMaterial));
        assert_eq!(categorize_label("backpack"), Some(ObjectCategory::ProhibitedItem));
        assert_eq!(categorize_label("person"), None);
        assert_eq!(categorize_label("chair"), None);
    }

    #[test]
    fn test_audio_devices_are_not_phones() {
        assert_eq!(categorize_label("headphones"), Some(ObjectCategory::UnauthorizedDevice));
        assert_eq!(categorize_label("Earphone"), Some(ObjectCategory::UnauthorizedDevice));
        assert_eq!(categorize_label("microphone"), Some(ObjectCategory::UnauthorizedDevice));
        assert_eq!(categorize_label("mobile phone"), Some(ObjectCategory::MobilePhone));
        assert_eq!(categorize_label("smartphone"), Some(ObjectCategory::MobilePhone));
    }

    #[test]
    fn test_categories_deduplicated() {
        let objects = vec![
            ObjectDetection::new("book", 0.9),
            ObjectDetection::new("cell phone", 0.8),
            ObjectDetection::new("notebook", 0.7),
            ObjectDetection::new("smartphone", 0.6),
            ObjectDetection::new("dining table", 0.9),
        ];
        assert_eq!(
            categorize_objects(&objects),
            vec![ObjectCategory::MobilePhone, ObjectCategory::UnauthorizedMaterial]
        );
    }
}
