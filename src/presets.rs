//! # Presets and Random Content
//!
//! Stateless helpers that produce content strings. Applying a preset goes
//! through [`Action::ApplyPreset`](crate::options::Action::ApplyPreset);
//! random content goes through `SetContent`.

use chrono::NaiveDate;
use rand::Rng;
use rand::seq::IndexedRandom;
use serde::Serialize;

use crate::options::CodeType;

/// A named QR content template.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct QrPreset {
    /// Stable identifier used by actions and the API.
    pub id: &'static str,
    pub name: &'static str,
    pub icon: &'static str,
    pub value: &'static str,
}

pub const QR_PRESETS: &[QrPreset] = &[
    QrPreset {
        id: "website",
        name: "Website URL",
        icon: "📱",
        value: "https://www.example.com",
    },
    QrPreset {
        id: "email",
        name: "Email",
        icon: "📧",
        value: "mailto:example@gmail.com",
    },
    QrPreset {
        id: "phone",
        name: "Phone",
        icon: "📞",
        value: "tel:+6281234567890",
    },
    QrPreset {
        id: "location",
        name: "Location",
        icon: "📍",
        value: "geo:37.7749,-122.4194",
    },
    QrPreset {
        id: "wifi",
        name: "WiFi",
        icon: "📶",
        value: "WIFI:T:WPA;S:NetworkName;P:password123;;",
    },
    QrPreset {
        id: "sms",
        name: "SMS",
        icon: "💬",
        value: "sms:+6281234567890?body=Hello!",
    },
];

/// Look up a preset by id or display name (case-insensitive).
pub fn find(name: &str) -> Option<&'static QrPreset> {
    let name = name.trim();
    QR_PRESETS
        .iter()
        .find(|p| p.id.eq_ignore_ascii_case(name) || p.name.eq_ignore_ascii_case(name))
}

/// Upper bound (exclusive) for random barcode numbers: at most 12 digits.
const BARCODE_RANDOM_LIMIT: u64 = 1_000_000_000_000;

/// Fixed pool random QR content is drawn from.
pub fn sample_pool(today: NaiveDate) -> Vec<String> {
    vec![
        "https://www.google.com".to_string(),
        "Hello World from QR Code!".to_string(),
        "Contact: +6281234567890".to_string(),
        "Email: example@gmail.com".to_string(),
        "WiFi:WIFI:T:WPA;S:MyNetwork;P:password123;;".to_string(),
        "Location: Jakarta, Indonesia".to_string(),
        format!("Generated on {}", today.format("%-m/%-d/%Y")),
    ]
}

/// Random content suitable for `code_type`.
///
/// QR draws from [`sample_pool`]; barcode yields a decimal number below
/// 10^12 (digits only, no more than 12 of them).
pub fn random_content<R: Rng>(code_type: CodeType, rng: &mut R, today: NaiveDate) -> String {
    match code_type {
        CodeType::Qr => sample_pool(today)
            .choose(rng)
            .cloned()
            .unwrap_or_else(|| code_type.default_content().to_string()),
        CodeType::Barcode => random_digits(rng),
    }
}

/// Random decimal string of up to 12 digits.
pub fn random_digits<R: Rng>(rng: &mut R) -> String {
    rng.random_range(0..BARCODE_RANDOM_LIMIT).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn day() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, 7).unwrap()
    }

    #[test]
    fn test_find_by_id_and_name() {
        assert_eq!(find("wifi").unwrap().value, "WIFI:T:WPA;S:NetworkName;P:password123;;");
        assert_eq!(find("Website URL").unwrap().id, "website");
        assert_eq!(find("SMS").unwrap().value, "sms:+6281234567890?body=Hello!");
        assert!(find("fax").is_none());
    }

    #[test]
    fn test_pool_includes_dated_entry() {
        let pool = sample_pool(day());
        assert_eq!(pool.len(), 7);
        assert_eq!(pool[6], "Generated on 3/7/2024");
    }

    #[test]
    fn test_random_qr_stays_in_pool() {
        let mut rng = StdRng::seed_from_u64(7);
        let pool = sample_pool(day());
        for _ in 0..200 {
            let content = random_content(CodeType::Qr, &mut rng, day());
            assert!(pool.contains(&content), "{content} not in pool");
        }
    }

    #[test]
    fn test_random_barcode_is_short_digits() {
        let mut rng = StdRng::seed_from_u64(42);
        for _ in 0..500 {
            let content = random_content(CodeType::Barcode, &mut rng, day());
            assert!(!content.is_empty());
            assert!(content.len() <= 12, "{content} too long");
            assert!(content.chars().all(|c| c.is_ascii_digit()));
        }
    }
}
