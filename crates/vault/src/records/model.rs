//! Record types as held by the store and as submitted by callers.

use std::fmt;

use common::Envelope;
use uuid::Uuid;

/// One attribute of a record, named as on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Attribute {
    FullName,
    DateOfBirth,
    Address,
    PhoneNumber,
    Email,
    Image,
}

impl Attribute {
    /// The four text attributes stored encrypted.
    pub const SENSITIVE_TEXT: [Attribute; 4] = [
        Attribute::FullName,
        Attribute::Address,
        Attribute::PhoneNumber,
        Attribute::Email,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Attribute::FullName => "fullName",
            Attribute::DateOfBirth => "dateOfBirth",
            Attribute::Address => "address",
            Attribute::PhoneNumber => "phoneNumber",
            Attribute::Email => "email",
            Attribute::Image => "image",
        }
    }
}

impl fmt::Display for Attribute {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A record as persisted: ciphertext for every sensitive attribute.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SensitiveRecord {
    pub id: Uuid,
    pub full_name: Envelope,
    pub address: Envelope,
    pub phone_number: Envelope,
    pub email: Envelope,
    /// Not sensitive; stored in the clear.
    pub date_of_birth: String,
    /// The encrypted portrait bytes.
    pub image: Envelope,
    /// Where the image host published the portrait.
    pub image_url: String,
}

impl SensitiveRecord {
    /// The envelope holding `attr`, or `None` for attributes stored in the clear.
    pub fn envelope(&self, attr: Attribute) -> Option<&Envelope> {
        match attr {
            Attribute::FullName => Some(&self.full_name),
            Attribute::Address => Some(&self.address),
            Attribute::PhoneNumber => Some(&self.phone_number),
            Attribute::Email => Some(&self.email),
            Attribute::Image => Some(&self.image),
            Attribute::DateOfBirth => None,
        }
    }
}

/// Plaintext input for a new record. Every field is required.
#[derive(Debug, Clone, Default)]
pub struct NewRecord {
    pub full_name: String,
    pub date_of_birth: String,
    pub address: String,
    pub phone_number: String,
    pub email: String,
    pub image: Vec<u8>,
}

impl NewRecord {
    /// The first attribute that is empty, if any.
    pub fn first_empty(&self) -> Option<Attribute> {
        [
            (Attribute::FullName, self.full_name.trim().is_empty()),
            (Attribute::DateOfBirth, self.date_of_birth.trim().is_empty()),
            (Attribute::Address, self.address.trim().is_empty()),
            (Attribute::PhoneNumber, self.phone_number.trim().is_empty()),
            (Attribute::Email, self.email.trim().is_empty()),
            (Attribute::Image, self.image.is_empty()),
        ]
        .into_iter()
        .find_map(|(attr, empty)| empty.then_some(attr))
    }
}

/// Plaintext input for an update. `None` leaves the stored value as is.
#[derive(Debug, Clone, Default)]
pub struct RecordPatch {
    pub full_name: Option<String>,
    pub date_of_birth: Option<String>,
    pub address: Option<String>,
    pub phone_number: Option<String>,
    pub email: Option<String>,
    pub image: Option<Vec<u8>>,
}

impl RecordPatch {
    /// The first attribute that is present but empty, if any.
    pub fn first_empty(&self) -> Option<Attribute> {
        fn blank(v: &Option<String>) -> bool {
            v.as_deref().is_some_and(|s| s.trim().is_empty())
        }
        [
            (Attribute::FullName, blank(&self.full_name)),
            (Attribute::DateOfBirth, blank(&self.date_of_birth)),
            (Attribute::Address, blank(&self.address)),
            (Attribute::PhoneNumber, blank(&self.phone_number)),
            (Attribute::Email, blank(&self.email)),
            (Attribute::Image, self.image.as_ref().is_some_and(Vec::is_empty)),
        ]
        .into_iter()
        .find_map(|(attr, empty)| empty.then_some(attr))
    }

    pub fn is_empty(&self) -> bool {
        self.full_name.is_none()
            && self.date_of_birth.is_none()
            && self.address.is_none()
            && self.phone_number.is_none()
            && self.email.is_none()
            && self.image.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn complete() -> NewRecord {
        NewRecord {
            full_name: "Jane Doe".into(),
            date_of_birth: "1990-01-01".into(),
            address: "1 Main St".into(),
            phone_number: "555-0100".into(),
            email: "jane@example.com".into(),
            image: vec![1, 2, 3],
        }
    }

    #[test]
    fn complete_record_has_no_empty_field() {
        assert_eq!(complete().first_empty(), None);
    }

    #[test]
    fn whitespace_only_counts_as_empty() {
        let rec = NewRecord {
            email: "  ".into(),
            ..complete()
        };
        assert_eq!(rec.first_empty(), Some(Attribute::Email));
    }

    #[test]
    fn missing_image_is_reported() {
        let rec = NewRecord {
            image: Vec::new(),
            ..complete()
        };
        assert_eq!(rec.first_empty(), Some(Attribute::Image));
    }

    #[test]
    fn patch_absent_fields_are_not_empty() {
        let patch = RecordPatch {
            address: Some("2 Side St".into()),
            ..Default::default()
        };
        assert_eq!(patch.first_empty(), None);
        assert!(!patch.is_empty());
        assert!(RecordPatch::default().is_empty());
    }

    #[test]
    fn patch_present_but_blank_is_reported() {
        let patch = RecordPatch {
            phone_number: Some(String::new()),
            ..Default::default()
        };
        assert_eq!(patch.first_empty(), Some(Attribute::PhoneNumber));
    }

    #[test]
    fn date_of_birth_has_no_envelope() {
        let rec = SensitiveRecord {
            id: Uuid::nil(),
            full_name: Envelope::new("a", "b"),
            address: Envelope::default(),
            phone_number: Envelope::default(),
            email: Envelope::default(),
            date_of_birth: "1990-01-01".into(),
            image: Envelope::default(),
            image_url: String::new(),
        };
        assert!(rec.envelope(Attribute::DateOfBirth).is_none());
        assert_eq!(rec.envelope(Attribute::FullName).unwrap().iv, "a");
    }
}
