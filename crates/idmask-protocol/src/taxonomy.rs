//! Document types and their detector class taxonomies.
//!
//! Each table mirrors the class-index order of the detection model trained
//! for that document type. Class ids are positions in the table, so they are
//! contiguous from 0 by construction.

use std::fmt;
use std::str::FromStr;

use idmask_core::{Error, Result};
use serde::{Deserialize, Serialize};

/// Minimum detection confidence used by every current table.
pub const DEFAULT_MIN_CONFIDENCE: f64 = 0.5;

/// One detector class.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TaxonomyEntry {
    pub class_id: u32,
    pub label: &'static str,
    pub is_pii: bool,
}

/// Ordered class table for one detection model.
#[derive(Debug)]
pub struct Taxonomy {
    name: &'static str,
    classes: &'static [(&'static str, bool)],
    /// Labels are the model's own class names, not a relabelling.
    model_labels: bool,
}

static NATIONAL_ID: Taxonomy = Taxonomy {
    name: "national_id",
    classes: &[
        ("AadharAddress", true),
        ("AadharBack", false),
        ("AadharDOB", true),
        ("AadharEmblem", false),
        ("AadharFront", false),
        ("AadharGOI", false),
        ("AadharGender", true),
        ("AadharName", true),
        ("AadharNumber", true),
        ("AadharUAIDI", true),
    ],
    model_labels: true,
};

static DRIVING_LICENSE: Taxonomy = Taxonomy {
    name: "driving_license",
    classes: &[
        ("add", true),
        ("blood_group", true),
        ("dl_no", true),
        ("dob", true),
        ("name", true),
        ("relation_with", true),
        ("rto", true),
        ("state", true),
        ("vehicle_type", true),
    ],
    model_labels: true,
};

// Single barcode class, reported as "QR".
static QR_CODE: Taxonomy = Taxonomy {
    name: "qr_code",
    classes: &[("QR", true)],
    model_labels: false,
};

impl Taxonomy {
    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn len(&self) -> usize {
        self.classes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.classes.is_empty()
    }

    /// Resolve a detector class id. Out-of-range ids are a hard error.
    pub fn lookup(&self, class_id: u32) -> Result<TaxonomyEntry> {
        self.classes
            .get(class_id as usize)
            .map(|&(label, is_pii)| TaxonomyEntry {
                class_id,
                label,
                is_pii,
            })
            .ok_or_else(|| Error::UnknownClassId {
                document: self.name.to_string(),
                class_id,
                table_len: self.classes.len(),
            })
    }

    pub fn entries(&self) -> impl Iterator<Item = TaxonomyEntry> + '_ {
        self.classes
            .iter()
            .enumerate()
            .map(|(i, &(label, is_pii))| TaxonomyEntry {
                class_id: i as u32,
                label,
                is_pii,
            })
    }

    pub fn pii_labels(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.classes
            .iter()
            .filter(|(_, is_pii)| *is_pii)
            .map(|&(label, _)| label)
    }

    /// Check table invariants: non-empty, labels unique.
    pub fn validate(&self) -> Result<()> {
        if self.classes.is_empty() {
            return Err(Error::Config(format!("taxonomy {} is empty", self.name)));
        }
        for (i, (label, _)) in self.classes.iter().enumerate() {
            if self.classes[..i].iter().any(|(other, _)| other == label) {
                return Err(Error::Config(format!(
                    "taxonomy {} has duplicate label {}",
                    self.name, label
                )));
            }
        }
        Ok(())
    }

    /// Compare the detector's declared class count with this table.
    pub fn check_class_count(&self, declared: usize) -> Result<()> {
        if declared != self.classes.len() {
            return Err(Error::TaxonomyMismatch {
                document: self.name.to_string(),
                expected: self.classes.len(),
                declared,
            });
        }
        Ok(())
    }

    /// Compare the detector's class names with this table, position by
    /// position. Tables that relabel the model's classes only check the count.
    pub fn check_class_names(&self, declared: &[String]) -> Result<()> {
        self.check_class_count(declared.len())?;
        if !self.model_labels {
            return Ok(());
        }
        for (entry, name) in self.entries().zip(declared) {
            if entry.label != name {
                return Err(Error::ClassNameMismatch {
                    document: self.name.to_string(),
                    class_id: entry.class_id,
                    expected: entry.label.to_string(),
                    declared: name.clone(),
                });
            }
        }
        Ok(())
    }
}

/// Kind of scanned document; selects a model, taxonomy and threshold.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DocumentType {
    NationalIdFront,
    NationalIdBack,
    DrivingLicense,
    QrCode,
}

impl DocumentType {
    pub const ALL: [DocumentType; 4] = [
        DocumentType::NationalIdFront,
        DocumentType::NationalIdBack,
        DocumentType::DrivingLicense,
        DocumentType::QrCode,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::NationalIdFront => "national_id_front",
            Self::NationalIdBack => "national_id_back",
            Self::DrivingLicense => "driving_license",
            Self::QrCode => "qr_code",
        }
    }

    /// Both national id sides share one model and one table.
    pub fn taxonomy(&self) -> &'static Taxonomy {
        match self {
            Self::NationalIdFront | Self::NationalIdBack => &NATIONAL_ID,
            Self::DrivingLicense => &DRIVING_LICENSE,
            Self::QrCode => &QR_CODE,
        }
    }

    /// Model artifact file name inside the model directory.
    pub fn model_file(&self) -> &'static str {
        match self {
            Self::NationalIdFront | Self::NationalIdBack => "national_id.onnx",
            Self::DrivingLicense => "driving_license.onnx",
            Self::QrCode => "qr_code.onnx",
        }
    }

    pub fn min_confidence(&self) -> f64 {
        DEFAULT_MIN_CONFIDENCE
    }

    /// Label of the region holding the document number, if any.
    pub fn primary_identifier(&self) -> Option<&'static str> {
        match self {
            Self::NationalIdFront | Self::NationalIdBack => Some("AadharNumber"),
            Self::DrivingLicense => Some("dl_no"),
            Self::QrCode => None,
        }
    }

    /// National id cards carry a QR code that is masked alongside the fields.
    pub fn scans_qr(&self) -> bool {
        matches!(self, Self::NationalIdFront | Self::NationalIdBack)
    }

    pub fn lookup(&self, class_id: u32) -> Result<TaxonomyEntry> {
        self.taxonomy().lookup(class_id)
    }
}

impl fmt::Display for DocumentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DocumentType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().replace('-', "_").as_str() {
            "national_id_front" | "national_id" | "aadhaar" | "adhaar" => {
                Ok(Self::NationalIdFront)
            }
            "national_id_back" => Ok(Self::NationalIdBack),
            "driving_license" | "driving_licence" | "dl" => Ok(Self::DrivingLicense),
            "qr_code" | "qr" => Ok(Self::QrCode),
            other => Err(Error::Config(format!("unknown document type: {}", other))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_declared_class_resolves() {
        for doc in DocumentType::ALL {
            let table = doc.taxonomy();
            for id in 0..table.len() as u32 {
                let entry = doc.lookup(id).unwrap();
                assert_eq!(entry.class_id, id);
            }
        }
    }

    #[test]
    fn test_out_of_range_is_unknown_class() {
        let err = DocumentType::DrivingLicense.lookup(9).unwrap_err();
        match err {
            Error::UnknownClassId {
                class_id,
                table_len,
                ..
            } => {
                assert_eq!(class_id, 9);
                assert_eq!(table_len, 9);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_driving_license_name_is_class_four() {
        let entry = DocumentType::DrivingLicense.lookup(4).unwrap();
        assert_eq!(entry.label, "name");
        assert!(entry.is_pii);
    }

    #[test]
    fn test_national_id_chrome_is_not_pii() {
        let table = DocumentType::NationalIdFront.taxonomy();
        let pii: Vec<_> = table.pii_labels().collect();
        assert_eq!(
            pii,
            vec![
                "AadharAddress",
                "AadharDOB",
                "AadharGender",
                "AadharName",
                "AadharNumber",
                "AadharUAIDI"
            ]
        );
        assert!(!DocumentType::NationalIdBack.lookup(3).unwrap().is_pii);
    }

    #[test]
    fn test_tables_are_valid() {
        for doc in DocumentType::ALL {
            doc.taxonomy().validate().unwrap();
        }
    }

    #[test]
    fn test_class_count_check() {
        let table = DocumentType::QrCode.taxonomy();
        assert!(table.check_class_count(1).is_ok());
        let err = table.check_class_count(2).unwrap_err();
        assert_eq!(err.kind(), "taxonomy_mismatch");
    }

    fn names(table: &Taxonomy) -> Vec<String> {
        table.entries().map(|e| e.label.to_string()).collect()
    }

    #[test]
    fn test_class_names_check() {
        let table = DocumentType::DrivingLicense.taxonomy();
        assert!(table.check_class_names(&names(table)).is_ok());

        let mut swapped = names(table);
        swapped.swap(2, 4);
        match table.check_class_names(&swapped).unwrap_err() {
            Error::ClassNameMismatch {
                class_id,
                expected,
                declared,
                ..
            } => {
                assert_eq!(class_id, 2);
                assert_eq!(expected, "dl_no");
                assert_eq!(declared, "name");
            }
            other => panic!("unexpected error: {other}"),
        }

        let short = names(table)[..8].to_vec();
        assert_eq!(
            table.check_class_names(&short).unwrap_err().kind(),
            "taxonomy_mismatch"
        );
    }

    #[test]
    fn test_relabelled_table_checks_count_only() {
        let table = DocumentType::QrCode.taxonomy();
        assert!(table.check_class_names(&["barcode".to_string()]).is_ok());
    }

    #[test]
    fn test_parse_aliases() {
        assert_eq!("dl".parse::<DocumentType>().unwrap(), DocumentType::DrivingLicense);
        assert_eq!("adhaar".parse::<DocumentType>().unwrap(), DocumentType::NationalIdFront);
        assert_eq!("QR-Code".parse::<DocumentType>().unwrap(), DocumentType::QrCode);
        assert!("passport".parse::<DocumentType>().is_err());
        for doc in DocumentType::ALL {
            assert_eq!(doc.to_string().parse::<DocumentType>().unwrap(), doc);
        }
    }

    #[test]
    fn test_primary_identifier_is_pii_label() {
        for doc in DocumentType::ALL {
            if let Some(label) = doc.primary_identifier() {
                assert!(doc.taxonomy().pii_labels().any(|l| l == label));
            }
        }
    }
}
