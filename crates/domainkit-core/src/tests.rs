use std::path::Path;

use super::*;

#[test]
fn find_in_extracts_first_four_part_token() {
    let version = FileVersion::find_in("driver-1.2.10.0").expect("token should parse");
    assert_eq!(version, FileVersion::new(1, 2, 10, 0));
    assert_eq!(version.components(), [1, 2, 10, 0]);
}

#[test]
fn find_in_ignores_trailing_suffix() {
    let version = FileVersion::find_in("tool-2.0.0.1-beta").expect("token should parse");
    assert_eq!(version.to_string(), "2.0.0.1");
}

#[test]
fn find_in_skips_non_ascii_digits() {
    let version = FileVersion::find_in("driver-\u{0663}1.2.3.4").expect("token should parse");
    assert_eq!(version, FileVersion::new(1, 2, 3, 4));
}

#[test]
fn find_in_takes_first_match_of_longer_dotted_run() {
    let version = FileVersion::find_in("pkg-1.2.3.4.5").expect("token should parse");
    assert_eq!(version, FileVersion::new(1, 2, 3, 4));
}

#[test]
fn find_in_rejects_three_part_versions() {
    let err = FileVersion::find_in("driver-1.2.3").expect_err("three parts must not match");
    assert_eq!(err, VersionError::MissingToken("driver-1.2.3".to_string()));
}

#[test]
fn find_in_reports_component_overflow() {
    let err = FileVersion::find_in("x-1.2.3.99999999999999999999999")
        .expect_err("overflowing component must fail");
    assert!(
        matches!(err, VersionError::ComponentOutOfRange { ref component, .. } if component == "99999999999999999999999"),
        "unexpected error: {err}"
    );
}

#[test]
fn ordering_is_component_wise_not_lexical() {
    let low = FileVersion::new(1, 2, 3, 4);
    let high = FileVersion::new(1, 2, 10, 0);
    assert!(high > low);
    assert!(FileVersion::new(2, 0, 0, 0) > FileVersion::new(1, 99, 99, 99));
    assert!(FileVersion::new(1, 0, 0, 1) > FileVersion::new(1, 0, 0, 0));
}

#[test]
fn from_str_requires_exactly_four_components() {
    assert_eq!(
        "10.0.19041.1".parse::<FileVersion>().expect("must parse"),
        FileVersion::new(10, 0, 19041, 1)
    );
    assert!("1.2.3".parse::<FileVersion>().is_err());
    assert!("1.2.3.4.5".parse::<FileVersion>().is_err());
    assert!("1..3.4".parse::<FileVersion>().is_err());
    assert!("1.2.3.x".parse::<FileVersion>().is_err());
}

#[test]
fn parse_lenient_pads_missing_components() {
    assert_eq!(
        FileVersion::parse_lenient("8.1.22").expect("must parse"),
        FileVersion::new(8, 1, 22, 0)
    );
    assert_eq!(
        FileVersion::parse_lenient(" 3.4 ").expect("must parse"),
        FileVersion::new(3, 4, 0, 0)
    );
    assert!(FileVersion::parse_lenient("7").is_err());
    assert!(FileVersion::parse_lenient("1.2.3.4.5").is_err());
}

#[test]
fn file_version_serializes_as_dotted_string() {
    let json = serde_json::to_string(&FileVersion::new(3, 1, 4, 1)).expect("must serialize");
    assert_eq!(json, "\"3.1.4.1\"");
    let back: FileVersion = serde_json::from_str(&json).expect("must deserialize");
    assert_eq!(back, FileVersion::new(3, 1, 4, 1));
}

#[test]
fn extension_filter_normalizes_dot_and_case() {
    let filter = ExtensionFilter::new(".MSI");
    assert_eq!(filter.as_str(), "msi");
    assert_eq!(filter.to_string(), "*.msi");
    assert!(filter.matches(Path::new("share/driver-1.2.3.4.msi")));
    assert!(filter.matches(Path::new("DRIVER-1.2.3.4.Msi")));
    assert!(!filter.matches(Path::new("a.txt")));
    assert!(!filter.matches(Path::new("b.exe")));
    assert!(!filter.matches(Path::new("notmsi")));
    assert!(!filter.matches(Path::new(".msi")));
}

#[test]
fn extension_filter_accepts_glob_spelling() {
    let filter = ExtensionFilter::new("*.msi");
    assert_eq!(filter, ExtensionFilter::new("msi"));
    assert!(filter.matches(Path::new("driver-1.2.3.4.msi")));
    assert_eq!(ExtensionFilter::new("*").to_string(), "*");
}

#[test]
fn extension_filter_supports_multi_part_extensions() {
    let filter = ExtensionFilter::new("tar.gz");
    assert!(filter.matches(Path::new("bundle-1.0.0.0.tar.gz")));
    assert!(!filter.matches(Path::new("bundle-1.0.0.0.gz")));
}

#[test]
fn empty_extension_filter_matches_everything() {
    let filter = ExtensionFilter::new("");
    assert_eq!(filter.to_string(), "*");
    assert!(filter.matches(Path::new("anything")));
}
