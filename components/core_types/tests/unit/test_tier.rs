//! Unit tests for CompilationTier and CompileEntry

use core_types::{CompilationTier, CompileEntry, ErrorKind};

#[test]
fn test_all_tiers_are_ordered() {
    let tiers = CompilationTier::ALL;
    for pair in tiers.windows(2) {
        assert!(pair[0] < pair[1]);
        assert_eq!(pair[0].level() + 1, pair[1].level());
    }
}

#[test]
fn test_unsupported_levels() {
    for level in [-3, 0, 5, 100] {
        let err = CompilationTier::from_level(level).unwrap_err();
        assert_eq!(err.kind, ErrorKind::UnsupportedTier);
    }
}

#[test]
fn test_tier_serializes_snake_case() {
    let json = serde_json::to_string(&CompilationTier::LimitedProfile).unwrap();
    assert_eq!(json, "\"limited_profile\"");
    let back: CompilationTier = serde_json::from_str("\"optimized\"").unwrap();
    assert_eq!(back, CompilationTier::Optimized);
}

#[test]
fn test_entry_serializes() {
    let json = serde_json::to_string(&CompileEntry::Osr(4)).unwrap();
    let back: CompileEntry = serde_json::from_str(&json).unwrap();
    assert_eq!(back, CompileEntry::Osr(4));
}
