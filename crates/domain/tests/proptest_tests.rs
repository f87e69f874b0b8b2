//! Property-based tests for domain invariants
//!
//! These tests use proptest to verify invariants across many random inputs.

use domain::{
    ContentSegment, PITCH_RANGE, ProviderId, RATE_RANGE, VOLUME_RANGE, VoiceProfile,
    extract_segments,
};
use proptest::prelude::*;

// ============================================================================
// Content Segment Property Tests
// ============================================================================

mod content_tests {
    use super::*;

    proptest! {
        #[test]
        fn text_without_fences_is_single_segment(text in "[^`]{1,200}") {
            let segments = extract_segments(&text);
            prop_assert_eq!(segments, vec![ContentSegment::text(text.clone())]);
        }

        #[test]
        fn fenced_block_is_extracted_and_trimmed(
            before in "[a-z ]{0,20}",
            lang in "[a-z]{1,8}",
            code in "[a-z0-9=;(){} ]{1,40}",
            after in "[a-z ]{0,20}",
        ) {
            let text = format!("{before}```{lang}\n{code}\n```{after}");
            let segments = extract_segments(&text);

            let code_segments: Vec<_> = segments.iter().filter(|s| s.is_code()).collect();
            prop_assert_eq!(code_segments.len(), 1);
            prop_assert_eq!(
                code_segments[0],
                &ContentSegment::code(lang.clone(), code.trim().to_string())
            );
            prop_assert_eq!(segments.len(), 1 + usize::from(!before.is_empty()) + usize::from(!after.is_empty()));
        }

        #[test]
        fn extraction_is_deterministic(text in ".{0,200}") {
            prop_assert_eq!(extract_segments(&text), extract_segments(&text));
        }
    }
}

// ============================================================================
// ProviderId Property Tests
// ============================================================================

mod provider_id_tests {
    use super::*;

    proptest! {
        #[test]
        fn valid_ids_are_lowercased(raw in "[A-Za-z0-9_-]{1,24}") {
            let id = ProviderId::parse(&raw).unwrap();
            prop_assert_eq!(id.as_str(), raw.to_ascii_lowercase());
        }

        #[test]
        fn normalization_is_idempotent(raw in "[A-Za-z0-9_-]{1,24}") {
            let once = ProviderId::parse(&raw).unwrap();
            let twice = ProviderId::parse(once.as_str()).unwrap();
            prop_assert_eq!(once, twice);
        }

        #[test]
        fn ids_with_other_characters_rejected(raw in "[a-z]{0,5}[ .!/:]{1,3}[a-z]{1,5}") {
            prop_assert!(ProviderId::parse(&raw).is_err());
        }

        #[test]
        fn config_key_has_no_dashes(raw in "[a-z0-9_-]{1,24}") {
            let key = ProviderId::parse(&raw).unwrap().config_key();
            prop_assert!(!key.contains('-'));
            prop_assert_eq!(key.clone(), key.to_ascii_uppercase());
        }
    }
}

// ============================================================================
// VoiceProfile Property Tests
// ============================================================================

mod voice_profile_tests {
    use super::*;

    fn any_f32() -> impl Strategy<Value = f32> {
        prop_oneof![
            -10.0f32..10.0f32,
            Just(f32::NAN),
            Just(f32::INFINITY),
            Just(f32::NEG_INFINITY),
        ]
    }

    proptest! {
        #[test]
        fn sanitized_profile_is_always_in_range(
            rate in any_f32(),
            pitch in any_f32(),
            volume in any_f32(),
            index in proptest::option::of(0usize..32),
        ) {
            let profile = VoiceProfile { rate, pitch, volume, selected_voice_index: index }.sanitized();
            prop_assert!(RATE_RANGE.contains(&profile.rate));
            prop_assert!(PITCH_RANGE.contains(&profile.pitch));
            prop_assert!(VOLUME_RANGE.contains(&profile.volume));
            prop_assert_eq!(profile.selected_voice_index, index);
        }

        #[test]
        fn sanitizing_is_idempotent(rate in any_f32(), pitch in any_f32(), volume in any_f32()) {
            let once = VoiceProfile { rate, pitch, volume, selected_voice_index: None }.sanitized();
            prop_assert_eq!(once, once.sanitized());
        }

        #[test]
        fn valid_fields_survive_sanitizing(rate in 0.5f32..=2.0f32, volume in 0.0f32..=1.0f32) {
            let profile = VoiceProfile { rate, volume, ..VoiceProfile::default() }.sanitized();
            prop_assert!((profile.rate - rate).abs() < f32::EPSILON);
            prop_assert!((profile.volume - volume).abs() < f32::EPSILON);
        }
    }
}
