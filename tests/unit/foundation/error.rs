use super::*;

#[test]
fn display_prefixes_are_stable() {
    assert!(
        VoyageError::validation("x")
            .to_string()
            .contains("validation error:")
    );
    assert!(VoyageError::load("x").to_string().contains("load error:"));
    assert!(
        VoyageError::compose("x")
            .to_string()
            .contains("compose error:")
    );
    assert!(
        VoyageError::capture("x")
            .to_string()
            .contains("capture error:")
    );
    assert!(
        VoyageError::export("x")
            .to_string()
            .contains("export error:")
    );
}

#[test]
fn stage_labels_match_variants() {
    assert_eq!(VoyageError::load("x").stage(), "load");
    assert_eq!(VoyageError::compose("x").stage(), "compose");
    assert_eq!(VoyageError::capture("x").stage(), "capture");
    assert_eq!(VoyageError::export("x").stage(), "export");
}

#[test]
fn context_keeps_stage() {
    let err = VoyageError::compose("line 4: bad").context("frame 2 (1792)");
    assert_eq!(err.stage(), "compose");
    assert_eq!(
        err.to_string(),
        "compose error: frame 2 (1792): line 4: bad"
    );
}

#[test]
fn other_preserves_source() {
    let base = std::io::Error::other("boom");
    let err = VoyageError::Other(anyhow::Error::new(base));
    assert!(err.to_string().contains("boom"));
    assert_eq!(err.stage(), "other");
}
