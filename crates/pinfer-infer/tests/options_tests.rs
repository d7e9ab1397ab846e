use super::*;

#[test]
fn test_empty_object_is_default() {
    let options = InferOptions::from_json("{}").unwrap();
    assert_eq!(options, InferOptions::default());
    assert!(!options.resolve_on_analysis);
    assert!(options.widen_loop_assignments);
    assert!(options.untyped_parameters_as_templates);
}

#[test]
fn test_camel_case_fields() {
    let options = InferOptions::from_json(
        r#"{"resolveOnAnalysis": true, "maxResolutionDepth": 8, "collectionClass": "App\\Bag"}"#,
    )
    .unwrap();
    assert!(options.resolve_on_analysis);
    assert_eq!(options.max_resolution_depth, 8);
    assert_eq!(options.collection_class, "App\\Bag");
    assert!(options.widen_loop_assignments);
}

#[test]
fn test_parse_error() {
    let err = InferOptions::from_json("{\"maxResolutionDepth\": \"deep\"}").unwrap_err();
    assert!(matches!(err, ConfigError::Parse(_)));
    assert!(err.to_string().starts_with("invalid options:"));
}

#[test]
fn test_zero_depth_rejected() {
    let err = InferOptions::from_json(r#"{"maxResolutionDepth": 0}"#).unwrap_err();
    match err {
        ConfigError::InvalidValue { field, .. } => assert_eq!(field, "maxResolutionDepth"),
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn test_empty_collection_class_rejected() {
    let options = InferOptions {
        collection_class: "\\".to_string(),
        ..InferOptions::default()
    };
    let err = options.validate().unwrap_err();
    assert_eq!(
        err.to_string(),
        "invalid value for `collectionClass`: must name a class"
    );
}

#[test]
fn test_serializes_camel_case() {
    let json = serde_json::to_value(InferOptions::default()).unwrap();
    assert_eq!(json["maxResolutionDepth"], 64);
    assert_eq!(json["untypedParametersAsTemplates"], true);
}
