use super::*;

fn parse(yaml: &str) -> SuppliersFile {
    serde_yaml::from_str(yaml).expect("valid yaml")
}

#[test]
fn parses_full_entry() {
    let file = parse(
        r#"
suppliers:
  - supplier: temu
    api_key_env: TEMU_API_KEY
    feed_url: https://feeds.example/temu.json
    tracking_url_template: "https://track.example/{tracking}"
"#,
    );
    validate_suppliers(&file).unwrap();
    let temu = file.get(SupplierTag::Temu);
    assert_eq!(temu.api_key_env.as_deref(), Some("TEMU_API_KEY"));
    assert_eq!(temu.feed_currency, "USD");
    assert_eq!(
        temu.tracking_url("LX123NO").as_deref(),
        Some("https://track.example/LX123NO")
    );
}

#[test]
fn missing_supplier_is_unconfigured() {
    let file = parse("suppliers: []");
    let ebay = file.get(SupplierTag::Ebay);
    assert!(ebay.feed_url.is_none());
    assert!(ebay.api_key().is_none());
    assert!(ebay.tracking_url("X").is_none());
}

#[test]
fn validate_rejects_duplicate_supplier() {
    let file = parse(
        r"
suppliers:
  - supplier: ebay
  - supplier: ebay
",
    );
    let err = validate_suppliers(&file).unwrap_err();
    assert!(err.to_string().contains("duplicate supplier entry"));
}

#[test]
fn validate_rejects_non_http_feed() {
    let file = parse(
        r"
suppliers:
  - supplier: alibaba
    feed_url: ftp://feeds.example/alibaba.json
",
    );
    let err = validate_suppliers(&file).unwrap_err();
    assert!(err.to_string().contains("must be http(s)"), "got: {err}");
}

#[test]
fn validate_rejects_template_without_placeholder() {
    let file = parse(
        r"
suppliers:
  - supplier: temu
    tracking_url_template: https://track.example/
",
    );
    let err = validate_suppliers(&file).unwrap_err();
    assert!(err.to_string().contains("{tracking}"), "got: {err}");
}

#[test]
fn unknown_supplier_tag_fails_to_parse() {
    let result = serde_yaml::from_str::<SuppliersFile>("suppliers:\n  - supplier: wish\n");
    assert!(result.is_err());
}

#[test]
fn load_suppliers_reports_missing_file() {
    let err = load_suppliers(Path::new("/definitely/not/here.yaml")).unwrap_err();
    assert!(matches!(err, ConfigError::SuppliersFileIo { .. }));
}

#[test]
fn validate_rejects_unknown_feed_currency() {
    let file = parse(
        r"
suppliers:
  - supplier: alibaba
    feed_currency: CNY
",
    );
    let err = validate_suppliers(&file).unwrap_err();
    assert!(err.to_string().contains("feed_currency"));
}
