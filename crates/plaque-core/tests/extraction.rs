use pretty_assertions::assert_eq;

use plaque_core::{
    extract, AliasTable, CanonicalField, ExtractionResult, FieldExtractor, FieldValue,
    PositionalExtractor, DEFAULT_SENTINEL,
};

use plaque_core::CanonicalField::{Ipm, Isc, Pmax, Voc, Vpm};

const NAMEPLATE: &str = r#"
SUNPOWER MAXEON 3
Electrical data (STC)

Pmax:
Vpm:
lpm:
Voc:
Isc:
415,3 W
40.52 V
10.24A
48,2 V
10.9 A

Max. system voltage 1000V
"#;

fn rendered(result: &ExtractionResult) -> Vec<(&'static str, String)> {
    result.to_map()
}

#[test]
fn full_nameplate_is_recovered() {
    let result = PositionalExtractor::new().extract(NAMEPLATE);

    assert_eq!(
        rendered(&result),
        vec![
            ("Voc", "48.2".to_string()),
            ("Isc", "10.9".to_string()),
            ("Pmax", "415.3".to_string()),
            ("Vpm", "40.5".to_string()),
            ("Ipm", "10.2".to_string()),
        ]
    );
    assert!(result.is_complete());
}

#[test]
fn every_requested_field_is_present() {
    let inputs = [
        "",
        "\n\n   \n",
        "Voc:",
        "45.6 V",
        "Voc\nVoc\nVoc\n1\n2",
        "Ω % ### ???",
        NAMEPLATE,
    ];
    let field_sets: [&[CanonicalField]; 3] = [&CanonicalField::ALL, &[Ipm], &[Pmax, Voc, Pmax]];
    let aliases = AliasTable::default();

    for text in inputs {
        for fields in field_sets {
            let result = extract(text, fields, &aliases);
            assert_eq!(result.len(), fields.len(), "{text:?}");
            let keys: Vec<CanonicalField> = result.iter().map(|(field, _)| field).collect();
            assert_eq!(keys, fields.to_vec());
        }
    }
}

#[test]
fn empty_text_yields_sentinel_everywhere() {
    let result = extract("", &CanonicalField::ALL, &AliasTable::default());

    assert!(result.iter().all(|(_, text)| text == DEFAULT_SENTINEL));
    assert_eq!(result.missing_fields(), CanonicalField::ALL.to_vec());
}

#[test]
fn spec_scenario() {
    let text = "Voc:\nIsc:\n45.6 V\n9.1 A\nPmax:\n415.3 W\n";
    let result = extract(text, &CanonicalField::ALL, &AliasTable::default());

    assert_eq!(
        serde_json::to_value(&result).unwrap(),
        serde_json::json!({
            "Voc": "45.6",
            "Isc": "9.1",
            "Pmax": "415.3",
            "Vpm": "Non détecté",
            "Ipm": "Non détecté",
        })
    );
}

#[test]
fn three_labels_two_values() {
    let result = extract(
        "Voc:\nIsc:\nVpm:\n45.6 V\n9.1 A\n",
        &CanonicalField::ALL,
        &AliasTable::default(),
    );

    assert_eq!(result.value(Voc), Some("45.6"));
    assert_eq!(result.value(Isc), Some("9.1"));
    assert_eq!(result.get(Vpm), Some(&FieldValue::NotFound));
}

#[test]
fn value_lines_with_leading_text_do_not_count() {
    let result = extract(
        "Voc:\nRated 45.6 V\n45.6 V\n",
        &[Voc],
        &AliasTable::default(),
    );

    assert_eq!(result.value(Voc), Some("45.6"));
}

#[test]
fn api_response_shape() {
    let result = extract("Isc\n9.1 A", &CanonicalField::ALL, &AliasTable::default());

    assert_eq!(
        serde_json::to_value(result.api_response()).unwrap(),
        serde_json::json!({
            "fields": {
                "Voc": null,
                "Isc": "9.1",
                "Pmax": null,
                "Vpm": null,
                "Ipm": null,
            }
        })
    );
}

#[test]
fn report_exposes_classification() {
    let report = PositionalExtractor::new().extract_with_report(NAMEPLATE);

    assert_eq!(report.labels, vec![Pmax, Vpm, Ipm, Voc, Isc]);
    assert_eq!(report.values.len(), 5);
    assert_eq!(report.pairings.len(), 5);
    assert!(report.warnings.is_empty(), "{:?}", report.warnings);

    let json = serde_json::to_value(&report).unwrap();
    assert_eq!(json["lines"][0]["class"], "other");
    assert_eq!(json["lines"][2]["class"], "label");
    assert_eq!(json["lines"][2]["field"], "Pmax");
}

#[test]
fn extraction_is_idempotent() {
    let extractor = PositionalExtractor::new();
    let first = extractor.extract(NAMEPLATE);
    let second = extractor.extract(NAMEPLATE);

    assert_eq!(first, second);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_extractions_are_independent() {
    let extractor = std::sync::Arc::new(PositionalExtractor::new());
    let expected = extractor.extract(NAMEPLATE);

    let mut handles = Vec::new();
    for i in 0..16 {
        let extractor = extractor.clone();
        handles.push(tokio::task::spawn_blocking(move || {
            if i % 2 == 0 {
                extractor.extract(NAMEPLATE)
            } else {
                extractor.extract("")
            }
        }));
    }

    for (i, handle) in handles.into_iter().enumerate() {
        let result = handle.await.unwrap();
        if i % 2 == 0 {
            assert_eq!(result, expected);
        } else {
            assert_eq!(result.missing_fields().len(), 5);
        }
    }
}
