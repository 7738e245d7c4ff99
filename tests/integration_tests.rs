//! Integration tests for the rx-forge pipeline.
//!
//! These tests validate:
//! - Record payloads parse and assemble in print order
//! - Layout config keeps boxes on the page and blocks together
//! - PDF output exists and has valid format, raw or base64
//! - Failures surface as a single stable error

use base64::{engine::general_purpose::STANDARD as BASE64_STD, Engine as _};
use sha2::{Digest, Sha256};

use rx_forge::assembler::{assemble, SectionKind};
use rx_forge::layout_config::{LayoutBox, LayoutConfig};
use rx_forge::model::{Findings, Letterhead, Medication, PatientSummary};
use rx_forge::pipeline::{compute_layout_config, generate, generate_pdf, GenerationConfig, PageSetup};
use rx_forge::render::render_pdf;
use rx_forge::sections;
use rx_forge::{output_file_name, GenerationFailure, OutputFormat, OutputPayload, PrescriptionRecord};

// =====================================================================
// Helper
// =====================================================================

fn default_config() -> GenerationConfig {
    GenerationConfig::default()
}

fn assert_valid_pdf(bytes: &[u8]) {
    assert!(bytes.len() > 100, "PDF too small: {} bytes", bytes.len());
    assert_eq!(&bytes[0..5], b"%PDF-", "Missing PDF header");
}

fn strings(prefix: &str, n: usize) -> Vec<String> {
    (1..=n).map(|i| format!("{prefix} {i}")).collect()
}

fn bare_record() -> PrescriptionRecord {
    PrescriptionRecord {
        id: "RX-0001".into(),
        patient: PatientSummary {
            name: "Amina Begum".into(),
            age: Some("34".into()),
            blood_group: Some("B+".into()),
            parity: Some("G2P1".into()),
            ..Default::default()
        },
        ..Default::default()
    }
}

fn full_record() -> PrescriptionRecord {
    PrescriptionRecord {
        date: Some("2024-03-18".into()),
        findings: Some(Findings {
            chief_complaints: vec!["Headache for 3 days".into()],
            examinations: vec!["BP 130/85".into(), "Pulse 78".into()],
            ..Default::default()
        }),
        medications: vec![
            Medication {
                trade_name: "Napa".into(),
                composition: vec!["Paracetamol".into()],
                dosage: Some("1+0+1".into()),
            },
            Medication {
                trade_name: "Ace Plus".into(),
                composition: vec!["Paracetamol".into(), "Caffeine".into()],
                dosage: Some("0+0+1".into()),
            },
        ],
        tests: vec!["CBC".into(), "Serum creatinine".into()],
        follow_up: vec!["Review after 7 days".into()],
        patient_response: vec!["Feeling better".into()],
        letterhead: Some(Letterhead {
            doctor_name: Some("Dr. Farhana Islam".into()),
            degree: Some("MBBS, FCPS".into()),
            specialization: Some("Medicine".into()),
            chamber_name: "City Care Clinic".into(),
            address_line1: Some("House 12, Road 4".into()),
            phone: Some("02-555-0101".into()),
            fax: Some("".into()),
            mobile: Some("01700-000000".into()),
            email: Some("clinic@example.com".into()),
            website: None,
            timings: Some("Sat-Thu 5pm-9pm".into()),
            ..Default::default()
        }),
        ..bare_record()
    }
}

fn visit_box(lbox: &LayoutBox, f: &mut dyn FnMut(&LayoutBox)) {
    f(lbox);
    for child in &lbox.children {
        visit_box(child, f);
    }
}

/// Every printed line, tagged with the page it landed on.
fn page_texts(config: &LayoutConfig) -> Vec<(usize, String)> {
    let mut out = Vec::new();
    for (index, page) in config.pages.iter().enumerate() {
        for lbox in &page.boxes {
            visit_box(lbox, &mut |b| {
                if let Some(text) = &b.text {
                    let joined: Vec<&str> = text.lines.iter().map(|l| l.text.as_str()).collect();
                    out.push((index, joined.join(" ")));
                }
            });
        }
    }
    out
}

fn all_texts(config: &LayoutConfig) -> Vec<String> {
    page_texts(config).into_iter().map(|(_, t)| t).collect()
}

// =====================================================================
// Record payload tests
// =====================================================================

#[test]
fn api_payload_generates_pdf() {
    let json = r#"{
        "prescriptionID": "RX-77",
        "prescriptionDate": "2024-01-02",
        "patientInfo": { "patientName": "Rahim", "age": 40, "bloodGroup": "O+" },
        "medications": [
            { "tradeName": "Seclo", "composition": ["Omeprazole"], "dosage": "1+0+1" }
        ],
        "tests": null
    }"#;
    let record = PrescriptionRecord::from_json(json).unwrap();
    assert_eq!(output_file_name(&record), "RX-77.pdf");

    let (bytes, layout) = generate_pdf(&record, &default_config()).unwrap();
    assert_valid_pdf(&bytes);
    assert_eq!(layout.title, "Prescription - RX-77");
    let texts = all_texts(&layout);
    assert!(texts.iter().any(|t| t == "40"));
    assert!(texts.iter().any(|t| t == "Omeprazole"));
}

// =====================================================================
// Assembly tests
// =====================================================================

#[test]
fn full_record_sections_in_print_order() {
    let doc = assemble(&full_record());
    assert_eq!(
        doc.sections,
        vec![
            SectionKind::Letterhead,
            SectionKind::PatientSummary,
            SectionKind::Findings,
            SectionKind::Medication,
            SectionKind::Tests,
            SectionKind::Miscellaneous,
        ]
    );
}

#[test]
fn bare_record_has_only_patient_details() {
    let record = bare_record();
    let (bytes, layout) = generate_pdf(&record, &default_config()).unwrap();
    assert_valid_pdf(&bytes);
    assert_eq!(layout.pages.len(), 1);

    let texts = all_texts(&layout);
    assert!(texts.iter().any(|t| t == "PATIENT DETAILS"));
    for absent in ["INVESTIGATIONS", "MEDICATION", "TESTS PRESCRIBED", "MISCELLANEOUS"] {
        assert!(!texts.iter().any(|t| t == absent), "unexpected {absent}");
    }
    assert!(!texts.iter().any(|t| t.starts_with("PrescriptionDate")));
}

#[test]
fn all_empty_findings_are_omitted() {
    let record = PrescriptionRecord {
        findings: Some(Findings::default()),
        ..bare_record()
    };
    let layout = compute_layout_config(&record, &default_config()).unwrap();
    assert!(!all_texts(&layout).iter().any(|t| t == "INVESTIGATIONS"));
}

// =====================================================================
// Table placement tests
// =====================================================================

#[test]
fn label_span_covers_all_rows() {
    for n in [1usize, 3, 9] {
        let node = sections::follow_up(&strings("note", n)).unwrap();
        let tables = node.tables();
        let placements = tables[0].placements();
        assert_eq!(placements[0].row_span, n);
        assert_eq!(placements.len(), n + 1);
        assert_eq!(tables[0].row_count(), n);
    }
}

#[test]
fn patient_table_is_two_rows_of_four() {
    let node = sections::patient_summary(&bare_record().patient).unwrap();
    let table = node
        .tables()
        .into_iter()
        .find(|t| t.columns() == 4)
        .expect("patient table");
    assert_eq!(table.row_count(), 2);
    assert_eq!(table.cells.len(), 8);
}

#[test]
fn composition_is_comma_joined_in_layout() {
    let layout = compute_layout_config(&full_record(), &default_config()).unwrap();
    let texts = all_texts(&layout);
    assert!(texts.iter().any(|t| t == "Paracetamol, Caffeine"));
    assert!(texts.iter().any(|t| t == "Paracetamol"));
}

// =====================================================================
// Letterhead tests
// =====================================================================

#[test]
fn letterhead_suppresses_blank_optional_contacts() {
    let layout = compute_layout_config(&full_record(), &default_config()).unwrap();
    let texts = all_texts(&layout);

    assert!(texts.iter().any(|t| t == "E - mail : clinic@example.com"));
    assert!(texts.iter().any(|t| t == "Phone : 02-555-0101"));
    assert!(texts.iter().any(|t| t == "Mobile : 01700-000000"));
    assert!(texts.iter().any(|t| t == "Day & Time : Sat-Thu 5pm-9pm"));
    assert!(!texts.iter().any(|t| t.starts_with("Fax")));
    assert!(!texts.iter().any(|t| t.starts_with("Website")));
    assert!(texts.iter().any(|t| t == "CITY CARE CLINIC"));
    assert!(texts.iter().any(|t| t == "PrescriptionDate : 2024-03-18"));
}

// =====================================================================
// Layout / pagination tests
// =====================================================================

#[test]
fn layout_positions_are_within_page() {
    let layout = compute_layout_config(&full_record(), &default_config()).unwrap();
    let page = PageSetup::default();
    layout.visit_boxes(&mut |b| {
        assert!(b.x >= page.margin - 0.5, "box x {} left of margin", b.x);
        assert!(
            b.x + b.width <= page.width - page.margin + 0.5,
            "box right edge {} past margin",
            b.x + b.width
        );
        assert!(b.y >= 0.0 && b.y <= page.height);
    });
}

#[test]
fn keep_together_block_does_not_straddle_pages() {
    let record = PrescriptionRecord {
        findings: Some(Findings {
            examinations: strings("exam", 30),
            ..Default::default()
        }),
        medications: (1..=20)
            .map(|i| Medication {
                trade_name: format!("drug {i}"),
                composition: vec![format!("ingredient {i}")],
                dosage: Some("1+0+1".into()),
            })
            .collect(),
        ..bare_record()
    };
    let layout = compute_layout_config(&record, &default_config()).unwrap();
    assert!(layout.pages.len() >= 2);

    let texts = page_texts(&layout);
    let page_of = |needle: &str| {
        texts
            .iter()
            .find(|(_, t)| t == needle)
            .map(|(p, _)| *p)
            .unwrap_or_else(|| panic!("missing {needle}"))
    };
    let band_page = page_of("MEDICATION");
    for i in 1..=20 {
        assert_eq!(page_of(&format!("drug {i}")), band_page);
    }
    let exam_page = page_of("INVESTIGATIONS");
    assert_eq!(page_of("exam 30"), exam_page);
}

#[test]
fn long_test_list_flows_onto_next_page() {
    let record = PrescriptionRecord {
        tests: strings("test", 70),
        ..bare_record()
    };
    let layout = compute_layout_config(&record, &default_config()).unwrap();
    assert_eq!(layout.pages.len(), 2);

    let texts = page_texts(&layout);
    // The block itself is allowed to split, so it starts on page one.
    assert!(texts.iter().any(|(p, t)| *p == 0 && t == "TESTS PRESCRIBED"));
    assert!(texts.iter().any(|(p, t)| *p == 1 && t == "test 70"));
}

#[test]
fn layout_config_json_roundtrip() {
    let layout = compute_layout_config(&full_record(), &default_config()).unwrap();
    let parsed = LayoutConfig::from_json(&layout.to_json()).unwrap();
    assert_eq!(parsed, layout);
}

#[test]
fn render_from_layout_config_json() {
    let layout = compute_layout_config(&full_record(), &default_config()).unwrap();
    let parsed = LayoutConfig::from_json(&layout.to_json()).unwrap();
    let bytes = render_pdf(&parsed).unwrap();
    assert_valid_pdf(&bytes);
}

// =====================================================================
// Output tests
// =====================================================================

#[test]
fn text_safe_payload_decodes_to_binary() {
    let record = full_record();
    let binary = generate(&record, &default_config()).unwrap();
    let text = generate(
        &record,
        &GenerationConfig {
            format: OutputFormat::TextSafe,
            ..default_config()
        },
    )
    .unwrap();

    let OutputPayload::Binary(bytes) = binary else {
        panic!("expected binary payload");
    };
    let OutputPayload::TextSafe(encoded) = text else {
        panic!("expected text payload");
    };
    assert_valid_pdf(&bytes);
    let decoded = BASE64_STD.decode(encoded).unwrap();
    assert_valid_pdf(&decoded);
    assert_eq!(decoded, bytes);
}

#[test]
fn concurrent_generation_is_deterministic() {
    let record = full_record();
    let config = default_config();

    let results: Vec<(Vec<u8>, LayoutConfig)> = std::thread::scope(|scope| {
        let handles: Vec<_> = (0..4)
            .map(|_| scope.spawn(|| generate_pdf(&record, &config).unwrap()))
            .collect();
        handles.into_iter().map(|h| h.join().unwrap()).collect()
    });

    let digest = |layout: &LayoutConfig| Sha256::digest(layout.to_json().as_bytes());
    let first = digest(&results[0].1);
    for (bytes, layout) in &results {
        assert_valid_pdf(bytes);
        assert_eq!(digest(layout), first);
        assert_eq!(bytes, &results[0].0);
    }
}

#[test]
fn invalid_page_geometry_fails_generation() {
    let config = GenerationConfig {
        page: PageSetup {
            width: 595.28,
            height: 50.0,
            margin: 36.0,
        },
        ..default_config()
    };
    let err = generate(&full_record(), &config).unwrap_err();
    assert_eq!(err, GenerationFailure::new());
    assert_eq!(
        err.to_string(),
        "An error occurred while generating prescription PDF"
    );
}

#[test]
fn input_record_is_not_modified() {
    let record = full_record();
    let before = record.clone();
    let _ = generate(&record, &default_config()).unwrap();
    assert_eq!(record, before);
}
