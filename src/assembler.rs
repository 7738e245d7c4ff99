//! Document assembler – runs the section builders in their fixed order and
//! joins the present sections into a single vertical page flow.

use crate::model::PrescriptionRecord;
use crate::node::LayoutNode;
use crate::sections;

/// Blank space inserted between consecutive sections, in points.
pub const SEPARATOR_HEIGHT: f32 = 12.0;

/// Top-level blocks of the prescription, in print order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SectionKind {
    Letterhead,
    PatientSummary,
    Findings,
    Medication,
    Tests,
    Miscellaneous,
}

/// Assembled page flow, ready for layout.
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    /// Title embedded in the PDF metadata.
    pub title: String,
    /// Sections that made it into the flow, in order.
    pub sections: Vec<SectionKind>,
    /// Section nodes with separators between them.
    pub blocks: Vec<LayoutNode>,
}

/// Build every section of `record`, skipping the ones with no data.
pub fn build_sections(record: &PrescriptionRecord) -> Vec<(SectionKind, LayoutNode)> {
    let candidates = [
        (
            SectionKind::Letterhead,
            sections::letterhead(record.letterhead.as_ref(), record.date.as_deref()),
        ),
        (
            SectionKind::PatientSummary,
            sections::patient_summary(&record.patient),
        ),
        (
            SectionKind::Findings,
            sections::findings(record.findings.as_ref()),
        ),
        (
            SectionKind::Medication,
            sections::medication(&record.medications),
        ),
        (
            SectionKind::Tests,
            sections::tests_prescribed(&record.tests),
        ),
        (
            SectionKind::Miscellaneous,
            sections::miscellaneous(&record.follow_up, &record.patient_response),
        ),
    ];

    candidates
        .into_iter()
        .filter_map(|(kind, node)| node.map(|n| (kind, n)))
        .collect()
}

/// Assemble the page flow for `record`.
pub fn assemble(record: &PrescriptionRecord) -> Document {
    let built = build_sections(record);
    let mut sections = Vec::with_capacity(built.len());
    let mut blocks = Vec::with_capacity(built.len() * 2);

    for (kind, node) in built {
        if !blocks.is_empty() {
            blocks.push(LayoutNode::Spacer(SEPARATOR_HEIGHT));
        }
        sections.push(kind);
        blocks.push(node);
    }

    log::debug!("assembled sections {:?} for record '{}'", sections, record.id);

    Document {
        title: format!("Prescription - {}", record.id),
        sections,
        blocks,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Findings, Letterhead, Medication, PatientSummary};

    fn bare_record() -> PrescriptionRecord {
        PrescriptionRecord {
            id: "rx-1".into(),
            patient: PatientSummary {
                name: "John Doe".into(),
                ..Default::default()
            },
            ..Default::default()
        }
    }

    #[test]
    fn bare_record_has_only_patient_block() {
        let doc = assemble(&bare_record());
        assert_eq!(doc.sections, vec![SectionKind::PatientSummary]);
        assert_eq!(doc.blocks.len(), 1);
        assert_eq!(doc.title, "Prescription - rx-1");
    }

    #[test]
    fn sections_follow_fixed_order_with_separators() {
        let mut record = bare_record();
        record.patient_response = vec!["Better".into()];
        record.tests = vec!["CBC".into()];
        record.medications = vec![Medication {
            trade_name: "Napa".into(),
            ..Default::default()
        }];
        record.findings = Some(Findings {
            family_history: vec!["Diabetes".into()],
            ..Default::default()
        });
        record.letterhead = Some(Letterhead {
            chamber_name: "Clinic".into(),
            ..Default::default()
        });

        let doc = assemble(&record);
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
        // six sections, five separators, none trailing
        assert_eq!(doc.blocks.len(), 11);
        for (i, block) in doc.blocks.iter().enumerate() {
            assert_eq!(matches!(block, LayoutNode::Spacer(_)), i % 2 == 1);
        }
    }

    #[test]
    fn empty_findings_are_skipped() {
        let mut record = bare_record();
        record.findings = Some(Findings::default());
        let doc = assemble(&record);
        assert!(!doc.sections.contains(&SectionKind::Findings));
    }

    #[test]
    fn repeated_entries_are_kept() {
        let mut record = bare_record();
        record.follow_up = vec!["Review".into(), "Review".into()];
        let doc = assemble(&record);
        let misc = doc.blocks.last().unwrap();
        let count = misc.texts().iter().filter(|r| r.text == "Review").count();
        assert_eq!(count, 2);
    }

    #[test]
    fn assembling_leaves_record_untouched() {
        let mut record = bare_record();
        record.tests = vec!["CBC".into()];
        let before = record.clone();
        let _ = assemble(&record);
        assert_eq!(record, before);
    }
}
