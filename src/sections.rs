//! Section builders – one function per logical block of the prescription.
//!
//! Each builder reads a slice of the record and returns `None` when the
//! backing data is absent or empty, so the assembler can simply skip it.

use crate::model::{Findings, Letterhead, Medication, PatientSummary};
use crate::node::LayoutNode;
use crate::style::{StyleRole, VerticalAlign};
use crate::table::{self, Cell, Table, LABEL_COLUMNS};

/// Column ratios of the letterhead: doctor block, gap, chamber block.
const LETTERHEAD_COLUMNS: [f32; 3] = [45.0, 20.0, 35.0];

// ---------------------------------------------------------------------------
// Letterhead
// ---------------------------------------------------------------------------

/// Contact lines of the chamber block, in print order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContactLine {
    Phone,
    Fax,
    Mobile,
    Email,
    Website,
    Timings,
}

impl ContactLine {
    pub const ALL: [ContactLine; 6] = [
        ContactLine::Phone,
        ContactLine::Fax,
        ContactLine::Mobile,
        ContactLine::Email,
        ContactLine::Website,
        ContactLine::Timings,
    ];

    pub fn label(self) -> &'static str {
        match self {
            ContactLine::Phone => "Phone",
            ContactLine::Fax => "Fax",
            ContactLine::Mobile => "Mobile",
            ContactLine::Email => "E - mail",
            ContactLine::Website => "Website",
            ContactLine::Timings => "Day & Time",
        }
    }

    pub fn value(self, letterhead: &Letterhead) -> Option<&str> {
        match self {
            ContactLine::Phone => letterhead.phone.as_deref(),
            ContactLine::Fax => letterhead.fax.as_deref(),
            ContactLine::Mobile => letterhead.mobile.as_deref(),
            ContactLine::Email => letterhead.email.as_deref(),
            ContactLine::Website => letterhead.website.as_deref(),
            ContactLine::Timings => letterhead.timings.as_deref(),
        }
    }

    /// Fax, e-mail and website are dropped when blank; the other lines
    /// always print, with an empty value if need be.
    pub fn suppressed_when_blank(self) -> bool {
        matches!(
            self,
            ContactLine::Fax | ContactLine::Email | ContactLine::Website
        )
    }

    pub fn is_shown(self, letterhead: &Letterhead) -> bool {
        !self.suppressed_when_blank() || !is_blank(self.value(letterhead))
    }

    fn render(self, letterhead: &Letterhead) -> String {
        format!("{} : {}", self.label(), self.value(letterhead).unwrap_or(""))
    }
}

fn is_blank(value: Option<&str>) -> bool {
    value.map_or(true, |v| v.trim().is_empty())
}

fn or_blank(value: Option<&str>) -> String {
    value.unwrap_or("").to_string()
}

/// Doctor and chamber header. `date` is printed under the chamber details.
pub fn letterhead(letterhead: Option<&Letterhead>, date: Option<&str>) -> Option<LayoutNode> {
    let lh = letterhead?;

    let doctor = LayoutNode::group(vec![
        LayoutNode::text(or_blank(lh.doctor_name.as_deref()), StyleRole::DoctorName),
        LayoutNode::text(or_blank(lh.degree.as_deref()), StyleRole::SectionHeader),
        LayoutNode::text(or_blank(lh.specialization.as_deref()), StyleRole::SectionHeader),
    ]);

    let mut chamber = vec![
        LayoutNode::text(lh.chamber_name.to_uppercase(), StyleRole::SectionHeader),
        LayoutNode::text(or_blank(lh.address_line1.as_deref()), StyleRole::Body),
        LayoutNode::text(or_blank(lh.address_line2.as_deref()), StyleRole::Body),
        LayoutNode::text(or_blank(lh.address_line3.as_deref()), StyleRole::Body),
    ];
    chamber.extend(
        ContactLine::ALL
            .iter()
            .filter(|line| line.is_shown(lh))
            .map(|line| LayoutNode::text(line.render(lh), StyleRole::Body)),
    );
    chamber.push(LayoutNode::text("", StyleRole::Body));
    chamber.push(LayoutNode::text(
        format!("PrescriptionDate : {}", date.unwrap_or("")),
        StyleRole::TableHeader,
    ));

    let mut header = Table::new(&LETTERHEAD_COLUMNS);
    header.push(Cell::new(vec![doctor]).v_align(VerticalAlign::Top));
    header.push(Cell::empty());
    header.push(Cell::new(vec![LayoutNode::group(chamber)]).v_align(VerticalAlign::Top));
    Some(LayoutNode::Table(header))
}

// ---------------------------------------------------------------------------
// Patient summary
// ---------------------------------------------------------------------------

/// Always present: the record requires a patient.
pub fn patient_summary(patient: &PatientSummary) -> Option<LayoutNode> {
    let values = vec![
        patient.name.clone(),
        or_blank(patient.age.as_deref()),
        or_blank(patient.blood_group.as_deref()),
        or_blank(patient.parity.as_deref()),
    ];
    let details = table::header_rows_table(
        &["NAME", "AGE", "BLOOD GROUP", "PARITY"],
        &[values],
        &[1.0; 4],
    );
    Some(LayoutNode::group(vec![
        LayoutNode::Table(table::band("PATIENT DETAILS")),
        LayoutNode::Table(details),
    ]))
}

// ---------------------------------------------------------------------------
// Findings
// ---------------------------------------------------------------------------

/// Findings sub-sections in print order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FindingKind {
    ChiefComplaints,
    PersonalHistory,
    FamilyHistory,
    Examinations,
    AdditionalFindings,
}

impl FindingKind {
    pub const ALL: [FindingKind; 5] = [
        FindingKind::ChiefComplaints,
        FindingKind::PersonalHistory,
        FindingKind::FamilyHistory,
        FindingKind::Examinations,
        FindingKind::AdditionalFindings,
    ];

    pub fn label(self) -> &'static str {
        match self {
            FindingKind::ChiefComplaints => "CHIEF COMPLAINTS",
            FindingKind::PersonalHistory => "PERSONAL HISTORY",
            FindingKind::FamilyHistory => "FAMILY HISTORY",
            FindingKind::Examinations => "EXAMINATIONS",
            FindingKind::AdditionalFindings => "ADDITIONAL FINDINGS",
        }
    }

    pub fn entries(self, findings: &Findings) -> &[String] {
        match self {
            FindingKind::ChiefComplaints => &findings.chief_complaints,
            FindingKind::PersonalHistory => &findings.personal_history,
            FindingKind::FamilyHistory => &findings.family_history,
            FindingKind::Examinations => &findings.examinations,
            FindingKind::AdditionalFindings => &findings.additional_findings,
        }
    }
}

/// One label-span table, or `None` for an empty sequence.
pub fn labelled_rows(label: &str, rows: &[String]) -> Option<LayoutNode> {
    if rows.is_empty() {
        return None;
    }
    Some(LayoutNode::Table(table::label_span_table(
        label,
        rows,
        &LABEL_COLUMNS,
    )))
}

pub fn finding(kind: FindingKind, findings: &Findings) -> Option<LayoutNode> {
    labelled_rows(kind.label(), kind.entries(findings))
}

/// The `INVESTIGATIONS` block with every non-empty sub-section.
pub fn findings(findings: Option<&Findings>) -> Option<LayoutNode> {
    let findings = findings?;
    let parts: Vec<LayoutNode> = FindingKind::ALL
        .iter()
        .filter_map(|kind| finding(*kind, findings))
        .collect();
    if parts.is_empty() {
        return None;
    }
    Some(titled_block("INVESTIGATIONS", parts, true))
}

// ---------------------------------------------------------------------------
// Medication, tests, notes
// ---------------------------------------------------------------------------

pub fn medication(medications: &[Medication]) -> Option<LayoutNode> {
    if medications.is_empty() {
        return None;
    }
    let rows: Vec<Vec<String>> = medications
        .iter()
        .map(|m| {
            vec![
                m.trade_name.clone(),
                m.composition_text(),
                or_blank(m.dosage.as_deref()),
            ]
        })
        .collect();
    let table = table::header_rows_table(
        &["TRADE NAME", "COMPOSITION", "DOSAGE"],
        &rows,
        &[1.0; 3],
    );
    Some(titled_block(
        "MEDICATION",
        vec![LayoutNode::Table(table)],
        true,
    ))
}

pub fn tests_prescribed(tests: &[String]) -> Option<LayoutNode> {
    if tests.is_empty() {
        return None;
    }
    Some(titled_block(
        "TESTS PRESCRIBED",
        vec![LayoutNode::Table(table::list_table(tests))],
        false,
    ))
}

pub fn follow_up(notes: &[String]) -> Option<LayoutNode> {
    labelled_rows("FOLLOW UP", notes)
}

pub fn patient_response(notes: &[String]) -> Option<LayoutNode> {
    labelled_rows("PATIENT RESPONSE", notes)
}

/// The `MISCELLANEOUS` block holding follow-up and patient response.
pub fn miscellaneous(follow_up_notes: &[String], responses: &[String]) -> Option<LayoutNode> {
    let parts: Vec<LayoutNode> = [follow_up(follow_up_notes), patient_response(responses)]
        .into_iter()
        .flatten()
        .collect();
    if parts.is_empty() {
        return None;
    }
    Some(titled_block("MISCELLANEOUS", parts, true))
}

fn titled_block(title: &str, parts: Vec<LayoutNode>, keep_together: bool) -> LayoutNode {
    let mut children = Vec::with_capacity(parts.len() + 1);
    children.push(LayoutNode::Table(table::band(title)));
    children.extend(parts);
    if keep_together {
        LayoutNode::keep_together(children)
    } else {
        LayoutNode::group(children)
    }
}
