//! Derived summaries: the membership report and dashboard totals.

use serde::Serialize;

use crate::listview::{Column, FieldValue, ListRecord};
use crate::resources::{Group, Member, Membership, Staff};

/// One membership type and how many members hold it
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MembershipReportRow {
    /// Serial number in report order, starting at 1
    pub sr_no: usize,
    pub id: String,
    pub name: String,
    pub total_member: usize,
}

static REPORT_COLUMNS: &[Column<MembershipReportRow>] = &[
    Column { key: "srNo", label: "Sr.No", get: |r| FieldValue::number(r.sr_no as f64) },
    Column { key: "name", label: "Membership Name", get: |r| FieldValue::text(&r.name) },
    Column { key: "totalMember", label: "Total Member", get: |r| FieldValue::number(r.total_member as f64) },
];

impl ListRecord for MembershipReportRow {
    fn columns() -> &'static [Column<Self>] {
        REPORT_COLUMNS
    }

    /// The report is searched by membership name only
    fn search_values(&self) -> Vec<FieldValue> {
        vec![FieldValue::text(&self.name)]
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct MembershipReport {
    pub rows: Vec<MembershipReportRow>,
}

impl MembershipReport {
    /// Count members per membership type by membership name (case-insensitive)
    pub fn build(memberships: &[Membership], members: &[Member]) -> Self {
        let rows = memberships
            .iter()
            .enumerate()
            .map(|(i, membership)| MembershipReportRow {
                sr_no: i + 1,
                id: membership.id.clone(),
                name: membership.name.clone(),
                total_member: members
                    .iter()
                    .filter(|m| {
                        m.membership_name
                            .as_deref()
                            .is_some_and(|n| n.trim().eq_ignore_ascii_case(membership.name.trim()))
                    })
                    .count(),
            })
            .collect();
        Self { rows }
    }

    pub fn total_members(&self) -> usize {
        self.rows.iter().map(|r| r.total_member).sum()
    }
}

/// Headline totals on the dashboard
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardStats {
    pub total_members: usize,
    pub total_staff: usize,
    pub total_groups: usize,
    pub total_memberships: usize,
}

impl DashboardStats {
    pub fn from_collections(
        members: &[Member],
        staff: &[Staff],
        groups: &[Group],
        memberships: &[Membership],
    ) -> Self {
        Self {
            total_members: members.len(),
            total_staff: staff.len(),
            total_groups: groups.len(),
            total_memberships: memberships.len(),
        }
    }
}
