//! Thin wrappers around `dtn_contact::persistence` plus a contact-plan
//! `verify` pass (duplicate ids, inverted time windows — spec.md §6).

use std::path::Path;

use dtn_contact::Contact;

use crate::OutputResult;

pub fn load(path: &Path) -> OutputResult<Vec<Contact>> {
    let contacts = if is_csv(path) {
        dtn_contact::load_contacts_csv(path)?
    } else {
        dtn_contact::load_contacts_json(path)?
    };
    Ok(contacts)
}

pub fn save(path: &Path, contacts: &[Contact]) -> OutputResult<()> {
    if is_csv(path) {
        dtn_contact::save_contacts_csv(path, contacts)?;
    } else {
        dtn_contact::save_contacts_json(path, contacts)?;
    }
    Ok(())
}

fn is_csv(path: &Path) -> bool {
    path.extension().and_then(|e| e.to_str()) == Some("csv")
}

/// One problem found while verifying a contact plan.
#[derive(Debug, Clone, PartialEq)]
pub enum VerifyIssue {
    DuplicateId(i64),
    InvertedWindow { contact_id: i64, start: u64, end: u64 },
}

impl std::fmt::Display for VerifyIssue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            VerifyIssue::DuplicateId(id) => write!(f, "duplicate contact id {id}"),
            VerifyIssue::InvertedWindow { contact_id, start, end } => {
                write!(f, "contact {contact_id} has inverted time window [{start}, {end}]")
            }
        }
    }
}

/// Check a loaded contact plan for duplicate ids and inverted windows.
/// Returns every issue found; an empty vec means the plan is well-formed.
pub fn verify(contacts: &[Contact]) -> Vec<VerifyIssue> {
    let mut issues = Vec::new();
    let mut seen = std::collections::HashSet::new();
    for contact in contacts {
        if !seen.insert(contact.id.0) {
            issues.push(VerifyIssue::DuplicateId(contact.id.0));
        }
        if contact.start_ts > contact.end_ts {
            issues.push(VerifyIssue::InvertedWindow {
                contact_id: contact.id.0,
                start: contact.start_ts.0,
                end: contact.end_ts.0,
            });
        }
    }
    issues
}

#[cfg(test)]
mod tests {
    use super::*;
    use dtn_core::{AgentId, ContactId, Tick};

    fn contact(id: i64, start: u64, end: u64) -> Contact {
        Contact::new(ContactId(id), AgentId::new("a"), AgentId::new("b"), Tick(start), Tick(end), 100, 0, 1.0)
    }

    #[test]
    fn clean_plan_has_no_issues() {
        let contacts = vec![contact(0, 0, 10), contact(1, 5, 15)];
        assert!(verify(&contacts).is_empty());
    }

    #[test]
    fn flags_duplicate_ids_and_inverted_windows() {
        let contacts = vec![contact(0, 0, 10), contact(0, 0, 10), contact(1, 10, 5)];
        let issues = verify(&contacts);
        assert!(issues.contains(&VerifyIssue::DuplicateId(0)));
        assert!(issues.contains(&VerifyIssue::InvertedWindow { contact_id: 1, start: 10, end: 5 }));
    }
}
