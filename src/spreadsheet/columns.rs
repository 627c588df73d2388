//! Header-to-field matching for imported sheets.
//!
//! Headers are normalised to lowercase alphanumerics, then matched in three
//! passes over all fields: exact alias, substring containment, and
//! Jaro-Winkler similarity of at least 0.85. Each column is claimed once.

use std::collections::HashMap;

use crate::entity::EntityKind;

const FUZZY_THRESHOLD: f64 = 0.85;
/// Shorter strings are too ambiguous for substring matching.
const MIN_SUBSTRING_LEN: usize = 3;

/// A form field and the header spellings that map onto it.
#[derive(Debug, Clone, Copy)]
pub struct FieldSpec {
    /// camelCase form field name.
    pub field: &'static str,
    pub aliases: &'static [&'static str],
}

const fn spec(field: &'static str, aliases: &'static [&'static str]) -> FieldSpec {
    FieldSpec { field, aliases }
}

pub const ACCOUNT_FIELDS: &[FieldSpec] = &[
    spec("name", &["name", "accountname"]),
    spec("accountType", &["accounttype", "type"]),
    spec("balance", &["balance", "amount", "currentbalance"]),
    spec("clientId", &["clientid", "client"]),
    spec("status", &["status"]),
    spec("openedOn", &["openedon", "opened", "opendate", "dateopened"]),
    spec("notes", &["notes", "note", "comments"]),
];

pub const CLIENT_FIELDS: &[FieldSpec] = &[
    spec("name", &["name", "clientname", "fullname"]),
    spec("email", &["email", "emailaddress", "mail"]),
    spec("phone", &["phone", "phonenumber", "telephone", "mobile"]),
    spec("company", &["company", "organization", "organisation", "business"]),
    spec("address", &["address", "streetaddress", "location"]),
    spec("accountId", &["accountid", "account"]),
    spec("status", &["status"]),
];

pub const EMPLOYEE_FIELDS: &[FieldSpec] = &[
    spec("name", &["name", "employeename", "fullname"]),
    spec("email", &["email", "emailaddress", "workemail"]),
    spec("phone", &["phone", "phonenumber", "mobile"]),
    spec("position", &["position", "title", "jobtitle", "role"]),
    spec("department", &["department", "dept"]),
    spec("salary", &["salary", "pay", "compensation"]),
    spec("teamId", &["teamid", "team"]),
    spec("hireDate", &["hiredate", "startdate", "hired"]),
    spec("salesQuota", &["salesquota", "quota"]),
    spec("status", &["status"]),
];

/// Importable fields for `kind`, if the kind can be imported at all.
pub fn import_fields(kind: EntityKind) -> Option<&'static [FieldSpec]> {
    match kind {
        EntityKind::Account => Some(ACCOUNT_FIELDS),
        EntityKind::Client => Some(CLIENT_FIELDS),
        EntityKind::Employee => Some(EMPLOYEE_FIELDS),
        _ => None,
    }
}

pub fn normalize_header(header: &str) -> String {
    header
        .chars()
        .filter(|c| c.is_alphanumeric())
        .flat_map(char::to_lowercase)
        .collect()
}

fn substring_match(header: &str, alias: &str) -> bool {
    let (short, long) = if header.len() <= alias.len() {
        (header, alias)
    } else {
        (alias, header)
    };
    short.len() >= MIN_SUBSTRING_LEN && long.contains(short)
}

/// Map each field to the index of the column that feeds it.
pub fn map_columns(headers: &[String], fields: &[FieldSpec]) -> HashMap<&'static str, usize> {
    let normalized: Vec<String> = headers.iter().map(|h| normalize_header(h)).collect();
    let mut claimed = vec![false; headers.len()];
    let mut mapping: HashMap<&'static str, usize> = HashMap::new();

    // exact
    for f in fields {
        if let Some(i) = (0..normalized.len())
            .find(|&i| !claimed[i] && f.aliases.iter().any(|a| normalized[i] == *a))
        {
            claimed[i] = true;
            mapping.insert(f.field, i);
        }
    }

    // substring
    for f in fields {
        if mapping.contains_key(f.field) {
            continue;
        }
        if let Some(i) = (0..normalized.len()).find(|&i| {
            !claimed[i] && f.aliases.iter().any(|a| substring_match(&normalized[i], a))
        }) {
            claimed[i] = true;
            mapping.insert(f.field, i);
        }
    }

    // fuzzy: best-scoring unclaimed column per field
    for f in fields {
        if mapping.contains_key(f.field) {
            continue;
        }
        let best = (0..normalized.len())
            .filter(|&i| !claimed[i] && !normalized[i].is_empty())
            .filter_map(|i| {
                let score = f
                    .aliases
                    .iter()
                    .map(|a| strsim::jaro_winkler(&normalized[i], a))
                    .fold(0.0, f64::max);
                (score >= FUZZY_THRESHOLD).then_some((i, score))
            })
            .max_by(|a, b| a.1.total_cmp(&b.1));
        if let Some((i, score)) = best {
            log::debug!(
                "Fuzzy-matched column '{}' to {} ({:.2})",
                headers[i],
                f.field,
                score
            );
            claimed[i] = true;
            mapping.insert(f.field, i);
        }
    }

    mapping
}

/// Headers that no field claimed.
pub fn unmapped_headers(headers: &[String], mapping: &HashMap<&'static str, usize>) -> Vec<String> {
    headers
        .iter()
        .enumerate()
        .filter(|(i, h)| !h.trim().is_empty() && !mapping.values().any(|m| m == i))
        .map(|(_, h)| h.clone())
        .collect()
}
