use sky_core::ProvisionError;

/// Accepted entity names and the detect API name each maps to.
pub(crate) const ENTITY_ALIASES: [(&str, &str); 14] = [
    ("SSN", "ssn"),
    ("CREDIT_CARD", "credit_card"),
    ("CREDIT_CARD_NUMBER", "credit_card"),
    ("EMAIL", "email_address"),
    ("EMAIL_ADDRESS", "email_address"),
    ("PHONE_NUMBER", "phone_number"),
    ("PHONE", "phone_number"),
    ("NAME", "name"),
    ("DOB", "dob"),
    ("DATE_OF_BIRTH", "dob"),
    ("ACCOUNT_NUMBER", "account_number"),
    ("DRIVER_LICENSE", "driver_license"),
    ("PASSPORT_NUMBER", "passport_number"),
    ("PASSPORT", "passport_number"),
];

pub(crate) const DEFAULT_ENTITIES: [&str; 6] = [
    "ssn",
    "credit_card",
    "email_address",
    "phone_number",
    "name",
    "dob",
];

pub(crate) fn available_entities() -> String {
    ENTITY_ALIASES
        .iter()
        .map(|(alias, _)| *alias)
        .collect::<Vec<_>>()
        .join(", ")
}

pub(crate) fn resolve_entity(name: &str) -> Result<&'static str, ProvisionError> {
    let upper = name.trim().to_uppercase();
    ENTITY_ALIASES
        .iter()
        .find(|(alias, _)| *alias == upper)
        .map(|(_, api_name)| *api_name)
        .ok_or_else(|| {
            ProvisionError::local(format!(
                "unknown entity type: {upper}\nAvailable entities: {}",
                available_entities()
            ))
        })
}

/// Parses a comma-separated entity list. `None` or a blank list stays `None`.
pub(crate) fn parse_entity_list(
    list: Option<&str>,
) -> Result<Option<Vec<&'static str>>, ProvisionError> {
    let Some(list) = list.map(str::trim).filter(|list| !list.is_empty()) else {
        return Ok(None);
    };
    let mut resolved = Vec::new();
    for name in list.split(',').filter(|name| !name.trim().is_empty()) {
        let entity = resolve_entity(name)?;
        if !resolved.contains(&entity) {
            resolved.push(entity);
        }
    }
    Ok(Some(resolved))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn aliases_resolve_case_insensitively() {
        assert_eq!(resolve_entity("email").expect("email"), "email_address");
        assert_eq!(resolve_entity(" Date_Of_Birth ").expect("dob"), "dob");
        assert_eq!(resolve_entity("passport").expect("passport"), "passport_number");
    }

    #[test]
    fn unknown_entity_lists_available_names() {
        let err = resolve_entity("iban").expect_err("unknown");
        let message = err.to_string();
        assert!(message.contains("unknown entity type: IBAN"));
        assert!(message.contains("CREDIT_CARD_NUMBER"));
        assert!(err.is_local());
    }

    #[test]
    fn entity_lists_dedupe_and_skip_blanks() {
        let parsed = parse_entity_list(Some("ssn, SSN,,email,email_address"))
            .expect("parse")
            .expect("some");
        assert_eq!(parsed, vec!["ssn", "email_address"]);
        assert_eq!(parse_entity_list(Some("  ")).expect("blank"), None);
        assert_eq!(parse_entity_list(None).expect("none"), None);
    }
}
