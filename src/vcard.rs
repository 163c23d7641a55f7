//! vCard 3.0 text for `vcard` profiles.
//!
//! Every property line is written even when its value is empty, and values
//! are copied verbatim: `;`, `,` and newlines are not escaped.

use crate::profile::VcardPayload;

pub const MEDIA_TYPE: &str = "text/vcard";
pub const FALLBACK_FILE_STEM: &str = "contact";
const FILE_EXTENSION: &str = "vcf";
const LINE_SEPARATOR: &str = "\n";

/// Encoded card plus the file name it should be offered under.
#[derive(Eq, PartialEq, Clone, Debug)]
pub struct ContactCard {
    pub file_name: String,
    pub content: String,
}

impl ContactCard {
    pub fn from_payload(payload: &VcardPayload) -> Self {
        Self {
            file_name: file_name(payload),
            content: encode(payload),
        }
    }

    pub fn media_type(&self) -> &'static str {
        MEDIA_TYPE
    }
}

pub fn encode(payload: &VcardPayload) -> String {
    fn value(field: &Option<String>) -> &str {
        field.as_deref().unwrap_or_default()
    }

    [
        "BEGIN:VCARD".to_owned(),
        "VERSION:3.0".to_owned(),
        format!("FN:{}", payload.full_name),
        format!("TITLE:{}", value(&payload.title)),
        format!("ORG:{}", value(&payload.company_name)),
        format!("TEL;TYPE=CELL:{}", value(&payload.mobile_number)),
        format!("TEL;TYPE=WORK:{}", value(&payload.company_number)),
        format!("EMAIL:{}", value(&payload.email)),
        format!("URL:{}", value(&payload.website)),
        format!("ADR:;;{}", value(&payload.address)),
        format!("X-SOCIALPROFILE;TYPE=linkedin:{}", value(&payload.linkedin)),
        "END:VCARD".to_owned(),
    ]
    .join(LINE_SEPARATOR)
}

/// `<full name>.vcf`, or `contact.vcf` when the name is blank.
///
/// Path separators and control characters are dropped from the stem, so
/// the name never leaves the directory it is saved in.
pub fn file_name(payload: &VcardPayload) -> String {
    let stem: String = payload
        .full_name
        .chars()
        .filter(|c| !matches!(c, '/' | '\\') && !c.is_control())
        .collect();
    let stem = stem.trim().trim_start_matches('.').trim();
    let stem = if stem.is_empty() {
        FALLBACK_FILE_STEM
    } else {
        stem
    };
    format!("{}.{}", stem, FILE_EXTENSION)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sparse_card_keeps_every_line() {
        let payload = VcardPayload {
            full_name: "Jane Doe".to_owned(),
            email: Some("jane@x.com".to_owned()),
            ..Default::default()
        };
        let card = encode(&payload);
        let lines: Vec<&str> = card.split('\n').collect();

        assert_eq!(
            lines,
            vec![
                "BEGIN:VCARD",
                "VERSION:3.0",
                "FN:Jane Doe",
                "TITLE:",
                "ORG:",
                "TEL;TYPE=CELL:",
                "TEL;TYPE=WORK:",
                "EMAIL:jane@x.com",
                "URL:",
                "ADR:;;",
                "X-SOCIALPROFILE;TYPE=linkedin:",
                "END:VCARD",
            ]
        );
    }

    #[test]
    fn full_card() {
        let payload = VcardPayload {
            full_name: "Jane Doe".to_owned(),
            title: Some("CTO".to_owned()),
            company_name: Some("Acme".to_owned()),
            mobile_number: Some("+1 555 0100".to_owned()),
            company_number: Some("+1 555 0199".to_owned()),
            email: Some("jane@acme.com".to_owned()),
            website: Some("https://acme.com".to_owned()),
            address: Some("1 Main St, Springfield".to_owned()),
            linkedin: Some("https://linkedin.com/in/jane".to_owned()),
        };
        let card = encode(&payload);
        assert!(card.contains("\nORG:Acme\n"));
        assert!(card.contains("\nTEL;TYPE=WORK:+1 555 0199\n"));
        assert!(card.contains("\nADR:;;1 Main St, Springfield\n"));
        assert!(card.ends_with(concat!(
            "X-SOCIALPROFILE;TYPE=linkedin:https://linkedin.com/in/jane\n",
            "END:VCARD"
        )));
    }

    #[test]
    fn values_are_not_escaped() {
        let payload = VcardPayload {
            full_name: "Doe; Jane, Dr.".to_owned(),
            ..Default::default()
        };
        assert!(encode(&payload).contains("\nFN:Doe; Jane, Dr.\n"));
    }

    #[test]
    fn file_name_falls_back() {
        let named = VcardPayload {
            full_name: "Jane Doe".to_owned(),
            ..Default::default()
        };
        assert_eq!(file_name(&named), "Jane Doe.vcf");
        assert_eq!(file_name(&VcardPayload::default()), "contact.vcf");

        let card = ContactCard::from_payload(&named);
        assert_eq!(card.media_type(), "text/vcard");
        assert_eq!(card.content, encode(&named));
    }

    #[test]
    fn file_name_stays_in_its_directory() {
        let named = |full_name: &str| VcardPayload {
            full_name: full_name.to_owned(),
            ..Default::default()
        };
        assert_eq!(file_name(&named("../../tmp/owned")), "tmpowned.vcf");
        assert_eq!(file_name(&named("/etc/cron.d/x")), "etccron.dx.vcf");
        assert_eq!(file_name(&named("..\\win\\x")), "winx.vcf");
        assert_eq!(file_name(&named("Jane\nDoe")), "JaneDoe.vcf");
        assert_eq!(file_name(&named("/../")), "contact.vcf");

        let card = ContactCard::from_payload(&named("../../tmp/owned"));
        assert!(card.content.contains("\nFN:../../tmp/owned\n"));
    }
}
