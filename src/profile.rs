use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use url::Url;

use crate::id::{OwnerId, ProfileId};
use crate::{ProfileError, Result};

/// Closed set of profile kinds a code can dispatch to.
#[derive(Eq, PartialEq, Hash, Clone, Copy, Debug, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProfileType {
    Website,
    Email,
    Phone,
    Whatsapp,
    Brochure,
    Vcard,
}

impl ProfileType {
    pub const ALL: [ProfileType; 6] = [
        ProfileType::Website,
        ProfileType::Email,
        ProfileType::Phone,
        ProfileType::Whatsapp,
        ProfileType::Brochure,
        ProfileType::Vcard,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ProfileType::Website => "website",
            ProfileType::Email => "email",
            ProfileType::Phone => "phone",
            ProfileType::Whatsapp => "whatsapp",
            ProfileType::Brochure => "brochure",
            ProfileType::Vcard => "vcard",
        }
    }
}

impl fmt::Display for ProfileType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ProfileType {
    type Err = ProfileError;

    fn from_str(s: &str) -> Result<Self> {
        ProfileType::ALL
            .into_iter()
            .find(|kind| kind.as_str() == s.trim())
            .ok_or_else(|| {
                ProfileError::validation(format!(
                    "unknown profile type '{}'",
                    s
                ))
            })
    }
}

#[derive(Eq, PartialEq, Clone, Debug, Default, Serialize, Deserialize)]
pub struct WebsitePayload {
    pub url: String,
}

#[derive(Eq, PartialEq, Clone, Debug, Default, Serialize, Deserialize)]
pub struct EmailPayload {
    pub address: String,
}

#[derive(Eq, PartialEq, Clone, Debug, Default, Serialize, Deserialize)]
pub struct PhonePayload {
    pub number: String,
}

#[derive(Eq, PartialEq, Clone, Debug, Default, Serialize, Deserialize)]
pub struct WhatsappPayload {
    pub number: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

#[derive(Eq, PartialEq, Clone, Debug, Default, Serialize, Deserialize)]
pub struct BrochurePayload {
    pub title: String,
    pub url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

#[derive(Eq, PartialEq, Clone, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VcardPayload {
    pub full_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub company_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mobile_number: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub company_number: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub website: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub linkedin: Option<String>,
}

/// Type-specific data of a profile. The variant is the profile's type.
#[derive(Eq, PartialEq, Clone, Debug, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Payload {
    Website(WebsitePayload),
    Email(EmailPayload),
    Phone(PhonePayload),
    Whatsapp(WhatsappPayload),
    Brochure(BrochurePayload),
    Vcard(VcardPayload),
}

impl Payload {
    pub fn kind(&self) -> ProfileType {
        match self {
            Payload::Website(_) => ProfileType::Website,
            Payload::Email(_) => ProfileType::Email,
            Payload::Phone(_) => ProfileType::Phone,
            Payload::Whatsapp(_) => ProfileType::Whatsapp,
            Payload::Brochure(_) => ProfileType::Brochure,
            Payload::Vcard(_) => ProfileType::Vcard,
        }
    }

    /// Build a payload from flat form fields.
    ///
    /// Keys are the column names of the legacy single-table layout
    /// (`website_url`, `vcard_full_name`, ...). Only the keys of the
    /// requested type are read; anything else is dropped. Blank values
    /// count as absent.
    pub fn from_fields(
        kind: ProfileType,
        fields: &BTreeMap<String, String>,
    ) -> Payload {
        let optional = |key: &str| {
            fields
                .get(key)
                .map(|value| value.trim())
                .filter(|value| !value.is_empty())
                .map(str::to_owned)
        };
        let required = |key: &str| optional(key).unwrap_or_default();

        match kind {
            ProfileType::Website => Payload::Website(WebsitePayload {
                url: required("website_url"),
            }),
            ProfileType::Email => Payload::Email(EmailPayload {
                address: required("email_address"),
            }),
            ProfileType::Phone => Payload::Phone(PhonePayload {
                number: required("phone_number"),
            }),
            ProfileType::Whatsapp => Payload::Whatsapp(WhatsappPayload {
                number: required("whatsapp_number"),
                message: optional("whatsapp_message"),
            }),
            ProfileType::Brochure => Payload::Brochure(BrochurePayload {
                title: required("brochure_title"),
                url: required("brochure_url"),
                description: optional("brochure_description"),
            }),
            ProfileType::Vcard => Payload::Vcard(VcardPayload {
                full_name: required("vcard_full_name"),
                title: optional("vcard_title"),
                company_name: optional("vcard_company_name"),
                mobile_number: optional("vcard_mobile_number"),
                company_number: optional("vcard_company_number"),
                email: optional("vcard_email"),
                website: optional("vcard_website"),
                address: optional("vcard_address"),
                linkedin: optional("vcard_linkedin"),
            }),
        }
    }

    /// Check the fields a profile of this type cannot exist without.
    pub fn validate(&self) -> Result<()> {
        match self {
            Payload::Website(website) => {
                require_url("website url", &website.url)
            }
            Payload::Email(email) => require("email address", &email.address),
            Payload::Phone(phone) => require("phone number", &phone.number),
            Payload::Whatsapp(whatsapp) => {
                require("whatsapp number", &whatsapp.number)
            }
            Payload::Brochure(brochure) => {
                require("brochure title", &brochure.title)?;
                require_url("brochure url", &brochure.url)
            }
            Payload::Vcard(vcard) => require("full name", &vcard.full_name),
        }
    }

    /// One-line description shown next to the profile name in listings.
    pub fn summary(&self) -> String {
        match self {
            Payload::Website(website) => website.url.clone(),
            Payload::Email(email) => email.address.clone(),
            Payload::Phone(phone) => phone.number.clone(),
            Payload::Whatsapp(whatsapp) => match &whatsapp.message {
                Some(message) => format!("{} - {}", whatsapp.number, message),
                None => whatsapp.number.clone(),
            },
            Payload::Brochure(brochure) => brochure.title.clone(),
            Payload::Vcard(vcard) => match &vcard.company_name {
                Some(company) => format!("{} - {}", vcard.full_name, company),
                None => vcard.full_name.clone(),
            },
        }
    }
}

fn require(field: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(ProfileError::validation(format!(
            "{} is required",
            field
        )));
    }
    Ok(())
}

fn require_url(field: &str, value: &str) -> Result<()> {
    require(field, value)?;
    Url::parse(value.trim()).map_err(|e| {
        ProfileError::validation(format!("{} is not a valid URL: {}", field, e))
    })?;
    Ok(())
}

/// One configuration variant owned by an account.
#[derive(Eq, PartialEq, Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Profile {
    pub id: ProfileId,
    pub owner_id: OwnerId,
    pub name: String,
    pub active: bool,
    pub payload: Payload,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Profile {
    pub fn kind(&self) -> ProfileType {
        self.payload.kind()
    }

    pub fn summary(&self) -> String {
        self.payload.summary()
    }
}

/// Partial update of a stored profile. `None` leaves a field untouched.
#[derive(Clone, Debug, Default)]
pub struct ProfileChanges {
    pub name: Option<String>,
    pub active: Option<bool>,
    pub payload: Option<Payload>,
}

impl ProfileChanges {
    pub fn active(active: bool) -> Self {
        Self {
            active: Some(active),
            ..Default::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.active.is_none() && self.payload.is_none()
    }

    /// Apply the changes to `profile` and stamp `updated_at`.
    ///
    /// A payload of another type is refused: the type of a profile is
    /// fixed when it is created.
    pub fn apply_to(
        &self,
        profile: &mut Profile,
        now: DateTime<Utc>,
    ) -> Result<()> {
        if let Some(payload) = &self.payload {
            if payload.kind() != profile.kind() {
                return Err(ProfileError::validation(format!(
                    "cannot change profile type from {} to {}",
                    profile.kind(),
                    payload.kind()
                )));
            }
        }

        if let Some(name) = &self.name {
            profile.name = name.clone();
        }
        if let Some(active) = self.active {
            profile.active = active;
        }
        if let Some(payload) = &self.payload {
            profile.payload = payload.clone();
        }
        profile.updated_at = now;
        Ok(())
    }
}
