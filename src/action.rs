use crate::profile::{Payload, Profile};
use crate::vcard::ContactCard;

const WHATSAPP_CHAT_URL: &str = "https://wa.me/";

/// What scanning a profile leads to.
#[derive(Eq, PartialEq, Clone, Debug)]
pub enum Effect {
    /// Open a web page (website and brochure profiles).
    Navigate(String),
    /// `mailto:` URI.
    ComposeEmail(String),
    /// `tel:` URI.
    Call(String),
    /// Chat link with the number reduced to digits.
    OpenChat(String),
    /// Offer a contact card for download.
    Download(ContactCard),
    /// The field the action needs is empty; the button does nothing.
    Noop,
}

impl Effect {
    /// URI to hand to the platform, if the effect opens one.
    pub fn uri(&self) -> Option<&str> {
        match self {
            Effect::Navigate(uri)
            | Effect::ComposeEmail(uri)
            | Effect::Call(uri)
            | Effect::OpenChat(uri) => Some(uri),
            Effect::Download(_) | Effect::Noop => None,
        }
    }
}

/// Primary action of a profile: the button label and what it does.
#[derive(Eq, PartialEq, Clone, Debug)]
pub struct Action {
    pub label: &'static str,
    pub effect: Effect,
}

/// Receives the side effects of [`Action::execute`].
pub trait ActionHandler {
    fn open(&mut self, uri: &str);

    fn download(&mut self, card: &ContactCard);
}

impl Action {
    pub fn for_profile(profile: &Profile) -> Self {
        dispatch(&profile.payload)
    }

    /// Run the effect. A no-op effect never reaches the handler, and
    /// running the same action again repeats the same calls.
    pub fn execute(&self, handler: &mut impl ActionHandler) {
        match &self.effect {
            Effect::Noop => {
                log::debug!("'{}' has nothing to do", self.label);
            }
            Effect::Download(card) => handler.download(card),
            effect => {
                if let Some(uri) = effect.uri() {
                    handler.open(uri);
                }
            }
        }
    }
}

pub fn label(payload: &Payload) -> &'static str {
    match payload {
        Payload::Website(_) => "Visit Website",
        Payload::Email(_) => "Send Email",
        Payload::Phone(_) => "Call Now",
        Payload::Whatsapp(_) => "Chat on WhatsApp",
        Payload::Brochure(_) => "View Brochure",
        Payload::Vcard(_) => "Download Contact",
    }
}

pub fn dispatch(payload: &Payload) -> Action {
    let effect = match payload {
        Payload::Website(website) => {
            non_empty(&website.url).map(|url| Effect::Navigate(url.to_owned()))
        }
        Payload::Email(email) => non_empty(&email.address)
            .map(|address| Effect::ComposeEmail(format!("mailto:{}", address))),
        Payload::Phone(phone) => non_empty(&phone.number)
            .map(|number| Effect::Call(format!("tel:{}", number))),
        Payload::Whatsapp(whatsapp) => {
            non_empty(&whatsapp.number).map(|number| {
                Effect::OpenChat(chat_url(number, whatsapp.message.as_deref()))
            })
        }
        Payload::Brochure(brochure) => {
            non_empty(&brochure.url).map(|url| Effect::Navigate(url.to_owned()))
        }
        Payload::Vcard(vcard) => {
            Some(Effect::Download(ContactCard::from_payload(vcard)))
        }
    };

    Action {
        label: label(payload),
        effect: effect.unwrap_or(Effect::Noop),
    }
}

/// `https://wa.me/<digits>?text=<message>`; the message is percent-encoded
/// and left empty when absent.
pub fn chat_url(number: &str, message: Option<&str>) -> String {
    let digits: String = number
        .chars()
        .filter(|c| c.is_ascii_digit())
        .collect();
    let text = message
        .map(|message| urlencoding::encode(message).into_owned())
        .unwrap_or_default();
    format!("{}{}?text={}", WHATSAPP_CHAT_URL, digits, text)
}

fn non_empty(value: &str) -> Option<&str> {
    let value = value.trim();
    (!value.is_empty()).then_some(value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::profile::{
        BrochurePayload, EmailPayload, PhonePayload, VcardPayload,
        WebsitePayload, WhatsappPayload,
    };
    use rstest::rstest;

    #[derive(Default)]
    struct Recorder {
        opened: Vec<String>,
        downloaded: Vec<ContactCard>,
    }

    impl ActionHandler for Recorder {
        fn open(&mut self, uri: &str) {
            self.opened.push(uri.to_owned());
        }

        fn download(&mut self, card: &ContactCard) {
            self.downloaded.push(card.clone());
        }
    }

    #[test]
    fn whatsapp_strips_number_and_encodes_message() {
        let action = dispatch(&Payload::Whatsapp(WhatsappPayload {
            number: "+1 (234) 567-890".to_owned(),
            message: Some("Hi!".to_owned()),
        }));
        assert_eq!(action.label, "Chat on WhatsApp");
        assert_eq!(
            action.effect,
            Effect::OpenChat("https://wa.me/1234567890?text=Hi%21".to_owned())
        );
    }

    #[test]
    fn whatsapp_without_message() {
        assert_eq!(chat_url("+44 20", None), "https://wa.me/4420?text=");
        assert_eq!(
            chat_url("1", Some("see you at 5")),
            "https://wa.me/1?text=see%20you%20at%205"
        );
    }

    #[rstest]
    #[case(
        Payload::Website(WebsitePayload { url: "https://a.io".to_owned() }),
        "Visit Website",
        Effect::Navigate("https://a.io".to_owned())
    )]
    #[case(
        Payload::Email(EmailPayload { address: "a@b.com".to_owned() }),
        "Send Email",
        Effect::ComposeEmail("mailto:a@b.com".to_owned())
    )]
    #[case(
        Payload::Phone(PhonePayload { number: "+1 555".to_owned() }),
        "Call Now",
        Effect::Call("tel:+1 555".to_owned())
    )]
    #[case(
        Payload::Brochure(BrochurePayload {
            title: "Catalog".to_owned(),
            url: "https://a.io/c.pdf".to_owned(),
            description: None,
        }),
        "View Brochure",
        Effect::Navigate("https://a.io/c.pdf".to_owned())
    )]
    fn dispatch_by_type(
        #[case] payload: Payload,
        #[case] label: &str,
        #[case] effect: Effect,
    ) {
        let action = dispatch(&payload);
        assert_eq!(action.label, label);
        assert_eq!(action.effect, effect);
    }

    #[rstest]
    #[case(Payload::Website(WebsitePayload::default()), "Visit Website")]
    #[case(Payload::Email(EmailPayload::default()), "Send Email")]
    #[case(Payload::Phone(PhonePayload::default()), "Call Now")]
    #[case(Payload::Whatsapp(WhatsappPayload::default()), "Chat on WhatsApp")]
    #[case(Payload::Brochure(BrochurePayload::default()), "View Brochure")]
    fn empty_field_is_a_noop(#[case] payload: Payload, #[case] label: &str) {
        let action = dispatch(&payload);
        assert_eq!(action.label, label);
        assert_eq!(action.effect, Effect::Noop);

        let mut recorder = Recorder::default();
        action.execute(&mut recorder);
        assert!(recorder.opened.is_empty());
        assert!(recorder.downloaded.is_empty());
    }

    #[test]
    fn vcard_offers_a_download() {
        let action = dispatch(&Payload::Vcard(VcardPayload {
            full_name: "Jane Doe".to_owned(),
            ..Default::default()
        }));
        assert_eq!(action.label, "Download Contact");

        let mut recorder = Recorder::default();
        action.execute(&mut recorder);
        action.execute(&mut recorder);
        assert_eq!(recorder.downloaded.len(), 2);
        assert_eq!(recorder.downloaded[0], recorder.downloaded[1]);
        assert_eq!(recorder.downloaded[0].file_name, "Jane Doe.vcf");
    }

    #[test]
    fn execute_is_repeatable() {
        let action = dispatch(&Payload::Phone(PhonePayload {
            number: "123".to_owned(),
        }));
        let mut recorder = Recorder::default();
        action.execute(&mut recorder);
        action.execute(&mut recorder);
        assert_eq!(recorder.opened, vec!["tel:123", "tel:123"]);
    }
}
