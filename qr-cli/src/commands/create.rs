use std::collections::BTreeMap;

use super::Context;
use crate::parsers::parse_field;
use crate::AppError;

#[derive(Clone, Debug, clap::Args)]
#[clap(name = "create", about = "Create a new (inactive) profile")]
pub struct Create {
    #[clap(help = "One of website, email, phone, whatsapp, brochure, vcard")]
    kind: String,
    #[clap(help = "Display name of the profile")]
    name: String,
    #[clap(
        long = "field",
        short = 'f',
        value_parser = parse_field,
        help = "Payload field as key=value, e.g. website_url=https://a.io"
    )]
    fields: Vec<(String, String)>,
}

impl Create {
    pub fn run(&self, ctx: &Context) -> Result<(), AppError> {
        let owner = ctx.owner()?;
        let fields: BTreeMap<String, String> =
            self.fields.iter().cloned().collect();

        let profile = ctx
            .manager
            .create_from_fields(owner, &self.name, &self.kind, &fields)?;
        println!("Created {} profile {}", profile.kind(), profile.id);
        Ok(())
    }
}
