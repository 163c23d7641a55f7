use std::collections::BTreeMap;

use qr_profiles::Payload;

use super::{parse_id, Context};
use crate::parsers::parse_field;
use crate::AppError;

#[derive(Clone, Debug, clap::Args)]
#[clap(name = "edit", about = "Rename a profile or replace its payload")]
pub struct Edit {
    #[clap(help = "ID of the profile")]
    id: String,
    #[clap(long, short, help = "New display name")]
    name: Option<String>,
    #[clap(
        long = "field",
        short = 'f',
        value_parser = parse_field,
        help = "Payload field as key=value; replaces the whole payload"
    )]
    fields: Vec<(String, String)>,
}

impl Edit {
    pub fn run(&self, ctx: &Context) -> Result<(), AppError> {
        let id = parse_id(&self.id)?;
        let payload = if self.fields.is_empty() {
            None
        } else {
            let kind = ctx.manager.get(&id)?.kind();
            let fields: BTreeMap<String, String> =
                self.fields.iter().cloned().collect();
            Some(Payload::from_fields(kind, &fields))
        };

        let profile = ctx
            .manager
            .edit(&id, self.name.clone(), payload)?;
        println!("Updated profile '{}'", profile.name);
        Ok(())
    }
}
