use super::{parse_id, Context};
use crate::AppError;

#[derive(Clone, Debug, clap::Args)]
#[clap(
    name = "activate",
    about = "Make a profile the one the code points to"
)]
pub struct Activate {
    #[clap(help = "ID of the profile")]
    id: String,
}

impl Activate {
    pub fn run(&self, ctx: &Context) -> Result<(), AppError> {
        let profile = ctx
            .manager
            .set_active(&parse_id(&self.id)?, true)?;
        println!("Profile '{}' is now active for your QR code", profile.name);
        Ok(())
    }
}

#[derive(Clone, Debug, clap::Args)]
#[clap(name = "deactivate", about = "Deactivate a profile")]
pub struct Deactivate {
    #[clap(help = "ID of the profile")]
    id: String,
}

impl Deactivate {
    pub fn run(&self, ctx: &Context) -> Result<(), AppError> {
        let profile = ctx
            .manager
            .set_active(&parse_id(&self.id)?, false)?;
        println!("Profile '{}' is no longer active", profile.name);
        Ok(())
    }
}
