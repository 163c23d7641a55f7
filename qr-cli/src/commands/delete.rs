use super::{parse_id, Context};
use crate::AppError;

#[derive(Clone, Debug, clap::Args)]
#[clap(name = "delete", about = "Delete a profile permanently")]
pub struct Delete {
    #[clap(help = "ID of the profile")]
    id: String,
}

impl Delete {
    pub fn run(&self, ctx: &Context) -> Result<(), AppError> {
        ctx.manager.delete(&parse_id(&self.id)?)?;
        println!("Profile has been successfully deleted");
        Ok(())
    }
}
