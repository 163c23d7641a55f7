use super::Context;
use crate::AppError;

#[derive(Clone, Debug, clap::Args)]
#[clap(name = "list", about = "List the owner's profiles, newest first")]
pub struct List {
    #[clap(long = "id", short = 'i', action, help = "Show profile IDs")]
    show_id: bool,
}

impl List {
    pub fn run(&self, ctx: &Context) -> Result<(), AppError> {
        let profiles = ctx.manager.list(ctx.owner()?)?;
        if profiles.is_empty() {
            println!("No profiles yet");
            return Ok(());
        }

        for profile in profiles {
            let marker = if profile.active { "*" } else { " " };
            if self.show_id {
                print!("{} ", profile.id);
            }
            println!(
                "{} [{}] {}: {}",
                marker,
                profile.kind(),
                profile.name,
                profile.summary()
            );
        }
        Ok(())
    }
}
