use qr_profiles::ScanLink;

use super::Context;
use crate::AppError;

#[derive(Clone, Debug, clap::Args)]
#[clap(
    name = "code",
    about = "Show the owner's QR code link, creating it on first use"
)]
pub struct Code {}

impl Code {
    pub fn run(&self, ctx: &Context) -> Result<(), AppError> {
        let code = ctx.manager.issue_code(ctx.owner()?)?;
        let link = ScanLink::new(&ctx.config, &code)?;

        println!("Code:  {}", link.code);
        println!("Link:  {}", link.url);
        println!("Image: {}", link.image_request());
        println!("Save the image as {}", link.image_file_name());
        Ok(())
    }
}
