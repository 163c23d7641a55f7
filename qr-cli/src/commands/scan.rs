use std::fs;
use std::io;
use std::path::PathBuf;

use qr_profiles::{ActionHandler, ContactCard};

use super::Context;
use crate::AppError;

#[derive(Clone, Debug, clap::Args)]
#[clap(name = "scan", about = "Resolve a code the way a scanner would")]
pub struct Scan {
    #[clap(help = "Public code printed in the QR image")]
    code: String,
    #[clap(
        long,
        value_parser,
        help = "Directory to save downloaded contact cards in"
    )]
    out: Option<PathBuf>,
}

/// Prints URIs and writes contact cards to disk.
struct ConsoleHandler {
    out_dir: PathBuf,
    error: Option<io::Error>,
}

impl ActionHandler for ConsoleHandler {
    fn open(&mut self, uri: &str) {
        println!("Open: {}", uri);
    }

    fn download(&mut self, card: &ContactCard) {
        let path = self.out_dir.join(&card.file_name);
        match fs::write(&path, &card.content) {
            Ok(()) => {
                println!("Saved {} ({})", path.display(), card.media_type())
            }
            Err(e) => self.error = Some(e),
        }
    }
}

impl Scan {
    pub fn run(&self, ctx: &Context) -> Result<(), AppError> {
        let outcome = ctx.scanner.scan(&self.code)?;
        println!("{}", outcome.profile.name);
        println!("[{}]", outcome.action.label);

        let mut handler = ConsoleHandler {
            out_dir: self.out.clone().unwrap_or_else(|| PathBuf::from(".")),
            error: None,
        };
        outcome.action.execute(&mut handler);
        if let Some(e) = handler.error {
            return Err(AppError::CardSaveError(e.to_string()));
        }
        Ok(())
    }
}
