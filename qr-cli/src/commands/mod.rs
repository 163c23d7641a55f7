use clap::Subcommand;
use qr_profiles::{
    Config, FileStore, OwnerId, ProfileId, ProfileSetManager, Scanner,
};

use crate::AppError;

mod activate;
mod code;
mod create;
mod delete;
mod edit;
mod list;
mod scan;

#[derive(Debug, Subcommand)]
pub enum Commands {
    Create(create::Create),
    List(list::List),
    Activate(activate::Activate),
    Deactivate(activate::Deactivate),
    Edit(edit::Edit),
    Delete(delete::Delete),
    Code(code::Code),
    Scan(scan::Scan),
}

impl Commands {
    pub fn run(&self, ctx: &Context) -> Result<(), AppError> {
        match self {
            Commands::Create(create) => create.run(ctx),
            Commands::List(list) => list.run(ctx),
            Commands::Activate(activate) => activate.run(ctx),
            Commands::Deactivate(deactivate) => deactivate.run(ctx),
            Commands::Edit(edit) => edit.run(ctx),
            Commands::Delete(delete) => delete.run(ctx),
            Commands::Code(code) => code.run(ctx),
            Commands::Scan(scan) => scan.run(ctx),
        }
    }
}

/// Everything a command needs, built once in `main`.
pub struct Context {
    pub config: Config,
    pub owner: Option<OwnerId>,
    pub manager: ProfileSetManager<FileStore>,
    pub scanner: Scanner<FileStore>,
}

impl Context {
    pub fn owner(&self) -> Result<&OwnerId, AppError> {
        self.owner
            .as_ref()
            .ok_or(AppError::OwnerMissing)
    }
}

pub(crate) fn parse_id(id: &str) -> Result<ProfileId, AppError> {
    Ok(id.parse()?)
}
