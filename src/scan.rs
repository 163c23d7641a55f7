use std::sync::Arc;

use url::Url;

use crate::action::Action;
use crate::config::Config;
use crate::id::PublicCode;
use crate::profile::Profile;
use crate::resolver::ProfileResolver;
use crate::storage::{CodeStore, ProfileStore};
use crate::Result;

/// Result of scanning a code: the active profile and what to do with it.
#[derive(Clone, Debug)]
pub struct ScanOutcome {
    pub profile: Profile,
    pub action: Action,
}

/// Entry point for scan events coming from outside.
pub struct Scanner<S> {
    resolver: ProfileResolver<S>,
}

impl<S> Scanner<S>
where
    S: ProfileStore + CodeStore,
{
    pub fn new(store: Arc<S>) -> Self {
        Self {
            resolver: ProfileResolver::new(store),
        }
    }

    /// Resolve `code` and derive its action. Fails with
    /// `CodeNotFound` or `NoActiveProfile`; nothing is written.
    pub fn scan(&self, code: &str) -> Result<ScanOutcome> {
        let profile = self.resolver.resolve(code)?;
        let action = Action::for_profile(&profile);
        log::debug!(
            "code {} -> {} profile {} ({})",
            code,
            profile.kind(),
            profile.id,
            action.label
        );
        Ok(ScanOutcome { profile, action })
    }
}

/// Links published for an owner's code. The image itself is produced by
/// the external renderer from [`image_request`](Self::image_request).
#[derive(Clone, Debug, PartialEq)]
pub struct ScanLink {
    pub code: PublicCode,
    pub url: Url,
    image_request: Url,
}

impl ScanLink {
    pub fn new(config: &Config, code: &PublicCode) -> Result<Self> {
        let url = config.scan_base_url.join(code.as_str())?;

        let mut image_request = config.renderer_url.clone();
        let size = format!("{0}x{0}", config.renderer_size);
        image_request
            .query_pairs_mut()
            .append_pair("size", &size)
            .append_pair("data", url.as_str());

        Ok(Self {
            code: code.clone(),
            url,
            image_request,
        })
    }

    pub fn image_request(&self) -> &Url {
        &self.image_request
    }

    pub fn image_file_name(&self) -> String {
        format!("qr-code-{}.png", self.code)
    }
}
