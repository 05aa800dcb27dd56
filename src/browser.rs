//! Opening URLs for the operator.

use crate::error::Result;
use tracing::debug;

pub trait Browser {
    fn open(&self, url: &str) -> Result<()>;
}

/// Opens URLs with the platform's default handler.
#[derive(Debug, Default)]
pub struct SystemBrowser;

impl Browser for SystemBrowser {
    fn open(&self, url: &str) -> Result<()> {
        debug!(%url, "opening in browser");
        open::that(url)?;
        Ok(())
    }
}

/// Prints nothing and opens nothing; used with `--no-browser`.
#[derive(Debug, Default)]
pub struct NoBrowser;

impl Browser for NoBrowser {
    fn open(&self, url: &str) -> Result<()> {
        debug!(%url, "browser disabled");
        Ok(())
    }
}
