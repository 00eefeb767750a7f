use forge::error::Result;
use forge::session::Session;

pub fn run(session: &mut Session<'_>, force: bool) -> Result<()> {
    let config = forge::project::init(session, force)?;
    log::debug!("project root is now {}", config.dir().display());
    Ok(())
}
