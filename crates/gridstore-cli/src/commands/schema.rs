use anyhow::Result;
use gridstore_db::DEFAULT_SCHEMA;

pub fn handle() -> Result<()> {
    print!("{DEFAULT_SCHEMA}");
    Ok(())
}
