use anyhow::Result;
use homeaccess::cli::{actions, start};

// Main function
#[tokio::main]
async fn main() -> Result<()> {
    // Parse arguments and install logging
    let (action, globals) = start()?;

    // Handle the action
    actions::handle(action, &globals).await?;

    Ok(())
}
