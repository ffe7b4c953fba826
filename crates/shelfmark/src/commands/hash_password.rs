//! Hash-password command - produces hashes for accounts seed files.

use anyhow::Result;
use clap::Args;

use super::Context;

/// Arguments for the hash-password command.
#[derive(Args, Debug)]
pub struct HashPasswordArgs {
    /// Password to hash
    pub password: String,
}

/// Run the hash-password command.
pub fn run(args: HashPasswordArgs, _ctx: &Context) -> Result<()> {
    let hash = shelfmark_server::credentials::hash_password(&args.password)
        .map_err(|e| anyhow::anyhow!("hashing failed: {e}"))?;
    println!("{hash}");
    Ok(())
}
