//! Token generation command.
//!
//! Prints the token itself exactly once, here. The server only ever
//! sees the hash, so a lost token cannot be recovered; generate a new
//! one instead.

use serde::Serialize;
use stint_sync_server::{Token, TokenInfo};

/// JSON shape of `gen-token --json`, keyed like the tokens file.
#[derive(Serialize)]
#[serde(rename_all = "PascalCase")]
struct GeneratedToken {
    token: String,
    hash: String,
    entry: TokenInfo,
}

/// Generates a token and prints it with its tokens-file entry.
pub fn run(name: &str, json: bool) -> Result<(), Box<dyn std::error::Error>> {
    let token = Token::generate();
    let hash = token.hash();
    let entry = TokenInfo::sync_client(name);

    if json {
        let output = GeneratedToken {
            token: token.as_str().to_string(),
            hash: hash.as_str().to_string(),
            entry,
        };
        println!("{}", serde_json::to_string_pretty(&output)?);
        return Ok(());
    }

    println!("token: {token}");
    println!("hash:  {hash}");
    println!();
    println!("tokens file entry:");
    println!("  \"{hash}\": {}", serde_json::to_string(&entry)?);
    Ok(())
}
