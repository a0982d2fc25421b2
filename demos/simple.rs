//! Basic TOON encoding and decoding of a single record.
//!
//! Run with: cargo run --example simple

use std::error::Error;
use toon_codec::{from_str, to_string, toon_record};

toon_record! {
    #[derive(Debug, Default, PartialEq)]
    struct User {
        #[toon(order = 1, comment = "account number")]
        id: u32,
        #[toon(order = 2)]
        name: String,
        #[toon(order = 3)]
        email: Option<String>,
        #[toon(order = 4)]
        roles: Vec<String>,
    }
}

fn main() -> Result<(), Box<dyn Error>> {
    let user = User {
        id: 42,
        name: "Alice Johnson".to_string(),
        email: None,
        roles: vec!["admin".to_string(), "ops, on call".to_string()],
    };

    // Encode to TOON
    let toon = to_string("user", &user)?;
    println!("TOON output:\n{}\n", toon);

    // Decode back to the record
    let user_back: User = from_str(&toon)?.ok_or("document was empty")?;
    assert_eq!(user, user_back);
    println!("✓ Round-trip successful");

    Ok(())
}
