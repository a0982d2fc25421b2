//! TOON vs JSON size comparison.
//!
//! Run with: cargo run --example token_efficiency

use serde::Serialize;
use std::error::Error;
use toon_codec::{to_string_with_options, toon_record, ToonOptions};

toon_record! {
    #[derive(Debug, Default, Serialize)]
    struct User {
        #[toon(order = 1)]
        id: u32,
        #[toon(order = 2)]
        name: String,
        #[toon(order = 3)]
        email: String,
        #[toon(order = 4)]
        active: bool,
    }
}

toon_record! {
    #[derive(Debug, Default, Serialize)]
    struct ApiResponse {
        #[toon(order = 1)]
        users: Vec<User>,
        #[toon(order = 2)]
        total: u32,
        #[toon(order = 3)]
        page: u32,
    }
}

fn main() -> Result<(), Box<dyn Error>> {
    let response = ApiResponse {
        users: vec![
            User {
                id: 1,
                name: "Alice Johnson".to_string(),
                email: "alice@example.com".to_string(),
                active: true,
            },
            User {
                id: 2,
                name: "Bob Smith".to_string(),
                email: "bob@example.com".to_string(),
                active: true,
            },
            User {
                id: 3,
                name: "Charlie Brown".to_string(),
                email: "charlie@example.com".to_string(),
                active: false,
            },
        ],
        total: 3,
        page: 1,
    };

    // Serialize to JSON
    let json = serde_json::to_string_pretty(&response)?;
    println!("JSON ({} chars):\n{}\n", json.len(), json);

    // Serialize to TOON
    let toon = to_string_with_options("response", &response, ToonOptions::compact())?;
    println!("TOON ({} chars):\n{}\n", toon.len(), toon);

    let savings = (json.len() as f64 - toon.len() as f64) / json.len() as f64 * 100.0;
    println!(
        "✓ Size savings: {:.1}% ({} → {} chars)",
        savings,
        json.len(),
        toon.len()
    );

    Ok(())
}
