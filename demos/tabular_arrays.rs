//! Tabular collection format for records, including nested records and lists.
//!
//! Run with: cargo run --example tabular_arrays

use std::error::Error;
use toon_codec::{from_str, to_string, toon_record};

toon_record! {
    #[derive(Debug, Default, Clone, PartialEq)]
    struct Warehouse {
        #[toon(order = 1)]
        code: String,
        #[toon(order = 2)]
        city: String,
    }
}

toon_record! {
    #[derive(Debug, Default, Clone, PartialEq)]
    struct Product {
        #[toon(order = 1)]
        sku: String,
        #[toon(order = 2)]
        name: String,
        #[toon(order = 3, comment = "EUR")]
        price: f64,
        #[toon(order = 4)]
        stored_at: Option<Warehouse>,
        #[toon(order = 5)]
        colors: Vec<String>,
    }
}

fn main() -> Result<(), Box<dyn Error>> {
    let products = vec![
        Product {
            sku: "WIDGET-001".into(),
            name: "Super Widget".into(),
            price: 29.99,
            stored_at: Some(Warehouse {
                code: "W1".into(),
                city: "Hamburg".into(),
            }),
            colors: vec!["red".into(), "blue".into()],
        },
        Product {
            sku: "GADGET-002".into(),
            name: "Mega Gadget".into(),
            price: 49.99,
            stored_at: None,
            colors: vec![],
        },
        Product {
            sku: "TOOL-003".into(),
            name: "Ultra Tool (v2)".into(),
            price: 19.99,
            stored_at: Some(Warehouse {
                code: "W2".into(),
                city: "Lyon".into(),
            }),
            colors: vec!["black".into()],
        },
    ];

    // One header, one row per product; the warehouse becomes dotted columns
    let toon = to_string("products", &products)?;
    println!("TOON tabular output:\n{}\n", toon);

    // Decode back to verify
    let products_back: Vec<Product> = from_str(&toon)?.ok_or("document was empty")?;
    assert_eq!(products, products_back);
    println!("✓ Round-trip successful");

    Ok(())
}
