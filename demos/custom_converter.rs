//! Plugging a converter in for a domain type.
//!
//! Run with: cargo run --example custom_converter

use std::error::Error;
use toon_codec::{toon_record, toon_scalar, Deserializer, FnConverter, Serializer, ToonOptions};

/// Amount of money in cents; has no text form of its own.
#[derive(Debug, Clone, Copy, PartialEq)]
struct Money(i64);
toon_scalar!(Money);

toon_record! {
    #[derive(Debug, Default, PartialEq)]
    struct Invoice {
        #[toon(order = 1)]
        number: String,
        #[toon(order = 2, comment = "in EUR")]
        amount: Option<Money>,
        #[toon(order = 3)]
        issued: Option<chrono::NaiveDateTime>,
    }
}

fn money() -> FnConverter<Money> {
    FnConverter::new(
        |m: &Money| format!("{}.{:02}", m.0 / 100, m.0 % 100),
        |text| {
            let (euros, cents) = text.split_once('.')?;
            Some(Money(euros.parse::<i64>().ok()? * 100 + cents.parse::<i64>().ok()?))
        },
    )
}

fn main() -> Result<(), Box<dyn Error>> {
    let invoices = vec![
        Invoice {
            number: "INV-001".into(),
            amount: Some(Money(12999)),
            issued: chrono::NaiveDate::from_ymd_opt(2024, 5, 1)
                .and_then(|d| d.and_hms_opt(9, 0, 0)),
        },
        Invoice {
            number: "INV-002".into(),
            amount: None,
            issued: None,
        },
    ];

    // Without a converter Money cannot be written
    let plain = Serializer::new(ToonOptions::new());
    if let Err(e) = plain.serialize("invoices", &invoices) {
        println!("Without converter: {}\n", e);
    }

    let mut serializer = Serializer::new(ToonOptions::new());
    serializer.add_converter(money());
    let toon = serializer.serialize("invoices", &invoices)?;
    println!("With converter:\n{}\n", toon);

    let mut deserializer = Deserializer::new(ToonOptions::new());
    deserializer.add_converter(money());
    let back: Vec<Invoice> = deserializer
        .deserialize(&toon)?
        .ok_or("document was empty")?;
    assert_eq!(invoices, back);
    println!("✓ Round-trip successful");

    Ok(())
}
