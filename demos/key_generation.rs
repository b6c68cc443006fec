//! Example demonstrating both key strategies
//!
//! This example shows:
//! 1. Structural keys used directly as map keys
//! 2. 64-bit hash keys and their agreement with structural keys
//! 3. Reflection of derived types
//! 4. Circular argument graphs with cycle checking on
//!
//! Run with: cargo run --example key_generation

use deepkey::prelude::*;
use deepkey::{Array, KeyEnum, Reflect};
use std::collections::HashMap;

#[derive(Debug, Clone, Copy, KeyEnum)]
enum Currency {
    Eur,
    Usd,
}

#[derive(Debug, Reflect)]
struct Price {
    amount: f64,
    currency: Currency,
}

fn convert(amount: f64, from: Currency, to: Currency) -> f64 {
    match (from, to) {
        (Currency::Eur, Currency::Usd) => amount * 1.08,
        (Currency::Usd, Currency::Eur) => amount / 1.08,
        _ => amount,
    }
}

fn main() -> Result<()> {
    println!("Key Generation Example");
    println!("======================");

    // Example 1: structural keys in a memo table
    println!("\n--- Structural keys ---");
    let generator = StructuralKeyGenerator::new();
    let signature = MethodSignature::new("demo::Rates", "convert")
        .param_of::<f64>()
        .param_of::<Currency>()
        .param_of::<Currency>();

    let mut memo: HashMap<StructuralKey, f64> = HashMap::new();
    for (amount, from, to) in [
        (10.0, Currency::Eur, Currency::Usd),
        (10.0, Currency::Eur, Currency::Usd),
        (10.5, Currency::Eur, Currency::Usd),
        (10.0, Currency::Usd, Currency::Eur),
    ] {
        let key = generator.generate_key(
            &Invocation::for_method(signature.clone())
                .arg(&amount)
                .arg(&from)
                .arg(&to),
        )?;
        let hit = memo.contains_key(&key);
        let result = *memo
            .entry(key)
            .or_insert_with(|| convert(amount, from, to));
        println!(
            "convert({amount}, {from:?}, {to:?}) = {result:.2} ({})",
            if hit { "hit" } else { "miss" }
        );
    }

    // Example 2: hash keys
    println!("\n--- Hash keys ---");
    let hashed = HashCodeKeyGenerator::new();
    let invocation = Invocation::for_method(signature)
        .arg(&1.5)
        .arg(&Currency::Eur)
        .arg(&Currency::Usd);
    let hash = hashed.generate_key(&invocation)?;
    let structural = generator.generate_key(&invocation)?;
    println!("hash key:            {hash}");
    println!("structural hash:     {}", structural.hash_code());

    // Example 3: reflection
    println!("\n--- Reflection ---");
    let reflecting = KeyGenerator::from_config(
        KeyGeneratorConfig::arguments_only()
            .with_reflection(true)
            .with_derivation(KeyDerivation::HashCode),
    );
    let price = |amount| {
        Value::object(Price {
            amount,
            currency: Currency::Eur,
        })
    };
    let a = reflecting.generate_key(&Invocation::new().value(price(9.99)))?;
    let b = reflecting.generate_key(&Invocation::new().value(price(9.99)))?;
    let c = reflecting.generate_key(&Invocation::new().value(price(9.98)))?;
    println!("equal prices share a key: {}", a == b);
    println!("different prices differ:  {}", a != c);

    // Example 4: circular arguments
    println!("\n--- Circular arguments ---");
    let arg = Array::with_len(2);
    let child = Array::with_len(2);
    arg.set(0, child.clone())?;
    arg.set(1, "argString")?;
    child.set(0, arg.clone())?;
    child.set(1, "childArgString")?;

    let cyclic = HashCodeKeyGenerator::with_config(KeyGeneratorConfig::arguments_only());
    println!("key: {}", cyclic.key_for(&[arg.into()])?);
    println!("cycles cut: {}", cyclic.metrics().cycles_detected());

    Ok(())
}
