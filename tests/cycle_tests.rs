//! Circular reference handling
//!
//! With cycle checking off, a cyclic argument graph must exhaust the stack
//! rather than produce a partial key. That abort kills the whole process, so
//! the test re-runs itself in a child process and inspects how it died.

use deepkey::prelude::*;
use deepkey::{Array, KeyNode};
use std::process::Command;

const CHILD_ENV: &str = "DEEPKEY_UNGUARDED_CYCLE_CHILD";

fn circular() -> Array {
    let arg = Array::with_len(2);
    let child = Array::with_len(2);
    arg.set(0, child.clone()).unwrap();
    arg.set(1, "argString").unwrap();
    child.set(0, arg.clone()).unwrap();
    child.set(1, "childArgString").unwrap();
    arg
}

#[test]
fn test_guarded_cycle_returns_a_key() {
    let generator = StructuralKeyGenerator::with_config(KeyGeneratorConfig::arguments_only());
    let key = generator.key_for(&[circular().into()]).unwrap();

    let KeyNode::Array(_, outer) = &key.nodes()[0] else {
        panic!("expected an array");
    };
    let KeyNode::Array(_, inner) = &outer[0] else {
        panic!("expected a nested array");
    };
    assert_eq!(inner[0], KeyNode::Cycle);
    assert_eq!(generator.metrics().cycles_detected(), 1);
}

#[test]
fn test_self_containing_list() {
    let list = Value::list([1]);
    if let Value::List(items) = &list {
        items.write().push(list.clone());
    }

    for derivation in [KeyDerivation::Structural, KeyDerivation::HashCode] {
        let generator = KeyGenerator::from_config(
            KeyGeneratorConfig::arguments_only().with_derivation(derivation),
        );
        let first = generator
            .generate_key(&Invocation::new().value(list.clone()))
            .unwrap();
        let second = generator
            .generate_key(&Invocation::new().value(list.clone()))
            .unwrap();
        assert_eq!(first, second);
    }
}

#[test]
fn test_unguarded_cycle_overflows_the_stack() {
    if std::env::var_os(CHILD_ENV).is_some() {
        let generator = HashCodeKeyGenerator::with_config(
            KeyGeneratorConfig::arguments_only().with_cycle_check(false),
        );
        let _ = generator.key_for(&[circular().into()]);
        // Only reached if the walk terminated, which fails the parent's check.
        std::process::exit(0);
    }

    let output = Command::new(std::env::current_exe().unwrap())
        .args([
            "--exact",
            "test_unguarded_cycle_overflows_the_stack",
            "--nocapture",
            "--test-threads=1",
        ])
        .env(CHILD_ENV, "1")
        .output()
        .unwrap();

    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(!output.status.success(), "child finished: {stderr}");
    assert!(stderr.contains("overflow"), "unexpected failure: {stderr}");
}
