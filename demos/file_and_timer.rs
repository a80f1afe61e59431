//! Reads a file and counts its words, then recovers from a rejection that
//! arrives on a timer.
//!
//! ```text
//! cargo run --example file_and_timer -- path/to/file
//! ```
use linked_promise::adapters::{delay_reject, read_to_string};
use linked_promise::{Continuation, Deferred, Runtime};
use std::env;
use std::time::Duration;

fn main() {
    let path = env::args().nth(1).unwrap_or_else(|| "Cargo.toml".to_string());
    let runtime = Runtime::new();

    runtime.run(|| {
        read_to_string(&path)
            .map(|text| text.split_whitespace().count())
            .then(|words| {
                println!("{words} words");
                Continuation::Fulfill(())
            })
            .catch(|err| {
                println!("{err}");
                Continuation::Fulfill(())
            })
            .finally(|| println!("done reading"));

        let promise =
            delay_reject::<u32, String>(Duration::from_secs(1), "Something went wrong!".into())
                .catch(|err| {
                    println!("{err}");
                    Continuation::Defer(Deferred::reject("recovered".to_string()))
                });

        promise
            .then(|value| {
                println!("Got value: {value}");
                Continuation::Fulfill(value + 1)
            })
            .catch(|err| {
                println!("{err}");
                Continuation::Fulfill(0)
            });

        promise.map(|value| {
            println!("Got value: {value}");
            value + 1
        });
    });
}
