//! Example Loom application.
//!
//! Builds the demo frame and logs what auto-detection found.
//!
//! # Usage
//!
//! ```bash
//! loom-demo [document titles...]
//! ```
//!
//! # Example
//!
//! ```bash
//! RUST_LOG=loom=debug loom-demo notes.txt todo.md
//! ```

use example::classes;
use loom_core::{TracingFormat, TracingSetup};
use loom_detect::DetectExt;
use loom_system::prelude::*;
use std::process::ExitCode;

fn main() -> ExitCode {
    let filter = std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_owned());
    TracingSetup::new()
        .with_format(TracingFormat::Compact)
        .with_env_filter(filter)
        .init();

    let titles: Vec<Value> = std::env::args().skip(1).map(Value::from).collect();

    match run(titles) {
        Ok(()) => ExitCode::SUCCESS,
        Err(error) => {
            tracing::error!(%error, "demo failed");
            ExitCode::FAILURE
        }
    }
}

fn run(titles: Vec<Value>) -> Result<(), Box<dyn core::error::Error>> {
    let authority = TypeAuthority::new();
    let classes = classes(&authority)?;

    let frame = authority.construct(&classes.frame, titles)?;
    let again = authority.construct(&classes.frame, Vec::new())?;
    tracing::info!(
        class = %frame.class(),
        shared = frame == again,
        size_max = ?frame.get_attr("size_max"),
        "frame ready"
    );

    let children = frame.children();
    for (index, child) in children.iter() {
        tracing::info!(
            %index,
            class = %child.class(),
            title = ?child.get_attr("title"),
            "child"
        );
    }

    let documents = frame.search_children_by_type(&classes.document);
    tracing::info!(
        panels = frame.search_children_by_type(&classes.panel).len(),
        documents = documents.len(),
        open = authority
            .multiton_instances(&classes.document)
            .map_or(0, |instances| instances.len()),
        "detection complete"
    );

    Ok(())
}
