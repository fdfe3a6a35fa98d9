//! Document Review Workflow
//!
//! This demo defines a review workflow as JSON and drives a document
//! through it.
//!
//! Key concepts:
//! - Declarative machine definitions (MachineDefinition)
//! - Named host operations as guards and actions
//! - First-match-wins between candidate transitions
//! - Both calling conventions: `fire` and `fire_strict`
//!
//! Run with: RUST_LOG=warden=debug cargo run --example document_workflow

use tracing_subscriber::EnvFilter;
use warden::host::{Arity, Host, HostError, StateSlots};
use warden::{Error, MachineDefinition, Machines};

const WORKFLOW: &str = r#"{
    "initial_state": "NEW",
    "states": [
        { "name": "NEW", "events": [{ "name": "submit", "to": "SUBMITTED" }] },
        {
            "name": "SUBMITTED",
            "events": [{
                "name": "review",
                "transitions": [
                    {
                        "to": "APPROVED",
                        "guards": [{ "operation": "has_signature", "failure_message": "it is not signed" }],
                        "comment": "only signed documents are approved"
                    },
                    { "to": "REJECTED", "action": "file_rejection" }
                ]
            }]
        },
        { "name": "REJECTED", "events": [{ "name": "revise", "to": "REVISED" }] },
        { "name": "REVISED", "events": [{ "name": "submit", "to": "SUBMITTED" }] },
        { "name": "APPROVED", "enter": "announce" }
    ]
}"#;

#[derive(Default)]
struct Document {
    slots: StateSlots,
    title: String,
    signed: bool,
    rejections: u32,
}

impl Host for Document {
    type Arg = ();

    fn read_state(&self, attribute: &str) -> Option<String> {
        self.slots.get(attribute).map(str::to_owned)
    }

    fn write_state(&mut self, attribute: &str, state: &str) {
        self.slots.set(attribute, state);
    }

    fn arity(operation: &str) -> Option<Arity> {
        match operation {
            "has_signature" | "file_rejection" | "announce" => Some(Arity::Nullary),
            _ => None,
        }
    }

    fn call(&mut self, operation: &str, _args: &[()]) -> Result<(), HostError> {
        match operation {
            "file_rejection" => {
                self.rejections += 1;
                println!("  [Audit] '{}' rejected ({} so far)", self.title, self.rejections);
            }
            "announce" => println!("  [Audit] '{}' approved", self.title),
            other => return Err(HostError::UnknownOperation(other.to_string())),
        }
        Ok(())
    }

    fn test(&self, operation: &str, _args: &[()]) -> Result<bool, HostError> {
        match operation {
            "has_signature" => Ok(self.signed),
            other => Err(HostError::UnknownOperation(other.to_string())),
        }
    }

    fn identity(&self) -> String {
        format!("Document '{}'", self.title)
    }
}

fn status(doc: &Document) -> &str {
    doc.slots.get("state").unwrap_or("NEW")
}

fn main() -> Result<(), Error> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_target(false)
        .init();

    println!("=== Document Review Workflow ===\n");

    let machines: Machines<Document> =
        Machines::new().with(MachineDefinition::from_json(WORKFLOW)?.build()?)?;
    println!("Events: {}\n", machines.events().collect::<Vec<_>>().join(", "));

    let mut doc = Document {
        title: "Quarterly report".to_string(),
        ..Document::default()
    };
    machines.initialize(&mut doc)?;

    println!("Step 1: Submit and review an unsigned document");
    machines.fire_strict(&mut doc, "submit", &[])?;
    machines.fire_strict(&mut doc, "review", &[])?;
    println!("  -> {}\n", status(&doc));

    println!("Step 2: Reviewing again is not possible");
    let outcome = machines.fire(&mut doc, "review", &[])?;
    if let Some(rejection) = outcome.rejection() {
        println!("  {}", rejection.human_explanation());
        for reason in rejection.human_reasons() {
            println!("    - {reason}");
        }
    }
    println!();

    println!("Step 3: Revise, sign and resubmit");
    machines.fire_strict(&mut doc, "revise", &[])?;
    doc.signed = true;
    machines.fire_strict(&mut doc, "submit", &[])?;
    machines.fire_strict(&mut doc, "review", &[])?;
    println!("  -> {}\n", status(&doc));

    println!("Step 4: Approved documents accept no further events");
    match machines.fire_strict(&mut doc, "submit", &[]) {
        Err(err) if err.is_impossible_event() => println!("  {err}"),
        other => println!("  unexpected: {other:?}"),
    }

    println!("\n=== Demo Complete ===");
    Ok(())
}
