use clap::{Parser, Subcommand};
use fhir::{catalog, OrderKind, ServiceRequest};
use launch::{EncounterSelection, LaunchContext};

#[derive(Parser)]
#[command(name = "ehr")]
#[command(about = "Simulated EHR host CLI")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Encode a launch context into a URL-safe token
    EncodeLaunch {
        /// Patient id (repeatable, order preserved)
        #[arg(long = "patient")]
        patients: Vec<String>,
        /// Provider id (repeatable, order preserved)
        #[arg(long = "provider")]
        providers: Vec<String>,
        /// Encounter selection: AUTO, MANUAL, NONE or a literal encounter id
        #[arg(long, default_value = "NONE")]
        encounter: String,
    },
    /// Decode a launch token and print the context as JSON
    DecodeLaunch {
        /// The token from the launch query parameter
        token: String,
    },
    /// List the catalog keys for an order kind
    Catalog {
        /// Order kind: diagnostic or therapeutic
        kind: String,
    },
    /// Build an order and print it as FHIR JSON
    BuildOrder {
        /// Order kind: diagnostic or therapeutic
        kind: String,
        /// Catalog key, e.g. "Blood Test"
        key: String,
        /// Patient id for the subject reference
        subject_id: String,
        /// Practitioner id for the requester reference
        requester_id: String,
    },
}

fn parse_kind(kind: &str) -> Result<OrderKind, String> {
    OrderKind::from_wire(kind)
        .ok_or_else(|| format!("unknown order kind '{kind}' (expected diagnostic or therapeutic)"))
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    match cli.command {
        Some(Commands::EncodeLaunch {
            patients,
            providers,
            encounter,
        }) => {
            let ctx = LaunchContext {
                patient_ids: patients,
                provider_ids: providers,
                encounter: EncounterSelection::from_wire(&encounter),
            };
            println!("{}", launch::encode(&ctx)?);
        }
        Some(Commands::DecodeLaunch { token }) => match launch::decode(&token) {
            Ok(ctx) => {
                println!("patients:  {:?}", ctx.patient_ids);
                println!("providers: {:?}", ctx.provider_ids);
                println!("encounter: {}", ctx.encounter.to_wire());
            }
            Err(e) => eprintln!("Error decoding launch token: {}", e),
        },
        Some(Commands::Catalog { kind }) => {
            let kind = parse_kind(&kind)?;
            for key in catalog::keys(kind) {
                println!("{}", key);
            }
        }
        Some(Commands::BuildOrder {
            kind,
            key,
            subject_id,
            requester_id,
        }) => {
            let kind = parse_kind(&kind)?;
            match ServiceRequest::build(kind, &key, &subject_id, &requester_id) {
                Ok(order) => println!("{}", serde_json::to_string_pretty(&order)?),
                Err(e) => eprintln!("Error building order: {}", e),
            }
        }
        None => {
            println!("Use 'ehr --help' for commands");
        }
    }

    Ok(())
}
