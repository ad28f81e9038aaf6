//! Quill preview CLI.
//!
//! Resolves the given codes against the built-in injectors, the demo
//! injectors and an optional workspace variables file, then prints the merged
//! value map as JSON.
//!
//! # Usage
//!
//! ```bash
//! quill-preview [--variables vars.json] [--payload '{"code": 1}'] [--format code=FMT] <code>...
//! ```
//!
//! # Example
//!
//! ```bash
//! quill-preview --template quote --format current_date=YYYY-MM-DD \
//!     current_date document_title reference_number company_name
//! ```
//!
//! # Environment
//!
//! `QUILL_TENANT` and `QUILL_WORKSPACE` select the workspace (default `demo` /
//! `default`). `QUILL_LOG` sets the log filter and `QUILL_LOG_FORMAT` the log
//! format. Resolver limits come from `QUILL_*_TIMEOUT_MS` and
//! `QUILL_MAX_CONCURRENCY`. A `.env` file is loaded first.

use example::{PreviewArgs, USAGE, register_demo_injectors};
use quill_core::{
    Clock, TracingConfig, TracingFormat, WorkspaceVariablesProvider, register_builtin_injectors,
};
use quill_injector::{InjectorRegistry, ResolutionContext};
use quill_resolver::{InjectableResolver, ResolverConfig, merge_with_payload_values};
use std::collections::BTreeMap;
use std::sync::Arc;

fn fail(message: impl core::fmt::Display) -> ! {
    eprintln!("Error: {message}");
    std::process::exit(1);
}

#[tokio::main]
async fn main() {
    let _ = dotenvy::dotenv();

    let format = std::env::var("QUILL_LOG_FORMAT")
        .ok()
        .and_then(|raw| raw.parse::<TracingFormat>().ok())
        .unwrap_or(TracingFormat::Compact);
    TracingConfig::new()
        .with_format(format)
        .with_env_filter(std::env::var("QUILL_LOG").unwrap_or_else(|_| "warn".to_string()))
        .init();

    let args = PreviewArgs::parse(std::env::args().skip(1)).unwrap_or_else(|e| {
        eprintln!("Error: {e}");
        eprintln!("{USAGE}");
        std::process::exit(1);
    });
    let config = ResolverConfig::from_env().unwrap_or_else(|e| fail(e));
    let tenant = std::env::var("QUILL_TENANT").unwrap_or_else(|_| "demo".to_string());
    let workspace = std::env::var("QUILL_WORKSPACE").unwrap_or_else(|_| "default".to_string());

    // Registry: built-ins plus demo injectors
    let mut registry = InjectorRegistry::new();
    register_builtin_injectors(&mut registry, Clock::system()).unwrap_or_else(|e| fail(e));
    register_demo_injectors(&mut registry).unwrap_or_else(|e| fail(e));

    // Provider: workspace variables from file
    let variables = WorkspaceVariablesProvider::new();
    if let Some(path) = &args.variables {
        let json = std::fs::read_to_string(path)
            .unwrap_or_else(|e| fail(format!("cannot read {}: {e}", path.display())));
        variables
            .load_json(&tenant, &workspace, &json)
            .unwrap_or_else(|e| fail(e));
    }

    let mut builder = ResolutionContext::builder()
        .tenant(&tenant)
        .workspace(&workspace)
        .payload(serde_json::Value::Object(args.payload.clone()));
    if let Some(template) = &args.template {
        builder = builder.template(template);
    }
    for (code, format) in &args.formats {
        builder = builder.format(code, format);
    }
    let ctx = builder.build();

    let resolver = InjectableResolver::new(Arc::new(registry))
        .with_provider(Arc::new(variables))
        .with_config(config);

    let result = match resolver.resolve(&ctx, &args.codes).await {
        Ok(result) => result,
        Err(e) => fail(e),
    };

    tracing::info!(
        requested = args.codes.len(),
        resolved = result.len(),
        failed = result.errors().len(),
        "preview resolved"
    );

    let errors: BTreeMap<_, _> = result.errors().into_iter().collect();
    for (code, error) in &errors {
        eprintln!("warning: {code}: {error}");
    }

    let merged: BTreeMap<_, _> = merge_with_payload_values(&result, &args.payload)
        .into_iter()
        .collect();
    match serde_json::to_string_pretty(&merged) {
        Ok(json) => println!("{json}"),
        Err(e) => fail(e),
    }
}
