//! Built-in injectors and workspace variables resolved together.

use chrono::{TimeDelta, TimeZone, Utc};
use quill_core::{
    Clock, DATETIME_GROUP, MockClock, WorkspaceVariable, WorkspaceVariablesProvider,
    register_builtin_injectors,
};
use quill_injector::{InjectorError, InjectorRegistry, ResolutionContext};
use quill_resolver::{InjectableResolver, merge_with_payload_values};
use serde_json::json;
use std::sync::Arc;

fn clock() -> Arc<MockClock> {
    Arc::new(MockClock::new(
        Utc.with_ymd_and_hms(2024, 11, 5, 8, 30, 0).unwrap(),
    ))
}

fn resolver_with(clock: Arc<MockClock>) -> InjectableResolver {
    let mut registry = InjectorRegistry::new();
    register_builtin_injectors(&mut registry, Clock::with_provider(clock)).unwrap();

    let variables = WorkspaceVariablesProvider::new()
        .with_variable(
            "acme",
            "sales",
            WorkspaceVariable::new("company_name", "ACME Corp"),
        )
        .with_variable(
            "acme",
            "sales",
            // Shadowed by the built-in of the same code.
            WorkspaceVariable::new("current_year", 1999_i64),
        );

    InjectableResolver::new(Arc::new(registry)).with_provider(Arc::new(variables))
}

fn resolver() -> InjectableResolver {
    resolver_with(clock())
}

fn context() -> ResolutionContext {
    ResolutionContext::builder()
        .tenant("acme")
        .workspace("sales")
        .build()
}

#[tokio::test]
async fn resolves_builtins_and_variables_together() {
    let ctx = ResolutionContext::builder()
        .tenant("acme")
        .workspace("sales")
        .format("current_date", "YYYY-MM-DD")
        .build();

    let result = resolver()
        .resolve(
            &ctx,
            &["current_date", "current_year", "company_name", "signature"],
        )
        .await
        .unwrap();

    let payload = json!({ "company_name": "ACME Europe" });
    let merged = merge_with_payload_values(&result, payload.as_object().unwrap());

    assert_eq!(merged["current_date"], "2024-11-05");
    assert_eq!(merged["current_year"], 2024);
    assert_eq!(merged["company_name"], "ACME Europe");
    assert!(!merged.contains_key("signature"));
    assert_eq!(
        result.error("signature"),
        Some(InjectorError::Provider(
            "variable 'signature' is not defined in workspace 'sales'".into()
        ))
    );
}

#[tokio::test]
async fn catalog_prefers_builtin_definitions() {
    let ctx = ResolutionContext::builder()
        .tenant("acme")
        .workspace("sales")
        .build();

    let catalog = resolver().injectables(&ctx).await.unwrap();

    let codes: Vec<_> = catalog.injectables.iter().map(|d| d.code.as_str()).collect();
    assert_eq!(
        codes,
        vec![
            "current_date",
            "current_time",
            "current_date_time",
            "current_year",
            "current_month",
            "current_day",
            "company_name",
        ]
    );
    let groups: Vec<_> = catalog.groups.iter().map(|g| g.code.as_str()).collect();
    assert_eq!(groups, vec![DATETIME_GROUP]);
}

#[tokio::test]
async fn each_request_reads_the_clock_again() {
    let clock = clock();
    let resolver = resolver_with(Arc::clone(&clock));

    let before = resolver.resolve(&context(), &["current_year"]).await.unwrap();
    clock.advance(TimeDelta::days(60));
    let after = resolver.resolve(&context(), &["current_year"]).await.unwrap();

    let payload = serde_json::Map::new();
    assert_eq!(merge_with_payload_values(&before, &payload)["current_year"], 2024);
    assert_eq!(merge_with_payload_values(&after, &payload)["current_year"], 2025);
}
