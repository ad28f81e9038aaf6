//! Demo injectors showing dependencies and critical failures.

use async_trait::async_trait;
use quill_core::CURRENT_DATE;
use quill_injector::{
    CancellationToken, Injector, InjectorError, InjectorRegistry, InjectorResult, RegistryError,
    ResolutionContext, ValueType,
};

/// Title built from the template id and today's date.
///
/// Reads `current_date` when the template also references it.
pub struct DocumentTitle;

#[async_trait]
impl Injector for DocumentTitle {
    fn code(&self) -> &str {
        "document_title"
    }

    fn data_type(&self) -> ValueType {
        ValueType::String
    }

    fn dependencies(&self) -> Vec<String> {
        vec![CURRENT_DATE.to_string()]
    }

    fn label(&self) -> String {
        "Document title".to_string()
    }

    async fn resolve(
        &self,
        ctx: &ResolutionContext,
        _cancel: CancellationToken,
    ) -> Result<Option<InjectorResult>, InjectorError> {
        let name = ctx.template_id().unwrap_or("Document");
        let title = match ctx.resolved(CURRENT_DATE) {
            Some(date) => match date.to_plain() {
                serde_json::Value::String(date) => format!("{name} - {date}"),
                other => format!("{name} - {other}"),
            },
            None => name.to_string(),
        };
        Ok(Some(InjectorResult::new(title)))
    }
}

/// Reference number derived from the template id.
///
/// Critical: a document without a reference cannot be issued, so resolution
/// aborts when no template is selected.
pub struct ReferenceNumber;

#[async_trait]
impl Injector for ReferenceNumber {
    fn code(&self) -> &str {
        "reference_number"
    }

    fn data_type(&self) -> ValueType {
        ValueType::String
    }

    fn is_critical(&self) -> bool {
        true
    }

    fn label(&self) -> String {
        "Reference number".to_string()
    }

    async fn resolve(
        &self,
        ctx: &ResolutionContext,
        _cancel: CancellationToken,
    ) -> Result<Option<InjectorResult>, InjectorError> {
        let template = ctx
            .template_id()
            .ok_or_else(|| InjectorError::failed("no template selected"))?;
        let reference = format!(
            "{}-{}-{}",
            ctx.tenant_code().to_uppercase(),
            template.to_uppercase(),
            ctx.workspace_code()
        );
        Ok(Some(InjectorResult::new(reference)))
    }
}

/// Registers the demo injectors.
///
/// # Errors
///
/// Returns [`RegistryError::DuplicateCode`] if a demo code is already taken.
pub fn register_demo_injectors(registry: &mut InjectorRegistry) -> Result<(), RegistryError> {
    registry.try_register(DocumentTitle)?;
    registry.try_register(ReferenceNumber)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use quill_injector::InjectableValue;

    #[tokio::test]
    async fn title_uses_resolved_date_when_available() {
        let ctx = ResolutionContext::builder().template("Quote").build();
        ctx.set_resolved(CURRENT_DATE, InjectableValue::from("05/11/2024"));

        let result = DocumentTitle
            .resolve(&ctx, CancellationToken::new())
            .await
            .unwrap()
            .unwrap();

        assert_eq!(result.value, InjectableValue::from("Quote - 05/11/2024"));
    }

    #[tokio::test]
    async fn reference_requires_a_template() {
        let ctx = ResolutionContext::new();
        let err = ReferenceNumber
            .resolve(&ctx, CancellationToken::new())
            .await
            .unwrap_err();
        assert_eq!(err, InjectorError::failed("no template selected"));
    }
}
