use serde_json::json;
use stepweaver::step_args;
use stepweaver::core::pipeline::{
    explain_steps, lint_steps, verbs, LintSeverity, StepInput, DEFAULT_INPUT_NAME,
};
use stepweaver::core::workflows::{
    CREATE_BASE_DOCUMENTS, CREATE_BASE_EXTRACTED_ENTITIES, CREATE_BASE_TEXT_UNITS,
};
use stepweaver::core::{
    AppError, ErrorCategory, PipelineConfig, StepDescriptor, WorkflowConfig, WorkflowRegistry,
};

fn passthrough(_config: &WorkflowConfig) -> Result<Vec<StepDescriptor>, AppError> {
    Ok(vec![StepDescriptor::new(
        verbs::COPY,
        step_args!({"column": "text", "to": "chunk"}),
    )
    .with_input(StepInput::source(DEFAULT_INPUT_NAME))])
}

#[test]
fn test_builtin_workflows_lint_clean() {
    let registry = WorkflowRegistry::with_defaults();
    for name in registry.names() {
        let steps = registry.build(name, &WorkflowConfig::new()).unwrap();
        let findings = lint_steps(&steps);
        assert!(
            findings.is_empty(),
            "{} produced lint findings: {:?}",
            name,
            findings
        );
    }
}

#[test]
fn test_registered_override_is_used_for_planning() {
    let mut registry = WorkflowRegistry::with_defaults();
    registry.register(CREATE_BASE_TEXT_UNITS, passthrough);

    let plan = registry
        .plan(CREATE_BASE_TEXT_UNITS, &WorkflowConfig::new())
        .unwrap();
    assert_eq!(plan.steps.len(), 1);
    assert_eq!(plan.steps[0].verb, verbs::COPY);
    assert!(plan.dependencies.is_empty());
}

#[test]
fn test_plans_record_upstream_workflows() {
    let registry = WorkflowRegistry::with_defaults();
    let documents = registry
        .plan(CREATE_BASE_DOCUMENTS, &WorkflowConfig::new())
        .unwrap();
    assert_eq!(documents.dependencies, vec!["create_final_text_units"]);

    let entities = registry
        .plan(CREATE_BASE_EXTRACTED_ENTITIES, &WorkflowConfig::new())
        .unwrap();
    assert_eq!(entities.dependencies, vec![CREATE_BASE_TEXT_UNITS]);
}

#[test]
fn test_fingerprint_is_stable_and_config_sensitive() {
    let registry = WorkflowRegistry::with_defaults();
    let config = WorkflowConfig::new().with("chunk_by", json!(["title"]));

    let first = registry.plan(CREATE_BASE_TEXT_UNITS, &config).unwrap();
    let second = registry.plan(CREATE_BASE_TEXT_UNITS, &config).unwrap();
    assert_eq!(first.fingerprint, second.fingerprint);
    assert_eq!(first.fingerprint.len(), 64);

    let other = registry
        .plan(CREATE_BASE_TEXT_UNITS, &WorkflowConfig::new())
        .unwrap();
    assert_ne!(first.fingerprint, other.fingerprint);
}

#[test]
fn test_plan_all_uses_pipeline_config_per_workflow() {
    let registry = WorkflowRegistry::with_defaults();
    let mut pipeline = PipelineConfig::default();
    pipeline
        .workflow_mut(CREATE_BASE_DOCUMENTS)
        .set("document_attribute_columns", json!(["year"]));
    pipeline
        .workflow_mut("create_final_entities")
        .set("anything", true);

    let plans = registry.plan_all(&pipeline).unwrap();
    let names: Vec<&str> = plans.iter().map(|plan| plan.name.as_str()).collect();
    assert_eq!(
        names,
        vec![
            CREATE_BASE_TEXT_UNITS,
            CREATE_BASE_DOCUMENTS,
            CREATE_BASE_EXTRACTED_ENTITIES
        ]
    );
    let documents = &plans[1];
    assert!(documents
        .steps
        .iter()
        .any(|step| step.verb == verbs::MERGE_OVERRIDE && step.is_enabled()));
}

#[test]
fn test_plan_surfaces_config_errors_with_workflow_context() {
    let registry = WorkflowRegistry::with_defaults();
    let config = WorkflowConfig::new().with("graph_merge_operations", "sum");
    let err = registry
        .plan(CREATE_BASE_EXTRACTED_ENTITIES, &config)
        .unwrap_err();
    assert_eq!(err.category, ErrorCategory::ConfigurationError);
    assert_eq!(
        err.context.get("workflow").map(String::as_str),
        Some(CREATE_BASE_EXTRACTED_ENTITIES)
    );
}

#[test]
fn test_plan_rejects_forward_references() {
    let mut registry = WorkflowRegistry::new();
    registry.register(
        "forward",
        |_config: &WorkflowConfig| -> Result<Vec<StepDescriptor>, AppError> {
            Ok(vec![
                StepDescriptor::new(verbs::JOIN, step_args!({"on": ["id", "id"]}))
                    .with_input(StepInput::with_others("later", [DEFAULT_INPUT_NAME])),
                StepDescriptor::new(verbs::COPY, step_args!({})).with_id("later"),
            ])
        },
    );
    let err = registry.plan("forward", &WorkflowConfig::new()).unwrap_err();
    assert_eq!(err.category, ErrorCategory::ValidationError);
    assert_eq!(err.code, "STEP-LINT-002");
    assert_eq!(
        err.context.get("location").map(String::as_str),
        Some("steps[0]")
    );
    assert!(err
        .context
        .get("suggestion")
        .is_some_and(|hint| hint.contains("earlier step")));
    assert!(err.to_string().contains("suggestion="));
}

#[test]
fn test_implicit_first_input_only_warns() {
    let mut registry = WorkflowRegistry::new();
    registry.register(
        "implicit",
        |_config: &WorkflowConfig| -> Result<Vec<StepDescriptor>, AppError> {
            Ok(vec![StepDescriptor::new(verbs::COPY, step_args!({}))])
        },
    );
    let steps = registry.build("implicit", &WorkflowConfig::new()).unwrap();
    assert_eq!(lint_steps(&steps)[0].severity, LintSeverity::Warning);
    assert!(registry.plan("implicit", &WorkflowConfig::new()).is_ok());
}

#[test]
fn test_explain_resolves_documents_wiring() {
    let registry = WorkflowRegistry::with_defaults();
    let steps = registry
        .build(CREATE_BASE_DOCUMENTS, &WorkflowConfig::new())
        .unwrap();
    let explained = explain_steps(&steps);

    assert_eq!(explained[0].source, "workflow:create_final_text_units");
    assert_eq!(explained[1].source, "step_0");
    assert_eq!(explained[2].id, "rename_chunk_doc_id");
    assert_eq!(explained[3].source, "rename_chunk_doc_id");
    assert_eq!(explained[3].others, vec![DEFAULT_INPUT_NAME]);
    assert_eq!(explained[4].source, "step_3");

    // the disabled attribute fold is skipped when wiring the final convert
    let fold = explained.len() - 2;
    assert!(!explained[fold].enabled);
    assert_eq!(explained[fold + 1].source, format!("step_{}", fold - 1));
}
