use serde_json::json;
use serial_test::serial;
use std::env;
use std::fs;
use stepweaver::core::config::loader::CONFIG_FILE_NAME;
use stepweaver::core::workflows::{
    CREATE_BASE_DOCUMENTS, CREATE_BASE_EXTRACTED_ENTITIES, CREATE_BASE_TEXT_UNITS,
};
use stepweaver::core::{ConfigLoader, WorkflowRegistry};
use tempfile::TempDir;

const OVERRIDE_VARS: [&str; 3] = [
    "STEPWEAVER_GRAPHML_SNAPSHOT",
    "STEPWEAVER_RAW_ENTITY_SNAPSHOT",
    "STEPWEAVER_CHUNK_COLUMN",
];

fn clear_env() {
    for var in OVERRIDE_VARS {
        env::remove_var(var);
    }
}

#[test]
#[serial]
fn test_toml_workspace_config_drives_builders() {
    clear_env();
    let dir = TempDir::new().unwrap();
    fs::write(
        dir.path().join(CONFIG_FILE_NAME),
        r#"
[logging]
default_level = "debug"

[workflows.create_base_text_units]
chunk_by = ["title"]

[workflows.create_base_text_units.text_chunk]
size = 300

[workflows.create_base_extracted_entities]
graphml_snapshot = true

[workflows.create_base_extracted_entities.graph_merge_operations.edges]
weight = "max"
"#,
    )
    .unwrap();

    let pipeline = ConfigLoader::load_from_workspace(dir.path()).unwrap();
    let plans = WorkflowRegistry::with_defaults().plan_all(&pipeline).unwrap();

    let text_units = &plans[0];
    assert_eq!(text_units.name, CREATE_BASE_TEXT_UNITS);
    assert_eq!(text_units.steps[2].arg("groupby"), Some(&json!(["title"])));
    assert_eq!(text_units.steps[3].arg("size"), Some(&json!(300)));

    let entities = &plans[2];
    assert!(entities.steps[3].is_enabled());
    assert_eq!(entities.steps[2].args["edges"]["weight"], json!("max"));
    assert_eq!(entities.steps[2].args["edges"]["source_id"]["operation"], json!("concat"));
}

#[test]
#[serial]
fn test_yaml_config_is_selected_by_extension() {
    clear_env();
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("pipeline.yaml");
    fs::write(
        &path,
        "workflows:\n  create_base_documents:\n    document_attribute_columns: [year, author]\n",
    )
    .unwrap();

    let pipeline = ConfigLoader::load_from_file(&path).unwrap().unwrap();
    let documents = pipeline.workflow(CREATE_BASE_DOCUMENTS).unwrap();
    assert_eq!(
        documents.get_string_list("document_attribute_columns").unwrap(),
        vec!["year", "author"]
    );
}

#[test]
#[serial]
fn test_missing_file_yields_defaults() {
    clear_env();
    let dir = TempDir::new().unwrap();
    assert!(ConfigLoader::load_from_file(&dir.path().join(CONFIG_FILE_NAME))
        .unwrap()
        .is_none());
    let pipeline = ConfigLoader::load_from_workspace(dir.path()).unwrap();
    assert!(pipeline.workflows.is_empty());
}

#[test]
#[serial]
fn test_malformed_file_reports_parse_error() {
    clear_env();
    let dir = TempDir::new().unwrap();
    fs::write(dir.path().join(CONFIG_FILE_NAME), "[workflows\nbroken").unwrap();
    let err = ConfigLoader::load_from_workspace(dir.path()).unwrap_err();
    assert_eq!(err.code, "CFG-PARSE-001");
    let cause = err.source.as_ref().expect("parse cause");
    assert!(cause.downcast_ref::<toml::de::Error>().is_some());
    assert!(err.to_string().contains("Caused by:"));
}

#[test]
#[serial]
fn test_unreadable_file_keeps_io_cause() {
    clear_env();
    let dir = TempDir::new().unwrap();
    fs::create_dir(dir.path().join(CONFIG_FILE_NAME)).unwrap();
    let err = ConfigLoader::load_from_workspace(dir.path()).unwrap_err();
    assert_eq!(err.code, "CFG-IO-001");
    let cause = std::error::Error::source(&err).expect("io cause");
    assert!(cause.downcast_ref::<std::io::Error>().is_some());
}

#[test]
#[serial]
fn test_env_overrides_take_precedence_over_file() {
    clear_env();
    let dir = TempDir::new().unwrap();
    fs::write(
        dir.path().join(CONFIG_FILE_NAME),
        "[workflows.create_base_extracted_entities]\ngraphml_snapshot = false\n",
    )
    .unwrap();

    env::set_var("STEPWEAVER_GRAPHML_SNAPSHOT", "true");
    env::set_var("STEPWEAVER_RAW_ENTITY_SNAPSHOT", "not-a-bool");
    env::set_var("STEPWEAVER_CHUNK_COLUMN", "body");
    let pipeline = ConfigLoader::load_from_workspace(dir.path());
    clear_env();
    let pipeline = pipeline.unwrap();

    let entities = pipeline.workflow(CREATE_BASE_EXTRACTED_ENTITIES).unwrap();
    assert!(entities.get_bool("graphml_snapshot", false).unwrap());
    assert!(!entities.contains("raw_entity_snapshot"));

    let text_units = pipeline.workflow(CREATE_BASE_TEXT_UNITS).unwrap();
    assert_eq!(text_units.get_str("chunk_column", "chunk").unwrap(), "body");
}

#[test]
#[serial]
fn test_chunk_column_override_keeps_extraction_in_step() {
    clear_env();
    let dir = TempDir::new().unwrap();
    fs::write(
        dir.path().join(CONFIG_FILE_NAME),
        "[workflows.create_base_extracted_entities.entity_extract]\nmax_gleanings = 1\n",
    )
    .unwrap();

    env::set_var("STEPWEAVER_CHUNK_COLUMN", "body");
    let pipeline = ConfigLoader::load_from_workspace(dir.path());
    clear_env();
    let plans = WorkflowRegistry::with_defaults()
        .plan_all(&pipeline.unwrap())
        .unwrap();

    let text_units = &plans[0];
    assert_eq!(
        text_units.steps[8].arg("to"),
        Some(&json!(["document_ids", "body", "n_tokens"]))
    );
    let extract = &plans[2].steps[0];
    assert_eq!(extract.arg("column"), Some(&json!("body")));
    assert_eq!(extract.arg("max_gleanings"), Some(&json!(1)));
}

#[test]
#[serial]
fn test_chunk_column_override_leaves_malformed_extract_for_builder() {
    clear_env();
    let dir = TempDir::new().unwrap();
    fs::write(
        dir.path().join(CONFIG_FILE_NAME),
        "[workflows.create_base_extracted_entities]\nentity_extract = \"graph\"\n",
    )
    .unwrap();

    env::set_var("STEPWEAVER_CHUNK_COLUMN", "body");
    let pipeline = ConfigLoader::load_from_workspace(dir.path());
    clear_env();
    let err = WorkflowRegistry::with_defaults()
        .plan(
            CREATE_BASE_EXTRACTED_ENTITIES,
            &pipeline.unwrap().workflow_or_default(CREATE_BASE_EXTRACTED_ENTITIES),
        )
        .unwrap_err();
    assert_eq!(err.code, "CFG-SHAPE-001");
}

#[test]
fn test_env_var_documentation_lists_overrides() {
    let docs = ConfigLoader::env_var_documentation();
    for var in OVERRIDE_VARS {
        assert!(docs.iter().any(|line| line.starts_with(var)), "{} undocumented", var);
    }
}
