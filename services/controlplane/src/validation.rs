//! Input validators for domain entities.
//!
//! # Purpose
//! Pure functions over raw user-provided strings. Naming rules are shared by
//! every object kind; schema content is compiled with `protox` against a
//! resolver that serves the submitted text for any filename, so imports can
//! only ever resolve back to the submitted content.
use crate::error::{OpsError, OpsResult};
use crate::model::{HandleKind, SchemaType};
use protox::Compiler;
use protox::file::{File, FileResolver};

const MAX_NAME_LEN: usize = 32;

/// Validate an object name (station, producer, consumer, schema, factory,
/// tag): lowercase `[a-z0-9_]`, length 1 to 32. `kind` shapes the error text.
pub fn validate_object_name(name: &str, kind: &str) -> OpsResult<()> {
    if name.is_empty() {
        return Err(OpsError::Validation(format!("{kind} name can not be empty")));
    }
    if name.len() > MAX_NAME_LEN {
        return Err(OpsError::Validation(format!(
            "{kind} name should be under {MAX_NAME_LEN} characters"
        )));
    }
    let valid = name
        .chars()
        .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_');
    if !valid {
        return Err(OpsError::Validation(format!(
            "{kind} name has to include only lowercase letters, numbers and _"
        )));
    }
    Ok(())
}

/// Parse a producer/consumer type; only application and connector exist.
pub fn parse_handle_kind(raw: &str, kind: &str) -> OpsResult<HandleKind> {
    match raw {
        "application" => Ok(HandleKind::Application),
        "connector" => Ok(HandleKind::Connector),
        _ => Err(OpsError::Validation(format!(
            "{kind} type has to be one of the following application/connector"
        ))),
    }
}

/// Parse a schema type. Avro and json are recognized but rejected with a
/// distinct error from entirely unknown types.
pub fn parse_schema_type(raw: &str) -> OpsResult<SchemaType> {
    match raw {
        "protobuf" => Ok(SchemaType::Protobuf),
        "avro" | "json" => Err(OpsError::Unsupported(
            "Json/Avro types are not supported at this time".to_string(),
        )),
        _ => Err(OpsError::UnsupportedType("unsupported schema type".to_string())),
    }
}

/// Validate schema content for the given type. Protobuf content must compile
/// as a single proto file; the diagnostic of a failed compile is surfaced to
/// the caller verbatim.
pub fn validate_schema_content(content: &str, schema_type: SchemaType) -> OpsResult<()> {
    if content.is_empty() {
        return Err(OpsError::SchemaValidation(
            "Your schema content is invalid".to_string(),
        ));
    }
    match schema_type {
        SchemaType::Protobuf => validate_protobuf_content(content),
        SchemaType::Avro | SchemaType::Json => Ok(()),
    }
}

/// The message struct name is required exactly when the type is protobuf.
pub fn validate_message_struct_name(
    message_struct_name: &str,
    schema_type: SchemaType,
) -> OpsResult<()> {
    if schema_type == SchemaType::Protobuf && message_struct_name.is_empty() {
        return Err(OpsError::Validation(
            "Message struct name is required when schema type is protobuf".to_string(),
        ));
    }
    Ok(())
}

// Serves the submitted schema text for every filename the compiler asks for,
// so imports always resolve to the submitted content.
struct SubmittedContent {
    source: String,
}

impl FileResolver for SubmittedContent {
    fn open_file(&self, name: &str) -> Result<File, protox::Error> {
        File::from_source(name, &self.source)
    }
}

fn validate_protobuf_content(content: &str) -> OpsResult<()> {
    let mut compiler = Compiler::with_file_resolver(SubmittedContent {
        source: content.to_string(),
    });
    compiler
        .open_file("schema.proto")
        .map_err(|err| OpsError::SchemaValidation(format!("Your proto file is invalid: {err}")))?;
    Ok(())
}
