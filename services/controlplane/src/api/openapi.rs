//! OpenAPI document for the admin surface.
use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "conveyor-controlplane",
        version = "v1",
        description = "Conveyor broker control plane HTTP API"
    ),
    paths(
        crate::api::system::status,
        crate::api::schemas::create_new_schema,
        crate::api::schemas::get_all_schemas,
        crate::api::schemas::get_schema_details,
        crate::api::schemas::remove_schema,
        crate::api::schemas::create_new_version,
        crate::api::schemas::roll_back_version,
        crate::api::schemas::validate_schema,
        crate::api::stations::create_station,
        crate::api::stations::get_all_stations,
        crate::api::stations::get_stations_by_factory,
        crate::api::stations::get_station_details,
        crate::api::stations::get_schema_details_for_station,
        crate::api::stations::attach_schema_to_station,
        crate::api::stations::detach_schema_from_station,
        crate::api::stations::remove_station,
        crate::api::factories::create_factory,
        crate::api::factories::get_all_factories,
        crate::api::factories::get_factory_details,
        crate::api::factories::remove_factory,
        crate::api::producers::get_all_producers,
        crate::api::producers::get_all_producers_by_station,
        crate::api::consumers::get_all_consumers,
        crate::api::consumers::get_all_consumers_by_station,
        crate::api::tags::create_tag,
        crate::api::tags::get_all_tags,
        crate::api::tags::get_tags_by_entity,
        crate::api::tags::attach_tag,
        crate::api::tags::detach_tag,
        crate::api::tags::remove_tag,
        crate::api::audit_logs::get_audit_logs_by_station
    ),
    components(schemas(
        crate::api::types::ErrorResponse,
        crate::api::types::HealthStatus,
        crate::api::types::CreateSchemaRequest,
        crate::api::types::SchemaNameRequest,
        crate::api::types::RemoveSchemaRequest,
        crate::api::types::CreateVersionRequest,
        crate::api::types::RollbackVersionRequest,
        crate::api::types::ValidateSchemaRequest,
        crate::api::types::ValidateSchemaResponse,
        crate::api::types::CreateStationRequest,
        crate::api::types::StationNameRequest,
        crate::api::types::AttachSchemaRequest,
        crate::api::types::CreateFactoryRequest,
        crate::api::types::FactoryNameRequest,
        crate::api::types::CreateTagRequest,
        crate::api::types::TagNameRequest,
        crate::api::types::TagAttachmentRequest,
        crate::api::types::TagsByEntityRequest,
        crate::handlers::tags::TagSpec,
        crate::model::EntityId,
        crate::model::AuditLog,
        crate::model::UserType,
        crate::model::Connection,
        crate::model::Consumer,
        crate::model::ExtendedConsumer,
        crate::model::Factory,
        crate::model::ExtendedFactory,
        crate::model::FactoryDetails,
        crate::model::HandleKind,
        crate::model::Producer,
        crate::model::ExtendedProducer,
        crate::model::Schema,
        crate::model::SchemaDetails,
        crate::model::SchemaSummary,
        crate::model::SchemaType,
        crate::model::SchemaVersion,
        crate::model::RetentionPolicy,
        crate::model::RetentionType,
        crate::model::SchemaBinding,
        crate::model::Station,
        crate::model::StationDetails,
        crate::model::StorageType,
        crate::model::Tag,
        crate::model::TagEntityKind
    )),
    tags(
        (name = "system", description = "Health and discovery"),
        (name = "schemas", description = "Schema management and versioning"),
        (name = "stations", description = "Station management"),
        (name = "factories", description = "Factory management"),
        (name = "producers", description = "Producer views"),
        (name = "consumers", description = "Consumer views"),
        (name = "tags", description = "Tag management"),
        (name = "auditlogs", description = "Audit history")
    )
)]
pub struct ApiDoc;
