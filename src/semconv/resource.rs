//! Resource attribute keys.

/// Logical name of the service emitting spans.
pub const SERVICE_NAME: &str = "service.name";

/// Version of the service emitting spans.
pub const SERVICE_VERSION: &str = "service.version";

/// Unique id of the service instance, `<hostname>-<pid>` here.
pub const SERVICE_INSTANCE_ID: &str = "service.instance.id";

/// Deployment environment, e.g. `"production"`.
pub const DEPLOYMENT_ENVIRONMENT: &str = "deployment.environment";

/// Name of the runtime the service runs on.
pub const PROCESS_RUNTIME_NAME: &str = "process.runtime.name";

/// Version of the runtime the service runs on.
pub const PROCESS_RUNTIME_VERSION: &str = "process.runtime.version";

/// Process identifier.
pub const PROCESS_PID: &str = "process.pid";

/// Name of the telemetry library producing the spans.
pub const TELEMETRY_SDK_NAME: &str = "telemetry.sdk.name";

/// Version of the telemetry library producing the spans.
pub const TELEMETRY_SDK_VERSION: &str = "telemetry.sdk.version";

/// Language of the telemetry library producing the spans.
pub const TELEMETRY_SDK_LANGUAGE: &str = "telemetry.sdk.language";
