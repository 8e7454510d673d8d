//! Process-wide resource metadata attached to every exported span batch.

use std::env;

use crate::attributes::Attribute;
use crate::semconv;

const OTEL_SERVICE_NAME: &str = "OTEL_SERVICE_NAME";
const OTEL_SERVICE_VERSION: &str = "OTEL_SERVICE_VERSION";
const APP_ENV: &str = "APP_ENV";

const DEFAULT_SERVICE_NAME: &str = "unknown_service";
const DEFAULT_SERVICE_VERSION: &str = "1.0.0";
const DEFAULT_DEPLOYMENT_ENVIRONMENT: &str = "production";

/// Descriptive metadata about the emitting process.
///
/// Attached identically to every export. The exporter re-reads it from the
/// environment on each export call; building it is cheap, so staleness is
/// not a concern.
#[derive(Clone, Debug)]
pub struct Resource {
    attributes: Vec<Attribute>,
}

impl Resource {
    /// Detect the resource from the environment.
    ///
    /// `OTEL_SERVICE_NAME` falls back to `unknown_service`,
    /// `OTEL_SERVICE_VERSION` to `1.0.0` and `APP_ENV` to `production`.
    pub fn from_env() -> Self {
        let instance_id = format!("{}-{}", hostname(), std::process::id());

        Resource {
            attributes: vec![
                Attribute::string(
                    semconv::resource::SERVICE_NAME,
                    env_or(OTEL_SERVICE_NAME, DEFAULT_SERVICE_NAME),
                ),
                Attribute::string(
                    semconv::resource::SERVICE_VERSION,
                    env_or(OTEL_SERVICE_VERSION, DEFAULT_SERVICE_VERSION),
                ),
                Attribute::string(semconv::resource::SERVICE_INSTANCE_ID, instance_id),
                Attribute::string(
                    semconv::resource::DEPLOYMENT_ENVIRONMENT,
                    env_or(APP_ENV, DEFAULT_DEPLOYMENT_ENVIRONMENT),
                ),
                Attribute::string(semconv::resource::PROCESS_RUNTIME_NAME, "rust"),
                Attribute::string(
                    semconv::resource::PROCESS_RUNTIME_VERSION,
                    env!("CARGO_PKG_RUST_VERSION"),
                ),
                Attribute::int(semconv::resource::PROCESS_PID, i64::from(std::process::id())),
                Attribute::string(semconv::resource::TELEMETRY_SDK_NAME, env!("CARGO_PKG_NAME")),
                Attribute::string(
                    semconv::resource::TELEMETRY_SDK_VERSION,
                    env!("CARGO_PKG_VERSION"),
                ),
                Attribute::string(semconv::resource::TELEMETRY_SDK_LANGUAGE, "rust"),
            ],
        }
    }

    /// The resource attributes, in a fixed order.
    pub fn attributes(&self) -> &[Attribute] {
        &self.attributes
    }

    pub(crate) fn into_attributes(self) -> Vec<Attribute> {
        self.attributes
    }
}

fn env_or(key: &str, default: &str) -> String {
    env::var(key)
        .ok()
        .filter(|v| !v.is_empty())
        .unwrap_or_else(|| default.to_owned())
}

fn hostname() -> String {
    env::var("HOSTNAME")
        .ok()
        .filter(|v| !v.is_empty())
        .unwrap_or_else(|| "localhost".to_owned())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::attributes::AttributeValue;

    fn value_of<'a>(resource: &'a Resource, key: &str) -> Option<&'a AttributeValue> {
        resource
            .attributes()
            .iter()
            .find(|a| a.key == key)
            .map(|a| &a.value)
    }

    #[test]
    fn defaults_apply_when_env_unset() {
        temp_env::with_vars(
            [
                (OTEL_SERVICE_NAME, None::<&str>),
                (OTEL_SERVICE_VERSION, None),
                (APP_ENV, None),
            ],
            || {
                let resource = Resource::from_env();
                assert_eq!(
                    value_of(&resource, semconv::resource::SERVICE_NAME),
                    Some(&AttributeValue::String("unknown_service".to_owned()))
                );
                assert_eq!(
                    value_of(&resource, semconv::resource::SERVICE_VERSION),
                    Some(&AttributeValue::String("1.0.0".to_owned()))
                );
                assert_eq!(
                    value_of(&resource, semconv::resource::DEPLOYMENT_ENVIRONMENT),
                    Some(&AttributeValue::String("production".to_owned()))
                );
            },
        );
    }

    #[test]
    fn env_overrides_are_picked_up_per_call() {
        temp_env::with_vars(
            [(OTEL_SERVICE_NAME, Some("checkout")), (APP_ENV, Some("staging"))],
            || {
                let resource = Resource::from_env();
                assert_eq!(
                    value_of(&resource, semconv::resource::SERVICE_NAME),
                    Some(&AttributeValue::String("checkout".to_owned()))
                );
                assert_eq!(
                    value_of(&resource, semconv::resource::DEPLOYMENT_ENVIRONMENT),
                    Some(&AttributeValue::String("staging".to_owned()))
                );
            },
        );
    }

    #[test]
    fn pid_is_integer_typed() {
        let resource = Resource::from_env();
        assert!(matches!(
            value_of(&resource, semconv::resource::PROCESS_PID),
            Some(AttributeValue::Int(_))
        ));
    }
}
