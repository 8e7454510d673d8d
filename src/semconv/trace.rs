//! Span attribute keys.

/// The database management system product, e.g. `"mysql"`.
pub const DB_SYSTEM: &str = "db.system";

/// The database statement being executed.
pub const DB_STATEMENT: &str = "db.statement";

/// The name of the operation being executed, e.g. `"select"`.
pub const DB_OPERATION: &str = "db.operation";

/// The name of the database being accessed.
pub const DB_NAME: &str = "db.name";

/// The primary table the operation is acting upon, best effort.
pub const DB_SQL_TABLE: &str = "db.sql.table";

/// Username for accessing the database.
pub const DB_USER: &str = "db.user";

/// The logical connection name the statement ran on.
pub const DB_CONNECTION: &str = "db.connection";

/// Statement execution time in milliseconds, stringified.
pub const DB_DURATION: &str = "db.duration";

/// Number of rows affected or returned by the statement.
pub const DB_ROWS_AFFECTED: &str = "db.rows_affected";

/// Server domain name or IP address.
pub const SERVER_ADDRESS: &str = "server.address";

/// Server port number.
///
/// # Examples
///
/// - `443`
/// - `3306`
pub const SERVER_PORT: &str = "server.port";

/// OSI transport layer protocol, e.g. `"tcp"`.
pub const NETWORK_TRANSPORT: &str = "network.transport";

/// OSI network layer protocol, e.g. `"ipv4"`.
pub const NETWORK_TYPE: &str = "network.type";

/// Application layer protocol name, e.g. `"http"`.
pub const NETWORK_PROTOCOL_NAME: &str = "network.protocol.name";

/// Application layer protocol version, e.g. `"1.1"`.
pub const NETWORK_PROTOCOL_VERSION: &str = "network.protocol.version";

/// HTTP request method, e.g. `"GET"`.
pub const HTTP_REQUEST_METHOD: &str = "http.request.method";

/// Size of the outgoing request body in bytes.
pub const HTTP_REQUEST_BODY_SIZE: &str = "http.request.body.size";

/// HTTP response status code.
pub const HTTP_RESPONSE_STATUS_CODE: &str = "http.response.status_code";

/// Size of the response body in bytes.
pub const HTTP_RESPONSE_BODY_SIZE: &str = "http.response.body.size";

/// The response `Content-Type` header.
pub const HTTP_RESPONSE_CONTENT_TYPE: &str = "http.response.header.content-type";

/// Absolute request URL.
///
/// # Examples
///
/// - `"https://api.example.com/v1/x?y=1"`
pub const URL_FULL: &str = "url.full";

/// URL scheme component, e.g. `"https"`.
pub const URL_SCHEME: &str = "url.scheme";

/// URL path component, e.g. `"/v1/x"`.
pub const URL_PATH: &str = "url.path";

/// URL query component without the leading `?`, e.g. `"y=1"`.
pub const URL_QUERY: &str = "url.query";

/// Value of the outgoing `User-Agent` header.
pub const USER_AGENT_ORIGINAL: &str = "user_agent.original";

/// The type of the error the traced operation ended with.
pub const EXCEPTION_TYPE: &str = "exception.type";

/// The message of the error the traced operation ended with.
pub const EXCEPTION_MESSAGE: &str = "exception.message";
