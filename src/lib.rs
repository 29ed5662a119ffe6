// Module layout (Clean Architecture style)
// - bootstrap: configuration, store construction and lifecycle
// - infrastructure: Postgres/PostgREST/in-memory stores and upload storage
// - presentation: HTTP handlers and routing
// - application: ports and use cases
// - domain: documents and content normalization

pub mod application;
pub mod bootstrap;
pub mod domain;
pub mod infrastructure;
pub mod presentation;
